use thiserror::Error;

/// Why a scan (or a single analysis attempt) did not produce a result.
///
/// Every variant is recoverable: the caller should prompt the user to
/// reposition the finger and retry.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanError {
    #[error("finger coverage stayed below the placement threshold")]
    InsufficientCoverage,
    #[error("not enough heartbeats detected in the analysis window")]
    InsufficientPeaks,
    #[error("signal confidence stayed below the reporting threshold")]
    LowConfidence,
    #[error("computed heart rate outside the physiological range")]
    PhysiologicallyImplausible,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}
