//! Small descriptive statistics with defined fallbacks.
//!
//! Every helper returns 0 instead of NaN for empty input or a zero
//! denominator.

use ndarray::Array1;

pub fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

/// Population standard deviation.
pub fn std(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|x| (x - m).powi(2)).sum::<f32>() / values.len() as f32;
    variance.sqrt()
}

/// Median of a copy of `values`; non-finite entries sort last.
pub fn median(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// `std / mean`, or 0 when the mean is zero.
pub fn coefficient_of_variation(values: &[f32]) -> f32 {
    let m = mean(values);
    if m == 0.0 || !m.is_finite() {
        return 0.0;
    }
    let cv = std(values) / m.abs();
    if cv.is_finite() {
        cv
    } else {
        0.0
    }
}

pub fn array_std(arr: &Array1<f32>) -> f32 {
    let m = arr.mean().unwrap_or(0.0);
    let variance = arr.mapv(|x| (x - m).powi(2)).mean().unwrap_or(0.0);
    variance.sqrt()
}
