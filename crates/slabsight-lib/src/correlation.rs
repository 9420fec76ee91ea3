//! Cross-metric correlation statistics
//!
//! Pearson correlation between two aligned series plus mean and
//! coefficient of variation over the second, used to judge whether two
//! independently tracked allocator metrics grow together. All
//! denominator-zero cases resolve to 0 so results stay bounded and
//! comparable, never NaN.

use serde::Serialize;

use crate::store::SnapshotStore;

/// Correlation figures over the full retained history
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CorrelationResult {
    /// Pearson correlation between the two series, in [-1, 1]
    pub pearson_correlation: f64,
    /// stddev/mean of the second series, a scale-free stability indicator
    pub coefficient_of_variation: f64,
    /// Mean of the second series
    pub mean: f64,
}

/// Arithmetic mean; 0 for an empty series.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Population standard deviation; 0 for an empty series.
pub fn stddev(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let m = mean(data);
    let variance = data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / data.len() as f64;
    variance.sqrt()
}

/// stddev/mean; a zero-mean series reports 0 (no variability signal)
/// rather than dividing.
pub fn coefficient_of_variation(data: &[f64]) -> f64 {
    let m = mean(data);
    if m == 0.0 {
        return 0.0;
    }
    stddev(data) / m
}

/// Pearson correlation over the paired prefix of the two series.
///
/// Returns 0 when fewer than two pairs exist or either series has zero
/// variance.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return 0.0;
    }

    let mean_x = mean(&x[..n]);
    let mean_y = mean(&y[..n]);

    let mut numerator = 0.0;
    let mut sum_sq_x = 0.0;
    let mut sum_sq_y = 0.0;

    for i in 0..n {
        let dx = x[i] - mean_x;
        let dy = y[i] - mean_y;
        numerator += dx * dy;
        sum_sq_x += dx * dx;
        sum_sq_y += dy * dy;
    }

    let denominator = (sum_sq_x * sum_sq_y).sqrt();
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Correlate two metrics over a store's retained history.
///
/// Pearson is computed over `(metric_a, metric_b)`; the coefficient of
/// variation and mean cover `metric_b`. Histories shorter than two
/// snapshots yield the all-zero result; callers decide whether that
/// means "not enough data".
pub fn analyze(store: &SnapshotStore, metric_a: &str, metric_b: &str) -> CorrelationResult {
    if store.len() < 2 {
        return CorrelationResult::default();
    }

    let a: Vec<f64> = store.series_for(metric_a).collect();
    let b: Vec<f64> = store.series_for(metric_b).collect();

    CorrelationResult {
        pearson_correlation: pearson(&a, &b),
        coefficient_of_variation: coefficient_of_variation(&b),
        mean: mean(&b),
    }
}
