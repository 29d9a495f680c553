// Consumer-facing statistics over (possibly gappy) series.
// An all-null or empty series yields None ("no data"), never a division by zero.

use serde::Serialize;

use crate::models::TimeSeriesRecord;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    /// Most recent non-null value.
    pub latest: f64,
    /// Non-null values seen.
    pub samples: usize,
}

/// Summary of one metric over `points`, in point order.
pub fn summarize<R: TimeSeriesRecord>(points: &[R], metric: &R::Metric) -> Option<SeriesSummary> {
    summarize_values(points.iter().map(|p| p.metric(metric)))
}

pub fn summarize_values(values: impl IntoIterator<Item = Option<f64>>) -> Option<SeriesSummary> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    let mut latest = None;
    let mut samples = 0usize;
    for v in values.into_iter().flatten().filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
        sum += v;
        latest = Some(v);
        samples += 1;
    }
    let latest = latest?;
    Some(SeriesSummary {
        min,
        max,
        avg: sum / samples as f64,
        latest,
        samples,
    })
}

/// Percentage of slots without a value; `None` for an empty series.
pub fn loss_percent<R: TimeSeriesRecord>(points: &[R], metric: &R::Metric) -> Option<f64> {
    if points.is_empty() {
        return None;
    }
    let lost = points.iter().filter(|p| p.metric(metric).is_none()).count();
    Some(lost as f64 * 100.0 / points.len() as f64)
}
