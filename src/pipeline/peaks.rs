// Peak clipping for display: clamp spikes in selected series to a percentile ceiling.

use crate::models::TimeSeriesRecord;

/// Percentile used as the reference level for a series.
pub const PEAK_PERCENTILE: f64 = 0.95;
/// Values above `PEAK_FACTOR × percentile` are clamped.
pub const PEAK_FACTOR: f64 = 1.5;
/// Series with fewer non-null values are left alone.
pub const MIN_PEAK_SAMPLES: usize = 8;

/// Clamps spikes in the series named by `keys`.
///
/// Times, nulls and unnamed series are untouched. Clamping to a ceiling derived from
/// a percentile at or below it leaves that percentile unchanged, so a second pass is
/// a no-op.
pub fn cut_peak_values<R: TimeSeriesRecord>(points: &[R], keys: &[R::Metric]) -> Vec<R> {
    let mut out = points.to_vec();
    for key in keys {
        let mut values: Vec<f64> = out
            .iter()
            .filter_map(|p| p.metric(key))
            .filter(|v| v.is_finite())
            .collect();
        let Some(ceiling) = peak_ceiling(&mut values) else {
            continue;
        };

        let mut clipped = 0usize;
        for point in &mut out {
            if let Some(slot) = point.metric_mut(key)
                && let Some(v) = slot
                && *v > ceiling
            {
                *v = ceiling;
                clipped += 1;
            }
        }
        if clipped > 0 {
            tracing::debug!(series = ?key, clipped, ceiling, "peak values clipped");
        }
    }
    out
}

fn peak_ceiling(values: &mut [f64]) -> Option<f64> {
    if values.len() < MIN_PEAK_SAMPLES {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let reference = nearest_rank(values, PEAK_PERCENTILE);
    (reference > 0.0).then_some(reference * PEAK_FACTOR)
}

/// Nearest-rank percentile of an ascending, non-empty slice.
fn nearest_rank(sorted: &[f64], p: f64) -> f64 {
    let rank = (p * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}
