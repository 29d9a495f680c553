// Retention-based downsampling: strided subsequence sized to the time window.

use super::grid::secs_to_ms;
use crate::models::TimeSeriesRecord;

/// Upper bound on points handed to the renderer for one series.
pub const MAX_CHART_POINTS: usize = 720;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Thins `points` so a `window_hours` chart stays near [`MAX_CHART_POINTS`].
///
/// The output is an ascending subsequence of the input; nothing is interpolated.
/// Effective spacing never drops below the native spacing of the input, nor below
/// `floor_interval_secs` when given. Each stride bucket is represented by its first
/// point that carries data, so isolated readings are not hidden behind gaps.
/// `force_preserve` keeps the newest point even when it falls off-stride.
pub fn sample_data_by_retention<R: TimeSeriesRecord>(
    points: &[R],
    window_hours: f64,
    force_preserve: bool,
    floor_interval_secs: Option<u64>,
) -> Vec<R> {
    if points.len() <= 2 || !window_hours.is_finite() || window_hours <= 0.0 {
        return points.to_vec();
    }
    let Some(native_ms) = native_spacing_ms(points) else {
        return points.to_vec();
    };

    let budget_ms = (window_hours * MS_PER_HOUR / MAX_CHART_POINTS as f64).ceil() as i64;
    let floor_ms = floor_interval_secs.map_or(0, |s| secs_to_ms(s).unwrap_or(i64::MAX));
    let target_ms = budget_ms.max(floor_ms).max(native_ms);
    // target_ms >= native_ms >= 1, so this is ceil(target / native) without overflow.
    let stride = usize::try_from((target_ms - 1) / native_ms + 1).unwrap_or(usize::MAX);
    if stride <= 1 {
        return points.to_vec();
    }

    let mut out: Vec<R> = points
        .chunks(stride)
        .map(|bucket| {
            bucket
                .iter()
                .find(|p| p.has_data())
                .unwrap_or(&bucket[0])
                .clone()
        })
        .collect();

    if force_preserve
        && let (Some(last_in), Some(last_out)) = (points.last(), out.last())
        && last_in.time() > last_out.time()
    {
        out.push(last_in.clone());
    }

    tracing::debug!(
        operation = "sample_data_by_retention",
        input_points = points.len(),
        output_points = out.len(),
        stride,
        "downsampled"
    );
    out
}

/// Smallest positive gap between consecutive points (the grid step for gridded input).
fn native_spacing_ms<R: TimeSeriesRecord>(points: &[R]) -> Option<i64> {
    points
        .windows(2)
        .map(|w| w[1].time().timestamp_millis() - w[0].time().timestamp_millis())
        .filter(|d| *d > 0)
        .min()
}
