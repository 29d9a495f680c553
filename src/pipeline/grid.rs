// Grid construction and tolerant sample matching.
//
// Samples arrive with jitter; each grid slot takes the first unconsumed
// sample within ±tolerance, otherwise a null template stamped with the slot time.

use chrono::{DateTime, Utc};

use crate::error::PipelineError;
use crate::models::{TimeSeriesRecord, from_millis};

const MS_PER_SEC: i64 = 1000;

/// Grid duration mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Exactly `total_secs` long, `total_secs / interval + 1` slots.
    Fixed { total_secs: u64 },
    /// From the first sample to the last.
    Spanning,
}

impl Window {
    /// `None` or `0` means no retention window was requested.
    pub fn from_total_secs(total_secs: Option<u64>) -> Self {
        match total_secs {
            Some(total_secs) if total_secs > 0 => Window::Fixed { total_secs },
            _ => Window::Spanning,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GridSpec {
    pub interval_secs: u64,
    pub window: Window,
    /// Defaults to `interval_secs`.
    pub tolerance_secs: Option<u64>,
    /// Fixed windows end here when set (typically "now"); otherwise they are
    /// anchored on the data.
    pub end: Option<DateTime<Utc>>,
}

impl GridSpec {
    pub fn new(interval_secs: u64, window: Window) -> Self {
        Self {
            interval_secs,
            window,
            tolerance_secs: None,
            end: None,
        }
    }

    pub fn with_tolerance(mut self, tolerance_secs: u64) -> Self {
        self.tolerance_secs = Some(tolerance_secs);
        self
    }

    pub fn ending_at(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }
}

/// `secs` in milliseconds, `None` when that leaves `i64`.
pub(crate) fn secs_to_ms(secs: u64) -> Option<i64> {
    i64::try_from(secs).ok()?.checked_mul(MS_PER_SEC)
}

/// Timestamps `start, start+Δ, …, ≤ end` in epoch ms.
pub fn build_grid(start_ms: i64, end_ms: i64, interval_ms: i64) -> Vec<i64> {
    if interval_ms <= 0 || end_ms < start_ms {
        return Vec::new();
    }
    let Some(span_ms) = end_ms.checked_sub(start_ms) else {
        return Vec::new();
    };
    let count = (span_ms / interval_ms) as usize + 1;
    (0..count)
        .map(|i| start_ms + i as i64 * interval_ms)
        .collect()
}

/// Aligns `samples` onto a regular grid, filling unmatched slots with null templates.
pub fn fill_missing_time_points<R: TimeSeriesRecord>(
    samples: &[R],
    spec: &GridSpec,
) -> Result<Vec<R>, PipelineError> {
    if spec.interval_secs == 0 {
        return Err(PipelineError::InvalidInterval);
    }
    let interval_ms = secs_to_ms(spec.interval_secs).ok_or(PipelineError::InvalidInterval)?;
    if samples.is_empty() {
        return Ok(Vec::new());
    }

    // A tolerance wider than representable matches everything anyway.
    let tolerance_ms = spec
        .tolerance_secs
        .map_or(Some(interval_ms), secs_to_ms)
        .unwrap_or(i64::MAX);

    let mut sorted: Vec<(i64, &R)> = samples
        .iter()
        .map(|s| (s.time().timestamp_millis(), s))
        .collect();
    sorted.sort_by_key(|(ts, _)| *ts);

    let first_ms = sorted[0].0;
    let last_ms = sorted[sorted.len() - 1].0;
    let (start_ms, end_ms) = match spec.window {
        Window::Spanning => (first_ms, last_ms),
        Window::Fixed { total_secs } => {
            let total_ms =
                secs_to_ms(total_secs).ok_or(PipelineError::WindowOutOfRange(total_secs))?;
            let end_ms = match spec.end {
                Some(end) => end.timestamp_millis(),
                None => last_ms.max(
                    first_ms
                        .checked_add(total_ms)
                        .ok_or(PipelineError::TimestampOutOfRange(first_ms))?,
                ),
            };
            let start_ms = end_ms
                .checked_sub(total_ms)
                .ok_or(PipelineError::TimestampOutOfRange(end_ms))?;
            (start_ms, end_ms)
        }
    };
    // Both ends must be real instants before any slot is allocated.
    from_millis(start_ms)?;
    from_millis(end_ms)?;

    let grid = build_grid(start_ms, end_ms, interval_ms);
    let template = sorted[sorted.len() - 1].1.null_template();

    let mut out = Vec::with_capacity(grid.len());
    let mut cursor = 0;
    for t in grid {
        while cursor < sorted.len() && sorted[cursor].0 < t.saturating_sub(tolerance_ms) {
            cursor += 1;
        }
        let time = from_millis(t)?;
        let mut point = match sorted.get(cursor) {
            Some((ts, sample)) if (ts - t).abs() <= tolerance_ms => {
                cursor += 1;
                (*sample).clone()
            }
            _ => template.clone(),
        };
        point.set_time(time);
        out.push(point);
    }
    Ok(out)
}
