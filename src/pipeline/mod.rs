// Chart pipeline: raw samples -> grid-aligned, gap-filled, thinned, optionally clipped.
//
// Pure and synchronous. Callers fetch, then hand the records here and pass the
// result straight to the renderer.

pub mod downsample;
pub mod grid;
pub mod merge;
pub mod peaks;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::PipelineError;
use crate::models::{ChartRow, Latency, LoadMetric, LoadRecord, PingRecord, SeriesKey, TimeSeriesRecord};

pub use downsample::sample_data_by_retention;
pub use grid::{GridSpec, Window, fill_missing_time_points};
pub use merge::merge_series;
pub use peaks::cut_peak_values;

/// Per-chart parameters.
#[derive(Debug, Clone)]
pub struct ChartOptions {
    /// Grid step; the reporting interval of the source.
    pub interval_secs: u64,
    /// Fixed retention window. `None` spans exactly the observed data.
    pub window_hours: Option<f64>,
    /// Matching tolerance; defaults to `interval_secs`.
    pub tolerance_secs: Option<u64>,
    /// Lower bound on the spacing the downsampler may produce.
    pub floor_interval_secs: Option<u64>,
    pub force_preserve: bool,
    /// End of a fixed window, usually "now". Anchored on the data when unset.
    pub end: Option<DateTime<Utc>>,
}

impl ChartOptions {
    pub fn new(interval_secs: u64) -> Self {
        Self {
            interval_secs,
            window_hours: None,
            tolerance_secs: None,
            floor_interval_secs: None,
            force_preserve: false,
            end: None,
        }
    }

    pub fn window_hours(mut self, hours: f64) -> Self {
        self.window_hours = Some(hours);
        self
    }

    fn grid_spec(&self) -> GridSpec {
        let total_secs = self
            .window_hours
            .filter(|h| h.is_finite() && *h > 0.0)
            .map(|h| (h * 3600.0).round() as u64);
        GridSpec {
            interval_secs: self.interval_secs,
            window: Window::from_total_secs(total_secs),
            tolerance_secs: self.tolerance_secs,
            end: self.end,
        }
    }

    fn tolerance_secs(&self) -> u64 {
        self.tolerance_secs.unwrap_or(self.interval_secs)
    }
}

#[derive(Debug, Clone)]
pub struct ChartPipeline {
    options: ChartOptions,
}

impl ChartPipeline {
    pub fn new(options: ChartOptions) -> Self {
        Self { options }
    }

    /// Single-node load chart. `cut_peaks` names the metrics to clip.
    pub fn build_load_chart(
        &self,
        records: &[LoadRecord],
        cut_peaks: &[LoadMetric],
    ) -> Result<Vec<LoadRecord>, PipelineError> {
        self.normalize(records, cut_peaks)
    }

    /// One load metric across several nodes: a `node_metric` column per client.
    pub fn build_load_compare(
        &self,
        records: &[LoadRecord],
        metric: LoadMetric,
        cut_peaks: bool,
    ) -> Result<Vec<ChartRow>, PipelineError> {
        let mut by_node: BTreeMap<SeriesKey, Vec<LoadRecord>> = BTreeMap::new();
        for r in records {
            by_node
                .entry(SeriesKey::Load {
                    node_id: r.client.clone(),
                    metric,
                })
                .or_default()
                .push(r.clone());
        }
        self.merge_and_normalize(by_node, &metric, cut_peaks)
    }

    /// Ping chart with one column per node, merged onto shared timestamps.
    pub fn build_ping_chart(
        &self,
        records: &[PingRecord],
        cut_peaks: bool,
    ) -> Result<Vec<ChartRow>, PipelineError> {
        let mut by_node: BTreeMap<SeriesKey, Vec<PingRecord>> = BTreeMap::new();
        for r in records {
            by_node
                .entry(SeriesKey::Ping {
                    node_id: r.client.clone(),
                })
                .or_default()
                .push(r.clone());
        }
        self.merge_and_normalize(by_node, &Latency, cut_peaks)
    }

    fn merge_and_normalize<R: TimeSeriesRecord>(
        &self,
        by_node: BTreeMap<SeriesKey, Vec<R>>,
        metric: &R::Metric,
        cut_peaks: bool,
    ) -> Result<Vec<ChartRow>, PipelineError> {
        let keys: Vec<SeriesKey> = if cut_peaks {
            by_node.keys().cloned().collect()
        } else {
            Vec::new()
        };
        let merged = merge_series(
            by_node.into_iter().collect(),
            metric,
            self.options.tolerance_secs(),
        );
        self.normalize(&merged, &keys)
    }

    fn normalize<R: TimeSeriesRecord>(
        &self,
        records: &[R],
        cut_peaks: &[R::Metric],
    ) -> Result<Vec<R>, PipelineError> {
        let filled = fill_missing_time_points(records, &self.options.grid_spec())?;
        let hours = self
            .options
            .window_hours
            .unwrap_or_else(|| span_hours(&filled));
        let thinned = sample_data_by_retention(
            &filled,
            hours,
            self.options.force_preserve,
            self.options.floor_interval_secs,
        );
        let out = if cut_peaks.is_empty() {
            thinned
        } else {
            cut_peak_values(&thinned, cut_peaks)
        };
        tracing::debug!(
            operation = "normalize",
            input = records.len(),
            gridded = filled.len(),
            output = out.len(),
            "chart series built"
        );
        Ok(out)
    }
}

fn span_hours<R: TimeSeriesRecord>(points: &[R]) -> f64 {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) => {
            (last.time() - first.time()).num_milliseconds() as f64 / 3_600_000.0
        }
        _ => 0.0,
    }
}
