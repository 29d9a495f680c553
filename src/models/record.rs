// Shared record contract for everything the chart pipeline touches.

use chrono::{DateTime, Utc};

use crate::error::PipelineError;

/// A timestamped record with a declared set of numeric metrics.
///
/// `Metric` is the per-type schema: the pipeline only ever reads or writes
/// numeric values through it, so a null template is complete by construction.
pub trait TimeSeriesRecord: Clone {
    type Metric: Clone + Eq + std::fmt::Debug;

    fn time(&self) -> DateTime<Utc>;

    fn set_time(&mut self, time: DateTime<Utc>);

    /// Same non-numeric fields, every metric `None`. Time is left for the caller to set.
    fn null_template(&self) -> Self;

    fn metric(&self, metric: &Self::Metric) -> Option<f64>;

    /// `None` when the record has no slot for `metric` at all.
    fn metric_mut(&mut self, metric: &Self::Metric) -> Option<&mut Option<f64>>;

    /// True when at least one metric carries a value.
    fn has_data(&self) -> bool;
}

pub(crate) fn from_millis(ms: i64) -> Result<DateTime<Utc>, PipelineError> {
    DateTime::from_timestamp_millis(ms).ok_or(PipelineError::TimestampOutOfRange(ms))
}
