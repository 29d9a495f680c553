// Pipeline error type. The service edge wraps these in anyhow.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("interval must be between 1 s and the representable time range")]
    InvalidInterval,

    #[error("window of {0} s is out of range")]
    WindowOutOfRange(u64),

    /// Grid arithmetic left the range chrono can represent.
    #[error("timestamp {0} ms is out of range")]
    TimestampOutOfRange(i64),
}
