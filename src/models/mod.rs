// Domain models: typed telemetry records and chart rows

mod decode;
mod load;
mod ping;
mod record;
mod series;

pub use decode::{Decoded, RejectedSample, decode_samples};
pub use load::{LoadMetric, LoadRecord, UnknownMetric};
pub use ping::{Latency, PingRecord};
pub use record::TimeSeriesRecord;
pub(crate) use record::from_millis;
pub use series::{ChartRow, SeriesKey};
