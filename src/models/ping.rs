// Ping record: one latency probe result for (task, node)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::TimeSeriesRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingRecord {
    pub task_id: u32,
    pub client: String,
    #[serde(alias = "updated_at")]
    pub time: DateTime<Utc>,
    /// Round-trip latency in ms. The wire sentinel `-1` (lost) decodes to `None`.
    #[serde(default, deserialize_with = "lost_as_none")]
    pub value: Option<f64>,
}

/// Ping records carry a single metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency;

fn lost_as_none<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.filter(|v| v.is_finite() && *v >= 0.0))
}

impl TimeSeriesRecord for PingRecord {
    type Metric = Latency;

    fn time(&self) -> DateTime<Utc> {
        self.time
    }

    fn set_time(&mut self, time: DateTime<Utc>) {
        self.time = time;
    }

    fn null_template(&self) -> Self {
        PingRecord {
            task_id: self.task_id,
            client: self.client.clone(),
            time: self.time,
            value: None,
        }
    }

    fn metric(&self, _: &Latency) -> Option<f64> {
        self.value
    }

    fn metric_mut(&mut self, _: &Latency) -> Option<&mut Option<f64>> {
        Some(&mut self.value)
    }

    fn has_data(&self) -> bool {
        self.value.is_some()
    }
}
