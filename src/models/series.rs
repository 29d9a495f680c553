// Series identity and the merged multi-series chart row.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::{LoadMetric, TimeSeriesRecord};

/// Which stream a column of a merged chart belongs to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SeriesKey {
    Ping { node_id: String },
    Load { node_id: String, metric: LoadMetric },
}

impl SeriesKey {
    pub fn node_id(&self) -> &str {
        match self {
            SeriesKey::Ping { node_id } | SeriesKey::Load { node_id, .. } => node_id,
        }
    }

    /// Column name handed to the chart renderer: `node` or `node_metric`.
    pub fn column_key(&self) -> String {
        match self {
            SeriesKey::Ping { node_id } => node_id.clone(),
            SeriesKey::Load { node_id, metric } => format!("{}_{}", node_id, metric.as_str()),
        }
    }
}

/// One timestamp of a merged chart: a value (or gap) per series.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRow {
    pub time: DateTime<Utc>,
    pub values: BTreeMap<SeriesKey, Option<f64>>,
}

impl ChartRow {
    pub fn get(&self, key: &SeriesKey) -> Option<f64> {
        self.values.get(key).copied().flatten()
    }
}

impl TimeSeriesRecord for ChartRow {
    type Metric = SeriesKey;

    fn time(&self) -> DateTime<Utc> {
        self.time
    }

    fn set_time(&mut self, time: DateTime<Utc>) {
        self.time = time;
    }

    fn null_template(&self) -> Self {
        ChartRow {
            time: self.time,
            values: self.values.keys().map(|k| (k.clone(), None)).collect(),
        }
    }

    fn metric(&self, key: &SeriesKey) -> Option<f64> {
        self.get(key)
    }

    fn metric_mut(&mut self, key: &SeriesKey) -> Option<&mut Option<f64>> {
        self.values.get_mut(key)
    }

    fn has_data(&self) -> bool {
        self.values.values().any(Option::is_some)
    }
}

// Flat object: {"time": "...", "<column_key>": value|null, ...}
impl Serialize for ChartRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        map.serialize_entry("time", &self.time)?;
        for (key, value) in &self.values {
            map.serialize_entry(&key.column_key(), value)?;
        }
        map.end()
    }
}
