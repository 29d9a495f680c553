// Load record: per-node resource sample (cpu, ram, disk, network, ...)

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TimeSeriesRecord;

/// One load sample as reported by a node. Every numeric field is optional;
/// a missing reading and a gap-filled slot look the same to the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadRecord {
    pub client: String,
    #[serde(alias = "updated_at")]
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub cpu: Option<f64>,
    #[serde(default)]
    pub gpu: Option<f64>,
    #[serde(default)]
    pub ram: Option<f64>,
    #[serde(default)]
    pub ram_total: Option<f64>,
    #[serde(default)]
    pub swap: Option<f64>,
    #[serde(default)]
    pub swap_total: Option<f64>,
    #[serde(default)]
    pub load: Option<f64>,
    #[serde(default)]
    pub temp: Option<f64>,
    #[serde(default)]
    pub disk: Option<f64>,
    #[serde(default)]
    pub disk_total: Option<f64>,
    #[serde(default)]
    pub net_in: Option<f64>,
    #[serde(default)]
    pub net_out: Option<f64>,
    #[serde(default)]
    pub net_total_up: Option<f64>,
    #[serde(default)]
    pub net_total_down: Option<f64>,
    #[serde(default)]
    pub process: Option<f64>,
    #[serde(default)]
    pub connections: Option<f64>,
    #[serde(default)]
    pub connections_udp: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadMetric {
    Cpu,
    Gpu,
    Ram,
    RamTotal,
    Swap,
    SwapTotal,
    Load,
    Temp,
    Disk,
    DiskTotal,
    NetIn,
    NetOut,
    NetTotalUp,
    NetTotalDown,
    Process,
    Connections,
    ConnectionsUdp,
}

impl LoadMetric {
    pub const ALL: [LoadMetric; 17] = [
        LoadMetric::Cpu,
        LoadMetric::Gpu,
        LoadMetric::Ram,
        LoadMetric::RamTotal,
        LoadMetric::Swap,
        LoadMetric::SwapTotal,
        LoadMetric::Load,
        LoadMetric::Temp,
        LoadMetric::Disk,
        LoadMetric::DiskTotal,
        LoadMetric::NetIn,
        LoadMetric::NetOut,
        LoadMetric::NetTotalUp,
        LoadMetric::NetTotalDown,
        LoadMetric::Process,
        LoadMetric::Connections,
        LoadMetric::ConnectionsUdp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LoadMetric::Cpu => "cpu",
            LoadMetric::Gpu => "gpu",
            LoadMetric::Ram => "ram",
            LoadMetric::RamTotal => "ram_total",
            LoadMetric::Swap => "swap",
            LoadMetric::SwapTotal => "swap_total",
            LoadMetric::Load => "load",
            LoadMetric::Temp => "temp",
            LoadMetric::Disk => "disk",
            LoadMetric::DiskTotal => "disk_total",
            LoadMetric::NetIn => "net_in",
            LoadMetric::NetOut => "net_out",
            LoadMetric::NetTotalUp => "net_total_up",
            LoadMetric::NetTotalDown => "net_total_down",
            LoadMetric::Process => "process",
            LoadMetric::Connections => "connections",
            LoadMetric::ConnectionsUdp => "connections_udp",
        }
    }

    /// Metrics measured in bytes (or bytes/sec); these get human-readable formatting.
    pub fn is_bytes(&self) -> bool {
        matches!(
            self,
            LoadMetric::Ram
                | LoadMetric::RamTotal
                | LoadMetric::Swap
                | LoadMetric::SwapTotal
                | LoadMetric::Disk
                | LoadMetric::DiskTotal
                | LoadMetric::NetIn
                | LoadMetric::NetOut
                | LoadMetric::NetTotalUp
                | LoadMetric::NetTotalDown
        )
    }
}

impl fmt::Display for LoadMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown load metric {0:?}")]
pub struct UnknownMetric(pub String);

impl FromStr for LoadMetric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LoadMetric::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownMetric(s.to_string()))
    }
}

impl LoadRecord {
    /// Record for `client` at `time` with no readings.
    pub fn empty(client: impl Into<String>, time: DateTime<Utc>) -> Self {
        LoadRecord {
            client: client.into(),
            time,
            cpu: None,
            gpu: None,
            ram: None,
            ram_total: None,
            swap: None,
            swap_total: None,
            load: None,
            temp: None,
            disk: None,
            disk_total: None,
            net_in: None,
            net_out: None,
            net_total_up: None,
            net_total_down: None,
            process: None,
            connections: None,
            connections_udp: None,
        }
    }

    fn slot(&self, metric: LoadMetric) -> &Option<f64> {
        match metric {
            LoadMetric::Cpu => &self.cpu,
            LoadMetric::Gpu => &self.gpu,
            LoadMetric::Ram => &self.ram,
            LoadMetric::RamTotal => &self.ram_total,
            LoadMetric::Swap => &self.swap,
            LoadMetric::SwapTotal => &self.swap_total,
            LoadMetric::Load => &self.load,
            LoadMetric::Temp => &self.temp,
            LoadMetric::Disk => &self.disk,
            LoadMetric::DiskTotal => &self.disk_total,
            LoadMetric::NetIn => &self.net_in,
            LoadMetric::NetOut => &self.net_out,
            LoadMetric::NetTotalUp => &self.net_total_up,
            LoadMetric::NetTotalDown => &self.net_total_down,
            LoadMetric::Process => &self.process,
            LoadMetric::Connections => &self.connections,
            LoadMetric::ConnectionsUdp => &self.connections_udp,
        }
    }

    fn slot_mut(&mut self, metric: LoadMetric) -> &mut Option<f64> {
        match metric {
            LoadMetric::Cpu => &mut self.cpu,
            LoadMetric::Gpu => &mut self.gpu,
            LoadMetric::Ram => &mut self.ram,
            LoadMetric::RamTotal => &mut self.ram_total,
            LoadMetric::Swap => &mut self.swap,
            LoadMetric::SwapTotal => &mut self.swap_total,
            LoadMetric::Load => &mut self.load,
            LoadMetric::Temp => &mut self.temp,
            LoadMetric::Disk => &mut self.disk,
            LoadMetric::DiskTotal => &mut self.disk_total,
            LoadMetric::NetIn => &mut self.net_in,
            LoadMetric::NetOut => &mut self.net_out,
            LoadMetric::NetTotalUp => &mut self.net_total_up,
            LoadMetric::NetTotalDown => &mut self.net_total_down,
            LoadMetric::Process => &mut self.process,
            LoadMetric::Connections => &mut self.connections,
            LoadMetric::ConnectionsUdp => &mut self.connections_udp,
        }
    }
}

impl TimeSeriesRecord for LoadRecord {
    type Metric = LoadMetric;

    fn time(&self) -> DateTime<Utc> {
        self.time
    }

    fn set_time(&mut self, time: DateTime<Utc>) {
        self.time = time;
    }

    fn null_template(&self) -> Self {
        LoadRecord::empty(self.client.clone(), self.time)
    }

    fn metric(&self, metric: &LoadMetric) -> Option<f64> {
        *self.slot(*metric)
    }

    fn metric_mut(&mut self, metric: &LoadMetric) -> Option<&mut Option<f64>> {
        Some(self.slot_mut(*metric))
    }

    fn has_data(&self) -> bool {
        LoadMetric::ALL.iter().any(|m| self.slot(*m).is_some())
    }
}
