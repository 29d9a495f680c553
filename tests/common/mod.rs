// Shared test helpers
#![allow(dead_code)]

use chartfill::models::{LoadRecord, PingRecord};
use chrono::{DateTime, Duration, TimeZone, Utc};

/// 2024-01-01T00:00:00Z + `secs`.
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(secs)
}

pub fn load(client: &str, time: DateTime<Utc>, cpu: Option<f64>) -> LoadRecord {
    let mut r = LoadRecord::empty(client, time);
    r.cpu = cpu;
    r
}

pub fn ping(task_id: u32, client: &str, time: DateTime<Utc>, value: Option<f64>) -> PingRecord {
    PingRecord {
        task_id,
        client: client.to_string(),
        time,
        value,
    }
}

/// `count` load records for `client`, `step_secs` apart from `at(0)`, cpu = index.
pub fn load_series(client: &str, count: usize, step_secs: i64) -> Vec<LoadRecord> {
    (0..count)
        .map(|i| load(client, at(i as i64 * step_secs), Some(i as f64)))
        .collect()
}

pub fn cpus(points: &[LoadRecord]) -> Vec<Option<f64>> {
    points.iter().map(|p| p.cpu).collect()
}
