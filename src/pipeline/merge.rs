// Merge several single-metric series onto shared timestamps.
// Nodes report on their own clocks; samples within `tolerance` of a bucket's
// first sample share that bucket's time, one sample per series per bucket.

use std::collections::{BTreeMap, BTreeSet};

use super::grid::secs_to_ms;
use crate::models::{ChartRow, SeriesKey, TimeSeriesRecord};

pub fn merge_series<R: TimeSeriesRecord>(
    series: Vec<(SeriesKey, Vec<R>)>,
    metric: &R::Metric,
    tolerance_secs: u64,
) -> Vec<ChartRow> {
    let tolerance_ms = secs_to_ms(tolerance_secs).unwrap_or(i64::MAX);
    let keys: BTreeSet<SeriesKey> = series.iter().map(|(k, _)| k.clone()).collect();

    let mut samples: Vec<(i64, &SeriesKey, &R)> = series
        .iter()
        .flat_map(|(key, records)| {
            records
                .iter()
                .map(move |r| (r.time().timestamp_millis(), key, r))
        })
        .collect();
    samples.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));

    let empty_row = |time| ChartRow {
        time,
        values: keys.iter().map(|k| (k.clone(), None)).collect::<BTreeMap<_, _>>(),
    };

    let mut rows: Vec<ChartRow> = Vec::new();
    let mut anchor_ms = i64::MIN;
    let mut filled: BTreeSet<&SeriesKey> = BTreeSet::new();
    for (ts, key, record) in samples {
        let joins_current = !rows.is_empty()
            && ts.saturating_sub(anchor_ms) <= tolerance_ms
            && !filled.contains(key);
        if !joins_current {
            rows.push(empty_row(record.time()));
            anchor_ms = ts;
            filled.clear();
        }
        if let Some(row) = rows.last_mut() {
            row.values.insert(key.clone(), record.metric(metric));
        }
        filled.insert(key);
    }
    rows
}
