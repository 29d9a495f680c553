// GET chart series: fetch raw records for the window, run the chart pipeline.

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState};
use crate::models::{ChartRow, Latency, LoadMetric, LoadRecord, PingRecord};
use crate::pipeline::{ChartOptions, ChartPipeline};
use crate::stats::{SeriesSummary, loss_percent, summarize};

#[derive(Debug, Deserialize)]
pub(super) struct LoadChartQuery {
    uuid: String,
    hours: Option<f64>,
    interval: Option<u64>,
    /// Comma-separated metric names, e.g. `net_in,net_out`.
    cut_peak: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct LoadCompareQuery {
    /// Comma-separated client ids.
    uuids: String,
    metric: LoadMetric,
    hours: Option<f64>,
    interval: Option<u64>,
    #[serde(default)]
    cut_peak: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct PingChartQuery {
    task_id: u32,
    hours: Option<f64>,
    interval: Option<u64>,
    #[serde(default)]
    cut_peak: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct MetricSummary {
    metric: LoadMetric,
    #[serde(flatten)]
    summary: SeriesSummary,
    /// Byte metrics only: formatted avg and latest.
    #[serde(skip_serializing_if = "Option::is_none")]
    avg_display: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    latest_display: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct LoadChartResponse {
    uuid: String,
    interval_secs: u64,
    hours: f64,
    points: Vec<LoadRecord>,
    summary: Vec<MetricSummary>,
}

#[derive(Debug, Serialize)]
pub(super) struct NodeMetricSummary {
    node_id: String,
    summary: Option<SeriesSummary>,
}

#[derive(Debug, Serialize)]
pub(super) struct LoadCompareResponse {
    metric: LoadMetric,
    interval_secs: u64,
    hours: f64,
    points: Vec<ChartRow>,
    nodes: Vec<NodeMetricSummary>,
}

#[derive(Debug, Serialize)]
pub(super) struct NodePingSummary {
    node_id: String,
    /// `null` when the node has no successful probe in the window.
    latency: Option<SeriesSummary>,
    loss_percent: Option<f64>,
}

#[derive(Debug, Serialize)]
pub(super) struct PingChartResponse {
    task_id: u32,
    interval_secs: u64,
    hours: f64,
    points: Vec<ChartRow>,
    nodes: Vec<NodePingSummary>,
}

struct Window {
    hours: f64,
    interval_secs: u64,
    now: DateTime<Utc>,
}

impl Window {
    fn since(&self) -> DateTime<Utc> {
        self.now - Duration::milliseconds((self.hours * 3_600_000.0) as i64)
    }

    fn options(&self, state: &AppState, native_interval_secs: u64) -> ChartOptions {
        ChartOptions {
            interval_secs: self.interval_secs,
            window_hours: Some(self.hours),
            tolerance_secs: Some(state.config.charts.tolerance_secs(self.interval_secs)),
            floor_interval_secs: Some(native_interval_secs),
            force_preserve: true,
            end: Some(self.now),
        }
    }
}

fn resolve_window(
    state: &AppState,
    hours: Option<f64>,
    interval: Option<u64>,
    native_interval_secs: u64,
) -> Result<Window, ApiError> {
    let charts = &state.config.charts;
    let hours = hours.unwrap_or(charts.default_hours);
    if !hours.is_finite() || hours <= 0.0 || hours > charts.max_hours {
        return Err(ApiError::BadRequest(format!(
            "hours must be in (0, {}], got {}",
            charts.max_hours, hours
        )));
    }
    let interval_secs = interval.unwrap_or(native_interval_secs);
    if interval_secs < native_interval_secs {
        return Err(ApiError::BadRequest(format!(
            "interval must be >= the native interval of {} s, got {}",
            native_interval_secs, interval_secs
        )));
    }
    let total_secs = (hours * 3600.0).round() as u64;
    let grid_points = total_secs / interval_secs + 1;
    if grid_points > charts.max_grid_points {
        return Err(ApiError::BadRequest(format!(
            "{} h at {} s needs {} grid points, limit is {}",
            hours, interval_secs, grid_points, charts.max_grid_points
        )));
    }
    Ok(Window {
        hours,
        interval_secs,
        now: Utc::now(),
    })
}

fn parse_metrics(list: Option<&str>) -> Result<Vec<LoadMetric>, ApiError> {
    list.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(|m| m.parse::<LoadMetric>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))
    })
    .transpose()
    .map(Option::unwrap_or_default)
}

/// GET /api/charts/load?uuid=&hours=&interval=&cut_peak=
pub(super) async fn load_chart_handler(
    State(state): State<AppState>,
    Query(q): Query<LoadChartQuery>,
) -> Result<Json<LoadChartResponse>, ApiError> {
    let native = state.config.charts.load_interval_secs;
    let window = resolve_window(&state, q.hours, q.interval, native)?;
    let cut_peaks = parse_metrics(q.cut_peak.as_deref())?;

    let records = state
        .history_repo
        .get_load_records(&q.uuid, window.since())
        .await?;
    let pipeline = ChartPipeline::new(window.options(&state, native));
    let points = pipeline.build_load_chart(&records, &cut_peaks)?;

    // Observed values, not the clipped display series.
    let summary = {
        let mut cache = state
            .format_cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        LoadMetric::ALL
            .into_iter()
            .filter_map(|metric| {
                let summary = summarize(&records, &metric)?;
                let (avg_display, latest_display) = if metric.is_bytes() {
                    (
                        Some(cache.format_bytes(summary.avg)),
                        Some(cache.format_bytes(summary.latest)),
                    )
                } else {
                    (None, None)
                };
                Some(MetricSummary {
                    metric,
                    summary,
                    avg_display,
                    latest_display,
                })
            })
            .collect()
    };

    tracing::debug!(
        uuid = %q.uuid,
        raw = records.len(),
        points = points.len(),
        "load chart served"
    );
    Ok(Json(LoadChartResponse {
        uuid: q.uuid,
        interval_secs: window.interval_secs,
        hours: window.hours,
        points,
        summary,
    }))
}

/// GET /api/charts/load/compare?uuids=&metric=&hours=&interval=&cut_peak=
pub(super) async fn load_compare_handler(
    State(state): State<AppState>,
    Query(q): Query<LoadCompareQuery>,
) -> Result<Json<LoadCompareResponse>, ApiError> {
    let native = state.config.charts.load_interval_secs;
    let window = resolve_window(&state, q.hours, q.interval, native)?;

    let mut node_ids: Vec<&str> = q
        .uuids
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .collect();
    node_ids.sort_unstable();
    node_ids.dedup();
    if node_ids.is_empty() {
        return Err(ApiError::BadRequest("uuids must name at least one node".into()));
    }

    let mut records = Vec::new();
    let mut nodes = Vec::with_capacity(node_ids.len());
    for node_id in node_ids {
        let own = state
            .history_repo
            .get_load_records(node_id, window.since())
            .await?;
        nodes.push(NodeMetricSummary {
            node_id: node_id.to_string(),
            summary: summarize(&own, &q.metric),
        });
        records.extend(own);
    }

    let pipeline = ChartPipeline::new(window.options(&state, native));
    let points = pipeline.build_load_compare(&records, q.metric, q.cut_peak)?;

    tracing::debug!(
        metric = %q.metric,
        nodes = nodes.len(),
        raw = records.len(),
        points = points.len(),
        "load comparison served"
    );
    Ok(Json(LoadCompareResponse {
        metric: q.metric,
        interval_secs: window.interval_secs,
        hours: window.hours,
        points,
        nodes,
    }))
}

/// GET /api/charts/ping?task_id=&hours=&interval=&cut_peak=
pub(super) async fn ping_chart_handler(
    State(state): State<AppState>,
    Query(q): Query<PingChartQuery>,
) -> Result<Json<PingChartResponse>, ApiError> {
    let native = state.config.charts.ping_interval_secs;
    let window = resolve_window(&state, q.hours, q.interval, native)?;

    let records = state
        .history_repo
        .get_ping_records(q.task_id, window.since())
        .await?;
    let pipeline = ChartPipeline::new(window.options(&state, native));
    let points = pipeline.build_ping_chart(&records, q.cut_peak)?;

    let mut node_ids: Vec<&str> = records.iter().map(|r| r.client.as_str()).collect();
    node_ids.sort_unstable();
    node_ids.dedup();
    let nodes = node_ids
        .into_iter()
        .map(|node_id| {
            let own: Vec<PingRecord> = records
                .iter()
                .filter(|r| r.client == node_id)
                .cloned()
                .collect();
            NodePingSummary {
                node_id: node_id.to_string(),
                latency: summarize(&own, &Latency),
                loss_percent: loss_percent(&own, &Latency),
            }
        })
        .collect();

    tracing::debug!(
        task_id = q.task_id,
        raw = records.len(),
        points = points.len(),
        "ping chart served"
    );
    Ok(Json(PingChartResponse {
        task_id: q.task_id,
        interval_secs: window.interval_secs,
        hours: window.hours,
        points,
        nodes,
    }))
}
