// GET /version and raw record ingestion

use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;

use super::{ApiError, AppState};
use crate::models::{LoadRecord, PingRecord, RejectedSample, decode_samples};
use crate::{NAME, VERSION};

#[derive(Debug, Serialize)]
pub(super) struct IngestResponse {
    accepted: usize,
    rejected: Vec<RejectedSample>,
}

/// GET /version — returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// POST /api/records/load — JSON array of load samples; malformed elements are skipped and reported.
pub(super) async fn ingest_load_handler(
    State(state): State<AppState>,
    Json(items): Json<Vec<serde_json::Value>>,
) -> Result<Json<IngestResponse>, ApiError> {
    let decoded = decode_samples::<LoadRecord>(items);
    state.history_repo.save_load_records(&decoded.records).await?;
    Ok(Json(IngestResponse {
        accepted: decoded.records.len(),
        rejected: decoded.rejected,
    }))
}

/// POST /api/records/ping — JSON array of ping samples; `value: -1` is stored as lost.
pub(super) async fn ingest_ping_handler(
    State(state): State<AppState>,
    Json(items): Json<Vec<serde_json::Value>>,
) -> Result<Json<IngestResponse>, ApiError> {
    let decoded = decode_samples::<PingRecord>(items);
    state.history_repo.save_ping_records(&decoded.records).await?;
    Ok(Json(IngestResponse {
        accepted: decoded.records.len(),
        rejected: decoded.rejected,
    }))
}
