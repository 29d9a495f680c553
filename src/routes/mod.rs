// HTTP routes

mod charts;
mod http;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::{Arc, Mutex};
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::error::PipelineError;
use crate::format::FormatCache;
use crate::history_repo::HistoryRepo;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) history_repo: Arc<HistoryRepo>,
    pub(crate) format_cache: Arc<Mutex<FormatCache>>,
    pub(crate) config: AppConfig,
}

pub fn app(history_repo: Arc<HistoryRepo>, config: AppConfig) -> Router {
    let state = AppState {
        history_repo,
        format_cache: Arc::new(Mutex::new(FormatCache::new(
            config.charts.format_cache_size,
        ))),
        config,
    };
    Router::new()
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/records/load", post(http::ingest_load_handler)) // POST /api/records/load
        .route("/api/records/ping", post(http::ingest_ping_handler)) // POST /api/records/ping
        .route("/api/charts/load", get(charts::load_chart_handler)) // GET /api/charts/load
        .route("/api/charts/load/compare", get(charts::load_compare_handler)) // GET /api/charts/load/compare
        .route("/api/charts/ping", get(charts::ping_chart_handler)) // GET /api/charts/ping
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}

/// Handler error: 400 for bad parameters, 500 for everything else.
#[derive(Debug)]
pub(crate) enum ApiError {
    BadRequest(String),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(e) => {
                tracing::warn!(error = %e, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        (status, axum::Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(e)
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::InvalidInterval | PipelineError::WindowOutOfRange(_) => {
                ApiError::BadRequest(e.to_string())
            }
            other => ApiError::Internal(other.into()),
        }
    }
}
