//! Service info route

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

/// Response for `GET /`
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub service: &'static str,
    pub version: String,
    pub extractor: &'static str,
    pub active_sessions: usize,
    pub uptime_seconds: u64,
}

/// Liveness and a summary of the running service
pub async fn get_info(State(state): State<Arc<AppState>>) -> Json<InfoResponse> {
    Json(InfoResponse {
        service: "drowsiness-server",
        version: state.version.clone(),
        extractor: state.pipeline.extractor_name(),
        active_sessions: state.registry.len(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}
