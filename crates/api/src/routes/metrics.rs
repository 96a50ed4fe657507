//! Prometheus scrape route

use axum::extract::State;
use std::sync::Arc;

use crate::AppState;

/// Render metrics in the Prometheus text format
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> String {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default()
}
