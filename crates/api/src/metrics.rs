//! Prometheus metrics recorder and metric names

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

use crate::ServerError;

/// Install the Prometheus metrics recorder (global).
///
/// Must be called once at startup, before any metrics are recorded.
pub fn install_recorder() -> Result<PrometheusHandle, ServerError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ServerError::Metrics(e.to_string()))?;
    info!("Prometheus metrics recorder installed");
    Ok(handle)
}

/// Socket.IO connections opened (counter).
pub const CONNECTIONS_TOTAL: &str = "socket_connections_total";
/// Socket.IO connections closed (counter).
pub const DISCONNECTIONS_TOTAL: &str = "socket_disconnections_total";
/// Live sessions (gauge).
pub const SESSIONS_ACTIVE: &str = "sessions_active";
/// Image events received (counter).
pub const FRAMES_RECEIVED_TOTAL: &str = "frames_received_total";
/// Frames that produced a response (counter).
pub const FRAMES_PROCESSED_TOTAL: &str = "frames_processed_total";
/// Frames dropped (counter, labels: reason = decode | extraction | backpressure).
pub const FRAMES_DROPPED_TOTAL: &str = "frames_dropped_total";
/// Status changes (counter, labels: status).
pub const STATUS_TRANSITIONS_TOTAL: &str = "status_transitions_total";
/// Decode + extraction + metric time (histogram, seconds).
pub const FRAME_PROCESSING_SECONDS: &str = "frame_processing_seconds";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_without_global_install() {
        let handle = PrometheusBuilder::new().build_recorder().handle();
        let output = handle.render();
        assert!(output.is_empty() || output.contains('\n'));
    }

    #[test]
    fn metric_names_are_snake_case() {
        let names = [
            CONNECTIONS_TOTAL,
            DISCONNECTIONS_TOTAL,
            SESSIONS_ACTIVE,
            FRAMES_RECEIVED_TOTAL,
            FRAMES_PROCESSED_TOTAL,
            FRAMES_DROPPED_TOTAL,
            STATUS_TRANSITIONS_TOTAL,
            FRAME_PROCESSING_SECONDS,
        ];
        for name in names {
            assert!(
                name.chars().all(|c| c.is_ascii_lowercase() || c == '_'),
                "metric name '{name}' must be snake_case"
            );
        }
    }
}
