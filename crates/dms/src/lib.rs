//! Driver Monitoring System (DMS)
//!
//! Real-time drowsiness classification from facial geometry:
//! - Face mesh landmark extraction
//! - Eye aspect ratio (eye openness)
//! - Debounced per-session status with a no-face grace period

pub mod analysis;
pub mod config;
pub mod detector;
pub mod ear;
pub mod landmarks;
pub mod state;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use analysis::StatusUpdate;
pub use config::DmsConfig;
pub use detector::{build_extractor, FaceMeshExtractor, LandmarkExtractor, NullExtractor};
pub use ear::eye_openness;
pub use landmarks::{EyeIndices, FaceLandmarks, Point, LEFT_EYE, RIGHT_EYE};
pub use state::{Category, Observation, SessionState, Status};

use thiserror::Error;

/// DMS error types
#[derive(Error, Debug)]
pub enum DmsError {
    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Image processing failed: {0}")]
    ImageProcessing(String),

    #[error("Landmark set too small: expected {expected}, got {actual}")]
    MalformedLandmarks { expected: usize, actual: usize },

    #[error("Landmark coordinates are not finite")]
    NonFiniteLandmarks,
}
