//! DMS configuration

use serde::{Deserialize, Serialize};

use crate::DmsError;

/// DMS configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DmsConfig {
    /// EAR below this value counts as a closed-eye (sleep) frame
    pub sleep_ear_threshold: f32,

    /// EAR at or above this value counts as an active frame
    pub active_ear_threshold: f32,

    /// Consecutive same-category frames that must be exceeded before the status flips
    pub category_run_length: u32,

    /// Consecutive no-face frames that must be exceeded before the session resets
    pub no_face_reset_threshold: u32,

    /// Face presence confidence threshold
    pub face_confidence: f32,

    /// Face mesh landmark model path (ONNX)
    pub landmark_model_path: Option<String>,

    /// Intra-op threads for the landmark model (None = runtime default)
    pub intra_threads: Option<usize>,
}

impl Default for DmsConfig {
    fn default() -> Self {
        Self {
            sleep_ear_threshold: 0.21,
            active_ear_threshold: 0.25,
            category_run_length: 6,
            no_face_reset_threshold: 10,
            face_confidence: 0.5,
            landmark_model_path: None,
            intra_threads: None,
        }
    }
}

impl DmsConfig {
    /// Check threshold ordering and ranges
    pub fn validate(&self) -> Result<(), DmsError> {
        if !self.sleep_ear_threshold.is_finite() || !self.active_ear_threshold.is_finite() {
            return Err(DmsError::Config("EAR thresholds must be finite".into()));
        }
        if self.sleep_ear_threshold < 0.0 {
            return Err(DmsError::Config(format!(
                "sleep_ear_threshold must be non-negative, got {}",
                self.sleep_ear_threshold
            )));
        }
        if self.sleep_ear_threshold >= self.active_ear_threshold {
            return Err(DmsError::Config(format!(
                "sleep_ear_threshold ({}) must be below active_ear_threshold ({})",
                self.sleep_ear_threshold, self.active_ear_threshold
            )));
        }
        if self.category_run_length == 0 {
            return Err(DmsError::Config("category_run_length must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.face_confidence) {
            return Err(DmsError::Config(format!(
                "face_confidence must be within [0, 1], got {}",
                self.face_confidence
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DmsConfig::default();
        assert_eq!(config.sleep_ear_threshold, 0.21);
        assert_eq!(config.active_ear_threshold, 0.25);
        assert_eq!(config.category_run_length, 6);
        assert_eq!(config.no_face_reset_threshold, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let config = DmsConfig {
            sleep_ear_threshold: 0.3,
            active_ear_threshold: 0.25,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(DmsError::Config(_))));
    }

    #[test]
    fn test_zero_run_length_rejected() {
        let config = DmsConfig {
            category_run_length: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nan_threshold_rejected() {
        let config = DmsConfig {
            active_ear_threshold: f32::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: DmsConfig = serde_json::from_str(r#"{"category_run_length": 3}"#).unwrap();
        assert_eq!(config.category_run_length, 3);
        assert_eq!(config.no_face_reset_threshold, 10);
    }
}
