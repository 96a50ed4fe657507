//! Per-frame analysis results

use serde::{Deserialize, Serialize};

use crate::state::{Observation, Status};

/// Status pushed to the client after each processed frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    /// Current session status
    pub status: Status,

    /// `#RRGGBB` color of the status
    pub color: String,

    /// Raw eye aspect ratio of this frame, rounded to 3 decimals
    pub ear: f64,
}

impl StatusUpdate {
    pub fn new(status: Status, ear: f32) -> Self {
        Self {
            status,
            color: status.color().to_string(),
            ear: round_ear(ear),
        }
    }

    /// Build the update for a frame that has just been applied
    pub fn after(status: Status, observation: &Observation) -> Self {
        Self::new(status, observation.ear())
    }
}

/// Round to 3 decimals; non-finite values report as 0.0
pub fn round_ear(ear: f32) -> f64 {
    if !ear.is_finite() {
        return 0.0;
    }
    (f64::from(ear) * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_ear() {
        assert_eq!(round_ear(0.30049), 0.3);
        assert_eq!(round_ear(0.2106), 0.211);
        assert_eq!(round_ear(f32::NAN), 0.0);
        assert_eq!(round_ear(f32::INFINITY), 0.0);
    }

    #[test]
    fn test_no_face_reports_zero() {
        let update = StatusUpdate::after(Status::Active, &Observation::NoFace);
        assert_eq!(update.ear, 0.0);
        assert_eq!(update.color, "#00FF00");
    }

    #[test]
    fn test_wire_format() {
        let update = StatusUpdate::new(Status::Sleeping, 0.1834);
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "SLEEPING !!!", "color": "#FF0000", "ear": 0.183})
        );
    }

    #[test]
    fn test_every_status_label_round_trips() {
        for status in [
            Status::Initializing,
            Status::Active,
            Status::Drowsy,
            Status::Sleeping,
            Status::NoFaceDetected,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.label()));
            let back: Status = serde_json::from_str(&json).unwrap();
            assert_eq!(back, status);
        }
    }
}
