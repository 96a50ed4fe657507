//! Frame pipeline: data URI → RGB frame → landmarks → eye openness
//!
//! Pure translation with no per-connection state. Decoding and extraction
//! are CPU bound, so `analyze_blocking` runs them on the blocking pool.

use std::sync::Arc;

use dms::{eye_openness, DmsError, LandmarkExtractor, Observation};
use frame_decoder::{decode_data_uri, DecodeError};
use thiserror::Error;

/// Why a frame was dropped
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("extraction failed: {0}")]
    Extraction(#[from] DmsError),
}

impl FrameError {
    /// Metrics label
    pub fn reason(&self) -> &'static str {
        match self {
            FrameError::Decode(_) => "decode",
            FrameError::Extraction(_) => "extraction",
        }
    }
}

/// Stateless decode/extract/metric chain shared by all connections
pub struct FramePipeline {
    extractor: Arc<dyn LandmarkExtractor>,
}

impl FramePipeline {
    pub fn new(extractor: Arc<dyn LandmarkExtractor>) -> Self {
        Self { extractor }
    }

    /// Name of the configured extractor
    pub fn extractor_name(&self) -> &'static str {
        self.extractor.name()
    }

    /// Turn one `image` payload into a state machine observation
    pub fn analyze(&self, payload: &str, sequence: u64) -> Result<Observation, FrameError> {
        let frame = decode_data_uri(payload, sequence)?;

        let Some(face) = self.extractor.extract(&frame)? else {
            return Ok(Observation::NoFace);
        };

        // Thresholds are calibrated on pixel-space geometry.
        let face = face.to_pixels(frame.width, frame.height);
        let ear = eye_openness(&face)?;
        Ok(Observation::Face(ear))
    }

    /// `analyze` on the blocking pool
    ///
    /// A panicking extractor is reported as an extraction failure.
    pub async fn analyze_blocking(
        self: &Arc<Self>,
        payload: String,
        sequence: u64,
    ) -> Result<Observation, FrameError> {
        let pipeline = Arc::clone(self);
        tokio::task::spawn_blocking(move || pipeline.analyze(&payload, sequence))
            .await
            .map_err(|e| DmsError::Inference(format!("extractor task failed: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dms::testing::{color_for_ear, ColorCodedExtractor, FAILURE_COLOR, NO_FACE_COLOR};
    use frame_decoder::encode_data_uri;
    use image::{ImageFormat, Rgb, RgbImage};

    fn pipeline() -> Arc<FramePipeline> {
        Arc::new(FramePipeline::new(Arc::new(ColorCodedExtractor)))
    }

    fn payload(color: [u8; 3], width: u32, height: u32) -> String {
        encode_data_uri(&RgbImage::from_pixel(width, height, Rgb(color)), ImageFormat::Png).unwrap()
    }

    #[test]
    fn test_face_observation() {
        let observation = pipeline().analyze(&payload(color_for_ear(0.3), 8, 8), 1).unwrap();
        match observation {
            Observation::Face(ear) => assert!((ear - 0.3).abs() < 1e-4),
            other => panic!("expected face, got {other:?}"),
        }
    }

    #[test]
    fn test_no_face_observation() {
        let observation = pipeline().analyze(&payload(NO_FACE_COLOR, 8, 8), 1).unwrap();
        assert_eq!(observation, Observation::NoFace);
    }

    #[test]
    fn test_pixel_space_geometry() {
        // Normalized EAR 0.3 on a 2:1 frame: vertical spans shrink relative to horizontal.
        let observation = pipeline().analyze(&payload(color_for_ear(0.3), 16, 8), 1).unwrap();
        match observation {
            Observation::Face(ear) => assert!((ear - 0.15).abs() < 1e-4),
            other => panic!("expected face, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_failure() {
        let err = pipeline().analyze("not a data uri", 1).unwrap_err();
        assert!(matches!(err, FrameError::Decode(_)));
        assert_eq!(err.reason(), "decode");
    }

    #[test]
    fn test_extraction_failure() {
        let err = pipeline().analyze(&payload(FAILURE_COLOR, 8, 8), 1).unwrap_err();
        assert!(matches!(err, FrameError::Extraction(_)));
        assert_eq!(err.reason(), "extraction");
    }

    #[tokio::test]
    async fn test_analyze_blocking() {
        let observation = pipeline()
            .analyze_blocking(payload(NO_FACE_COLOR, 4, 4), 2)
            .await
            .unwrap();
        assert_eq!(observation, Observation::NoFace);
    }
}
