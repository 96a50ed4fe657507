//! Facial landmark extraction

use std::sync::Arc;

use frame_decoder::VideoFrame;
use image::imageops::FilterType;
use ndarray::Array4;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use tracing::{debug, error, info, warn};

use crate::landmarks::{FaceLandmarks, Point, FACE_MESH_LANDMARKS};
use crate::{DmsConfig, DmsError};

/// Face mesh model input edge (pixels)
pub const FACE_MESH_INPUT_SIZE: u32 = 192;

/// Geometry extractor: image in, landmarks of the first face out
///
/// Landmarks are returned in normalized `[0, 1]` image coordinates.
/// `Ok(None)` means no face was found.
pub trait LandmarkExtractor: Send + Sync {
    fn extract(&self, frame: &VideoFrame) -> Result<Option<FaceLandmarks>, DmsError>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Build the extractor described by the configuration
///
/// Without a model path every frame reports "no face".
pub fn build_extractor(config: &DmsConfig) -> Result<Arc<dyn LandmarkExtractor>, DmsError> {
    match &config.landmark_model_path {
        Some(path) => Ok(Arc::new(FaceMeshExtractor::new(path, config)?)),
        None => {
            warn!("No landmark model path configured. Every frame will report no face.");
            Ok(Arc::new(NullExtractor))
        }
    }
}

/// Face mesh landmark model (468 points) running on ONNX Runtime
///
/// Expects an NHWC `1x192x192x3` input in `[0, 1]`; output 0 holds
/// `468 * (x, y, z)` in model pixels, output 1 the face presence logit.
///
/// There is no face detection stage: the whole frame is resized to the model
/// input. The landmark model is trained on face crops, so accuracy is only
/// good when the face fills most of the frame (a driver-facing camera or a
/// client that sends a cropped face). Wide shots with a small face will
/// produce weak presence scores and loose eye landmarks.
pub struct FaceMeshExtractor {
    session: Session,
    confidence_threshold: f32,
}

impl FaceMeshExtractor {
    pub fn new(path: &str, config: &DmsConfig) -> Result<Self, DmsError> {
        info!("Loading face mesh model from {}", path);

        let session = Self::load_session(path, config).map_err(|e| {
            error!("Failed to load face mesh model: {}", e);
            DmsError::ModelLoad(e.to_string())
        })?;

        Ok(Self {
            session,
            confidence_threshold: config.face_confidence,
        })
    }

    fn load_session(path: &str, config: &DmsConfig) -> ort::Result<Session> {
        let mut builder = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?;
        if let Some(threads) = config.intra_threads {
            builder = builder.with_intra_threads(threads)?;
        }
        builder.commit_from_file(path)
    }

    fn preprocess(frame: &VideoFrame) -> Result<Array4<f32>, DmsError> {
        let img = frame
            .as_image()
            .ok_or_else(|| DmsError::ImageProcessing("Failed to create image buffer".into()))?;

        let size = FACE_MESH_INPUT_SIZE;
        let resized = image::imageops::resize(&img, size, size, FilterType::Triangle);

        let mut input = Array4::<f32>::zeros((1, size as usize, size as usize, 3));
        for (x, y, pixel) in resized.enumerate_pixels() {
            for c in 0..3 {
                input[[0, y as usize, x as usize, c]] = pixel[c] as f32 / 255.0;
            }
        }
        Ok(input)
    }
}

impl LandmarkExtractor for FaceMeshExtractor {
    fn extract(&self, frame: &VideoFrame) -> Result<Option<FaceLandmarks>, DmsError> {
        if frame.is_empty() {
            return Err(DmsError::ImageProcessing("Empty frame".into()));
        }

        let input = Self::preprocess(frame)?;
        let tensor = Tensor::from_array(input).map_err(|e| DmsError::Inference(e.to_string()))?;
        let outputs = self
            .session
            .run(ort::inputs![tensor].map_err(|e| DmsError::Inference(e.to_string()))?)
            .map_err(|e| DmsError::Inference(e.to_string()))?;

        let flag = outputs[1]
            .try_extract_tensor::<f32>()
            .map_err(|e| DmsError::Inference(e.to_string()))?;
        let logit = flag.iter().next().copied().ok_or(DmsError::MalformedLandmarks {
            expected: 1,
            actual: 0,
        })?;
        let confidence = sigmoid(logit);

        if confidence < self.confidence_threshold {
            debug!(sequence = frame.sequence, confidence, "No face in frame");
            return Ok(None);
        }

        let raw = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| DmsError::Inference(e.to_string()))?;
        let values: Vec<f32> = raw.iter().copied().collect();
        let points = decode_mesh(&values, FACE_MESH_INPUT_SIZE as f32)?;

        Ok(Some(FaceLandmarks::new(points, confidence)))
    }

    fn name(&self) -> &'static str {
        "face-mesh"
    }
}

/// Extractor used when no model is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct NullExtractor;

impl LandmarkExtractor for NullExtractor {
    fn extract(&self, _frame: &VideoFrame) -> Result<Option<FaceLandmarks>, DmsError> {
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "null"
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Convert flat `(x, y, z)` triples in model pixels into normalized points
fn decode_mesh(values: &[f32], input_size: f32) -> Result<Vec<Point>, DmsError> {
    let expected = FACE_MESH_LANDMARKS * 3;
    if values.len() < expected {
        return Err(DmsError::MalformedLandmarks {
            expected: FACE_MESH_LANDMARKS,
            actual: values.len() / 3,
        });
    }

    values[..expected]
        .chunks_exact(3)
        .map(|xyz| {
            let point = Point::new(xyz[0] / input_size, xyz[1] / input_size);
            if point.is_finite() {
                Ok(point)
            } else {
                Err(DmsError::NonFiniteLandmarks)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_extractor_reports_no_face() {
        let frame = VideoFrame::new(vec![0; 12], 2, 2, 0);
        assert!(NullExtractor.extract(&frame).unwrap().is_none());
    }

    #[test]
    fn test_build_without_model_path() {
        let extractor = build_extractor(&DmsConfig::default()).unwrap();
        assert_eq!(extractor.name(), "null");
    }

    #[test]
    fn test_sigmoid() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-6);
        assert!(sigmoid(10.0) > 0.99);
        assert!(sigmoid(-10.0) < 0.01);
    }

    #[test]
    fn test_decode_mesh_normalizes() {
        let mut values = vec![0.0; FACE_MESH_LANDMARKS * 3];
        values[0] = 96.0;
        values[1] = 48.0;
        values[2] = -3.0;
        let points = decode_mesh(&values, 192.0).unwrap();
        assert_eq!(points.len(), FACE_MESH_LANDMARKS);
        assert_eq!(points[0], Point::new(0.5, 0.25));
    }

    #[test]
    fn test_decode_mesh_short_output() {
        let values = vec![0.0; 30];
        assert!(matches!(
            decode_mesh(&values, 192.0),
            Err(DmsError::MalformedLandmarks { actual: 10, .. })
        ));
    }

    #[test]
    fn test_decode_mesh_non_finite() {
        let mut values = vec![0.0; FACE_MESH_LANDMARKS * 3];
        values[4] = f32::NAN;
        assert!(matches!(decode_mesh(&values, 192.0), Err(DmsError::NonFiniteLandmarks)));
    }
}
