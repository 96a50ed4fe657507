//! Test helpers: synthetic faces and a color-coded extractor
//!
//! `ColorCodedExtractor` reads the top-left pixel of a frame to decide what
//! to report, so tests can push real encoded images through the full
//! decode/extract/metric path with a scripted outcome.

use frame_decoder::VideoFrame;

use crate::detector::LandmarkExtractor;
use crate::landmarks::{EyeIndices, FaceLandmarks, Point, FACE_MESH_LANDMARKS, LEFT_EYE, RIGHT_EYE};
use crate::DmsError;

/// Pixel color meaning "no face"
pub const NO_FACE_COLOR: [u8; 3] = [0, 0, 255];

/// Pixel color meaning "extractor fails"
pub const FAILURE_COLOR: [u8; 3] = [0, 255, 0];

/// Red channel units per 1.0 EAR
const EAR_SCALE: f32 = 500.0;

/// Place one eye with the given corner width and lid opening
pub fn place_eye(points: &mut [Point], eye: &EyeIndices, origin: Point, width: f32, opening: f32) {
    points[eye.p1] = origin;
    points[eye.p4] = Point::new(origin.x + width, origin.y);
    let third = width / 3.0;
    points[eye.p2] = Point::new(origin.x + third, origin.y - opening / 2.0);
    points[eye.p6] = Point::new(origin.x + third, origin.y + opening / 2.0);
    points[eye.p3] = Point::new(origin.x + 2.0 * third, origin.y - opening / 2.0);
    points[eye.p5] = Point::new(origin.x + 2.0 * third, origin.y + opening / 2.0);
}

/// Normalized face whose eyes both have the given EAR
pub fn face_with_ear(ear: f32) -> FaceLandmarks {
    let width = 0.1;
    let mut points = vec![Point::new(0.5, 0.5); FACE_MESH_LANDMARKS];
    place_eye(&mut points, &RIGHT_EYE, Point::new(0.35, 0.4), width, width * ear);
    place_eye(&mut points, &LEFT_EYE, Point::new(0.55, 0.4), width, width * ear);
    FaceLandmarks::new(points, 1.0)
}

/// Frame color that `ColorCodedExtractor` reads back as this EAR
///
/// EAR resolution is 1/500; values above 0.51 saturate.
pub fn color_for_ear(ear: f32) -> [u8; 3] {
    let red = (ear * EAR_SCALE).round().clamp(0.0, 255.0) as u8;
    [red, 0, 0]
}

/// Extractor scripted by the frame's top-left pixel
#[derive(Debug, Default, Clone, Copy)]
pub struct ColorCodedExtractor;

impl LandmarkExtractor for ColorCodedExtractor {
    fn extract(&self, frame: &VideoFrame) -> Result<Option<FaceLandmarks>, DmsError> {
        let pixel = frame
            .get_pixel(0, 0)
            .ok_or_else(|| DmsError::ImageProcessing("Empty frame".into()))?;

        match pixel {
            NO_FACE_COLOR => Ok(None),
            FAILURE_COLOR => Err(DmsError::Inference("scripted failure".into())),
            [red, _, _] => Ok(Some(face_with_ear(red as f32 / EAR_SCALE))),
        }
    }

    fn name(&self) -> &'static str {
        "color-coded"
    }
}
