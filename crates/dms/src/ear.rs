//! Eye aspect ratio (EAR)
//!
//! EAR = (|p2 - p6| + |p3 - p5|) / (2 * |p1 - p4|), averaged over both eyes.
//! An open eye sits around 0.3 and drops toward 0 as the lids close.

use crate::landmarks::{EyeIndices, FaceLandmarks, LEFT_EYE, RIGHT_EYE};
use crate::DmsError;

/// Horizontal spans at or below this are treated as degenerate geometry
const MIN_HORIZONTAL_SPAN: f32 = 1e-6;

/// EAR of a single eye
///
/// Returns `None` when the eye corners coincide.
pub fn eye_aspect_ratio(face: &FaceLandmarks, eye: &EyeIndices) -> Result<Option<f32>, DmsError> {
    let point = |index: usize| {
        face.get(index)
            .copied()
            .ok_or(DmsError::MalformedLandmarks {
                expected: eye.max_index() + 1,
                actual: face.len(),
            })
    };

    let (p1, p2, p3) = (point(eye.p1)?, point(eye.p2)?, point(eye.p3)?);
    let (p4, p5, p6) = (point(eye.p4)?, point(eye.p5)?, point(eye.p6)?);

    if ![p1, p2, p3, p4, p5, p6].iter().all(|p| p.is_finite()) {
        return Err(DmsError::NonFiniteLandmarks);
    }

    let horizontal = p1.distance(&p4);
    if horizontal <= MIN_HORIZONTAL_SPAN {
        return Ok(None);
    }

    Ok(Some((p2.distance(&p6) + p3.distance(&p5)) / (2.0 * horizontal)))
}

/// Mean EAR over both eyes
///
/// 0.0 if either eye is degenerate.
pub fn eye_openness(face: &FaceLandmarks) -> Result<f32, DmsError> {
    let left = eye_aspect_ratio(face, &LEFT_EYE)?;
    let right = eye_aspect_ratio(face, &RIGHT_EYE)?;
    match (left, right) {
        (Some(left), Some(right)) => Ok((left + right) / 2.0),
        _ => Ok(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{Point, FACE_MESH_LANDMARKS};
    use crate::testing::{face_with_ear, place_eye};

    #[test]
    fn test_open_eyes() {
        let ear = eye_openness(&face_with_ear(0.3)).unwrap();
        assert!((ear - 0.3).abs() < 1e-5);
    }

    #[test]
    fn test_closed_eyes() {
        let ear = eye_openness(&face_with_ear(0.0)).unwrap();
        assert!(ear.abs() < 1e-6);
    }

    #[test]
    fn test_eyes_averaged() {
        let mut face = face_with_ear(0.3);
        place_eye(&mut face.points, &LEFT_EYE, Point::new(0.55, 0.4), 0.1, 0.1 * 0.1);
        let ear = eye_openness(&face).unwrap();
        assert!((ear - 0.2).abs() < 1e-5);
    }

    #[test]
    fn test_scale_invariant() {
        let face = face_with_ear(0.27);
        let scaled = FaceLandmarks::new(
            face.points.iter().map(|p| Point::new(p.x * 3.0, p.y * 3.0)).collect(),
            1.0,
        );
        let a = eye_openness(&face).unwrap();
        let b = eye_openness(&scaled).unwrap();
        assert!((a - b).abs() < 1e-5);
    }

    #[test]
    fn test_degenerate_horizontal_span() {
        let face = FaceLandmarks::new(vec![Point::new(5.0, 5.0); FACE_MESH_LANDMARKS], 1.0);
        assert_eq!(eye_openness(&face).unwrap(), 0.0);
    }

    #[test]
    fn test_one_degenerate_eye_zeroes_openness() {
        let mut face = face_with_ear(0.3);
        face.points[LEFT_EYE.p4] = face.points[LEFT_EYE.p1];

        assert_eq!(eye_aspect_ratio(&face, &LEFT_EYE).unwrap(), None);
        let right = eye_aspect_ratio(&face, &RIGHT_EYE).unwrap().unwrap();
        assert!((right - 0.3).abs() < 1e-5);
        assert_eq!(eye_openness(&face).unwrap(), 0.0);
    }

    #[test]
    fn test_too_few_landmarks() {
        let face = FaceLandmarks::new(vec![Point::default(); 100], 1.0);
        let err = eye_openness(&face).unwrap_err();
        assert!(matches!(err, DmsError::MalformedLandmarks { actual: 100, .. }));
    }

    #[test]
    fn test_non_finite_landmarks() {
        let mut face = face_with_ear(0.3);
        face.points[RIGHT_EYE.p2] = Point::new(f32::NAN, 0.0);
        assert!(matches!(eye_openness(&face), Err(DmsError::NonFiniteLandmarks)));
    }
}
