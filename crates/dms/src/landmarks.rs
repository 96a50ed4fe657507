//! Facial landmark types and the face mesh eye index table

use serde::{Deserialize, Serialize};

/// Number of landmarks produced by the face mesh model
pub const FACE_MESH_LANDMARKS: usize = 468;

/// 2D landmark point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Six face mesh indices describing one eye
///
/// `p1`/`p4` are the eye corners, `p2`/`p6` and `p3`/`p5` the two
/// upper/lower eyelid pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EyeIndices {
    pub p1: usize,
    pub p2: usize,
    pub p3: usize,
    pub p4: usize,
    pub p5: usize,
    pub p6: usize,
}

impl EyeIndices {
    /// Largest index referenced
    pub fn max_index(&self) -> usize {
        [self.p1, self.p2, self.p3, self.p4, self.p5, self.p6]
            .into_iter()
            .max()
            .unwrap_or(self.p1)
    }
}

/// Subject's left eye (image right side on an unmirrored frame)
pub const LEFT_EYE: EyeIndices = EyeIndices {
    p1: 362,
    p2: 385,
    p3: 387,
    p4: 263,
    p5: 373,
    p6: 380,
};

/// Subject's right eye
pub const RIGHT_EYE: EyeIndices = EyeIndices {
    p1: 33,
    p2: 160,
    p3: 158,
    p4: 133,
    p5: 153,
    p6: 144,
};

/// Landmarks of the first detected face
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceLandmarks {
    /// Landmark points, indexed by face mesh topology
    pub points: Vec<Point>,
    /// Face presence confidence (0-1)
    pub confidence: f32,
}

impl FaceLandmarks {
    pub fn new(points: Vec<Point>, confidence: f32) -> Self {
        Self { points, confidence }
    }

    /// Scale normalized `[0, 1]` coordinates to pixel coordinates
    pub fn to_pixels(&self, width: u32, height: u32) -> FaceLandmarks {
        let (w, h) = (width as f32, height as f32);
        FaceLandmarks {
            points: self
                .points
                .iter()
                .map(|p| Point::new(p.x * w, p.y * h))
                .collect(),
            confidence: self.confidence,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Point> {
        self.points.get(index)
    }
}
