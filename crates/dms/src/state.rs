//! Per-session drowsiness state machine
//!
//! Raw per-frame EAR values are noisy. The session only changes its displayed
//! status after a run of same-category frames longer than
//! `category_run_length`, and tolerates up to `no_face_reset_threshold`
//! consecutive missed detections before declaring the face lost.

use serde::{Deserialize, Serialize};

use crate::config::DmsConfig;

/// Displayed session status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    #[serde(rename = "Initializing...")]
    Initializing,
    #[serde(rename = "Active")]
    Active,
    #[serde(rename = "Drowsy !")]
    Drowsy,
    #[serde(rename = "SLEEPING !!!")]
    Sleeping,
    #[serde(rename = "No Face Detected")]
    NoFaceDetected,
}

impl Status {
    /// Label shown to the operator (also the wire form)
    pub fn label(&self) -> &'static str {
        match self {
            Status::Initializing => "Initializing...",
            Status::Active => "Active",
            Status::Drowsy => "Drowsy !",
            Status::Sleeping => "SLEEPING !!!",
            Status::NoFaceDetected => "No Face Detected",
        }
    }

    /// `#RRGGBB` display color
    pub fn color(&self) -> &'static str {
        match self {
            Status::Initializing | Status::NoFaceDetected => "#FFFFFF",
            Status::Active => "#00FF00",
            Status::Drowsy => "#FFFF00",
            Status::Sleeping => "#FF0000",
        }
    }

    /// Short machine name (metrics labels, logs)
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Initializing => "initializing",
            Status::Active => "active",
            Status::Drowsy => "drowsy",
            Status::Sleeping => "sleeping",
            Status::NoFaceDetected => "no_face",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// EAR category of a single frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Sleep,
    Drowsy,
    Active,
}

impl Category {
    /// Bucket an EAR value
    pub fn classify(ear: f32, config: &DmsConfig) -> Self {
        if ear < config.sleep_ear_threshold {
            Category::Sleep
        } else if ear < config.active_ear_threshold {
            Category::Drowsy
        } else {
            Category::Active
        }
    }

    /// Status shown once a run of this category is long enough
    pub fn terminal_status(&self) -> Status {
        match self {
            Category::Sleep => Status::Sleeping,
            Category::Drowsy => Status::Drowsy,
            Category::Active => Status::Active,
        }
    }
}

/// Per-frame input to the state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Observation {
    /// A face was found with this eye openness
    Face(f32),
    /// No face in the frame
    NoFace,
}

impl Observation {
    /// Raw score reported for this frame (0.0 without a face)
    pub fn ear(&self) -> f32 {
        match self {
            Observation::Face(ear) => *ear,
            Observation::NoFace => 0.0,
        }
    }
}

/// Session state (one per connection)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Consecutive sleep-category frames
    pub sleep_frames: u32,
    /// Consecutive drowsy-category frames
    pub drowsy_frames: u32,
    /// Consecutive active-category frames
    pub active_frames: u32,
    /// Consecutive frames without a face
    pub no_face_frames: u32,
    /// Current displayed status
    pub status: Status,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Display color of the current status
    pub fn color(&self) -> &'static str {
        self.status.color()
    }

    /// Apply one frame and return the status shown after it
    pub fn observe(&mut self, observation: Observation, config: &DmsConfig) -> Status {
        match observation {
            Observation::Face(ear) => self.observe_face(ear, config),
            Observation::NoFace => self.observe_no_face(config),
        }
        self.status
    }

    fn observe_face(&mut self, ear: f32, config: &DmsConfig) {
        self.no_face_frames = 0;

        let category = Category::classify(ear, config);
        let run = match category {
            Category::Sleep => {
                self.drowsy_frames = 0;
                self.active_frames = 0;
                self.sleep_frames = self.sleep_frames.saturating_add(1);
                self.sleep_frames
            }
            Category::Drowsy => {
                self.sleep_frames = 0;
                self.active_frames = 0;
                self.drowsy_frames = self.drowsy_frames.saturating_add(1);
                self.drowsy_frames
            }
            Category::Active => {
                self.sleep_frames = 0;
                self.drowsy_frames = 0;
                self.active_frames = self.active_frames.saturating_add(1);
                self.active_frames
            }
        };

        if run > config.category_run_length {
            self.status = category.terminal_status();
        }
    }

    fn observe_no_face(&mut self, config: &DmsConfig) {
        self.no_face_frames = self.no_face_frames.saturating_add(1);

        if self.no_face_frames > config.no_face_reset_threshold {
            *self = Self {
                status: Status::NoFaceDetected,
                ..Self::default()
            };
        }
    }
}
