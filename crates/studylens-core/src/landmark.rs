//! Landmark geometry and detection frames
//!
//! Coordinates are normalized to the image: x and y in [0, 1] with y
//! growing downward, z relative depth as reported by the classifier.

use serde::{Deserialize, Serialize};

use crate::{StudyError, StudyResult, Timestamp};

/// Landmark position (normalized coordinates)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Point on the image plane with zero depth
    pub fn planar(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Linear interpolation
    pub fn lerp(&self, other: &Point3, t: f32) -> Point3 {
        Point3 {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }
}

/// Hand joint identifier (21-point hand model)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandJoint {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexMcp = 5,
    IndexPip = 6,
    IndexDip = 7,
    IndexTip = 8,
    MiddleMcp = 9,
    MiddlePip = 10,
    MiddleDip = 11,
    MiddleTip = 12,
    RingMcp = 13,
    RingPip = 14,
    RingDip = 15,
    RingTip = 16,
    PinkyMcp = 17,
    PinkyPip = 18,
    PinkyDip = 19,
    PinkyTip = 20,
}

impl HandJoint {
    /// Number of joints in a hand landmark set
    pub const COUNT: usize = 21;

    /// Fingertips in thumb-to-pinky order
    pub fn tips() -> &'static [HandJoint] {
        &[
            HandJoint::ThumbTip,
            HandJoint::IndexTip,
            HandJoint::MiddleTip,
            HandJoint::RingTip,
            HandJoint::PinkyTip,
        ]
    }
}

/// One detected hand: an ordered set of 21 landmarks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandLandmarks {
    pub points: Vec<Point3>,
}

impl HandLandmarks {
    pub fn new(points: Vec<Point3>) -> Self {
        Self { points }
    }

    /// Check the set carries every joint the hand model defines
    pub fn validate(&self) -> StudyResult<()> {
        if self.points.len() < HandJoint::COUNT {
            return Err(StudyError::MalformedFrame {
                expected: HandJoint::COUNT,
                actual: self.points.len(),
            });
        }
        Ok(())
    }

    /// Get landmark by joint
    pub fn joint(&self, joint: HandJoint) -> Option<&Point3> {
        self.points.get(joint as usize)
    }

    /// Set landmark by joint; ignored if the set is too short
    pub fn set_joint(&mut self, joint: HandJoint, point: Point3) {
        if let Some(slot) = self.points.get_mut(joint as usize) {
            *slot = point;
        }
    }
}

/// Classifier output for one processed camera frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionFrame {
    pub timestamp: Timestamp,
    /// Face mesh vertices; empty when no face was detected
    pub face_landmarks: Vec<Point3>,
    /// One entry per detected hand
    pub hands: Vec<HandLandmarks>,
}

impl DetectionFrame {
    /// Frame with nothing detected
    pub fn empty(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            face_landmarks: Vec::new(),
            hands: Vec::new(),
        }
    }

    pub fn with_face(mut self, landmarks: Vec<Point3>) -> Self {
        self.face_landmarks = landmarks;
        self
    }

    pub fn with_hand(mut self, hand: HandLandmarks) -> Self {
        self.hands.push(hand);
        self
    }

    #[inline]
    pub fn has_face(&self) -> bool {
        !self.face_landmarks.is_empty()
    }

    #[inline]
    pub fn has_hands(&self) -> bool {
        !self.hands.is_empty()
    }
}
