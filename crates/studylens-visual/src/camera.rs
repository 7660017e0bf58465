//! Camera capability - webcam plus landmark classifier
//!
//! The host owns the device and the inference models. The monitor only
//! asks it to start and stop; frames come back through the monitor's
//! `on_frame` entry point.

use serde::{Deserialize, Serialize};

use studylens_core::StudyResult;

/// What the monitor asks of the camera and classifier
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraRequest {
    pub width: u32,
    pub height: u32,
    /// Face mesh results per frame
    pub max_faces: u32,
    /// Hand landmark sets per frame
    pub max_hands: u32,
    pub min_face_confidence: f32,
    pub min_hand_confidence: f32,
}

impl Default for CameraRequest {
    fn default() -> Self {
        CameraRequest {
            width: 640,
            height: 480,
            max_faces: 1,
            max_hands: 2,
            min_face_confidence: 0.1,
            min_hand_confidence: 0.5,
        }
    }
}

/// Webcam feed with a landmark classifier attached
pub trait CameraSource: Send {
    /// Open the device and start producing frames.
    /// Permission and device errors are returned as-is.
    fn start(&mut self, request: &CameraRequest) -> StudyResult<()>;

    /// Release the device; must tolerate being called when not started
    fn stop(&mut self);
}
