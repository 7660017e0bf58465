//! Error types for StudyLens

use std::fmt;

use thiserror::Error;

/// Capture device named in permission and resource errors
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Device {
    Camera,
    Microphone,
    Speaker,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Device::Camera => "camera",
            Device::Microphone => "microphone",
            Device::Speaker => "speaker",
        };
        f.write_str(name)
    }
}

/// Core StudyLens errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StudyError {
    // Permission / resource errors
    #[error("{0} access denied")]
    PermissionDenied(Device),

    #[error("no {0} found")]
    DeviceNotFound(Device),

    #[error("could not access {device}: {reason}")]
    DeviceUnavailable { device: Device, reason: String },

    // Transient errors
    #[error("malformed landmark set: expected {expected} points, got {actual}")]
    MalformedFrame { expected: usize, actual: usize },

    #[error("audio alert blocked: {0}")]
    AlertBlocked(String),

    // Precondition violations
    #[error("start the webcam first to use doubt mode")]
    CameraInactive,

    // Collaborator failures
    #[error("{service} failed: {message}")]
    Collaborator { service: &'static str, message: String },

    // Configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    // Runtime
    #[error("monitor is no longer running")]
    MonitorClosed,
}

impl StudyError {
    /// Shorthand for a collaborator failure
    pub fn collaborator(service: &'static str, message: impl Into<String>) -> Self {
        StudyError::Collaborator {
            service,
            message: message.into(),
        }
    }

    /// Permission and device errors leave the monitor in the Off state
    pub fn is_device_error(&self) -> bool {
        matches!(
            self,
            StudyError::PermissionDenied(_)
                | StudyError::DeviceNotFound(_)
                | StudyError::DeviceUnavailable { .. }
        )
    }

    /// Transient errors are logged and skipped, never propagated
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StudyError::MalformedFrame { .. } | StudyError::AlertBlocked(_)
        )
    }
}

/// Result type for StudyLens operations
pub type StudyResult<T> = Result<T, StudyError>;
