//! Voice Session - at most one live recognizer

use tracing::{debug, info};

use studylens_core::StudyResult;

use crate::{RecognitionSettings, VoiceHandle, VoiceInput};

/// Owns the recognizer and the handle of the running capture, if any
pub struct VoiceSession {
    input: Box<dyn VoiceInput>,
    settings: RecognitionSettings,
    active: Option<VoiceHandle>,
    started: u64,
}

impl VoiceSession {
    pub fn new(input: Box<dyn VoiceInput>) -> Self {
        Self::with_settings(input, RecognitionSettings::default())
    }

    pub fn with_settings(input: Box<dyn VoiceInput>, settings: RecognitionSettings) -> Self {
        VoiceSession {
            input,
            settings,
            active: None,
            started: 0,
        }
    }

    /// Start capturing; a capture already running is stopped first
    pub fn begin(&mut self) -> StudyResult<VoiceHandle> {
        self.end();

        let handle = self.input.start(&self.settings)?;
        self.active = Some(handle);
        self.started += 1;
        info!(handle = handle.0, "voice capture started");
        Ok(handle)
    }

    /// Stop the running capture. Returns false if nothing was running.
    pub fn end(&mut self) -> bool {
        let Some(handle) = self.active.take() else {
            return false;
        };
        self.input.stop(handle);
        debug!(handle = handle.0, "voice capture stopped");
        true
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_handle(&self) -> Option<VoiceHandle> {
        self.active
    }

    /// Captures started over the session's lifetime
    pub fn sessions_started(&self) -> u64 {
        self.started
    }
}

impl Drop for VoiceSession {
    fn drop(&mut self) {
        self.end();
    }
}

impl std::fmt::Debug for VoiceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceSession")
            .field("active", &self.active)
            .field("started", &self.started)
            .finish()
    }
}
