//! Host capabilities for voice and audio

use serde::{Deserialize, Serialize};

use studylens_core::StudyResult;

/// Identifier of a running recognizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceHandle(pub u64);

impl VoiceHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Recognizer settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionSettings {
    /// Keep listening across pauses
    pub continuous: bool,
    /// Deliver non-final hypotheses as well
    pub interim_results: bool,
    /// BCP 47 language tag
    pub language: String,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        RecognitionSettings {
            continuous: true,
            interim_results: true,
            language: "en-US".to_string(),
        }
    }
}

/// Speech recognition
pub trait VoiceInput: Send {
    fn start(&mut self, settings: &RecognitionSettings) -> StudyResult<VoiceHandle>;

    fn stop(&mut self, handle: VoiceHandle);
}

/// One piece of synthesized speech
#[derive(Clone, Debug, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub rate: f32,
    pub pitch: f32,
}

impl Utterance {
    /// Utterance at the reading pace used for assistant replies
    pub fn reading(text: impl Into<String>) -> Self {
        Utterance {
            text: text.into(),
            rate: 0.9,
            pitch: 1.0,
        }
    }
}

/// Speech synthesis
pub trait VoiceOutput: Send {
    fn speak(&mut self, utterance: &Utterance) -> StudyResult<()>;
}

/// Audible distraction alert.
/// Hosts may refuse playback (e.g. before any user gesture); that is not fatal.
pub trait AlertSound: Send {
    fn play(&mut self) -> StudyResult<()>;
}
