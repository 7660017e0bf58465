//! Recording fakes for host capabilities and collaborators
//!
//! Every fake appends to one shared [`DeviceLog`], so a test can assert on
//! the exact interleaving of camera, voice and collaborator calls.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use studylens_core::{Device, StudyError, StudyResult};
use studylens_runtime::{
    Assistant, CannedVideoSearch, Monitor, MonitorCapabilities, MonitorConfig, ProgressSink,
    VideoResult, VideoSearch,
};
use studylens_visual::{CameraRequest, CameraSource};
use studylens_voice::{
    AlertSound, RecognitionSettings, Utterance, VoiceHandle, VoiceInput, VoiceOutput,
};

/// Something a fake was asked to do
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeviceEvent {
    CameraStart,
    CameraStop,
    VoiceStart(u64),
    VoiceStop(u64),
    Alert,
    AlertBlocked,
    Speak(String),
    Ask(String),
    Search(String),
    Progress(u64),
}

#[derive(Debug, Default)]
struct LogInner {
    events: Vec<DeviceEvent>,
    next_voice: u64,
    live_voice: usize,
    max_live_voice: usize,
}

/// Shared, ordered record of fake calls
#[derive(Clone, Debug, Default)]
pub struct DeviceLog {
    inner: Arc<Mutex<LogInner>>,
}

impl DeviceLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: DeviceEvent) {
        self.inner.lock().events.push(event);
    }

    pub fn events(&self) -> Vec<DeviceEvent> {
        self.inner.lock().events.clone()
    }

    /// Events other than alerts and progress reports
    pub fn device_events(&self) -> Vec<DeviceEvent> {
        self.events()
            .into_iter()
            .filter(|e| {
                !matches!(
                    e,
                    DeviceEvent::Alert | DeviceEvent::AlertBlocked | DeviceEvent::Progress(_)
                )
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&DeviceEvent) -> bool) -> usize {
        self.inner.lock().events.iter().filter(|e| pred(e)).count()
    }

    pub fn voice_starts(&self) -> usize {
        self.count(|e| matches!(e, DeviceEvent::VoiceStart(_)))
    }

    pub fn alerts(&self) -> usize {
        self.count(|e| matches!(e, DeviceEvent::Alert))
    }

    /// Recognizers running right now
    pub fn live_voice(&self) -> usize {
        self.inner.lock().live_voice
    }

    /// Most recognizers ever running at once
    pub fn max_live_voice(&self) -> usize {
        self.inner.lock().max_live_voice
    }

    pub fn clear(&self) {
        self.inner.lock().events.clear();
    }
}

pub struct FakeCamera {
    log: DeviceLog,
    failure: Option<StudyError>,
    open: bool,
}

impl FakeCamera {
    pub fn new(log: DeviceLog) -> Self {
        FakeCamera {
            log,
            failure: None,
            open: false,
        }
    }

    /// Camera that refuses to start with `error`
    pub fn failing(log: DeviceLog, error: StudyError) -> Self {
        FakeCamera {
            log,
            failure: Some(error),
            open: false,
        }
    }
}

impl CameraSource for FakeCamera {
    fn start(&mut self, _request: &CameraRequest) -> StudyResult<()> {
        if let Some(e) = &self.failure {
            return Err(e.clone());
        }
        self.open = true;
        self.log.push(DeviceEvent::CameraStart);
        Ok(())
    }

    fn stop(&mut self) {
        if self.open {
            self.open = false;
            self.log.push(DeviceEvent::CameraStop);
        }
    }
}

pub struct FakeVoiceInput {
    log: DeviceLog,
    deny: bool,
}

impl FakeVoiceInput {
    pub fn new(log: DeviceLog) -> Self {
        FakeVoiceInput { log, deny: false }
    }

    /// Microphone permission denied
    pub fn denied(log: DeviceLog) -> Self {
        FakeVoiceInput { log, deny: true }
    }
}

impl VoiceInput for FakeVoiceInput {
    fn start(&mut self, _settings: &RecognitionSettings) -> StudyResult<VoiceHandle> {
        if self.deny {
            return Err(StudyError::PermissionDenied(Device::Microphone));
        }
        let id = {
            let mut inner = self.log.inner.lock();
            inner.next_voice += 1;
            inner.live_voice += 1;
            inner.max_live_voice = inner.max_live_voice.max(inner.live_voice);
            inner.next_voice
        };
        self.log.push(DeviceEvent::VoiceStart(id));
        Ok(VoiceHandle::new(id))
    }

    fn stop(&mut self, handle: VoiceHandle) {
        {
            let mut inner = self.log.inner.lock();
            inner.live_voice = inner.live_voice.saturating_sub(1);
        }
        self.log.push(DeviceEvent::VoiceStop(handle.0));
    }
}

pub struct FakeVoiceOutput {
    log: DeviceLog,
}

impl FakeVoiceOutput {
    pub fn new(log: DeviceLog) -> Self {
        FakeVoiceOutput { log }
    }
}

impl VoiceOutput for FakeVoiceOutput {
    fn speak(&mut self, utterance: &Utterance) -> StudyResult<()> {
        self.log.push(DeviceEvent::Speak(utterance.text.clone()));
        Ok(())
    }
}

pub struct FakeAlert {
    log: DeviceLog,
    blocked: bool,
}

impl FakeAlert {
    pub fn new(log: DeviceLog) -> Self {
        FakeAlert {
            log,
            blocked: false,
        }
    }

    /// Host refuses playback, as browsers do before any user gesture
    pub fn blocked(log: DeviceLog) -> Self {
        FakeAlert { log, blocked: true }
    }
}

impl AlertSound for FakeAlert {
    fn play(&mut self) -> StudyResult<()> {
        if self.blocked {
            self.log.push(DeviceEvent::AlertBlocked);
            return Err(StudyError::AlertBlocked("playback requires user interaction".into()));
        }
        self.log.push(DeviceEvent::Alert);
        Ok(())
    }
}

/// Assistant that answers from a script, or always fails
pub struct ScriptedAssistant {
    log: DeviceLog,
    failure: Option<String>,
}

impl ScriptedAssistant {
    pub fn new(log: DeviceLog) -> Self {
        ScriptedAssistant { log, failure: None }
    }

    pub fn failing(log: DeviceLog, message: impl Into<String>) -> Self {
        ScriptedAssistant {
            log,
            failure: Some(message.into()),
        }
    }
}

#[async_trait]
impl Assistant for ScriptedAssistant {
    async fn submit(&self, user_text: &str) -> StudyResult<Vec<String>> {
        self.log.push(DeviceEvent::Ask(user_text.to_string()));
        if let Some(message) = &self.failure {
            return Err(StudyError::collaborator("assistant", message.clone()));
        }
        Ok(vec![
            "Good question! ".to_string(),
            format!("Let's look at {}.", user_text),
        ])
    }
}

/// Canned search that records queries; can be switched to fail
pub struct RecordingSearch {
    log: DeviceLog,
    inner: CannedVideoSearch,
    fail: bool,
}

impl RecordingSearch {
    pub fn new(log: DeviceLog) -> Self {
        RecordingSearch {
            log,
            inner: CannedVideoSearch,
            fail: false,
        }
    }

    pub fn failing(log: DeviceLog) -> Self {
        RecordingSearch {
            fail: true,
            ..Self::new(log)
        }
    }
}

#[async_trait]
impl VideoSearch for RecordingSearch {
    async fn search(&self, query: &str, max_results: usize) -> StudyResult<Vec<VideoResult>> {
        self.log.push(DeviceEvent::Search(query.to_string()));
        if self.fail {
            return Err(StudyError::collaborator("video search", "quota exceeded"));
        }
        self.inner.search(query, max_results).await
    }
}

pub struct RecordingProgress {
    log: DeviceLog,
}

impl RecordingProgress {
    pub fn new(log: DeviceLog) -> Self {
        RecordingProgress { log }
    }
}

impl ProgressSink for RecordingProgress {
    fn report_focused_seconds(&mut self, total_seconds: u64) -> StudyResult<()> {
        self.log.push(DeviceEvent::Progress(total_seconds));
        Ok(())
    }
}

/// Builder wiring fakes into a monitor
#[derive(Clone, Debug, Default)]
pub struct FakeHost {
    log: DeviceLog,
    camera_error: Option<StudyError>,
    microphone_denied: bool,
    alerts_blocked: bool,
    assistant_error: Option<String>,
    search_fails: bool,
    config: MonitorConfig,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn camera_error(mut self, error: StudyError) -> Self {
        self.camera_error = Some(error);
        self
    }

    pub fn microphone_denied(mut self) -> Self {
        self.microphone_denied = true;
        self
    }

    pub fn alerts_blocked(mut self) -> Self {
        self.alerts_blocked = true;
        self
    }

    pub fn assistant_error(mut self, message: impl Into<String>) -> Self {
        self.assistant_error = Some(message.into());
        self
    }

    pub fn search_fails(mut self) -> Self {
        self.search_fails = true;
        self
    }

    pub fn config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn log(&self) -> DeviceLog {
        self.log.clone()
    }

    /// Build a monitor with speech output and progress reporting attached
    pub fn monitor(&self) -> Monitor {
        let log = &self.log;
        let camera = match &self.camera_error {
            Some(e) => FakeCamera::failing(log.clone(), e.clone()),
            None => FakeCamera::new(log.clone()),
        };
        let voice = if self.microphone_denied {
            FakeVoiceInput::denied(log.clone())
        } else {
            FakeVoiceInput::new(log.clone())
        };
        let alert = if self.alerts_blocked {
            FakeAlert::blocked(log.clone())
        } else {
            FakeAlert::new(log.clone())
        };
        let assistant = match &self.assistant_error {
            Some(message) => ScriptedAssistant::failing(log.clone(), message.clone()),
            None => ScriptedAssistant::new(log.clone()),
        };
        let videos = if self.search_fails {
            RecordingSearch::failing(log.clone())
        } else {
            RecordingSearch::new(log.clone())
        };

        Monitor::with_config(
            MonitorCapabilities {
                camera: Box::new(camera),
                voice: Box::new(voice),
                alert: Box::new(alert),
                assistant: Box::new(assistant),
                videos: Box::new(videos),
            },
            self.config.clone(),
        )
        .with_speech(Box::new(FakeVoiceOutput::new(log.clone())))
        .with_progress(Box::new(RecordingProgress::new(log.clone())))
    }
}
