//! Monitor - the owned focus-monitoring session
//!
//! Holds the tracker, the gesture switch, and every host capability. All
//! mutation goes through the entry points below; none of them block on
//! I/O of their own, and none of them fail because a collaborator did.
//! Transcripts hand back an [`Inquiry`] for the caller to resolve; the
//! answer re-enters through [`Monitor::on_inquiry_resolved`].

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use studylens_core::{
    format_minutes_seconds, DetectionFrame, Device, StudyError, StudyResult, Timestamp,
};
use studylens_time::TickGate;
use studylens_visual::{
    AttentionStatus, AttentionTracker, CameraSource, DoubtTransition, GestureModeSwitch,
    TickReport,
};
use studylens_voice::{
    finalized_transcript, AlertSound, RecognitionEvent, Utterance, VoiceInput, VoiceOutput,
    VoiceSession,
};

use crate::{
    Assistant, ChatLog, ChatRole, Inquiry, InquiryOutcome, MonitorConfig, ProgressSink,
    VideoResult, VideoSearch, XpLedger,
};

/// Host capabilities and collaborators the monitor cannot run without
pub struct MonitorCapabilities {
    pub camera: Box<dyn CameraSource>,
    pub voice: Box<dyn VoiceInput>,
    pub alert: Box<dyn AlertSound>,
    pub assistant: Box<dyn Assistant>,
    pub videos: Box<dyn VideoSearch>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct MonitorStats {
    pub frames: u64,
    pub frames_ignored: u64,
    pub ticks: u64,
    pub alerts_played: u64,
    pub alerts_blocked: u64,
    pub voice_errors: u64,
    pub assistant_errors: u64,
    pub search_errors: u64,
    pub progress_errors: u64,
    /// Most recent error surfaced to the student
    pub last_error: Option<String>,
}

/// Point-in-time view of the monitor for displays
#[derive(Clone, Debug, Serialize)]
pub struct MonitorSnapshot {
    pub status: AttentionStatus,
    pub message: &'static str,
    pub camera_active: bool,
    pub face_present: bool,
    pub hand_raised: bool,
    pub doubt_mode_active: bool,
    pub voice_active: bool,
    pub focused_seconds: u64,
    pub distracted_seconds: u64,
    pub focus_time: String,
    pub distracted_time: String,
    pub xp: u64,
    pub level: u64,
    pub last_transcript: Option<String>,
    pub recommendations: Vec<VideoResult>,
    pub chat_turns: usize,
    /// Questions still waiting on the assistant
    pub pending_inquiries: usize,
    pub stats: MonitorStats,
}

impl Default for MonitorSnapshot {
    fn default() -> Self {
        MonitorSnapshot {
            status: AttentionStatus::Off,
            message: AttentionStatus::Off.message(),
            camera_active: false,
            face_present: false,
            hand_raised: false,
            doubt_mode_active: false,
            voice_active: false,
            focused_seconds: 0,
            distracted_seconds: 0,
            focus_time: format_minutes_seconds(0),
            distracted_time: format_minutes_seconds(0),
            xp: 0,
            level: 1,
            last_transcript: None,
            recommendations: Vec::new(),
            chat_turns: 0,
            pending_inquiries: 0,
            stats: MonitorStats::default(),
        }
    }
}

/// Focus monitoring session
pub struct Monitor {
    config: MonitorConfig,
    tracker: AttentionTracker,
    switch: GestureModeSwitch,
    gate: TickGate,
    camera: Box<dyn CameraSource>,
    camera_active: bool,
    voice: VoiceSession,
    alert: Box<dyn AlertSound>,
    speech: Option<Box<dyn VoiceOutput>>,
    assistant: Arc<dyn Assistant>,
    videos: Arc<dyn VideoSearch>,
    progress: Option<Box<dyn ProgressSink>>,
    xp: XpLedger,
    chat: ChatLog,
    recommendations: Vec<VideoResult>,
    /// Inquiry the current recommendations answer
    recommendations_for: u64,
    last_transcript: Option<String>,
    next_inquiry: u64,
    pending_inquiries: usize,
    /// Latest time seen on any entry point
    now: Timestamp,
    stats: MonitorStats,
}

impl Monitor {
    /// Create a monitor with default configuration
    pub fn new(capabilities: MonitorCapabilities) -> Self {
        Self::with_config(capabilities, MonitorConfig::default())
    }

    /// Create a monitor with custom configuration
    pub fn with_config(capabilities: MonitorCapabilities, config: MonitorConfig) -> Self {
        let MonitorCapabilities {
            camera,
            voice,
            alert,
            assistant,
            videos,
        } = capabilities;

        Monitor {
            tracker: AttentionTracker::with_config(config.attention.clone()),
            switch: GestureModeSwitch::with_thresholds(config.hand_raise.clone()),
            gate: TickGate::new(config.tick_interval),
            voice: VoiceSession::with_settings(voice, config.recognition.clone()),
            camera,
            camera_active: false,
            alert,
            speech: None,
            assistant: Arc::from(assistant),
            videos: Arc::from(videos),
            progress: None,
            xp: XpLedger::new(),
            chat: ChatLog::new(),
            recommendations: Vec::new(),
            recommendations_for: 0,
            last_transcript: None,
            next_inquiry: 0,
            pending_inquiries: 0,
            now: Timestamp::ZERO,
            stats: MonitorStats::default(),
            config,
        }
    }

    /// Enable reading assistant replies aloud
    pub fn with_speech(mut self, speech: Box<dyn VoiceOutput>) -> Self {
        self.speech = Some(speech);
        self
    }

    /// Report focus totals to an external progress display as well
    pub fn with_progress(mut self, progress: Box<dyn ProgressSink>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Start the camera and begin monitoring.
    /// On permission or device errors the status stays Off and nothing is retried.
    pub fn start(&mut self, now: Timestamp) -> StudyResult<()> {
        self.observe(now);
        if self.camera_active {
            return Ok(());
        }

        if let Err(e) = self.camera.start(&self.config.camera) {
            warn!("could not start webcam: {}", e);
            self.stats.last_error = Some(e.to_string());
            return Err(e);
        }

        self.camera_active = true;
        self.tracker.start(now);
        self.gate.arm(now);
        info!(?now, "focus monitor started");
        Ok(())
    }

    /// Stop voice capture and the camera; status returns to Off.
    /// Returns false if there was nothing to stop.
    pub fn stop(&mut self) -> bool {
        if !self.camera_active && !self.voice.is_active() {
            return false;
        }

        self.voice.end();
        self.switch.reset();
        if self.camera_active {
            self.camera.stop();
            self.camera_active = false;
        }
        self.tracker.reset();
        self.gate.disarm();
        info!("focus monitor stopped");
        true
    }

    /// Ingest one classifier frame
    pub fn on_frame(&mut self, frame: &DetectionFrame) {
        if !self.camera_active {
            self.stats.frames_ignored += 1;
            trace!("frame dropped: camera inactive");
            return;
        }

        self.observe(frame.timestamp);
        self.stats.frames += 1;
        self.tracker.on_frame(frame);

        if let Some(transition) = self.switch.on_frame(frame) {
            self.apply_transition(transition);
        }
    }

    /// Evaluate attention; call once per tick interval
    pub fn on_tick(&mut self, now: Timestamp) -> TickReport {
        self.observe(now);
        let report = self.tracker.on_tick(now);
        if report.status == AttentionStatus::Off {
            return report;
        }
        self.stats.ticks += 1;

        if report.alert {
            match self.alert.play() {
                Ok(()) => self.stats.alerts_played += 1,
                Err(e) => {
                    self.stats.alerts_blocked += 1;
                    debug!("alert not played: {}", e);
                }
            }
        }

        if let Some(total) = report.focused_total {
            self.xp.record(total);
            if let Some(progress) = self.progress.as_mut() {
                if let Err(e) = progress.report_focused_seconds(total) {
                    self.stats.progress_errors += 1;
                    warn!("progress report failed: {}", e);
                }
            }
        }

        report
    }

    /// Fire a tick if one is due; missed intervals collapse into one tick
    pub fn pump(&mut self, now: Timestamp) -> Option<TickReport> {
        let due = self.gate.poll(now)?;
        Some(self.on_tick(due))
    }

    /// A finalized speech segment: record the user turn and return the
    /// question for the assistant and video search. Blank text is ignored.
    /// Doubt mode stays on; more segments may follow.
    pub fn on_transcript_finalized(&mut self, text: &str) -> Option<Inquiry> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        info!(chars = text.len(), "transcript finalized");
        self.last_transcript = Some(text.to_string());
        self.chat.push_user(text, self.now);

        self.next_inquiry += 1;
        self.pending_inquiries += 1;
        Some(Inquiry::new(
            self.next_inquiry,
            text.to_string(),
            self.assistant.clone(),
            self.videos.clone(),
            self.config.video_results,
            self.config.collaborator_timeout,
        ))
    }

    /// Apply a resolved inquiry: the reply (or an apology) joins the chat,
    /// and the videos replace older recommendations
    pub fn on_inquiry_resolved(&mut self, outcome: InquiryOutcome, now: Timestamp) {
        self.observe(now);
        self.pending_inquiries = self.pending_inquiries.saturating_sub(1);

        match outcome.reply {
            Ok(chunks) => self.chat.push_assistant(&chunks, self.now),
            Err(e) => {
                self.stats.assistant_errors += 1;
                warn!(inquiry = outcome.id, "assistant request failed: {}", e);
                self.chat.push_failure(&e, self.now);
            }
        }

        match outcome.videos {
            Ok(videos) if outcome.id > self.recommendations_for => {
                self.recommendations = videos;
                self.recommendations_for = outcome.id;
            }
            Ok(_) => debug!(inquiry = outcome.id, "stale recommendations dropped"),
            Err(e) => {
                self.stats.search_errors += 1;
                warn!(inquiry = outcome.id, "video search failed: {}", e);
            }
        }
    }

    /// An inquiry that will never resolve
    pub fn on_inquiry_lost(&mut self) {
        self.pending_inquiries = self.pending_inquiries.saturating_sub(1);
        self.stats.assistant_errors += 1;
    }

    /// Answer a transcript in place, for callers without a monitor task
    pub async fn answer_transcript(&mut self, text: &str) {
        if let Some(inquiry) = self.on_transcript_finalized(text) {
            let outcome = inquiry.resolve().await;
            let now = self.now;
            self.on_inquiry_resolved(outcome, now);
        }
    }

    /// Raw recognizer callback; forwards the finalized part, if any
    pub fn on_recognition(&mut self, event: &RecognitionEvent) -> Option<Inquiry> {
        let text = finalized_transcript(event)?;
        self.on_transcript_finalized(&text)
    }

    /// Manual doubt-mode toggle; requires a running camera
    pub fn toggle_doubt_mode(&mut self) -> StudyResult<DoubtTransition> {
        if !self.camera_active {
            return Err(StudyError::CameraInactive);
        }
        let transition = self.switch.toggle();
        self.apply_transition(transition);
        Ok(transition)
    }

    /// Speak an assistant reply from the chat log
    pub fn read_aloud(&mut self, turn: usize) -> StudyResult<()> {
        let text = match self.chat.get(turn) {
            Some(t) if t.role == ChatRole::Assistant => t.text.clone(),
            _ => {
                return Err(StudyError::collaborator(
                    "speech synthesis",
                    format!("no assistant reply at turn {}", turn),
                ))
            }
        };

        let Some(speech) = self.speech.as_mut() else {
            return Err(StudyError::DeviceUnavailable {
                device: Device::Speaker,
                reason: "speech synthesis not available".into(),
            });
        };
        speech.speak(&Utterance::reading(text))
    }

    fn apply_transition(&mut self, transition: DoubtTransition) {
        match transition {
            DoubtTransition::Entered => {
                info!("doubt mode on");
                if let Err(e) = self.voice.begin() {
                    self.stats.voice_errors += 1;
                    self.stats.last_error = Some(e.to_string());
                    warn!("voice capture unavailable: {}", e);
                }
            }
            DoubtTransition::Exited => {
                info!("doubt mode off");
                self.voice.end();
            }
        }
    }

    fn observe(&mut self, t: Timestamp) {
        if t > self.now {
            self.now = t;
        }
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        let status = self.tracker.status();
        let gesture = self.switch.state();
        MonitorSnapshot {
            status,
            message: status.message(),
            camera_active: self.camera_active,
            face_present: self.tracker.face_present(),
            hand_raised: gesture.hand_raised,
            doubt_mode_active: gesture.doubt_mode_active,
            voice_active: self.voice.is_active(),
            focused_seconds: self.tracker.focused_seconds(),
            distracted_seconds: self.tracker.distracted_seconds(),
            focus_time: self.tracker.focus_time_display(),
            distracted_time: self.tracker.distracted_time_display(),
            xp: self.xp.xp(),
            level: self.xp.level(),
            last_transcript: self.last_transcript.clone(),
            recommendations: self.recommendations.clone(),
            chat_turns: self.chat.len(),
            pending_inquiries: self.pending_inquiries,
            stats: self.stats.clone(),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn status(&self) -> AttentionStatus {
        self.tracker.status()
    }

    pub fn is_camera_active(&self) -> bool {
        self.camera_active
    }

    pub fn doubt_mode_active(&self) -> bool {
        self.switch.doubt_mode_active()
    }

    pub fn tracker(&self) -> &AttentionTracker {
        &self.tracker
    }

    pub fn gesture(&self) -> &GestureModeSwitch {
        &self.switch
    }

    pub fn voice(&self) -> &VoiceSession {
        &self.voice
    }

    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    pub fn recommendations(&self) -> &[VideoResult] {
        &self.recommendations
    }

    pub fn xp(&self) -> &XpLedger {
        &self.xp
    }

    pub fn stats(&self) -> &MonitorStats {
        &self.stats
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        self.stop();
    }
}
