//! Attention tracking - focus status from face presence
//!
//! Frames only record when a face was last seen. The status itself moves
//! on ticks, so a noisy camera cannot make it flicker.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use studylens_core::{format_minutes_seconds, DetectionFrame, Timestamp};

/// Thresholds for attention evaluation (milliseconds)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttentionConfig {
    /// Face unseen for longer than this (while still counted present) means distracted
    pub distracted_after_ms: i64,
    /// Face absent for longer than this means looking away
    pub looking_away_after_ms: i64,
    /// A no-face frame only clears presence once the last sighting is this old
    pub face_lost_after_ms: i64,
}

impl Default for AttentionConfig {
    fn default() -> Self {
        AttentionConfig {
            distracted_after_ms: 5_000,
            looking_away_after_ms: 3_000,
            face_lost_after_ms: 1_000,
        }
    }
}

/// Discrete attention status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttentionStatus {
    /// Webcam not started
    Off,
    Focused,
    Distracted,
    LookingAway,
}

impl AttentionStatus {
    /// Short label for status displays
    pub fn label(&self) -> &'static str {
        match self {
            AttentionStatus::Off => "Webcam Off",
            AttentionStatus::Focused => "Focused",
            AttentionStatus::Distracted => "Distracted",
            AttentionStatus::LookingAway => "Looking Away",
        }
    }

    /// Feedback shown to the student
    pub fn message(&self) -> &'static str {
        match self {
            AttentionStatus::Off => "Webcam Off",
            AttentionStatus::Focused => "Focused, good job!",
            AttentionStatus::Distracted => "Stop talking and get back to studying!",
            AttentionStatus::LookingAway => "Focus on your studies",
        }
    }

    pub fn is_focused(&self) -> bool {
        matches!(self, AttentionStatus::Focused)
    }
}

impl Default for AttentionStatus {
    fn default() -> Self {
        Self::Off
    }
}

/// State owned by the tracker
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttentionState {
    pub status: AttentionStatus,
    /// None until the first face is seen
    pub last_face_seen_at: Option<Timestamp>,
    /// Debounced face-presence flag
    pub face_present: bool,
    /// Monotonic; one per Focused tick
    pub focused_seconds: u64,
    /// Monotonic; one per Distracted tick
    pub distracted_seconds: u64,
}

/// Side effects requested by one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub previous: AttentionStatus,
    pub status: AttentionStatus,
    /// Play the audible alert
    pub alert: bool,
    /// New focused total to report to the XP collaborator
    pub focused_total: Option<u64>,
}

impl TickReport {
    fn idle(status: AttentionStatus) -> Self {
        TickReport {
            previous: status,
            status,
            alert: false,
            focused_total: None,
        }
    }

    pub fn changed(&self) -> bool {
        self.previous != self.status
    }
}

/// Attention State Tracker
#[derive(Debug, Clone)]
pub struct AttentionTracker {
    state: AttentionState,
    config: AttentionConfig,
}

impl AttentionTracker {
    pub fn new() -> Self {
        Self::with_config(AttentionConfig::default())
    }

    pub fn with_config(config: AttentionConfig) -> Self {
        AttentionTracker {
            state: AttentionState::default(),
            config,
        }
    }

    /// Begin monitoring; no face has been seen in this run yet
    pub fn start(&mut self, now: Timestamp) {
        if self.state.status != AttentionStatus::Off {
            return;
        }
        self.state.face_present = false;
        self.state.status = AttentionStatus::LookingAway;
        debug!(?now, "attention monitoring started");
    }

    /// Return to Off; accumulators are kept
    pub fn reset(&mut self) {
        self.state.status = AttentionStatus::Off;
        self.state.face_present = false;
    }

    /// Record face presence from one classifier frame
    pub fn on_frame(&mut self, frame: &DetectionFrame) {
        if self.state.status == AttentionStatus::Off {
            trace!("frame ignored while off");
            return;
        }

        if frame.has_face() {
            self.state.face_present = true;
            // Late frames never move the sighting backwards
            let seen = match self.state.last_face_seen_at {
                Some(seen) => seen.max(frame.timestamp),
                None => frame.timestamp,
            };
            self.state.last_face_seen_at = Some(seen);
            return;
        }

        // A recent sighting suppresses the no-face path
        if let Some(seen) = self.state.last_face_seen_at {
            if frame.timestamp.millis_since(seen) > self.config.face_lost_after_ms {
                self.state.face_present = false;
            }
        }
    }

    /// Evaluate status; must be called on a fixed cadence
    pub fn on_tick(&mut self, now: Timestamp) -> TickReport {
        let previous = self.state.status;
        if previous == AttentionStatus::Off {
            return TickReport::idle(previous);
        }

        let elapsed = self
            .state
            .last_face_seen_at
            .map(|seen| now.millis_since(seen));
        let mut report = TickReport::idle(previous);

        match (self.state.face_present, elapsed) {
            (true, Some(elapsed)) if elapsed > self.config.distracted_after_ms => {
                self.state.status = AttentionStatus::Distracted;
                self.state.distracted_seconds += 1;
                report.alert = true;
            }
            (true, Some(elapsed)) if elapsed < self.config.distracted_after_ms => {
                self.state.status = AttentionStatus::Focused;
                self.state.focused_seconds += 1;
                report.focused_total = Some(self.state.focused_seconds);
            }
            (false, None) => {
                self.state.status = AttentionStatus::LookingAway;
            }
            (false, Some(elapsed)) if elapsed > self.config.looking_away_after_ms => {
                self.state.status = AttentionStatus::LookingAway;
            }
            // Boundaries fall through: hold the previous status
            _ => {}
        }

        report.status = self.state.status;
        if report.changed() {
            debug!(from = ?previous, to = ?report.status, ?elapsed, "attention status changed");
        }
        report
    }

    pub fn status(&self) -> AttentionStatus {
        self.state.status
    }

    pub fn state(&self) -> &AttentionState {
        &self.state
    }

    pub fn config(&self) -> &AttentionConfig {
        &self.config
    }

    pub fn face_present(&self) -> bool {
        self.state.face_present
    }

    pub fn focused_seconds(&self) -> u64 {
        self.state.focused_seconds
    }

    pub fn distracted_seconds(&self) -> u64 {
        self.state.distracted_seconds
    }

    /// Focus time as `"{m}m {s}s"`
    pub fn focus_time_display(&self) -> String {
        format_minutes_seconds(self.state.focused_seconds)
    }

    /// Distracted time as `"{m}m {s}s"`
    pub fn distracted_time_display(&self) -> String {
        format_minutes_seconds(self.state.distracted_seconds)
    }
}

impl Default for AttentionTracker {
    fn default() -> Self {
        Self::new()
    }
}
