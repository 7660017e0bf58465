//! Deterministic monitor driver
//!
//! Plays frames into a monitor on a manual clock and pumps ticks the way a
//! host render loop would: before each frame, and at every tick interval
//! while no frames arrive.

use std::time::Duration;

use studylens_core::{DetectionFrame, StudyResult, Timestamp};
use studylens_runtime::{Inquiry, Monitor};
use studylens_time::{Clock, ManualClock};
use studylens_visual::TickReport;

pub struct MonitorHarness {
    monitor: Monitor,
    clock: ManualClock,
    reports: Vec<TickReport>,
}

impl MonitorHarness {
    pub fn new(monitor: Monitor) -> Self {
        MonitorHarness {
            monitor,
            clock: ManualClock::new(Timestamp::ZERO),
            reports: Vec::new(),
        }
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn start(&mut self) -> StudyResult<()> {
        self.monitor.start(self.clock.now())
    }

    /// Deliver frames in order, pumping ticks as time passes
    pub fn feed(&mut self, frames: &[DetectionFrame]) {
        for frame in frames {
            self.advance_to(frame.timestamp);
            self.monitor.on_frame(frame);
        }
    }

    /// Move the clock forward and give the monitor a chance to tick
    pub fn advance_to(&mut self, t: Timestamp) {
        self.clock.set(t);
        if let Some(report) = self.monitor.pump(self.clock.now()) {
            self.reports.push(report);
        }
    }

    /// No frames for `duration`; the host keeps polling every interval
    pub fn idle(&mut self, duration: Duration) {
        let end = self.clock.now() + duration;
        let step = self.monitor.config().tick_interval;
        while self.clock.now() < end {
            let next = (self.clock.now() + step).min(end);
            self.advance_to(next);
        }
    }

    /// The host is frozen for `duration`, then polls once
    pub fn stall(&mut self, duration: Duration) {
        let t = self.clock.advance(duration);
        self.advance_to(t);
    }

    /// Send a transcript and wait for its answer before moving on
    pub async fn ask(&mut self, text: &str) {
        if let Some(inquiry) = self.monitor.on_transcript_finalized(text) {
            self.answer(inquiry).await;
        }
    }

    /// Deliver an inquiry's answer at the current time
    pub async fn answer(&mut self, inquiry: Inquiry) {
        let outcome = inquiry.resolve().await;
        self.monitor.on_inquiry_resolved(outcome, self.clock.now());
    }

    pub fn reports(&self) -> &[TickReport] {
        &self.reports
    }

    pub fn last_report(&self) -> Option<&TickReport> {
        self.reports.last()
    }

    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    pub fn monitor_mut(&mut self) -> &mut Monitor {
        &mut self.monitor
    }

    pub fn into_monitor(self) -> Monitor {
        self.monitor
    }
}
