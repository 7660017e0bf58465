//! XP ledger - focus time turned into experience and levels
//!
//! One XP per ten focused seconds, fifty XP per level. XP is only
//! re-evaluated when the focused total lands on a multiple of ten.

use serde::Serialize;
use tracing::info;

use studylens_core::StudyResult;

use crate::ProgressSink;

/// Focused seconds per XP point
pub const SECONDS_PER_XP: u64 = 10;

/// XP per level
pub const XP_PER_LEVEL: u64 = 50;

/// A newly earned XP total
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct XpAward {
    pub xp: u64,
    pub level: u64,
    pub leveled_up: bool,
}

impl XpAward {
    /// Notification text shown to the student
    pub fn notification(&self) -> String {
        format!("+1 XP! ({} total)", self.xp)
    }
}

#[derive(Debug, Clone, Default)]
pub struct XpLedger {
    xp: u64,
    awards: Vec<XpAward>,
}

impl XpLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a focused-seconds total; returns the award if XP grew
    pub fn record(&mut self, focused_seconds: u64) -> Option<XpAward> {
        if focused_seconds == 0 || focused_seconds % SECONDS_PER_XP != 0 {
            return None;
        }

        let earned = focused_seconds / SECONDS_PER_XP;
        if earned <= self.xp {
            return None;
        }

        let previous_level = self.level();
        self.xp = earned;
        let award = XpAward {
            xp: earned,
            level: self.level(),
            leveled_up: self.level() > previous_level,
        };
        info!(xp = award.xp, level = award.level, "{}", award.notification());
        self.awards.push(award.clone());
        Some(award)
    }

    pub fn xp(&self) -> u64 {
        self.xp
    }

    pub fn level(&self) -> u64 {
        self.xp / XP_PER_LEVEL + 1
    }

    /// XP earned inside the current level
    pub fn level_xp(&self) -> u64 {
        self.xp % XP_PER_LEVEL
    }

    pub fn xp_to_next_level(&self) -> u64 {
        XP_PER_LEVEL - self.level_xp()
    }

    /// Progress through the current level, 0.0 - 100.0
    pub fn progress_percent(&self) -> f32 {
        self.level_xp() as f32 / XP_PER_LEVEL as f32 * 100.0
    }

    /// Every award so far, oldest first
    pub fn awards(&self) -> &[XpAward] {
        &self.awards
    }
}

impl ProgressSink for XpLedger {
    fn report_focused_seconds(&mut self, total_seconds: u64) -> StudyResult<()> {
        self.record(total_seconds);
        Ok(())
    }
}
