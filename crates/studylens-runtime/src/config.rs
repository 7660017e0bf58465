//! Monitor configuration
//!
//! Loaded from JSON; every field is optional and defaults to the tuned
//! constants. Durations are written as humantime strings ("1s", "250ms").

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use studylens_core::{StudyError, StudyResult};
use studylens_time::DEFAULT_TICK_INTERVAL;
use studylens_visual::{AttentionConfig, CameraRequest, HandRaiseThresholds};
use studylens_voice::RecognitionSettings;

use crate::LogConfig;

/// Monitor configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Status evaluation cadence
    #[serde(with = "duration_str")]
    pub tick_interval: Duration,
    pub attention: AttentionConfig,
    pub hand_raise: HandRaiseThresholds,
    pub camera: CameraRequest,
    pub recognition: RecognitionSettings,
    /// Recommendations requested per transcript
    pub video_results: usize,
    /// Longest wait for an assistant reply or a video search
    #[serde(with = "duration_str")]
    pub collaborator_timeout: Duration,
    /// Capacity of the event queue in front of the monitor
    pub event_queue: usize,
    pub log: LogConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            tick_interval: DEFAULT_TICK_INTERVAL,
            attention: AttentionConfig::default(),
            hand_raise: HandRaiseThresholds::default(),
            camera: CameraRequest::default(),
            recognition: RecognitionSettings::default(),
            video_results: 3,
            collaborator_timeout: Duration::from_secs(30),
            event_queue: 256,
            log: LogConfig::default(),
        }
    }
}

impl MonitorConfig {
    pub fn from_json_str(json: &str) -> StudyResult<Self> {
        let config: MonitorConfig =
            serde_json::from_str(json).map_err(|e| StudyError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> StudyResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| StudyError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> StudyResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| StudyError::Config(e.to_string()))
    }

    pub fn validate(&self) -> StudyResult<()> {
        if self.tick_interval.is_zero() {
            return Err(StudyError::Config("tick_interval must be positive".into()));
        }
        let a = &self.attention;
        if a.distracted_after_ms <= 0 || a.looking_away_after_ms <= 0 || a.face_lost_after_ms < 0 {
            return Err(StudyError::Config("attention thresholds must be positive".into()));
        }
        if self.collaborator_timeout.is_zero() {
            return Err(StudyError::Config("collaborator_timeout must be positive".into()));
        }
        if self.event_queue == 0 {
            return Err(StudyError::Config("event_queue must be at least 1".into()));
        }
        Ok(())
    }
}

mod duration_str {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let text = String::deserialize(deserializer)?;
        humantime::parse_duration(&text).map_err(serde::de::Error::custom)
    }
}
