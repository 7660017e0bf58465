//! Tracing subscriber setup for hosts and demos

use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Log output settings; `RUST_LOG` takes precedence over `level`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    /// One JSON object per line instead of human-readable text
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl LogConfig {
    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let level = &self.level;
            format!(
                "focus_demo={level},studylens_runtime={level},studylens_visual={level},studylens_voice={level}"
            )
            .into()
        })
    }
}

/// Install the global subscriber.
/// Returns false if one was already installed (e.g. by the host or another test).
pub fn init_tracing(config: &LogConfig) -> bool {
    let fmt_layer = if config.json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().with_target(false).boxed()
    };

    tracing_subscriber::registry()
        .with(config.filter())
        .with(fmt_layer)
        .try_init()
        .is_ok()
}
