use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Engine tuning. Durations are whole milliseconds so the struct reads naturally as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncConfig {
    pub debounce_ms: u64,
    pub parse_timeout_ms: u64,
    /// Consecutive parse attempts allowed before one request is turned away.
    pub max_parse_attempts: u32,
    pub min_parse_interval_ms: u64,
    /// Counted sync failures before the engine pauses itself.
    pub max_errors: u32,
    /// Line cap applied when repairing source before a parse.
    pub max_lines: usize,
    pub metrics_window: usize,
    pub metrics_interval_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            parse_timeout_ms: 5000,
            max_parse_attempts: 3,
            min_parse_interval_ms: 100,
            max_errors: 5,
            max_lines: umlsync_core::DEFAULT_MAX_LINES,
            metrics_window: 100,
            metrics_interval_ms: 30_000,
        }
    }
}

impl SyncConfig {
    /// Reads a (possibly partial) JSON object; missing keys keep their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn parse_timeout(&self) -> Duration {
        Duration::from_millis(self.parse_timeout_ms)
    }

    pub fn min_parse_interval(&self) -> Duration {
        Duration::from_millis(self.min_parse_interval_ms)
    }

    pub fn metrics_interval(&self) -> Duration {
        Duration::from_millis(self.metrics_interval_ms)
    }
}
