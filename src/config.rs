//! Shell configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::codec::DEFAULT_MAX_FRAME_BYTES;

/// What to do when the core emits an effect tag this shell does not know.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnknownEffectPolicy {
    /// Skip the effect with a warning. Supports additive protocol evolution
    /// without breaking older shells.
    #[default]
    Ignore,
    /// Report a fatal error and abort the batch.
    Fatal,
}

/// Configuration for the shell bridge.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ShellConfig {
    /// Policy for unknown effect variants (default: ignore).
    #[serde(default)]
    pub unknown_effects: UnknownEffectPolicy,
    /// Upper bound on any single decoded frame (default: 1 MiB).
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            unknown_effects: UnknownEffectPolicy::default(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

fn default_max_frame_bytes() -> usize {
    DEFAULT_MAX_FRAME_BYTES
}

/// Timeouts for the reqwest-backed transport adapters.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HttpTransportConfig {
    /// Connection timeout in seconds (default: 5).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Total request timeout in seconds (default: 30).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_seconds: default_connect_timeout(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl HttpTransportConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_request_timeout() -> u64 {
    30
}
