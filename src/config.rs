//! Client configuration
//!
//! Defaults target the public live-timing service. A YAML file can override
//! any field, and the endpoint environment variables override the file.
//!
//! ```yaml
//! http_endpoint: https://live-timing-api.sportall.tv/graphql
//! ws_endpoint: wss://live-timing-api.sportall.tv/graphql
//! request_timeout_ms: 10000
//! reconnect:
//!   max_attempts: 5
//!   initial_delay_ms: 500
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Result, TimingError};

pub const DEFAULT_HTTP_ENDPOINT: &str = "https://live-timing-api.sportall.tv/graphql";
pub const DEFAULT_WS_ENDPOINT: &str = "wss://live-timing-api.sportall.tv/graphql";

/// Overrides [`ClientConfig::http_endpoint`].
pub const HTTP_ENDPOINT_ENV: &str = "PITBOARD_HTTP_ENDPOINT";
/// Overrides [`ClientConfig::ws_endpoint`].
pub const WS_ENDPOINT_ENV: &str = "PITBOARD_WS_ENDPOINT";

/// Connection settings for the timing service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// GraphQL endpoint for queries
    pub http_endpoint: String,
    /// GraphQL-over-WebSocket endpoint for subscriptions
    pub ws_endpoint: String,
    pub request_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    /// How long to wait for `connection_ack` after `connection_init`
    pub ack_timeout_ms: u64,
    pub user_agent: String,
    pub reconnect: ReconnectPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            http_endpoint: DEFAULT_HTTP_ENDPOINT.to_string(),
            ws_endpoint: DEFAULT_WS_ENDPOINT.to_string(),
            request_timeout_ms: 10_000,
            connect_timeout_ms: 5_000,
            ack_timeout_ms: 5_000,
            user_agent: concat!("pitboard/", env!("CARGO_PKG_VERSION")).to_string(),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a YAML file, then apply environment overrides.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| TimingError::config(path, e.to_string()))?;
        let config = Self::from_yaml(&text).map_err(|e| match e {
            TimingError::Parse { details, .. } => TimingError::config(path, details),
            other => other,
        })?;
        debug!(path = %path.display(), "Loaded client config");
        config.with_env_overrides()
    }

    /// Parse configuration from YAML text. Missing fields keep their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml_ng::from_str(yaml)
            .map_err(|e| TimingError::parse("client config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `PITBOARD_HTTP_ENDPOINT` / `PITBOARD_WS_ENDPOINT` when set and
    /// check the resulting endpoints.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(
            std::env::var(HTTP_ENDPOINT_ENV).ok(),
            std::env::var(WS_ENDPOINT_ENV).ok(),
        )
    }

    fn with_overrides(mut self, http: Option<String>, ws: Option<String>) -> Result<Self> {
        if let Some(http) = http.filter(|v| !v.trim().is_empty()) {
            self.http_endpoint = http;
        }
        if let Some(ws) = ws.filter(|v| !v.trim().is_empty()) {
            self.ws_endpoint = ws;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if !self.http_endpoint.starts_with("http://") && !self.http_endpoint.starts_with("https://")
        {
            return Err(TimingError::parse(
                "client config",
                format!("http_endpoint must be an http(s) URL, got '{}'", self.http_endpoint),
            ));
        }
        if !self.ws_endpoint.starts_with("ws://") && !self.ws_endpoint.starts_with("wss://") {
            return Err(TimingError::parse(
                "client config",
                format!("ws_endpoint must be a ws(s) URL, got '{}'", self.ws_endpoint),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn ack_timeout(&self) -> Duration {
        Duration::from_millis(self.ack_timeout_ms)
    }
}

/// Reconnect behaviour for live feeds.
///
/// Delays grow geometrically from `initial_delay_ms` by `multiplier`, capped
/// at `max_delay_ms`. `max_attempts` counts consecutive failures; zero
/// disables reconnecting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self { max_attempts: 10, initial_delay_ms: 500, max_delay_ms: 30_000, multiplier: 2.0 }
    }
}

impl ReconnectPolicy {
    /// A policy that never reconnects.
    pub fn disabled() -> Self {
        Self { max_attempts: 0, ..Self::default() }
    }

    /// Delay before reconnect attempt `attempt` (1-based), or `None` once
    /// attempts are exhausted.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_attempts {
            return None;
        }
        let factor = self.multiplier.max(1.0).powi(attempt.saturating_sub(1).min(64) as i32);
        let millis = (self.initial_delay_ms as f64 * factor).min(self.max_delay_ms as f64);
        Some(Duration::from_millis(millis as u64))
    }
}
