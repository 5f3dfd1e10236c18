//! Session configuration
//!
//! Centralizes the knobs shared by the transport, playback and UI layers.

use crate::{Result, StreamviewError};
use std::time::Duration;
use url::Url;

/// Environment variable overriding the backend base URL
pub const SERVER_ENV_VAR: &str = "STREAMVIEW_SERVER";

/// Path of the streaming WebSocket endpoint
pub const STREAM_WS_PATH: &str = "/ws/stream";

/// Configuration for a streaming session
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Backend base URL, e.g. `http://127.0.0.1:8000`
    pub api_base: String,

    /// Sample rate of the PCM stream
    pub sample_rate: u32,

    /// Channel count of the PCM stream
    pub channels: u16,

    /// Fixed delay before a reconnect attempt after an unexpected close
    pub reconnect_delay: Duration,

    /// Timeout for the start-stream request (the backend synthesizes
    /// audio before responding, so this is generous)
    pub start_timeout: Duration,

    /// Animation frame interval for the viseme scheduler
    pub frame_interval: Duration,

    /// How long the error banner stays visible
    pub error_banner: Duration,

    /// Command/event channel capacity
    pub queue_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_base: "http://127.0.0.1:8000".to_string(),
            sample_rate: crate::audio::pcm::STREAM_SAMPLE_RATE,
            channels: crate::audio::pcm::STREAM_CHANNELS,
            reconnect_delay: Duration::from_millis(3000),
            start_timeout: Duration::from_secs(120),
            frame_interval: Duration::from_millis(16),
            error_banner: Duration::from_secs(5),
            queue_size: 100,
        }
    }
}

impl SessionConfig {
    /// Default configuration with the base URL taken from
    /// `STREAMVIEW_SERVER` when set
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(base) = std::env::var(SERVER_ENV_VAR) {
            if !base.trim().is_empty() {
                config.api_base = base.trim().trim_end_matches('/').to_string();
            }
        }
        config
    }

    /// Set the backend base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the reconnect backoff
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Set the animation frame interval
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Parse the backend base URL
    pub fn base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.api_base)
            .map_err(|e| StreamviewError::ConfigError(format!("invalid server URL: {}", e)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(StreamviewError::ConfigError(format!(
                "unsupported URL scheme: {}",
                other
            ))),
        }
    }

    /// Derive the WebSocket endpoint from the base URL.
    ///
    /// A secure base (`https`) yields a secure socket (`wss`).
    pub fn ws_url(&self) -> Result<String> {
        let base = self.base_url()?;
        let scheme = match base.scheme() {
            "https" => "wss",
            _ => "ws",
        };

        let mut ws = base;
        ws.set_scheme(scheme)
            .map_err(|_| StreamviewError::ConfigError("cannot derive WebSocket URL".into()))?;
        ws.set_path(STREAM_WS_PATH);
        ws.set_query(None);
        ws.set_fragment(None);
        Ok(ws.to_string())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.base_url()?;
        if self.sample_rate == 0 {
            return Err(StreamviewError::ConfigError(
                "sample rate must be non-zero".into(),
            ));
        }
        if self.channels == 0 {
            return Err(StreamviewError::ConfigError(
                "channel count must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_stream_contract() {
        let config = SessionConfig::default();
        assert_eq!(config.sample_rate, 24000);
        assert_eq!(config.channels, 1);
        assert_eq!(config.reconnect_delay, Duration::from_millis(3000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn ws_url_mirrors_http_scheme() {
        let config = SessionConfig::default().with_api_base("http://example.com:8000");
        assert_eq!(config.ws_url().unwrap(), "ws://example.com:8000/ws/stream");
    }

    #[test]
    fn secure_base_yields_secure_socket() {
        let config = SessionConfig::default().with_api_base("https://streamer.example.com");
        assert_eq!(
            config.ws_url().unwrap(),
            "wss://streamer.example.com/ws/stream"
        );
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = SessionConfig::default().with_api_base("http://localhost:8000/");
        assert_eq!(config.api_base, "http://localhost:8000");
    }

    #[test]
    fn malformed_base_url_fails_validation() {
        let config = SessionConfig::default().with_api_base("not a url");
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_http_scheme_is_rejected() {
        let config = SessionConfig::default().with_api_base("ftp://example.com");
        assert!(config.validate().is_err());
    }
}
