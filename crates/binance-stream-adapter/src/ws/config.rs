/*
[INPUT]:  Target environment and connection tuning knobs
[OUTPUT]: Immutable stream configuration shared by every session
[POS]:    WebSocket layer - stream hosts, handshake and keepalive settings
[UPDATE]: When adding stream hosts or session tuning options
*/

use std::time::Duration;

use super::error::StreamError;
use crate::types::Environment;

const FUTURES_WS_URL: &str = "wss://fstream.binance.com/ws";
const FUTURES_COMBINED_URL: &str = "wss://fstream.binance.com/stream?streams=";
const MARGIN_WS_URL: &str = "wss://margin-stream.binance.com/ws";

const FUTURES_TESTNET_WS_URL: &str = "wss://stream.binancefuture.com/ws";
const FUTURES_TESTNET_COMBINED_URL: &str = "wss://stream.binancefuture.com/stream?streams=";

const DEFAULT_DECODE_LOG_LIMIT: usize = 3;

/// Base hosts the endpoint builder prefixes onto stream names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEndpoints {
    /// Raw stream base, single and all-symbol feeds (`.../ws`)
    pub ws_base: String,
    /// Combined stream base (`.../stream?streams=`)
    pub combined_base: String,
    /// Margin user data base, suffixed by the listen key.
    /// `None` where the environment has no margin user data stream (testnet).
    pub margin_ws_base: Option<String>,
}

impl StreamEndpoints {
    pub fn mainnet() -> Self {
        Self {
            ws_base: FUTURES_WS_URL.to_string(),
            combined_base: FUTURES_COMBINED_URL.to_string(),
            margin_ws_base: Some(MARGIN_WS_URL.to_string()),
        }
    }

    pub fn testnet() -> Self {
        Self {
            ws_base: FUTURES_TESTNET_WS_URL.to_string(),
            combined_base: FUTURES_TESTNET_COMBINED_URL.to_string(),
            margin_ws_base: None,
        }
    }

    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Mainnet => Self::mainnet(),
            Environment::Testnet => Self::testnet(),
        }
    }

    /// Point every feed at one host, e.g. a local test server.
    ///
    /// `base` must not end with a slash.
    pub fn with_host(base: &str) -> Self {
        Self {
            ws_base: format!("{base}/ws"),
            combined_base: format!("{base}/stream?streams="),
            margin_ws_base: Some(format!("{base}/ws")),
        }
    }
}

impl Default for StreamEndpoints {
    fn default() -> Self {
        Self::mainnet()
    }
}

/// Ping cadence and silence tolerance for an open session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepaliveConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for KeepaliveConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            timeout: Duration::from_secs(180),
        }
    }
}

/// Stream subsystem configuration
#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub endpoints: StreamEndpoints,
    /// Upper bound on the transport dial
    pub handshake_timeout: Duration,
    /// Disabled when `None`
    pub keepalive: Option<KeepaliveConfig>,
    /// Decode failures logged with payload preview per session
    pub decode_log_limit: usize,
}

impl StreamConfig {
    /// Reject settings a session could not run with
    pub fn validate(&self) -> Result<(), StreamError> {
        if self.handshake_timeout.is_zero() {
            return Err(StreamError::config("handshake timeout must be non-zero"));
        }
        if let Some(keepalive) = &self.keepalive {
            if keepalive.interval.is_zero() {
                return Err(StreamError::config("keepalive interval must be non-zero"));
            }
            if keepalive.timeout < keepalive.interval {
                return Err(StreamError::config(format!(
                    "keepalive timeout {:?} is shorter than interval {:?}",
                    keepalive.timeout, keepalive.interval
                )));
            }
        }
        Ok(())
    }

    pub fn for_environment(environment: Environment) -> Self {
        Self {
            endpoints: StreamEndpoints::for_environment(environment),
            ..Self::default()
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            endpoints: StreamEndpoints::mainnet(),
            handshake_timeout: Duration::from_secs(10),
            keepalive: None,
            decode_log_limit: DEFAULT_DECODE_LOG_LIMIT,
        }
    }
}
