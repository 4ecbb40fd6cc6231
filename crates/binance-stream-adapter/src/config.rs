/*
[INPUT]:  YAML configuration file
[OUTPUT]: ClientConfig, StreamConfig and credentials for one environment
[POS]:    Configuration layer - file-based setup for REST and streams
[UPDATE]: When adding new configuration options
*/

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::http::{BinanceError, ClientConfig, Credentials, Result};
use crate::types::Environment;
use crate::ws::{KeepaliveConfig, StreamConfig};

/// Top-level adapter configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AdapterConfig {
    /// `mainnet` or `testnet`; selects REST and stream hosts
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub stream: StreamSettings,
    /// Only required for listen-key and signed margin endpoints
    #[serde(default)]
    pub credentials: Option<CredentialSettings>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HttpSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default)]
    pub recv_window_ms: Option<u64>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            recv_window_ms: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StreamSettings {
    #[serde(default = "default_handshake_timeout_secs")]
    pub handshake_timeout_secs: u64,
    /// Connection keepalive; omitted means disabled
    #[serde(default)]
    pub keepalive: Option<KeepaliveSettings>,
    #[serde(default = "default_decode_log_limit")]
    pub decode_log_limit: usize,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            handshake_timeout_secs: default_handshake_timeout_secs(),
            keepalive: None,
            decode_log_limit: default_decode_log_limit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct KeepaliveSettings {
    pub interval_secs: u64,
    pub timeout_secs: u64,
}

#[derive(Clone, PartialEq, Deserialize, Serialize)]
pub struct CredentialSettings {
    pub api_key: String,
    pub api_secret: String,
}

impl std::fmt::Debug for CredentialSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSettings")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_handshake_timeout_secs() -> u64 {
    10
}

fn default_decode_log_limit() -> usize {
    3
}

impl AdapterConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|err| {
            BinanceError::Config(format!("failed to read {}: {err}", path.display()))
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|err| BinanceError::Config(format!("invalid config: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.http.timeout_secs == 0 || self.stream.handshake_timeout_secs == 0 {
            return Err(BinanceError::Config(
                "timeouts must be greater than zero".to_string(),
            ));
        }
        if let Some(keepalive) = &self.stream.keepalive {
            if keepalive.interval_secs == 0 || keepalive.timeout_secs < keepalive.interval_secs {
                return Err(BinanceError::Config(
                    "keepalive timeout must be at least one non-zero interval".to_string(),
                ));
            }
        }
        if let Some(credentials) = &self.credentials {
            if credentials.api_key.trim().is_empty() || credentials.api_secret.trim().is_empty() {
                return Err(BinanceError::Config(
                    "api_key and api_secret must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.http.timeout_secs),
            connect_timeout: Duration::from_secs(self.http.connect_timeout_secs),
            recv_window: self.http.recv_window_ms.map(Duration::from_millis),
        }
    }

    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig {
            handshake_timeout: Duration::from_secs(self.stream.handshake_timeout_secs),
            keepalive: self.stream.keepalive.as_ref().map(|keepalive| KeepaliveConfig {
                interval: Duration::from_secs(keepalive.interval_secs),
                timeout: Duration::from_secs(keepalive.timeout_secs),
            }),
            decode_log_limit: self.stream.decode_log_limit,
            ..StreamConfig::for_environment(self.environment)
        }
    }

    pub fn credentials(&self) -> Option<Credentials> {
        self.credentials
            .as_ref()
            .map(|settings| Credentials::new(&settings.api_key, &settings.api_secret))
    }
}
