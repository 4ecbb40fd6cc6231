/*
[INPUT]:  HTTP configuration (base URLs, timeouts, recvWindow, credentials)
[OUTPUT]: Configured reqwest client executing ApiRequests
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing signing/error mapping
*/

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::http::request::{ApiHost, ApiRequest, RequestExecutor, SecurityType};
use crate::http::{BinanceError, RequestSigner, Result};
use crate::types::{ApiErrorResponse, Environment};

const SPOT_BASE_URL: &str = "https://api.binance.com";
const SPOT_TESTNET_BASE_URL: &str = "https://testnet.binance.vision";
const COIN_FUTURES_BASE_URL: &str = "https://dapi.binance.com";
const COIN_FUTURES_TESTNET_BASE_URL: &str = "https://testnet.binancefuture.com";

const API_KEY_HEADER: &str = "X-MBX-APIKEY";
const ERROR_BODY_LOG_LIMIT: usize = 512;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Sent as `recvWindow` on signed requests; exchange default applies when `None`
    pub recv_window: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            recv_window: None,
        }
    }
}

/// API key pair for authenticated requests
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Main HTTP client for the REST API
#[derive(Debug)]
pub struct BinanceClient {
    http_client: Client,
    spot_base_url: Url,
    coin_futures_base_url: Url,
    recv_window: Option<Duration>,
    credentials: Option<Credentials>,
    signer: Option<RequestSigner>,
}

impl BinanceClient {
    /// Create a new mainnet client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new mainnet client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Self::for_environment(config, Environment::Mainnet)
    }

    pub fn for_environment(config: ClientConfig, environment: Environment) -> Result<Self> {
        let (spot, coin_futures) = match environment {
            Environment::Mainnet => (SPOT_BASE_URL, COIN_FUTURES_BASE_URL),
            Environment::Testnet => (SPOT_TESTNET_BASE_URL, COIN_FUTURES_TESTNET_BASE_URL),
        };
        Self::with_config_and_base_urls(config, spot, coin_futures)
    }

    /// Create a client against explicit hosts (mock servers, proxies)
    pub fn with_config_and_base_urls(
        config: ClientConfig,
        spot_base_url: &str,
        coin_futures_base_url: &str,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            http_client,
            spot_base_url: Url::parse(spot_base_url)?,
            coin_futures_base_url: Url::parse(coin_futures_base_url)?,
            recv_window: config.recv_window,
            credentials: None,
            signer: None,
        })
    }

    /// Set credentials for authenticated requests
    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.signer = Some(RequestSigner::new(&credentials.api_secret));
        self.credentials = Some(credentials);
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.set_credentials(credentials);
        self
    }

    /// Get credentials if set
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    fn base_url(&self, host: ApiHost) -> &Url {
        match host {
            ApiHost::Spot => &self.spot_base_url,
            ApiHost::CoinFutures => &self.coin_futures_base_url,
        }
    }

    /// Execute `request` and decode the JSON body into `T`
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let body = self.execute(request).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Encoded query string, with `timestamp`, `recvWindow` and `signature` for signed calls
    fn encode_query(&self, request: &ApiRequest, body: &str) -> Result<String> {
        let mut query = encode_pairs(&request.query);
        if request.security != SecurityType::Signed {
            return Ok(query);
        }

        let signer = self
            .signer
            .as_ref()
            .ok_or_else(|| BinanceError::MissingCredentials {
                endpoint: request.endpoint.clone(),
            })?;

        let mut serializer = url::form_urlencoded::Serializer::new(query);
        serializer.append_pair("timestamp", &Utc::now().timestamp_millis().to_string());
        if let Some(recv_window) = self.recv_window {
            serializer.append_pair("recvWindow", &recv_window.as_millis().to_string());
        }
        query = serializer.finish();

        let signature = signer.sign(&format!("{query}{body}"));
        query.push_str("&signature=");
        query.push_str(&signature);
        Ok(query)
    }
}

#[async_trait]
impl RequestExecutor for BinanceClient {
    async fn execute(&self, request: ApiRequest) -> Result<Vec<u8>> {
        let mut url = self.base_url(request.host).join(&request.endpoint)?;
        let body = encode_pairs(&request.form);
        let query = self.encode_query(&request, &body)?;
        if !query.is_empty() {
            url.set_query(Some(&query));
        }

        let mut builder = self.http_client.request(request.method.clone(), url);
        if request.needs_api_key() {
            let credentials =
                self.credentials
                    .as_ref()
                    .ok_or_else(|| BinanceError::MissingCredentials {
                        endpoint: request.endpoint.clone(),
                    })?;
            builder = builder.header(API_KEY_HEADER, &credentials.api_key);
        }
        if !body.is_empty() {
            builder = builder
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(body);
        }

        debug!(method = %request.method, endpoint = %request.endpoint, "sending request");
        let response = builder.send().await?;
        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok());
        let bytes = response.bytes().await?;

        if status.is_success() {
            return Ok(bytes.to_vec());
        }
        let err = error_from_response(status, retry_after, &bytes);
        warn!(
            method = %request.method,
            endpoint = %request.endpoint,
            status = status.as_u16(),
            error = %err,
            "request failed"
        );
        Err(err)
    }
}

fn encode_pairs(pairs: &[(String, String)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

fn error_from_response(status: StatusCode, retry_after: Option<u64>, body: &[u8]) -> BinanceError {
    if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::IM_A_TEAPOT {
        return BinanceError::RateLimit {
            status: status.as_u16(),
            retry_after: retry_after.unwrap_or(1),
        };
    }
    match serde_json::from_slice::<ApiErrorResponse>(body) {
        Ok(api) => BinanceError::Api {
            code: api.code,
            message: api.msg,
        },
        Err(_) => {
            let text = String::from_utf8_lossy(body);
            BinanceError::api_error(
                status,
                crate::ws::error::truncate_for_log(&text, ERROR_BODY_LOG_LIMIT),
            )
        }
    }
}
