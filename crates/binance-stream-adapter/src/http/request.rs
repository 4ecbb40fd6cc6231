/*
[INPUT]:  Endpoint path, host family, security type and parameters
[OUTPUT]: ApiRequest values and the RequestExecutor seam that runs them
[POS]:    HTTP layer - transport-neutral request description
[UPDATE]: When adding host families or security types
*/

use async_trait::async_trait;
use reqwest::Method;

use super::error::Result;

/// Which REST host family serves the endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiHost {
    /// `api.binance.com` (spot and `/sapi` margin)
    Spot,
    /// `dapi.binance.com` (coin-margined futures)
    CoinFutures,
}

/// Endpoint security type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityType {
    None,
    /// Requires the `X-MBX-APIKEY` header
    ApiKey,
    /// API key header plus `timestamp` and `signature`
    Signed,
}

/// One REST call, described independently of how it is sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub host: ApiHost,
    pub endpoint: String,
    pub security: SecurityType,
    pub query: Vec<(String, String)>,
    pub form: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: Method, host: ApiHost, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            host,
            endpoint: endpoint.into(),
            security: SecurityType::None,
            query: Vec::new(),
            form: Vec::new(),
        }
    }

    pub fn get(host: ApiHost, endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, host, endpoint)
    }

    pub fn post(host: ApiHost, endpoint: impl Into<String>) -> Self {
        Self::new(Method::POST, host, endpoint)
    }

    pub fn put(host: ApiHost, endpoint: impl Into<String>) -> Self {
        Self::new(Method::PUT, host, endpoint)
    }

    pub fn delete(host: ApiHost, endpoint: impl Into<String>) -> Self {
        Self::new(Method::DELETE, host, endpoint)
    }

    pub fn security(mut self, security: SecurityType) -> Self {
        self.security = security;
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Adds the parameter only when `value` is `Some` and not blank
    pub fn query_opt(self, key: impl Into<String>, value: Option<&str>) -> Self {
        match value.map(str::trim).filter(|value| !value.is_empty()) {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    pub fn form(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.form.push((key.into(), value.to_string()));
        self
    }

    pub fn needs_api_key(&self) -> bool {
        self.security != SecurityType::None
    }
}

/// Runs [`ApiRequest`]s and returns the raw response body.
///
/// Non-success statuses surface as errors; the body is only returned on 2xx.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<Vec<u8>>;
}
