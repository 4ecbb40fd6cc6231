/*
[INPUT]:  HTTP client configuration and API endpoints
[OUTPUT]: HTTP responses and typed API results
[POS]:    HTTP layer - REST API communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod client;
pub mod delivery;
pub mod error;
pub mod margin;
pub mod request;
pub mod signature;

pub use error::{BinanceError, Result};
pub use signature::RequestSigner;

pub use client::{BinanceClient, ClientConfig, Credentials};
pub use margin::{DEFAULT_LISTEN_KEY_KEEPALIVE, keepalive_request, spawn_listen_key_keepalive};
pub use request::{ApiHost, ApiRequest, RequestExecutor, SecurityType};
