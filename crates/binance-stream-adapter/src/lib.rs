/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public Binance stream adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod config;
pub mod http;
pub mod types;
pub mod ws;

pub use config::AdapterConfig;

// Re-export commonly used types from http
pub use http::{
    ApiHost,
    ApiRequest,
    BinanceClient,
    BinanceError,
    ClientConfig,
    Credentials,
    RequestExecutor,
    RequestSigner,
    Result,
    SecurityType,
    spawn_listen_key_keepalive,
};

// Re-export all types
pub use types::*;

// Re-export commonly used types from ws
pub use ws::{
    BookTickerEvent,
    MarginDataEvent,
    MarkPriceEvent,
    SessionState,
    StreamConfig,
    StreamEndpoints,
    StreamError,
    StreamKind,
    StreamService,
    SubscriptionHandle,
    SymbolSet,
    UpdateRate,
};
