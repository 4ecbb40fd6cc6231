/*
[INPUT]:  Stream configuration, symbols, listen keys and caller handlers
[OUTPUT]: Live subscriptions delivering book ticker, mark price and margin events
[POS]:    WebSocket layer - real-time data streams
[UPDATE]: When adding new stream kinds or changing session lifecycle
*/

pub mod codec;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod message;
pub mod service;
pub mod session;
pub mod transport;

pub use codec::{FrameDecoder, Framing, JsonDecoder, RawDecoder};
pub use config::{KeepaliveConfig, StreamConfig, StreamEndpoints};
pub use endpoint::{EndpointBuilder, StreamKind, SymbolSet, UpdateRate, stream_name};
pub use error::{StreamError, StreamErrorKind};
pub use message::{BookTickerEvent, MarginDataEvent, MarkPriceEvent, StreamEnvelope};
pub use service::StreamService;
pub use session::{DoneSignal, SessionState, StopSignal, SubscriptionHandle};
pub use transport::{Connection, Inbound, Transport, TungsteniteTransport};
