/*
[INPUT]:  Endpoint URL to dial
[OUTPUT]: Duplex connection yielding frame payloads, liveness notices or a terminal error
[POS]:    WebSocket layer - transport seam under the subscription session
[UPDATE]: When changing socket handling (ping/pong, close, TLS)
*/

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;

use super::error::StreamError;

/// One item read from a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Application payload (text or binary)
    Frame(Vec<u8>),
    /// Ping or pong; proves the peer is alive but carries no event
    Heartbeat,
}

/// An open duplex connection owned by exactly one session.
#[async_trait]
pub trait Connection: Send {
    /// Next inbound item. `None` once the peer has closed the connection.
    async fn recv(&mut self) -> Option<Result<Inbound, StreamError>>;

    async fn ping(&mut self) -> Result<(), StreamError>;

    /// Best-effort orderly close
    async fn close(&mut self);
}

/// Dials connections to endpoint URLs.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn Connection>, StreamError>;
}

/// Default transport over `tokio-tungstenite`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteTransport;

#[async_trait]
impl Transport for TungsteniteTransport {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn Connection>, StreamError> {
        let (stream, response) = connect_async(endpoint)
            .await
            .map_err(|err| StreamError::connect(endpoint, err))?;
        debug!(endpoint, status = %response.status(), "websocket handshake complete");
        Ok(Box::new(TungsteniteConnection { stream }))
    }
}

struct TungsteniteConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Connection for TungsteniteConnection {
    async fn recv(&mut self) -> Option<Result<Inbound, StreamError>> {
        loop {
            match self.stream.next().await? {
                Ok(WsMessage::Text(text)) => {
                    return Some(Ok(Inbound::Frame(text.as_str().as_bytes().to_vec())));
                }
                Ok(WsMessage::Binary(bytes)) => return Some(Ok(Inbound::Frame(bytes.to_vec()))),
                // tungstenite queues the pong reply itself
                Ok(WsMessage::Ping(_)) | Ok(WsMessage::Pong(_)) => {
                    return Some(Ok(Inbound::Heartbeat));
                }
                Ok(WsMessage::Close(frame)) => {
                    debug!(?frame, "websocket close frame received");
                    return None;
                }
                Ok(WsMessage::Frame(_)) => continue,
                Err(err) => return Some(Err(err.into())),
            }
        }
    }

    async fn ping(&mut self) -> Result<(), StreamError> {
        self.stream
            .send(WsMessage::Ping(Default::default()))
            .await
            .map_err(StreamError::from)
    }

    async fn close(&mut self) {
        if let Err(err) = self.stream.close(None).await {
            debug!(error = %err, "websocket close failed");
        }
    }
}
