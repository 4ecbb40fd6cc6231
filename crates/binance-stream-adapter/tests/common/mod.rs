/*
[INPUT]:  Test configuration, mock server and socket requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for binance-stream-adapter tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use binance_stream_adapter::ws::{Connection, Inbound, Transport};
use binance_stream_adapter::{BinanceClient, ClientConfig, Credentials, StreamError};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use wiremock::MockServer;

pub const TEST_API_KEY: &str = "vmPUZE6mv9SD5VNHk4HlWFsOr6aKE2zvsw0MuIgwCIPy6utIco14y7Ju91duEh8A";
pub const TEST_API_SECRET: &str = "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Client pointed at the mock server for both host families, with test credentials
pub fn mock_client(server: &MockServer) -> BinanceClient {
    BinanceClient::with_config_and_base_urls(ClientConfig::default(), &server.uri(), &server.uri())
        .expect("client init")
        .with_credentials(Credentials::new(TEST_API_KEY, TEST_API_SECRET))
}

pub fn book_ticker_json(symbol: &str, update_id: u64) -> String {
    format!(
        r#"{{"e":"bookTicker","u":{update_id},"E":1568014460893,"T":1568014460891,"s":"{symbol}","b":"25.35190000","B":"31.21000000","a":"25.36520000","A":"40.66000000"}}"#
    )
}

pub fn mark_price_json(symbol: &str) -> String {
    format!(
        r#"{{"e":"markPriceUpdate","E":1562305380000,"s":"{symbol}","p":"11794.15000000","i":"11784.62659091","P":"11784.25641265","r":"0.00038167","T":1562306400000}}"#
    )
}

pub fn margin_liability_json() -> String {
    r#"{"e":"USER_LIABILITY_CHANGE","E":1701949716000,"a":"BTC","t":"BORROW","p":"0.05","i":"0.0000125"}"#
        .to_string()
}

/// Wrap `data` in the combined-stream envelope
pub fn envelope(stream: &str, data: &str) -> String {
    format!(r#"{{"stream":"{stream}","data":{data}}}"#)
}

/// In-memory transport: items pushed into the returned sender reach the session.
///
/// Pushing an `Err` simulates a read failure; dropping the sender closes the
/// connection from the remote side.
pub struct ChannelTransport {
    inbox: Mutex<Option<mpsc::UnboundedReceiver<Result<Inbound, StreamError>>>>,
    dialed: Mutex<Vec<String>>,
}

impl ChannelTransport {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedSender<Result<Inbound, StreamError>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let transport = Arc::new(Self {
            inbox: Mutex::new(Some(rx)),
            dialed: Mutex::new(Vec::new()),
        });
        (transport, tx)
    }

    pub fn dialed(&self) -> Vec<String> {
        self.dialed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn Connection>, StreamError> {
        self.dialed.lock().unwrap().push(endpoint.to_string());
        let inbox = self.inbox.lock().unwrap().take();
        match inbox {
            Some(inbox) => Ok(Box::new(ChannelConnection { inbox })),
            None => Err(StreamError::Connect {
                endpoint: endpoint.to_string(),
                message: "channel transport already used".to_string(),
            }),
        }
    }
}

struct ChannelConnection {
    inbox: mpsc::UnboundedReceiver<Result<Inbound, StreamError>>,
}

#[async_trait]
impl Connection for ChannelConnection {
    async fn recv(&mut self) -> Option<Result<Inbound, StreamError>> {
        self.inbox.recv().await
    }

    async fn ping(&mut self) -> Result<(), StreamError> {
        Ok(())
    }

    async fn close(&mut self) {
        self.inbox.close();
    }
}

pub fn frame(text: &str) -> Result<Inbound, StreamError> {
    Ok(Inbound::Frame(text.as_bytes().to_vec()))
}

/// Local WebSocket server accepting a single client
pub struct WsServer {
    /// `ws://127.0.0.1:<port>`, suitable for `StreamEndpoints::with_host`
    pub host: String,
    /// Request URI of the accepted handshake
    pub requested: mpsc::UnboundedReceiver<String>,
    pub task: JoinHandle<()>,
}

/// Start a server that sends `frames` to its first client.
///
/// With `close_after` the server closes once the frames are out; otherwise it
/// stays open until the client disconnects.
pub async fn spawn_ws_server(frames: Vec<String>, close_after: bool) -> WsServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let (uri_tx, uri_rx) = mpsc::unbounded_channel();

    let task = tokio::spawn(async move {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };
        let callback = move |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
            let _ = uri_tx.send(request.uri().to_string());
            Ok(response)
        };
        let Ok(mut socket) = tokio_tungstenite::accept_hdr_async(stream, callback).await else {
            return;
        };

        for frame in frames {
            if socket.send(Message::text(frame)).await.is_err() {
                return;
            }
        }

        if close_after {
            let _ = socket.close(None).await;
            return;
        }
        while let Some(Ok(message)) = socket.next().await {
            if message.is_close() {
                break;
            }
        }
    });

    WsServer {
        host: format!("ws://{addr}"),
        requested: uri_rx,
        task,
    }
}

/// Await `rx` for up to one second
pub async fn recv_within<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> Option<T> {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .ok()
        .flatten()
}
