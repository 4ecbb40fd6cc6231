/*
[INPUT]:  Endpoint URL, transport, frame decoder, caller handler and error handler
[OUTPUT]: Running receive loop plus the (done, stop) lifecycle handle
[POS]:    WebSocket layer - one live connection per subscription
[UPDATE]: When changing session states, shutdown ordering or keepalive handling
*/

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::codec::FrameDecoder;
use super::config::{KeepaliveConfig, StreamConfig};
use super::error::StreamError;
use super::transport::{Connection, Inbound, Transport};

/// Lifecycle of a subscription session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Open,
    Draining,
    Closed,
}

/// Closed once the receive loop has fully exited.
#[derive(Debug, Clone)]
pub struct DoneSignal(CancellationToken);

impl DoneSignal {
    pub fn is_done(&self) -> bool {
        self.0.is_cancelled()
    }

    /// Wait until the session reaches `Closed`
    pub async fn wait(&self) {
        self.0.cancelled().await;
    }
}

/// Requests orderly shutdown. Idempotent and never blocks.
#[derive(Debug, Clone)]
pub struct StopSignal(CancellationToken);

impl StopSignal {
    pub fn stop(&self) {
        self.0.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.0.is_cancelled()
    }
}

/// Caller-facing handle of one subscription.
///
/// Dropping the handle does not stop the session; call [`SubscriptionHandle::stop`].
#[derive(Debug)]
pub struct SubscriptionHandle {
    endpoint: String,
    done: DoneSignal,
    stop: StopSignal,
    state: watch::Receiver<SessionState>,
}

impl SubscriptionHandle {
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn done_signal(&self) -> DoneSignal {
        self.done.clone()
    }

    pub fn is_done(&self) -> bool {
        self.done.is_done()
    }

    pub async fn wait(&self) {
        self.done.wait().await;
    }

    pub async fn stop_and_wait(&self) {
        self.stop();
        self.wait().await;
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }
}

/// Spawn a session task and return its handle immediately.
///
/// Must be called from within a Tokio runtime.
pub(crate) fn spawn_session<D, H, E>(
    transport: Arc<dyn Transport>,
    endpoint: String,
    decoder: D,
    handler: H,
    err_handler: E,
    config: &StreamConfig,
) -> SubscriptionHandle
where
    D: FrameDecoder,
    H: FnMut(D::Output) + Send + 'static,
    E: FnMut(StreamError) + Send + 'static,
{
    let stop = CancellationToken::new();
    let done = CancellationToken::new();
    let (state_tx, state_rx) = watch::channel(SessionState::Connecting);

    let session = Session {
        endpoint: endpoint.clone(),
        transport,
        decoder,
        handler,
        err_handler,
        stop: stop.clone(),
        handshake_timeout: config.handshake_timeout,
        keepalive: config.keepalive,
        decode_log_limit: config.decode_log_limit,
        decode_failures: 0,
        frames: 0,
    };
    let guard = CloseGuard {
        done: done.clone(),
        state_tx,
    };

    tokio::spawn(async move {
        let guard = guard;
        session.run(&guard).await;
        drop(guard);
    });

    SubscriptionHandle {
        endpoint,
        done: DoneSignal(done),
        stop: StopSignal(stop),
        state: state_rx,
    }
}

/// Moves the session to `Closed` and fires "done" when the task ends, even by panic.
struct CloseGuard {
    done: CancellationToken,
    state_tx: watch::Sender<SessionState>,
}

impl CloseGuard {
    fn set_state(&self, state: SessionState) {
        self.state_tx.send_replace(state);
    }
}

impl Drop for CloseGuard {
    fn drop(&mut self) {
        self.state_tx.send_replace(SessionState::Closed);
        self.done.cancel();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionExit {
    Stopped,
    Failed,
}

struct Session<D, H, E> {
    endpoint: String,
    transport: Arc<dyn Transport>,
    decoder: D,
    handler: H,
    err_handler: E,
    stop: CancellationToken,
    handshake_timeout: Duration,
    keepalive: Option<KeepaliveConfig>,
    decode_log_limit: usize,
    decode_failures: usize,
    frames: u64,
}

impl<D, H, E> Session<D, H, E>
where
    D: FrameDecoder,
    H: FnMut(D::Output) + Send + 'static,
    E: FnMut(StreamError) + Send + 'static,
{
    async fn run(mut self, guard: &CloseGuard) {
        let Some(mut connection) = self.connect().await else {
            return;
        };

        guard.set_state(SessionState::Open);
        info!(endpoint = %self.endpoint, "stream session open");

        let exit = self.receive_loop(connection.as_mut()).await;

        guard.set_state(SessionState::Draining);
        if tokio::time::timeout(self.handshake_timeout, connection.close())
            .await
            .is_err()
        {
            debug!(endpoint = %self.endpoint, "websocket close timed out");
        }
        drop(connection);

        info!(
            endpoint = %self.endpoint,
            frames = self.frames,
            decode_failures = self.decode_failures,
            stopped_by_caller = exit == SessionExit::Stopped,
            "stream session closed"
        );
    }

    async fn connect(&mut self) -> Option<Box<dyn Connection>> {
        let stop = self.stop.clone();
        let transport = self.transport.clone();
        let endpoint = self.endpoint.clone();
        let timeout = self.handshake_timeout;

        debug!(endpoint = %endpoint, "stream session connecting");

        tokio::select! {
            biased;
            _ = stop.cancelled() => {
                debug!(endpoint = %endpoint, "stop requested while connecting");
                None
            }
            result = tokio::time::timeout(timeout, transport.connect(&endpoint)) => {
                let err = match result {
                    Ok(Ok(connection)) => return Some(connection),
                    Ok(Err(err)) => err,
                    Err(_) => StreamError::connect(
                        &endpoint,
                        format!("handshake timed out after {timeout:?}"),
                    ),
                };
                warn!(endpoint = %endpoint, error = %err, "stream session connect failed");
                (self.err_handler)(err);
                None
            }
        }
    }

    async fn receive_loop(&mut self, connection: &mut dyn Connection) -> SessionExit {
        let stop = self.stop.clone();
        let mut keepalive = self.keepalive.map(|config| {
            let mut interval =
                tokio::time::interval_at(Instant::now() + config.interval, config.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            (interval, config.timeout)
        });
        let mut last_seen = Instant::now();

        loop {
            tokio::select! {
                biased;
                _ = stop.cancelled() => {
                    debug!(endpoint = %self.endpoint, "stop requested");
                    return SessionExit::Stopped;
                }
                inbound = connection.recv() => match inbound {
                    Some(Ok(Inbound::Frame(payload))) => {
                        last_seen = Instant::now();
                        self.dispatch(payload);
                    }
                    Some(Ok(Inbound::Heartbeat)) => {
                        last_seen = Instant::now();
                    }
                    Some(Err(err)) => {
                        self.report_terminal(err);
                        return SessionExit::Failed;
                    }
                    None => {
                        self.report_terminal(StreamError::Transport(
                            "connection closed by remote".to_string(),
                        ));
                        return SessionExit::Failed;
                    }
                },
                silence_limit = next_keepalive_tick(&mut keepalive) => {
                    let silent_for = last_seen.elapsed();
                    if silent_for > silence_limit {
                        self.report_terminal(StreamError::Transport(format!(
                            "no data received for {silent_for:?}"
                        )));
                        return SessionExit::Failed;
                    }
                    // A stalled peer can block the ping write; stop must still win.
                    tokio::select! {
                        biased;
                        _ = stop.cancelled() => {
                            debug!(endpoint = %self.endpoint, "stop requested during keepalive ping");
                            return SessionExit::Stopped;
                        }
                        sent = tokio::time::timeout(silence_limit, connection.ping()) => match sent {
                            Ok(Ok(())) => {}
                            Ok(Err(err)) => {
                                self.report_terminal(err);
                                return SessionExit::Failed;
                            }
                            Err(_) => {
                                self.report_terminal(StreamError::Transport(format!(
                                    "keepalive ping not sent within {silence_limit:?}"
                                )));
                                return SessionExit::Failed;
                            }
                        },
                    }
                }
            }
        }
    }

    fn dispatch(&mut self, payload: Vec<u8>) {
        self.frames += 1;
        match self.decoder.decode(payload) {
            Ok(event) => (self.handler)(event),
            Err(err) => {
                self.log_decode_failure(&err);
                (self.err_handler)(err);
            }
        }
    }

    fn report_terminal(&mut self, err: StreamError) {
        warn!(endpoint = %self.endpoint, error = %err, "stream session failed");
        (self.err_handler)(err);
    }

    fn log_decode_failure(&mut self, err: &StreamError) {
        let count = self.decode_failures;
        self.decode_failures += 1;
        if count >= self.decode_log_limit {
            return;
        }

        info!(
            endpoint = %self.endpoint,
            sample_index = count + 1,
            sample_limit = self.decode_log_limit,
            error = %err,
            "stream frame decode failed"
        );
        if let StreamError::Decode { preview, .. } = err {
            debug!(
                endpoint = %self.endpoint,
                sample_index = count + 1,
                message = %preview,
                "stream frame decode failed"
            );
        }
    }
}

/// Resolves on the next keepalive tick with the silence limit; never resolves when disabled.
async fn next_keepalive_tick(keepalive: &mut Option<(Interval, Duration)>) -> Duration {
    match keepalive {
        Some((interval, timeout)) => {
            interval.tick().await;
            *timeout
        }
        None => std::future::pending().await,
    }
}
