/*
[INPUT]:  Failures from endpoint construction, dialing, frame decoding and socket reads
[OUTPUT]: StreamError taxonomy delivered synchronously or through the error handler
[POS]:    WebSocket layer - error types for the streaming subsystem
[UPDATE]: When adding new stream failure modes
*/

use thiserror::Error;

const PREVIEW_MAX_BYTES: usize = 1024;

/// Errors produced by the streaming subsystem.
///
/// `Configuration` is only ever returned synchronously from a facade call.
/// Every other variant is delivered to the subscription's error handler.
#[derive(Error, Debug)]
pub enum StreamError {
    /// Invalid stream kind, symbol set or rate combination
    #[error("stream configuration error: {0}")]
    Configuration(String),

    /// Transport dial failed
    #[error("failed to connect to {endpoint}: {message}")]
    Connect { endpoint: String, message: String },

    /// A single frame could not be decoded into the expected event shape
    #[error("failed to decode {payload_len}-byte frame: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        payload_len: usize,
        /// Leading bytes of the frame, lossily converted to text
        preview: String,
    },

    /// Read failure after the connection was open
    #[error("stream transport error: {0}")]
    Transport(String),
}

/// Coarse classification of a [`StreamError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamErrorKind {
    Configuration,
    Connect,
    Decode,
    Transport,
}

impl StreamError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        StreamError::Configuration(message.into())
    }

    pub(crate) fn connect(endpoint: &str, message: impl ToString) -> Self {
        StreamError::Connect {
            endpoint: endpoint.to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn decode(source: serde_json::Error, payload: &[u8]) -> Self {
        let text = String::from_utf8_lossy(payload);
        StreamError::Decode {
            source,
            payload_len: payload.len(),
            preview: truncate_for_log(&text, PREVIEW_MAX_BYTES),
        }
    }

    pub fn kind(&self) -> StreamErrorKind {
        match self {
            StreamError::Configuration(_) => StreamErrorKind::Configuration,
            StreamError::Connect { .. } => StreamErrorKind::Connect,
            StreamError::Decode { .. } => StreamErrorKind::Decode,
            StreamError::Transport(_) => StreamErrorKind::Transport,
        }
    }

    /// Whether the session keeps running after reporting this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StreamError::Decode { .. })
    }

    /// Whether this error ends the session that reported it
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StreamError::Connect { .. } | StreamError::Transport(_)
        )
    }
}

pub(crate) fn truncate_for_log(value: &str, max_len: usize) -> String {
    if value.len() <= max_len {
        return value.to_string();
    }
    let mut end = max_len;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = String::with_capacity(end + 3);
    out.push_str(&value[..end]);
    out.push_str("...");
    out
}

impl From<tokio_tungstenite::tungstenite::Error> for StreamError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        StreamError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_is_recoverable() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = StreamError::decode(source, b"{");
        assert!(err.is_recoverable());
        assert!(!err.is_terminal());
        assert_eq!(err.kind(), StreamErrorKind::Decode);
    }

    #[test]
    fn test_terminal_errors() {
        let connect = StreamError::connect("wss://example", "refused");
        assert!(connect.is_terminal());
        assert_eq!(
            connect.to_string(),
            "failed to connect to wss://example: refused"
        );

        let transport = StreamError::Transport("reset".to_string());
        assert!(transport.is_terminal());
        assert!(!transport.is_recoverable());
    }

    #[test]
    fn test_decode_preview_is_truncated() {
        let payload = "x".repeat(4096);
        let source = serde_json::from_str::<serde_json::Value>(&payload).unwrap_err();
        match StreamError::decode(source, payload.as_bytes()) {
            StreamError::Decode {
                payload_len,
                preview,
                ..
            } => {
                assert_eq!(payload_len, 4096);
                assert_eq!(preview.len(), PREVIEW_MAX_BYTES + 3);
                assert!(preview.ends_with("..."));
            }
            other => panic!("Expected Decode variant, got {other:?}"),
        }
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let value = "ééééé";
        let truncated = truncate_for_log(value, 3);
        assert_eq!(truncated, "é...");
    }

    #[test]
    fn test_configuration_error_is_neither() {
        let err = StreamError::config("no symbols");
        assert!(!err.is_terminal());
        assert!(!err.is_recoverable());
        assert_eq!(err.kind(), StreamErrorKind::Configuration);
    }
}
