/*
[INPUT]:  Raw frame payloads from the transport
[OUTPUT]: Typed events (optionally unwrapped from the combined envelope) or raw bytes
[POS]:    WebSocket layer - per-frame decode step between transport and handler
[UPDATE]: When adding frame framings or decode modes
*/

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use super::endpoint::SymbolSet;
use super::error::StreamError;
use super::message::StreamEnvelope;

/// Turns one frame payload into the value handed to the caller's handler.
pub trait FrameDecoder: Send + 'static {
    type Output: Send + 'static;

    fn decode(&self, payload: Vec<u8>) -> Result<Self::Output, StreamError>;
}

/// How events sit inside a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// The frame is the event
    Bare,
    /// The event sits under `data` in a `{"stream", "data"}` envelope
    Enveloped,
}

impl Framing {
    pub fn for_symbols(symbols: &SymbolSet) -> Self {
        if symbols.is_combined() {
            Framing::Enveloped
        } else {
            Framing::Bare
        }
    }
}

/// Decodes JSON frames into `T`.
pub struct JsonDecoder<T> {
    framing: Framing,
    _event: PhantomData<fn() -> T>,
}

impl<T> JsonDecoder<T> {
    pub fn new(framing: Framing) -> Self {
        Self {
            framing,
            _event: PhantomData,
        }
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }
}

impl<T> fmt::Debug for JsonDecoder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonDecoder")
            .field("framing", &self.framing)
            .field("event", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> FrameDecoder for JsonDecoder<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Output = T;

    fn decode(&self, payload: Vec<u8>) -> Result<T, StreamError> {
        let decoded = match self.framing {
            Framing::Bare => serde_json::from_slice::<T>(&payload),
            Framing::Enveloped => {
                serde_json::from_slice::<StreamEnvelope<T>>(&payload).map(|envelope| envelope.data)
            }
        };
        decoded.map_err(|err| StreamError::decode(err, &payload))
    }
}

/// Hands frames through untouched; never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawDecoder;

impl FrameDecoder for RawDecoder {
    type Output = Vec<u8>;

    fn decode(&self, payload: Vec<u8>) -> Result<Vec<u8>, StreamError> {
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws::message::fixtures;
    use crate::ws::message::{BookTickerEvent, MarkPriceEvent};

    #[test]
    fn bare_frame_decodes_directly() {
        let event = fixtures::book_ticker("BTCUSDT", 1);
        let payload = serde_json::to_vec(&event).unwrap();

        let decoder = JsonDecoder::<BookTickerEvent>::new(Framing::Bare);

        assert_eq!(decoder.decode(payload).unwrap(), event);
    }

    #[test]
    fn enveloped_frame_yields_inner_event_only() {
        let event = fixtures::book_ticker("BTCUSDT", 2);
        let payload = serde_json::to_vec(&serde_json::json!({
            "stream": "btcusdt@bookTicker",
            "data": event,
        }))
        .unwrap();

        let decoder = JsonDecoder::<BookTickerEvent>::new(Framing::Enveloped);

        assert_eq!(decoder.decode(payload).unwrap(), event);
    }

    #[test]
    fn enveloped_decoder_rejects_bare_frame() {
        let payload = serde_json::to_vec(&fixtures::book_ticker("BTCUSDT", 3)).unwrap();
        let decoder = JsonDecoder::<BookTickerEvent>::new(Framing::Enveloped);

        let err = decoder.decode(payload).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn array_frames_decode_into_vec() {
        let events = vec![fixtures::mark_price("BTCUSDT"), fixtures::mark_price("ETHUSDT")];
        let payload = serde_json::to_vec(&events).unwrap();

        let decoder = JsonDecoder::<Vec<MarkPriceEvent>>::new(Framing::Bare);

        assert_eq!(decoder.decode(payload).unwrap(), events);
    }

    #[test]
    fn malformed_frame_is_decode_error() {
        let decoder = JsonDecoder::<MarkPriceEvent>::new(Framing::Bare);

        let err = decoder.decode(b"{\"e\":\"markPriceUpdate\"".to_vec()).unwrap_err();

        match err {
            StreamError::Decode { payload_len, .. } => assert_eq!(payload_len, 22),
            other => panic!("Expected Decode variant, got {other:?}"),
        }
    }

    #[test]
    fn raw_decoder_passes_bytes_through() {
        let payload = b"not json at all".to_vec();
        assert_eq!(RawDecoder.decode(payload.clone()).unwrap(), payload);
    }

    #[test]
    fn framing_follows_symbol_set() {
        assert_eq!(Framing::for_symbols(&SymbolSet::combined(["A"])), Framing::Enveloped);
        assert_eq!(Framing::for_symbols(&SymbolSet::single("A")), Framing::Bare);
        assert_eq!(Framing::for_symbols(&SymbolSet::All), Framing::Bare);
    }
}
