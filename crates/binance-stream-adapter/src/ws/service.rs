/*
[INPUT]:  Symbols, rates, listen keys and caller handlers
[OUTPUT]: Subscription handles for typed or raw stream delivery
[POS]:    WebSocket layer - public stream entry points (builder + session composition)
[UPDATE]: When adding stream kinds or delivery modes
*/

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;

use super::codec::{FrameDecoder, Framing, JsonDecoder, RawDecoder};
use super::config::StreamConfig;
use super::endpoint::{EndpointBuilder, StreamKind, SymbolSet, UpdateRate};
use super::error::StreamError;
use super::message::{BookTickerEvent, MarginDataEvent, MarkPriceEvent};
use super::session::{SubscriptionHandle, spawn_session};
use super::transport::{Transport, TungsteniteTransport};

/// Entry point for all stream subscriptions.
///
/// Every call validates its arguments, opens one dedicated connection and
/// returns immediately. `Err` is only ever [`StreamError::Configuration`];
/// everything after that reaches the error handler.
#[derive(Clone)]
pub struct StreamService {
    builder: EndpointBuilder,
    config: Arc<StreamConfig>,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for StreamService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl StreamService {
    pub fn new(config: StreamConfig) -> Self {
        Self::with_transport(config, Arc::new(TungsteniteTransport))
    }

    pub fn with_transport(config: StreamConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            builder: EndpointBuilder::new(config.endpoints.clone()),
            config: Arc::new(config),
            transport,
        }
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn endpoint_builder(&self) -> &EndpointBuilder {
        &self.builder
    }

    /// Subscribe to any symbol stream, decoding frames into `T`.
    pub fn subscribe<T, H, E>(
        &self,
        kind: StreamKind,
        symbols: &SymbolSet,
        rate: UpdateRate,
        handler: H,
        err_handler: E,
    ) -> Result<SubscriptionHandle, StreamError>
    where
        T: DeserializeOwned + Send + 'static,
        H: FnMut(T) + Send + 'static,
        E: FnMut(StreamError) + Send + 'static,
    {
        let endpoint = self.builder.build(kind, symbols, rate)?;
        let decoder = JsonDecoder::<T>::new(Framing::for_symbols(symbols));
        self.spawn(endpoint, decoder, handler, err_handler)
    }

    /// Subscribe to any symbol stream, delivering frames untouched.
    pub fn subscribe_raw<H, E>(
        &self,
        kind: StreamKind,
        symbols: &SymbolSet,
        rate: UpdateRate,
        handler: H,
        err_handler: E,
    ) -> Result<SubscriptionHandle, StreamError>
    where
        H: FnMut(Vec<u8>) + Send + 'static,
        E: FnMut(StreamError) + Send + 'static,
    {
        let endpoint = self.builder.build(kind, symbols, rate)?;
        self.spawn(endpoint, RawDecoder, handler, err_handler)
    }

    // ### Book ticker

    pub fn book_ticker_serve<H, E>(
        &self,
        symbol: &str,
        handler: H,
        err_handler: E,
    ) -> Result<SubscriptionHandle, StreamError>
    where
        H: FnMut(BookTickerEvent) + Send + 'static,
        E: FnMut(StreamError) + Send + 'static,
    {
        let endpoint = self
            .builder
            .single(StreamKind::BookTicker, symbol, UpdateRate::Standard)?;
        self.spawn_json(endpoint, Framing::Bare, handler, err_handler)
    }

    pub fn combined_book_ticker_serve<S, H, E>(
        &self,
        symbols: &[S],
        handler: H,
        err_handler: E,
    ) -> Result<SubscriptionHandle, StreamError>
    where
        S: AsRef<str>,
        H: FnMut(BookTickerEvent) + Send + 'static,
        E: FnMut(StreamError) + Send + 'static,
    {
        let endpoint = self
            .builder
            .combined(StreamKind::BookTicker, symbols, UpdateRate::Standard)?;
        self.spawn_json(endpoint, Framing::Enveloped, handler, err_handler)
    }

    pub fn all_book_ticker_serve<H, E>(
        &self,
        handler: H,
        err_handler: E,
    ) -> Result<SubscriptionHandle, StreamError>
    where
        H: FnMut(BookTickerEvent) + Send + 'static,
        E: FnMut(StreamError) + Send + 'static,
    {
        let endpoint = self.builder.all(StreamKind::BookTicker, UpdateRate::Standard)?;
        self.spawn_json(endpoint, Framing::Bare, handler, err_handler)
    }

    pub fn raw_book_ticker_serve<H, E>(
        &self,
        symbol: &str,
        handler: H,
        err_handler: E,
    ) -> Result<SubscriptionHandle, StreamError>
    where
        H: FnMut(Vec<u8>) + Send + 'static,
        E: FnMut(StreamError) + Send + 'static,
    {
        let endpoint = self
            .builder
            .single(StreamKind::BookTicker, symbol, UpdateRate::Standard)?;
        self.spawn(endpoint, RawDecoder, handler, err_handler)
    }

    pub fn combined_raw_book_ticker_serve<S, H, E>(
        &self,
        symbols: &[S],
        handler: H,
        err_handler: E,
    ) -> Result<SubscriptionHandle, StreamError>
    where
        S: AsRef<str>,
        H: FnMut(Vec<u8>) + Send + 'static,
        E: FnMut(StreamError) + Send + 'static,
    {
        let endpoint = self
            .builder
            .combined(StreamKind::BookTicker, symbols, UpdateRate::Standard)?;
        self.spawn(endpoint, RawDecoder, handler, err_handler)
    }

    pub fn all_raw_book_ticker_serve<H, E>(
        &self,
        handler: H,
        err_handler: E,
    ) -> Result<SubscriptionHandle, StreamError>
    where
        H: FnMut(Vec<u8>) + Send + 'static,
        E: FnMut(StreamError) + Send + 'static,
    {
        let endpoint = self.builder.all(StreamKind::BookTicker, UpdateRate::Standard)?;
        self.spawn(endpoint, RawDecoder, handler, err_handler)
    }

    // ### Mark price

    pub fn mark_price_serve<H, E>(
        &self,
        symbol: &str,
        handler: H,
        err_handler: E,
    ) -> Result<SubscriptionHandle, StreamError>
    where
        H: FnMut(MarkPriceEvent) + Send + 'static,
        E: FnMut(StreamError) + Send + 'static,
    {
        self.mark_price_serve_with_rate(symbol, UpdateRate::STANDARD_INTERVAL, handler, err_handler)
    }

    /// `rate` must be exactly 1s or 3s
    pub fn mark_price_serve_with_rate<H, E>(
        &self,
        symbol: &str,
        rate: Duration,
        handler: H,
        err_handler: E,
    ) -> Result<SubscriptionHandle, StreamError>
    where
        H: FnMut(MarkPriceEvent) + Send + 'static,
        E: FnMut(StreamError) + Send + 'static,
    {
        let rate = UpdateRate::try_from(rate)?;
        let endpoint = self.builder.single(StreamKind::MarkPrice, symbol, rate)?;
        self.spawn_json(endpoint, Framing::Bare, handler, err_handler)
    }

    pub fn raw_mark_price_serve<H, E>(
        &self,
        symbol: &str,
        handler: H,
        err_handler: E,
    ) -> Result<SubscriptionHandle, StreamError>
    where
        H: FnMut(Vec<u8>) + Send + 'static,
        E: FnMut(StreamError) + Send + 'static,
    {
        let endpoint = self
            .builder
            .single(StreamKind::MarkPrice, symbol, UpdateRate::Standard)?;
        self.spawn(endpoint, RawDecoder, handler, err_handler)
    }

    pub fn combined_mark_price_serve<S, H, E>(
        &self,
        symbols: &[S],
        handler: H,
        err_handler: E,
    ) -> Result<SubscriptionHandle, StreamError>
    where
        S: AsRef<str>,
        H: FnMut(MarkPriceEvent) + Send + 'static,
        E: FnMut(StreamError) + Send + 'static,
    {
        let endpoint = self
            .builder
            .combined(StreamKind::MarkPrice, symbols, UpdateRate::Standard)?;
        self.spawn_json(endpoint, Framing::Enveloped, handler, err_handler)
    }

    /// Each symbol carries its own rate (1s or 3s)
    pub fn combined_mark_price_serve_with_rate<S, H, E>(
        &self,
        symbol_rates: &[(S, Duration)],
        handler: H,
        err_handler: E,
    ) -> Result<SubscriptionHandle, StreamError>
    where
        S: AsRef<str>,
        H: FnMut(MarkPriceEvent) + Send + 'static,
        E: FnMut(StreamError) + Send + 'static,
    {
        let endpoint = self.combined_mark_price_endpoint(symbol_rates)?;
        self.spawn_json(endpoint, Framing::Enveloped, handler, err_handler)
    }

    pub fn combined_raw_mark_price_serve<S, H, E>(
        &self,
        symbols: &[S],
        handler: H,
        err_handler: E,
    ) -> Result<SubscriptionHandle, StreamError>
    where
        S: AsRef<str>,
        H: FnMut(Vec<u8>) + Send + 'static,
        E: FnMut(StreamError) + Send + 'static,
    {
        let endpoint = self
            .builder
            .combined(StreamKind::MarkPrice, symbols, UpdateRate::Standard)?;
        self.spawn(endpoint, RawDecoder, handler, err_handler)
    }

    pub fn combined_raw_mark_price_serve_with_rate<S, H, E>(
        &self,
        symbol_rates: &[(S, Duration)],
        handler: H,
        err_handler: E,
    ) -> Result<SubscriptionHandle, StreamError>
    where
        S: AsRef<str>,
        H: FnMut(Vec<u8>) + Send + 'static,
        E: FnMut(StreamError) + Send + 'static,
    {
        let endpoint = self.combined_mark_price_endpoint(symbol_rates)?;
        self.spawn(endpoint, RawDecoder, handler, err_handler)
    }

    /// Every symbol; each frame is an array of updates
    pub fn all_mark_price_serve<H, E>(
        &self,
        handler: H,
        err_handler: E,
    ) -> Result<SubscriptionHandle, StreamError>
    where
        H: FnMut(Vec<MarkPriceEvent>) + Send + 'static,
        E: FnMut(StreamError) + Send + 'static,
    {
        self.all_mark_price_serve_with_rate(UpdateRate::STANDARD_INTERVAL, handler, err_handler)
    }

    pub fn all_mark_price_serve_with_rate<H, E>(
        &self,
        rate: Duration,
        handler: H,
        err_handler: E,
    ) -> Result<SubscriptionHandle, StreamError>
    where
        H: FnMut(Vec<MarkPriceEvent>) + Send + 'static,
        E: FnMut(StreamError) + Send + 'static,
    {
        let rate = UpdateRate::try_from(rate)?;
        let endpoint = self.builder.all(StreamKind::MarkPrice, rate)?;
        self.spawn_json(endpoint, Framing::Bare, handler, err_handler)
    }

    pub fn all_raw_mark_price_serve<H, E>(
        &self,
        handler: H,
        err_handler: E,
    ) -> Result<SubscriptionHandle, StreamError>
    where
        H: FnMut(Vec<u8>) + Send + 'static,
        E: FnMut(StreamError) + Send + 'static,
    {
        self.all_raw_mark_price_serve_with_rate(UpdateRate::STANDARD_INTERVAL, handler, err_handler)
    }

    pub fn all_raw_mark_price_serve_with_rate<H, E>(
        &self,
        rate: Duration,
        handler: H,
        err_handler: E,
    ) -> Result<SubscriptionHandle, StreamError>
    where
        H: FnMut(Vec<u8>) + Send + 'static,
        E: FnMut(StreamError) + Send + 'static,
    {
        let rate = UpdateRate::try_from(rate)?;
        let endpoint = self.builder.all(StreamKind::MarkPrice, rate)?;
        self.spawn(endpoint, RawDecoder, handler, err_handler)
    }

    // ### Margin user data

    /// Listen key comes from `BinanceClient::start_margin_user_stream`
    pub fn margin_data_serve<H, E>(
        &self,
        listen_key: &str,
        handler: H,
        err_handler: E,
    ) -> Result<SubscriptionHandle, StreamError>
    where
        H: FnMut(MarginDataEvent) + Send + 'static,
        E: FnMut(StreamError) + Send + 'static,
    {
        let endpoint = self.builder.margin_data(listen_key)?;
        self.spawn_json(endpoint, Framing::Bare, handler, err_handler)
    }

    pub fn raw_margin_data_serve<H, E>(
        &self,
        listen_key: &str,
        handler: H,
        err_handler: E,
    ) -> Result<SubscriptionHandle, StreamError>
    where
        H: FnMut(Vec<u8>) + Send + 'static,
        E: FnMut(StreamError) + Send + 'static,
    {
        let endpoint = self.builder.margin_data(listen_key)?;
        self.spawn(endpoint, RawDecoder, handler, err_handler)
    }

    fn combined_mark_price_endpoint<S: AsRef<str>>(
        &self,
        symbol_rates: &[(S, Duration)],
    ) -> Result<String, StreamError> {
        let rates = symbol_rates
            .iter()
            .map(|(symbol, rate)| {
                UpdateRate::try_from(*rate)
                    .map(|rate| (symbol.as_ref(), rate))
                    .map_err(|_| {
                        StreamError::config(format!(
                            "invalid rate {rate:?} for {}, expected 1s or 3s",
                            symbol.as_ref()
                        ))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.builder.combined_with_rates(StreamKind::MarkPrice, &rates)
    }

    fn spawn_json<T, H, E>(
        &self,
        endpoint: String,
        framing: Framing,
        handler: H,
        err_handler: E,
    ) -> Result<SubscriptionHandle, StreamError>
    where
        T: DeserializeOwned + Send + 'static,
        H: FnMut(T) + Send + 'static,
        E: FnMut(StreamError) + Send + 'static,
    {
        self.spawn(endpoint, JsonDecoder::<T>::new(framing), handler, err_handler)
    }

    fn spawn<D, H, E>(
        &self,
        endpoint: String,
        decoder: D,
        handler: H,
        err_handler: E,
    ) -> Result<SubscriptionHandle, StreamError>
    where
        D: FrameDecoder,
        H: FnMut(D::Output) + Send + 'static,
        E: FnMut(StreamError) + Send + 'static,
    {
        self.config.validate()?;
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(StreamError::config(
                "stream subscriptions require a running Tokio runtime",
            ));
        }
        Ok(spawn_session(
            self.transport.clone(),
            endpoint,
            decoder,
            handler,
            err_handler,
            &self.config,
        ))
    }
}

impl Default for StreamService {
    fn default() -> Self {
        Self::new(StreamConfig::default())
    }
}
