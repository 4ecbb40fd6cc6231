/*
[INPUT]:  Stream kind, symbol set and optional update rate
[OUTPUT]: Canonical WebSocket endpoint URLs
[POS]:    WebSocket layer - pure endpoint path construction (no I/O)
[UPDATE]: When adding stream kinds or rate markers
*/

use std::time::Duration;

use super::config::StreamEndpoints;
use super::error::StreamError;

/// Which feed a subscription targets; fixes the event shape and stream suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    BookTicker,
    MarkPrice,
    /// Private margin account feed addressed by listen key
    MarginData,
}

impl StreamKind {
    /// Stream name suffix, e.g. `bookTicker` in `btcusdt@bookTicker`
    pub fn suffix(self) -> &'static str {
        match self {
            StreamKind::BookTicker => "bookTicker",
            StreamKind::MarkPrice => "markPrice",
            StreamKind::MarginData => "",
        }
    }

    pub fn supports_rate(self) -> bool {
        matches!(self, StreamKind::MarkPrice)
    }

    fn is_symbol_stream(self) -> bool {
        !matches!(self, StreamKind::MarginData)
    }
}

/// Update cadence for rate-qualified streams.
///
/// Only the two cadences the exchange defines are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UpdateRate {
    /// Every 3 seconds, no marker in the stream name
    #[default]
    Standard,
    /// Every second, `@1s` marker
    Fast,
}

impl UpdateRate {
    pub const STANDARD_INTERVAL: Duration = Duration::from_secs(3);
    pub const FAST_INTERVAL: Duration = Duration::from_secs(1);

    pub fn interval(self) -> Duration {
        match self {
            UpdateRate::Standard => Self::STANDARD_INTERVAL,
            UpdateRate::Fast => Self::FAST_INTERVAL,
        }
    }

    fn marker(self) -> &'static str {
        match self {
            UpdateRate::Standard => "",
            UpdateRate::Fast => "@1s",
        }
    }
}

impl TryFrom<Duration> for UpdateRate {
    type Error = StreamError;

    fn try_from(interval: Duration) -> Result<Self, Self::Error> {
        if interval == Self::STANDARD_INTERVAL {
            Ok(UpdateRate::Standard)
        } else if interval == Self::FAST_INTERVAL {
            Ok(UpdateRate::Fast)
        } else {
            Err(StreamError::config(format!(
                "invalid rate {interval:?}, expected 1s or 3s"
            )))
        }
    }
}

/// Symbols a subscription covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolSet {
    Single(String),
    /// Multiplexed over one connection, frames arrive wrapped in an envelope
    Combined(Vec<String>),
    /// Wildcard feed covering every symbol
    All,
}

impl SymbolSet {
    pub fn single(symbol: impl Into<String>) -> Self {
        SymbolSet::Single(symbol.into())
    }

    pub fn combined<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SymbolSet::Combined(symbols.into_iter().map(Into::into).collect())
    }

    /// Combined feeds wrap every frame in a `{"stream", "data"}` envelope
    pub fn is_combined(&self) -> bool {
        matches!(self, SymbolSet::Combined(_))
    }
}

/// Builds endpoint URLs against a fixed set of hosts.
#[derive(Debug, Clone)]
pub struct EndpointBuilder {
    endpoints: StreamEndpoints,
}

impl EndpointBuilder {
    pub fn new(endpoints: StreamEndpoints) -> Self {
        Self { endpoints }
    }

    pub fn endpoints(&self) -> &StreamEndpoints {
        &self.endpoints
    }

    /// Build the endpoint for `kind` over `symbols` with one rate for every stream.
    pub fn build(
        &self,
        kind: StreamKind,
        symbols: &SymbolSet,
        rate: UpdateRate,
    ) -> Result<String, StreamError> {
        match symbols {
            SymbolSet::Single(symbol) => self.single(kind, symbol, rate),
            SymbolSet::Combined(list) => self.combined(kind, list, rate),
            SymbolSet::All => self.all(kind, rate),
        }
    }

    /// `{ws}/{symbol}@{suffix}[@1s]`
    pub fn single(
        &self,
        kind: StreamKind,
        symbol: &str,
        rate: UpdateRate,
    ) -> Result<String, StreamError> {
        let name = stream_name(kind, symbol, rate)?;
        Ok(format!("{}/{}", self.endpoints.ws_base, name))
    }

    /// `{combined}{s1}@{suffix}/{s2}@{suffix}...` in input order
    pub fn combined<S: AsRef<str>>(
        &self,
        kind: StreamKind,
        symbols: &[S],
        rate: UpdateRate,
    ) -> Result<String, StreamError> {
        let names = symbols
            .iter()
            .map(|symbol| stream_name(kind, symbol.as_ref(), rate))
            .collect::<Result<Vec<_>, _>>()?;
        self.join_combined(names)
    }

    /// Combined endpoint where every symbol carries its own rate
    pub fn combined_with_rates<S: AsRef<str>>(
        &self,
        kind: StreamKind,
        symbols: &[(S, UpdateRate)],
    ) -> Result<String, StreamError> {
        let names = symbols
            .iter()
            .map(|(symbol, rate)| stream_name(kind, symbol.as_ref(), *rate))
            .collect::<Result<Vec<_>, _>>()?;
        self.join_combined(names)
    }

    /// `{ws}/!{suffix}@arr[@1s]`
    pub fn all(&self, kind: StreamKind, rate: UpdateRate) -> Result<String, StreamError> {
        check_kind(kind, rate)?;
        Ok(format!(
            "{}/!{}@arr{}",
            self.endpoints.ws_base,
            kind.suffix(),
            rate.marker()
        ))
    }

    /// `{margin_ws}/{listen_key}`
    pub fn margin_data(&self, listen_key: &str) -> Result<String, StreamError> {
        let Some(margin_ws_base) = &self.endpoints.margin_ws_base else {
            return Err(StreamError::config(
                "margin user data streams are not available in this environment",
            ));
        };
        let listen_key = listen_key.trim();
        if listen_key.is_empty() {
            return Err(StreamError::config("listen key must not be empty"));
        }
        if !is_path_safe(listen_key) {
            return Err(StreamError::config(format!(
                "listen key {listen_key:?} contains reserved characters"
            )));
        }
        Ok(format!("{margin_ws_base}/{listen_key}"))
    }

    fn join_combined(&self, names: Vec<String>) -> Result<String, StreamError> {
        if names.is_empty() {
            return Err(StreamError::config(
                "combined stream requires at least one symbol",
            ));
        }
        Ok(format!("{}{}", self.endpoints.combined_base, names.join("/")))
    }
}

impl Default for EndpointBuilder {
    fn default() -> Self {
        Self::new(StreamEndpoints::default())
    }
}

/// Single stream name, e.g. `btcusdt@markPrice@1s`.
pub fn stream_name(kind: StreamKind, symbol: &str, rate: UpdateRate) -> Result<String, StreamError> {
    check_kind(kind, rate)?;
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(StreamError::config("symbol must not be empty"));
    }
    if !is_path_safe(symbol) {
        return Err(StreamError::config(format!(
            "symbol {symbol:?} contains reserved characters"
        )));
    }
    Ok(format!(
        "{}@{}{}",
        symbol.to_lowercase(),
        kind.suffix(),
        rate.marker()
    ))
}

fn check_kind(kind: StreamKind, rate: UpdateRate) -> Result<(), StreamError> {
    if !kind.is_symbol_stream() {
        return Err(StreamError::config(format!(
            "{kind:?} is addressed by listen key, not by symbol"
        )));
    }
    if rate != UpdateRate::Standard && !kind.supports_rate() {
        return Err(StreamError::config(format!(
            "{kind:?} does not support update rate {:?}",
            rate.interval()
        )));
    }
    Ok(())
}

fn is_path_safe(segment: &str) -> bool {
    !segment
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '/' | '@' | '?' | '&' | '#'))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn builder() -> EndpointBuilder {
        EndpointBuilder::default()
    }

    #[rstest]
    #[case(StreamKind::BookTicker, "BTCUSDT", UpdateRate::Standard, "wss://fstream.binance.com/ws/btcusdt@bookTicker")]
    #[case(StreamKind::MarkPrice, "ETHUSDT", UpdateRate::Standard, "wss://fstream.binance.com/ws/ethusdt@markPrice")]
    #[case(StreamKind::MarkPrice, "ethusdt", UpdateRate::Fast, "wss://fstream.binance.com/ws/ethusdt@markPrice@1s")]
    fn test_single_endpoint(
        #[case] kind: StreamKind,
        #[case] symbol: &str,
        #[case] rate: UpdateRate,
        #[case] expected: &str,
    ) {
        assert_eq!(builder().single(kind, symbol, rate).unwrap(), expected);
    }

    #[rstest]
    #[case(StreamKind::BookTicker, UpdateRate::Standard, "wss://fstream.binance.com/ws/!bookTicker@arr")]
    #[case(StreamKind::MarkPrice, UpdateRate::Standard, "wss://fstream.binance.com/ws/!markPrice@arr")]
    #[case(StreamKind::MarkPrice, UpdateRate::Fast, "wss://fstream.binance.com/ws/!markPrice@arr@1s")]
    fn test_all_symbols_endpoint(
        #[case] kind: StreamKind,
        #[case] rate: UpdateRate,
        #[case] expected: &str,
    ) {
        assert_eq!(builder().all(kind, rate).unwrap(), expected);
    }

    #[test]
    fn test_combined_endpoint_preserves_order() {
        let endpoint = builder()
            .combined(StreamKind::BookTicker, &["BTCUSDT", "ETHUSDT"], UpdateRate::Standard)
            .unwrap();
        assert_eq!(
            endpoint,
            "wss://fstream.binance.com/stream?streams=btcusdt@bookTicker/ethusdt@bookTicker"
        );
        assert!(!endpoint.ends_with('/'));
    }

    #[test]
    fn test_combined_with_rates() {
        let endpoint = builder()
            .combined_with_rates(
                StreamKind::MarkPrice,
                &[("BTCUSDT", UpdateRate::Fast), ("ETHUSDT", UpdateRate::Standard)],
            )
            .unwrap();
        assert_eq!(
            endpoint,
            "wss://fstream.binance.com/stream?streams=btcusdt@markPrice@1s/ethusdt@markPrice"
        );
    }

    #[test]
    fn test_combined_requires_symbols() {
        let empty: [&str; 0] = [];
        let err = builder()
            .combined(StreamKind::BookTicker, &empty, UpdateRate::Standard)
            .unwrap_err();
        assert!(matches!(err, StreamError::Configuration(_)));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("btc/usdt")]
    #[case("btc@usdt")]
    fn test_invalid_symbol_rejected(#[case] symbol: &str) {
        let err = builder()
            .single(StreamKind::BookTicker, symbol, UpdateRate::Standard)
            .unwrap_err();
        assert!(matches!(err, StreamError::Configuration(_)));
    }

    #[test]
    fn test_fast_rate_rejected_for_book_ticker() {
        let err = builder()
            .single(StreamKind::BookTicker, "BTCUSDT", UpdateRate::Fast)
            .unwrap_err();
        assert!(matches!(err, StreamError::Configuration(_)));

        let err = builder().all(StreamKind::BookTicker, UpdateRate::Fast).unwrap_err();
        assert!(matches!(err, StreamError::Configuration(_)));
    }

    #[test]
    fn test_margin_kind_needs_listen_key() {
        let err = builder()
            .single(StreamKind::MarginData, "BTCUSDT", UpdateRate::Standard)
            .unwrap_err();
        assert!(matches!(err, StreamError::Configuration(_)));

        assert_eq!(
            builder().margin_data("pqia91ma19a5s61cv6a81va65sdf19v8a65a1a5s61cv6a81va65sdf19v8a65a1").unwrap(),
            "wss://margin-stream.binance.com/ws/pqia91ma19a5s61cv6a81va65sdf19v8a65a1a5s61cv6a81va65sdf19v8a65a1"
        );
        assert!(builder().margin_data("").is_err());
    }

    #[test]
    fn test_margin_data_unavailable_on_testnet() {
        let testnet = EndpointBuilder::new(StreamEndpoints::testnet());
        let err = testnet.margin_data("validlistenkey").unwrap_err();
        assert!(matches!(err, StreamError::Configuration(_)));
    }

    #[rstest]
    #[case(Duration::from_secs(3), UpdateRate::Standard)]
    #[case(Duration::from_millis(3000), UpdateRate::Standard)]
    #[case(Duration::from_secs(1), UpdateRate::Fast)]
    fn test_rate_from_interval(#[case] interval: Duration, #[case] expected: UpdateRate) {
        assert_eq!(UpdateRate::try_from(interval).unwrap(), expected);
    }

    #[rstest]
    #[case(Duration::from_secs(2))]
    #[case(Duration::from_millis(500))]
    #[case(Duration::from_millis(1001))]
    #[case(Duration::ZERO)]
    fn test_rate_outside_closed_set(#[case] interval: Duration) {
        let err = UpdateRate::try_from(interval).unwrap_err();
        assert!(matches!(err, StreamError::Configuration(_)));
    }

    #[test]
    fn test_builder_is_deterministic() {
        let set = SymbolSet::combined(["SOLUSDT", "BNBUSDT", "XRPUSDT"]);
        let first = builder().build(StreamKind::MarkPrice, &set, UpdateRate::Fast).unwrap();
        let _ = builder().build(StreamKind::BookTicker, &SymbolSet::All, UpdateRate::Standard);
        let second = builder().build(StreamKind::MarkPrice, &set, UpdateRate::Fast).unwrap();
        assert_eq!(first, second);
        assert!(set.is_combined());
        assert!(!SymbolSet::single("BTCUSDT").is_combined());
    }
}
