/*
[INPUT]:  Raw WebSocket message bytes
[OUTPUT]: Typed push events and the combined-stream envelope
[POS]:    WebSocket layer - event shapes keyed by stream kind
[UPDATE]: When adding new event shapes or the exchange changes field codes
*/

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::MarginDataEventType;
use crate::types::models::serde_helpers;

/// Best bid/ask update (`<symbol>@bookTicker`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookTickerEvent {
    #[serde(rename = "e")]
    pub event_type: String,
    #[serde(rename = "u")]
    pub update_id: u64,
    #[serde(rename = "E")]
    pub event_time: i64,
    #[serde(rename = "T")]
    pub transaction_time: i64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "b", with = "rust_decimal::serde::str")]
    pub best_bid_price: Decimal,
    #[serde(rename = "B", with = "rust_decimal::serde::str")]
    pub best_bid_qty: Decimal,
    #[serde(rename = "a", with = "rust_decimal::serde::str")]
    pub best_ask_price: Decimal,
    #[serde(rename = "A", with = "rust_decimal::serde::str")]
    pub best_ask_qty: Decimal,
}

/// Mark price and funding update (`<symbol>@markPrice`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkPriceEvent {
    #[serde(rename = "e")]
    pub event_type: String,
    #[serde(rename = "E")]
    pub event_time: i64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "p", with = "rust_decimal::serde::str")]
    pub mark_price: Decimal,
    #[serde(rename = "i", with = "rust_decimal::serde::str")]
    pub index_price: Decimal,
    #[serde(
        rename = "P",
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub estimated_settle_price: Decimal,
    #[serde(
        rename = "r",
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub funding_rate: Decimal,
    #[serde(rename = "T")]
    pub next_funding_time: i64,
}

/// Margin account liability or margin level change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarginDataEvent {
    #[serde(rename = "e")]
    pub event: MarginDataEventType,
    #[serde(rename = "E")]
    pub time: i64,
    #[serde(rename = "a")]
    pub asset: String,
    #[serde(rename = "t")]
    pub kind: String,
    #[serde(
        rename = "p",
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub principal: Decimal,
    #[serde(
        rename = "i",
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub interest: Decimal,
}

/// Combined-stream wrapper: `{"stream": "btcusdt@bookTicker", "data": {...}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamEnvelope<T> {
    pub stream: String,
    pub data: T,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn book_ticker(symbol: &str, update_id: u64) -> BookTickerEvent {
        BookTickerEvent {
            event_type: "bookTicker".to_string(),
            update_id,
            event_time: 1_568_014_460_893,
            transaction_time: 1_568_014_460_891,
            symbol: symbol.to_string(),
            best_bid_price: "25.35190000".parse().expect("bid price"),
            best_bid_qty: "31.21000000".parse().expect("bid qty"),
            best_ask_price: "25.36520000".parse().expect("ask price"),
            best_ask_qty: "40.66000000".parse().expect("ask qty"),
        }
    }

    pub fn mark_price(symbol: &str) -> MarkPriceEvent {
        MarkPriceEvent {
            event_type: "markPriceUpdate".to_string(),
            event_time: 1_562_305_380_000,
            symbol: symbol.to_string(),
            mark_price: "11794.15000000".parse().expect("mark price"),
            index_price: "11784.62659091".parse().expect("index price"),
            estimated_settle_price: "11784.25641265".parse().expect("settle price"),
            funding_rate: "0.00038167".parse().expect("funding rate"),
            next_funding_time: 1_562_306_400_000,
        }
    }

    pub fn margin_data() -> MarginDataEvent {
        MarginDataEvent {
            event: MarginDataEventType::UserLiabilityChange,
            time: 1_701_949_716_000,
            asset: "BTC".to_string(),
            kind: "BORROW".to_string(),
            principal: "0.05".parse().expect("principal"),
            interest: "0.0000125".parse().expect("interest"),
        }
    }
}
