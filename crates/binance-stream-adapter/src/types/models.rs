/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Margin assets currently available to borrow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableInventory {
    pub assets: BTreeMap<String, Decimal>,
    #[serde(rename = "updateTime")]
    pub update_time: i64,
}

/// Mark price and funding snapshot for a coin-margined contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumIndex {
    pub symbol: String,
    pub pair: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub mark_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub index_price: Decimal,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub estimated_settle_price: Decimal,
    // Empty for delivery contracts
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub last_funding_rate: Decimal,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub interest_rate: Decimal,
    pub next_funding_time: i64,
    pub time: i64,
}

pub(crate) mod serde_helpers {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;
    use std::str::FromStr;

    pub fn deserialize_decimal_or_zero<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        if value.is_null() {
            return Ok(Decimal::ZERO);
        }

        if let Some(raw) = value.as_str() {
            if raw.trim().is_empty() {
                return Ok(Decimal::ZERO);
            }
            return Decimal::from_str(raw).map_err(serde::de::Error::custom);
        }

        if value.is_number() {
            return Decimal::from_str(&value.to_string()).map_err(serde::de::Error::custom);
        }

        Err(serde::de::Error::custom("invalid decimal value"))
    }

    pub fn serialize_decimal<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn premium_index_accepts_empty_funding_rate() {
        let value = json!({
            "symbol": "BTCUSD_250328",
            "pair": "BTCUSD",
            "markPrice": "87012.5",
            "indexPrice": "86950.1",
            "estimatedSettlePrice": "86990.0",
            "lastFundingRate": "",
            "interestRate": "",
            "nextFundingTime": 0,
            "time": 1_700_000_000_000_i64
        });

        let index: PremiumIndex = serde_json::from_value(value).expect("premium index");

        assert_eq!(index.last_funding_rate, Decimal::ZERO);
        assert_eq!(index.interest_rate, Decimal::ZERO);
        assert_eq!(index.mark_price, "87012.5".parse::<Decimal>().expect("decimal"));
    }

    #[test]
    fn available_inventory_parses_asset_map() {
        let value = json!({
            "assets": {"BTC": "0.512", "USDT": "1200000"},
            "updateTime": 1_699_272_487_000_i64
        });

        let inventory: AvailableInventory = serde_json::from_value(value).expect("inventory");

        assert_eq!(inventory.assets.len(), 2);
        assert_eq!(inventory.assets["BTC"], "0.512".parse::<Decimal>().expect("decimal"));
        assert_eq!(inventory.update_time, 1_699_272_487_000);
    }
}
