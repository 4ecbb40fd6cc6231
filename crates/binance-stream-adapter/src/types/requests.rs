/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust request structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::enums::BorrowRepayType;

/// Margin borrow or repay request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowRepayRequest {
    pub asset: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: BorrowRepayType,
    #[serde(default)]
    pub is_isolated: bool,
    /// Isolated margin symbol
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

impl BorrowRepayRequest {
    pub fn borrow(asset: impl Into<String>, amount: Decimal) -> Self {
        Self {
            asset: asset.into(),
            amount,
            kind: BorrowRepayType::Borrow,
            is_isolated: false,
            symbol: None,
        }
    }

    pub fn repay(asset: impl Into<String>, amount: Decimal) -> Self {
        Self {
            kind: BorrowRepayType::Repay,
            ..Self::borrow(asset, amount)
        }
    }

    /// Target an isolated margin account
    pub fn isolated(mut self, symbol: impl Into<String>) -> Self {
        self.is_isolated = true;
        self.symbol = Some(symbol.into());
        self
    }
}
