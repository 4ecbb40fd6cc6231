/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust enums with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};

/// Exchange environment selecting REST and stream hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Mainnet,
    Testnet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarginDataEventType {
    UserLiabilityChange,
    MarginLevelStatusChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarginType {
    Margin,
    Isolated,
}

impl MarginType {
    pub fn as_str(self) -> &'static str {
        match self {
            MarginType::Margin => "MARGIN",
            MarginType::Isolated => "ISOLATED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BorrowRepayType {
    Borrow,
    Repay,
}

impl BorrowRepayType {
    pub fn as_str(self) -> &'static str {
        match self {
            BorrowRepayType::Borrow => "BORROW",
            BorrowRepayType::Repay => "REPAY",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margin_event_type_wire_names() {
        let parsed: MarginDataEventType =
            serde_json::from_str("\"MARGIN_LEVEL_STATUS_CHANGE\"").expect("event type");
        assert_eq!(parsed, MarginDataEventType::MarginLevelStatusChange);
        assert_eq!(
            serde_json::to_string(&MarginDataEventType::UserLiabilityChange).expect("serialize"),
            "\"USER_LIABILITY_CHANGE\""
        );
    }

    #[test]
    fn as_str_matches_serde() {
        for margin_type in [MarginType::Margin, MarginType::Isolated] {
            let json = serde_json::to_string(&margin_type).expect("serialize");
            assert_eq!(json.trim_matches('"'), margin_type.as_str());
        }
        for kind in [BorrowRepayType::Borrow, BorrowRepayType::Repay] {
            let json = serde_json::to_string(&kind).expect("serialize");
            assert_eq!(json.trim_matches('"'), kind.as_str());
        }
    }
}
