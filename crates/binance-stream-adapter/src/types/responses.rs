/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust response structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};

use super::models::PremiumIndex;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListenKeyResponse {
    #[serde(rename = "listenKey")]
    pub listen_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionResponse {
    #[serde(rename = "tranId")]
    pub tran_id: i64,
}

/// Error body returned with non-2xx responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub code: i64,
    pub msg: String,
}

/// The premium index endpoint answers with an object for one symbol and a list otherwise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PremiumIndexResponse {
    Many(Vec<PremiumIndex>),
    One(Box<PremiumIndex>),
}

impl PremiumIndexResponse {
    pub fn into_vec(self) -> Vec<PremiumIndex> {
        match self {
            PremiumIndexResponse::Many(items) => items,
            PremiumIndexResponse::One(item) => vec![*item],
        }
    }
}
