/*
[INPUT]:  REST payload shapes for margin and coin-margined endpoints
[OUTPUT]: Serde models, request builders, response wrappers and wire enums
[POS]:    Data layer - shared by http, ws and config
[UPDATE]: When REST payloads change or new enums are added
*/

pub mod enums;
pub mod models;
pub mod requests;
pub mod responses;

pub use enums::{BorrowRepayType, Environment, MarginDataEventType, MarginType};
pub use models::{AvailableInventory, PremiumIndex};
pub use requests::BorrowRepayRequest;
pub use responses::{ApiErrorResponse, ListenKeyResponse, PremiumIndexResponse, TransactionResponse};
