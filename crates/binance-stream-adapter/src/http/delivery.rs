/*
[INPUT]:  Optional symbol or pair filter
[OUTPUT]: Premium index rows for coin-margined contracts
[POS]:    HTTP layer - public coin-margined futures (/dapi) endpoints
[UPDATE]: When adding /dapi market data endpoints
*/

use crate::http::request::{ApiHost, ApiRequest};
use crate::http::{BinanceClient, Result};
use crate::types::{PremiumIndex, PremiumIndexResponse};

impl BinanceClient {
    /// Mark price, index price and funding for coin-margined contracts
    ///
    /// GET /dapi/v1/premiumIndex?symbol={symbol}&pair={pair}
    pub async fn premium_index(
        &self,
        symbol: Option<&str>,
        pair: Option<&str>,
    ) -> Result<Vec<PremiumIndex>> {
        let request = ApiRequest::get(ApiHost::CoinFutures, "/dapi/v1/premiumIndex")
            .query_opt("symbol", symbol)
            .query_opt("pair", pair);
        let response: PremiumIndexResponse = self.send_json(request).await?;
        Ok(response.into_vec())
    }
}
