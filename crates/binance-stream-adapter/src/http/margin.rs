/*
[INPUT]:  Listen keys, margin account type and borrow/repay requests
[OUTPUT]: Listen keys, available inventory and transaction ids
[POS]:    HTTP layer - margin (/sapi) endpoints and listen-key upkeep
[UPDATE]: When adding margin endpoints or changing the keepalive cadence
*/

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::http::request::{ApiHost, ApiRequest, RequestExecutor, SecurityType};
use crate::http::{BinanceClient, Result};
use crate::types::{
    AvailableInventory, BorrowRepayRequest, ListenKeyResponse, MarginType, TransactionResponse,
};

const LISTEN_KEY_ENDPOINT: &str = "/sapi/v1/margin/listen-key";
const AVAILABLE_INVENTORY_ENDPOINT: &str = "/sapi/v1/margin/available-inventory";
const BORROW_REPAY_ENDPOINT: &str = "/sapi/v1/margin/borrow-repay";

/// Listen keys expire after 60 minutes without a keepalive
pub const DEFAULT_LISTEN_KEY_KEEPALIVE: Duration = Duration::from_secs(30 * 60);

fn listen_key_request(request: ApiRequest, listen_key: &str) -> ApiRequest {
    request
        .security(SecurityType::ApiKey)
        .form("listenKey", listen_key)
}

/// PUT that extends a margin listen key's validity
pub fn keepalive_request(listen_key: &str) -> ApiRequest {
    listen_key_request(ApiRequest::put(ApiHost::Spot, LISTEN_KEY_ENDPOINT), listen_key)
}

impl BinanceClient {
    /// Open a margin user data stream
    ///
    /// POST /sapi/v1/margin/listen-key
    pub async fn start_margin_user_stream(&self) -> Result<String> {
        let request =
            ApiRequest::post(ApiHost::Spot, LISTEN_KEY_ENDPOINT).security(SecurityType::ApiKey);
        let response: ListenKeyResponse = self.send_json(request).await?;
        info!("margin listen key created");
        Ok(response.listen_key)
    }

    /// PUT /sapi/v1/margin/listen-key
    pub async fn keepalive_margin_user_stream(&self, listen_key: &str) -> Result<()> {
        self.execute(keepalive_request(listen_key)).await?;
        Ok(())
    }

    /// DELETE /sapi/v1/margin/listen-key
    pub async fn close_margin_user_stream(&self, listen_key: &str) -> Result<()> {
        let request = listen_key_request(
            ApiRequest::delete(ApiHost::Spot, LISTEN_KEY_ENDPOINT),
            listen_key,
        );
        self.execute(request).await?;
        Ok(())
    }

    /// Assets currently available to borrow
    ///
    /// GET /sapi/v1/margin/available-inventory?type={MARGIN|ISOLATED}
    pub async fn get_available_inventory(
        &self,
        margin_type: MarginType,
    ) -> Result<AvailableInventory> {
        let request = ApiRequest::get(ApiHost::Spot, AVAILABLE_INVENTORY_ENDPOINT)
            .security(SecurityType::Signed)
            .query("type", margin_type.as_str());
        self.send_json(request).await
    }

    /// Borrow or repay against a cross or isolated margin account
    ///
    /// POST /sapi/v1/margin/borrow-repay
    pub async fn margin_borrow_repay(
        &self,
        request: &BorrowRepayRequest,
    ) -> Result<TransactionResponse> {
        let mut api_request = ApiRequest::post(ApiHost::Spot, BORROW_REPAY_ENDPOINT)
            .security(SecurityType::Signed);
        if request.is_isolated {
            api_request = api_request.query("isIsolated", "TRUE");
        }
        let api_request = api_request
            .query_opt("symbol", request.symbol.as_deref())
            .form("asset", &request.asset)
            .form("amount", request.amount)
            .form("type", request.kind.as_str());
        self.send_json(api_request).await
    }
}

/// Extend `listen_key` every `interval` until `stop` is cancelled.
///
/// Failed keepalives are logged and retried on the next tick.
pub fn spawn_listen_key_keepalive(
    executor: Arc<dyn RequestExecutor>,
    listen_key: String,
    interval: Duration,
    stop: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = stop.cancelled() => {
                    debug!("listen key keepalive stopped");
                    break;
                }
                _ = ticker.tick() => {
                    match executor.execute(keepalive_request(&listen_key)).await {
                        Ok(_) => debug!("listen key keepalive sent"),
                        Err(err) => warn!(error = %err, "listen key keepalive failed"),
                    }
                }
            }
        }
    })
}
