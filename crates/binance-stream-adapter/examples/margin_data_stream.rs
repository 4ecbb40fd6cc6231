/*
[INPUT]:  Config file path (YAML with credentials) as the first argument
[OUTPUT]: Margin liability and margin level events until Ctrl-C
[POS]:    Examples - listen key upkeep plus private stream
[UPDATE]: When margin REST or stream API changes
*/

use std::sync::Arc;

use binance_stream_adapter::http::DEFAULT_LISTEN_KEY_KEEPALIVE;
use binance_stream_adapter::{
    AdapterConfig, BinanceClient, RequestExecutor, StreamService, spawn_listen_key_keepalive,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = std::env::args()
        .nth(1)
        .ok_or("usage: margin_data_stream <config.yaml>")?;
    let config = AdapterConfig::from_file(&path)?;
    let credentials = config.credentials().ok_or("config has no credentials")?;

    let client = Arc::new(
        BinanceClient::for_environment(config.client_config(), config.environment)?
            .with_credentials(credentials),
    );
    let listen_key = client.start_margin_user_stream().await?;

    let stop = CancellationToken::new();
    let executor: Arc<dyn RequestExecutor> = client.clone();
    let keepalive = spawn_listen_key_keepalive(
        executor,
        listen_key.clone(),
        DEFAULT_LISTEN_KEY_KEEPALIVE,
        stop.clone(),
    );

    let service = StreamService::new(config.stream_config());
    let handle = service.margin_data_serve(
        &listen_key,
        |event| {
            info!(
                event = ?event.event,
                asset = %event.asset,
                principal = %event.principal,
                interest = %event.interest,
                "margin event"
            );
        },
        |err| error!(error = %err, "stream error"),
    )?;

    tokio::select! {
        _ = handle.wait() => warn!("margin stream ended"),
        _ = tokio::signal::ctrl_c() => handle.stop_and_wait().await,
    }

    stop.cancel();
    let _ = keepalive.await;
    client.close_margin_user_stream(&listen_key).await?;
    Ok(())
}
