/*
[INPUT]:  Symbols on the command line (default BTCUSDT ETHUSDT)
[OUTPUT]: Best bid/ask updates printed for 10 seconds
[POS]:    Examples - combined stream subscription
[UPDATE]: When the stream facade API changes
*/

use std::time::Duration;

use binance_stream_adapter::{StreamConfig, StreamService};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut symbols: Vec<String> = std::env::args().skip(1).collect();
    if symbols.is_empty() {
        symbols = vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()];
    }

    let service = StreamService::new(StreamConfig::default());
    let handle = service.combined_book_ticker_serve(
        &symbols,
        |event| {
            info!(
                symbol = %event.symbol,
                bid = %event.best_bid_price,
                ask = %event.best_ask_price,
                "book ticker"
            );
        },
        |err| error!(error = %err, "stream error"),
    )?;
    info!(endpoint = handle.endpoint(), "subscribed");

    tokio::select! {
        _ = handle.wait() => info!("stream ended"),
        _ = tokio::time::sleep(Duration::from_secs(10)) => handle.stop_and_wait().await,
    }
    Ok(())
}
