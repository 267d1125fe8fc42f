mod alert;
mod config;
mod data;
mod error;
mod messaging;
mod news;

use alert::AlertPipeline;
use config::Config;
use dotenv::dotenv;
use messaging::TwilioMessenger;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Checks the tracked stock's latest daily move and texts the headlines when it is large.
///
/// # Workflow Steps
/// - Load environment variables from .env file
/// - Fetch the daily series and compare the two most recent closes
/// - When the move exceeds 2%, fetch up to three recent articles
/// - Send one SMS per article to the configured recipient
///
/// # Returns
/// Returns an error (non-zero exit) when configuration is incomplete or
/// market data is unavailable. News and send failures are only logged.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;
    let client = config.http_client()?;
    let messenger = TwilioMessenger::new(&config, client.clone());

    let report = AlertPipeline::new(&config, client, &messenger)
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("Unable to fetch stock data for {}: {}", config.symbol, e))?;

    info!(
        symbol = %config.symbol,
        change = %report.change,
        notified = report.notified,
        articles = report.articles,
        sent = report.sent.len(),
        failed = report.failed,
        "run complete"
    );

    Ok(())
}
