//! Capture the stock heatmap once and post it to the webhook.

use dotenvy::dotenv;
use rsiwatch::config::Config;
use rsiwatch::logging;
use rsiwatch::notification::Branding;
use rsiwatch::services::{ChromeHeatmapCapture, DiscordWebhook, ImageCapture, Notifier};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let config = Config::from_env()?;
    let client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()?;

    let capture = ChromeHeatmapCapture::new(&config.heatmap);
    let path = capture.capture().await?;

    let webhook = DiscordWebhook::new(config.discord_webhook_url.clone(), Branding::default(), client);
    webhook.send_image(&path).await?;

    info!(path = %path.display(), "Heatmap posted");
    Ok(())
}
