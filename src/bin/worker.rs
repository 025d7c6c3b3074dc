//! RSI Watch Worker
//!
//! Runs the alert cycle immediately or daily at `SCHEDULE_TIME`, once or forever.

use dotenvy::dotenv;
use rsiwatch::config::{get_environment, Config};
use rsiwatch::core::{AlertRuntime, Scheduler, SchedulerConfig};
use rsiwatch::logging;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let config = Config::from_env()?;

    info!("Starting RSI Watch worker");
    info!(environment = %get_environment(), "Environment");
    info!(
        overbought = config.rsi_overbought,
        oversold = config.rsi_oversold,
        show_overbought = config.show_overbought,
        show_oversold = config.show_oversold,
        "RSI thresholds"
    );
    info!(
        use_timer = config.use_timer,
        schedule_time = %config.schedule_time.format("%H:%M"),
        loop_forever = config.loop_forever,
        "Schedule"
    );
    if let Some(tickers) = &config.tickers {
        info!(count = tickers.len(), "Using fixed ticker list: {}", tickers.join(", "));
    }

    let runtime = AlertRuntime::from_config(&config)?;
    let scheduler = Scheduler::new(SchedulerConfig::from_config(&config))?;

    let runs = scheduler.run(&runtime).await;
    info!(runs = runs, "Worker finished");

    Ok(())
}
