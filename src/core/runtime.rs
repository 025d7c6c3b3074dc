//! The alert cycle: tickers -> RSI fan-out -> classification -> webhook

use crate::config::Config;
use crate::core::scheduler::CycleJob;
use crate::error::CycleError;
use crate::models::{IndicatorReading, Perspective};
use crate::notification::{Branding, NotificationBuilder};
use crate::services::{
    fetch_latest_readings, filter_tickers, ChromeHeatmapCapture, DiscordWebhook, ImageCapture,
    IndicatorProvider, NasdaqTickerSource, Notifier, PolygonRsiClient, StaticTickerSource,
    TickerSource,
};
use crate::signals::{Classifier, Thresholds};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info, warn};

pub const DEFAULT_TICKER_LIMIT: usize = 1000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Nothing to report, no request made.
    #[default]
    Skipped,
    Delivered,
    Failed,
}

/// Summary of one cycle, mostly for logs and tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    pub tickers: usize,
    pub readings: usize,
    pub failures: usize,
    pub perspectives: Vec<Perspective>,
    pub delivery: DeliveryOutcome,
}

pub struct AlertRuntime {
    tickers: Arc<dyn TickerSource>,
    indicators: Arc<dyn IndicatorProvider>,
    notifier: Arc<dyn Notifier>,
    heatmap: Option<Arc<dyn ImageCapture>>,
    classifier: Classifier,
    builder: NotificationBuilder,
    ticker_limit: usize,
}

impl AlertRuntime {
    pub fn new(
        tickers: Arc<dyn TickerSource>,
        indicators: Arc<dyn IndicatorProvider>,
        notifier: Arc<dyn Notifier>,
        classifier: Classifier,
        builder: NotificationBuilder,
    ) -> Self {
        Self {
            tickers,
            indicators,
            notifier,
            heatmap: None,
            classifier,
            builder,
            ticker_limit: DEFAULT_TICKER_LIMIT,
        }
    }

    /// Wire the production collaborators. All HTTP traffic shares one connection pool.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let tickers: Arc<dyn TickerSource> = match &config.tickers {
            Some(list) => Arc::new(StaticTickerSource::new(list.clone())),
            None => Arc::new(NasdaqTickerSource::new(
                config.ticker_list_url.clone(),
                client.clone(),
            )),
        };
        let indicators = Arc::new(PolygonRsiClient::with_client(
            config.rsi_endpoint.clone(),
            config.polygon_api_key.clone(),
            client.clone(),
        ));
        let branding = Branding::default();
        let notifier = Arc::new(DiscordWebhook::new(
            config.discord_webhook_url.clone(),
            branding.clone(),
            client,
        ));

        let mut runtime = Self::new(
            tickers,
            indicators,
            notifier,
            Classifier::new(Thresholds::from_config(config)),
            NotificationBuilder::new(branding, config.embed_style),
        )
        .with_ticker_limit(config.ticker_limit);

        if config.heatmap.enabled {
            runtime = runtime.with_heatmap(Arc::new(ChromeHeatmapCapture::new(&config.heatmap)));
        }
        Ok(runtime)
    }

    pub fn with_heatmap(mut self, capture: Arc<dyn ImageCapture>) -> Self {
        self.heatmap = Some(capture);
        self
    }

    pub fn with_ticker_limit(mut self, limit: usize) -> Self {
        self.ticker_limit = limit;
        self
    }

    /// Run one full cycle. Only a ticker-source failure aborts it.
    pub async fn execute(&self) -> Result<CycleReport, CycleError> {
        let raw = self.tickers.fetch_tickers().await?;
        let mut tickers = filter_tickers(raw.as_slice());
        tickers.truncate(self.ticker_limit);

        if tickers.is_empty() {
            warn!(raw = raw.len(), "no tickers fetched, skipping cycle");
            return Ok(CycleReport::default());
        }

        info!(
            count = tickers.len(),
            "checking RSI for {} tickers on {}",
            tickers.len(),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );

        if let Some(capture) = &self.heatmap {
            self.post_heatmap(capture.as_ref()).await;
        }

        let results = fetch_latest_readings(self.indicators.as_ref(), &tickers).await;
        let failures = results.iter().filter(|r| r.is_err()).count();
        let readings: Vec<IndicatorReading> = results.into_iter().filter_map(Result::ok).collect();

        let perspectives = self.classifier.classify(&readings);
        info!(
            perspectives = perspectives.len(),
            "{} tickers outside the neutral band",
            perspectives.len()
        );

        let delivery = self.notify(&perspectives, Utc::now()).await;

        Ok(CycleReport {
            tickers: tickers.len(),
            readings: readings.len(),
            failures,
            perspectives,
            delivery,
        })
    }

    /// Build and send the cycle's message. Delivery failures are logged, never raised.
    pub async fn notify(
        &self,
        perspectives: &[Perspective],
        sent_at: DateTime<Utc>,
    ) -> DeliveryOutcome {
        let Some(payload) = self.builder.build(perspectives, sent_at) else {
            return DeliveryOutcome::Skipped;
        };

        match self.notifier.send_payload(&payload).await {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(e) => {
                error!(error = %e, "failed to send webhook: {}", e);
                DeliveryOutcome::Failed
            }
        }
    }

    async fn post_heatmap(&self, capture: &dyn ImageCapture) {
        let path = match capture.capture().await {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "heatmap capture failed, continuing without image");
                return;
            }
        };

        if let Err(e) = self.notifier.send_image(&path).await {
            error!(error = %e, path = %path.display(), "failed to send heatmap image");
        }
    }
}

#[async_trait]
impl CycleJob for AlertRuntime {
    async fn run_cycle(&self) -> Result<(), CycleError> {
        let report = self.execute().await?;
        info!(
            tickers = report.tickers,
            readings = report.readings,
            failures = report.failures,
            delivery = ?report.delivery,
            "cycle finished"
        );
        Ok(())
    }
}
