//! Heatmap screenshots through a headless Chrome/Chromium binary

use crate::config::HeatmapConfig;
use crate::error::CaptureError;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, info};

pub const SCREENSHOT_FILE: &str = "tradingview_heatmap.png";

#[async_trait]
pub trait ImageCapture: Send + Sync {
    /// Capture an image and return where it was written.
    async fn capture(&self) -> Result<PathBuf, CaptureError>;
}

pub struct ChromeHeatmapCapture {
    chrome_bin: String,
    url: String,
    output_dir: PathBuf,
    window_size: (u32, u32),
}

impl ChromeHeatmapCapture {
    pub fn new(config: &HeatmapConfig) -> Self {
        Self {
            chrome_bin: config.chrome_bin.clone(),
            url: config.url.clone(),
            output_dir: PathBuf::from(&config.output_dir),
            window_size: (1920, 1080),
        }
    }

    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(SCREENSHOT_FILE)
    }

    /// Browser arguments for a single screenshot.
    pub fn browser_args(&self) -> Vec<String> {
        vec![
            "--headless=new".to_string(),
            "--disable-gpu".to_string(),
            "--hide-scrollbars".to_string(),
            // Lets the page render its client-side widgets before the shot.
            "--virtual-time-budget=1000".to_string(),
            format!("--window-size={},{}", self.window_size.0, self.window_size.1),
            format!("--screenshot={}", self.output_path().display()),
            self.url.clone(),
        ]
    }
}

#[async_trait]
impl ImageCapture for ChromeHeatmapCapture {
    async fn capture(&self) -> Result<PathBuf, CaptureError> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self.output_path();

        debug!(bin = %self.chrome_bin, url = %self.url, "launching headless browser");
        let output = Command::new(&self.chrome_bin)
            .args(self.browser_args())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(CaptureError::Browser {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(CaptureError::MissingOutput(path.display().to_string()));
        }

        info!(path = %path.display(), "heatmap captured");
        Ok(path)
    }
}
