//! Discord webhook delivery

use crate::error::DeliveryError;
use crate::notification::{Branding, WebhookPayload};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use std::path::Path;
use tracing::{error, info};

/// Sink for alert payloads. Any outcome other than `Ok` is logged by the caller and not retried.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_payload(&self, payload: &WebhookPayload) -> Result<(), DeliveryError>;

    /// Post a PNG as a standalone message.
    async fn send_image(&self, path: &Path) -> Result<(), DeliveryError>;
}

pub struct DiscordWebhook {
    client: reqwest::Client,
    url: String,
    branding: Branding,
}

impl DiscordWebhook {
    pub fn new(url: impl Into<String>, branding: Branding, client: reqwest::Client) -> Self {
        Self {
            client,
            url: url.into(),
            branding,
        }
    }

    fn check(status: StatusCode) -> Result<(), DeliveryError> {
        if status == StatusCode::NO_CONTENT {
            Ok(())
        } else {
            Err(DeliveryError::Status(status.as_u16()))
        }
    }
}

#[async_trait]
impl Notifier for DiscordWebhook {
    async fn send_payload(&self, payload: &WebhookPayload) -> Result<(), DeliveryError> {
        let response = self.client.post(&self.url).json(payload).send().await?;
        let status = response.status();
        match Self::check(status) {
            Ok(()) => {
                info!(embeds = payload.embeds.len(), "webhook sent successfully");
                Ok(())
            }
            Err(e) => {
                let body = response.text().await.unwrap_or_default();
                error!(status = status.as_u16(), body = %body, "failed to send webhook");
                Err(e)
            }
        }
    }

    async fn send_image(&self, path: &Path) -> Result<(), DeliveryError> {
        let bytes = tokio::fs::read(path).await?;
        let file = Part::bytes(bytes)
            .file_name("image.png")
            .mime_str("image/png")?;
        let form = Form::new()
            .text("username", self.branding.username.clone())
            .text("avatar_url", self.branding.avatar_url.clone())
            .part("file", file);

        let response = self.client.post(&self.url).multipart(form).send().await?;
        let status = response.status();
        Self::check(status).map_err(|e| {
            error!(status = status.as_u16(), path = %path.display(), "failed to send image");
            e
        })?;

        info!(path = %path.display(), "image sent successfully");
        Ok(())
    }
}
