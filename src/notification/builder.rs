//! Size-bounded payload assembly
//!
//! Discord rejects messages whose content exceeds 2000 characters, that carry more than
//! 10 embeds, or whose embeds add up to more than 6000 characters. The builder keeps a
//! margin under the content limit and degrades in steps until the payload fits:
//! all embeds (max 10), then 5, then content only.

use crate::models::{Perspective, RsiStatus};
use crate::notification::payload::{
    Branding, Embed, EmbedField, EmbedFooter, EmbedThumbnail, WebhookPayload,
};
use chrono::{DateTime, SecondsFormat, Utc};
use std::str::FromStr;
use tracing::{info, warn};

pub const CONTENT_SOFT_LIMIT: usize = 1900;
pub const MAX_EMBEDS: usize = 10;
pub const FALLBACK_EMBEDS: usize = 5;
pub const PAYLOAD_LIMIT: usize = 6000;

const OVERBOUGHT_COLOR: u32 = 0xFF5555;
const OVERSOLD_COLOR: u32 = 0x55FF55;
const ELLIPSIS: &str = "...";

/// How perspectives are laid out in embeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmbedStyle {
    /// One embed per perspective.
    #[default]
    Detailed,
    /// A single embed with one inline field per perspective.
    Compact,
}

impl FromStr for EmbedStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "detailed" => Ok(EmbedStyle::Detailed),
            "compact" => Ok(EmbedStyle::Compact),
            other => Err(format!("unknown embed style '{}'", other)),
        }
    }
}

pub struct NotificationBuilder {
    branding: Branding,
    style: EmbedStyle,
}

impl NotificationBuilder {
    pub fn new(branding: Branding, style: EmbedStyle) -> Self {
        Self { branding, style }
    }

    /// Build the message for one cycle, or `None` when there is nothing to report.
    ///
    /// `sent_at` is stamped on every embed; the output is otherwise a pure function of
    /// the perspectives.
    pub fn build(
        &self,
        perspectives: &[Perspective],
        sent_at: DateTime<Utc>,
    ) -> Option<WebhookPayload> {
        if perspectives.is_empty() {
            info!("no perspectives to send");
            return None;
        }

        let content = self.summary(perspectives);

        if perspectives.len() > MAX_EMBEDS {
            warn!(
                dropped = perspectives.len() - MAX_EMBEDS,
                first_dropped = %perspectives[MAX_EMBEDS].ticker,
                "exceeded {} embeds, skipping {} and beyond",
                MAX_EMBEDS,
                perspectives[MAX_EMBEDS].ticker
            );
        }
        let shown = &perspectives[..perspectives.len().min(MAX_EMBEDS)];

        let mut payload = WebhookPayload {
            username: self.branding.username.clone(),
            avatar_url: Some(self.branding.avatar_url.clone()),
            content,
            embeds: self.embeds(shown, sent_at),
        };
        if payload.serialized_len() <= PAYLOAD_LIMIT {
            return Some(payload);
        }

        warn!(
            size = payload.serialized_len(),
            "payload exceeds {} characters, trimming embeds", PAYLOAD_LIMIT
        );
        payload.embeds = self.embeds(&shown[..shown.len().min(FALLBACK_EMBEDS)], sent_at);
        if payload.serialized_len() <= PAYLOAD_LIMIT {
            return Some(payload);
        }

        warn!(
            size = payload.serialized_len(),
            "payload still too large, sending content only"
        );
        payload.embeds.clear();
        payload.content = truncate_with_ellipsis(payload.content, CONTENT_SOFT_LIMIT);
        Some(payload)
    }

    /// Content line listing every oversold ticker, including ones without an embed.
    pub fn summary(&self, perspectives: &[Perspective]) -> String {
        let oversold: Vec<&str> = perspectives
            .iter()
            .filter(|p| p.status == RsiStatus::Oversold)
            .map(|p| p.ticker.as_str())
            .collect();

        let listed = if oversold.is_empty() {
            "None".to_string()
        } else {
            oversold.join(", ")
        };

        truncate_with_ellipsis(
            format!("**Oversold Alerts:**\n{}\n", listed),
            CONTENT_SOFT_LIMIT,
        )
    }

    fn embeds(&self, perspectives: &[Perspective], sent_at: DateTime<Utc>) -> Vec<Embed> {
        let timestamp = sent_at.to_rfc3339_opts(SecondsFormat::Secs, true);
        match self.style {
            EmbedStyle::Detailed => perspectives
                .iter()
                .map(|p| self.detailed_embed(p, &timestamp))
                .collect(),
            EmbedStyle::Compact if perspectives.is_empty() => Vec::new(),
            EmbedStyle::Compact => vec![self.compact_embed(perspectives, &timestamp)],
        }
    }

    fn detailed_embed(&self, perspective: &Perspective, timestamp: &str) -> Embed {
        let date = perspective
            .observed_at()
            .map(|d| d.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "unknown".to_string());

        Embed {
            title: format!(
                "{} RSI Alert {}",
                perspective.ticker,
                trend_icon(perspective.status)
            ),
            description: format!("Here's the latest RSI status for **{}**", perspective.ticker),
            color: status_color(perspective.status),
            fields: vec![
                EmbedField {
                    name: "📊 RSI Value".to_string(),
                    value: format!("`{:.2}`", perspective.value),
                    inline: true,
                },
                EmbedField {
                    name: "⚠️ Status".to_string(),
                    value: format!("**{}**", perspective.status),
                    inline: true,
                },
                EmbedField {
                    name: "📅 Date".to_string(),
                    value: date,
                    inline: false,
                },
            ],
            footer: Some(EmbedFooter {
                text: self.branding.footer.clone(),
            }),
            timestamp: Some(timestamp.to_string()),
            thumbnail: Some(EmbedThumbnail {
                url: self.branding.avatar_url.clone(),
            }),
        }
    }

    fn compact_embed(&self, perspectives: &[Perspective], timestamp: &str) -> Embed {
        // Colored by the first entry; the fields carry the per-ticker status.
        let color = perspectives
            .first()
            .map(|p| status_color(p.status))
            .unwrap_or(OVERSOLD_COLOR);

        Embed {
            title: "RSI Alerts".to_string(),
            description: "Latest RSI statuses:".to_string(),
            color,
            fields: perspectives
                .iter()
                .map(|p| EmbedField {
                    name: format!("{} {}", p.ticker, trend_icon(p.status)),
                    value: format!("RSI: `{:.1}` | {}", p.value, p.status),
                    inline: true,
                })
                .collect(),
            footer: Some(EmbedFooter {
                text: self.branding.footer.clone(),
            }),
            timestamp: Some(timestamp.to_string()),
            thumbnail: None,
        }
    }
}

impl Default for NotificationBuilder {
    fn default() -> Self {
        Self::new(Branding::default(), EmbedStyle::default())
    }
}

fn status_color(status: RsiStatus) -> u32 {
    match status {
        RsiStatus::Overbought => OVERBOUGHT_COLOR,
        RsiStatus::Oversold => OVERSOLD_COLOR,
    }
}

fn trend_icon(status: RsiStatus) -> &'static str {
    match status {
        RsiStatus::Overbought => "📈",
        RsiStatus::Oversold => "📉",
    }
}

/// Cut `text` to at most `limit` characters, marking the cut with an ellipsis.
pub fn truncate_with_ellipsis(text: String, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text;
    }
    let mut cut: String = text
        .chars()
        .take(limit.saturating_sub(ELLIPSIS.len()))
        .collect();
    cut.push_str(ELLIPSIS);
    cut
}
