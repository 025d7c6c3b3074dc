//! Discord webhook wire types

use serde::{Deserialize, Serialize};

pub const DEFAULT_USERNAME: &str = "RSI Bot";
pub const DEFAULT_AVATAR_URL: &str = "https://i.imgur.com/4M34hi2.png";
pub const DEFAULT_FOOTER: &str = "Powered by Polygon.io | RSI Bot";

/// Sender identity attached to every message.
#[derive(Debug, Clone, PartialEq)]
pub struct Branding {
    pub username: String,
    pub avatar_url: String,
    pub footer: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            username: DEFAULT_USERNAME.to_string(),
            avatar_url: DEFAULT_AVATAR_URL.to_string(),
            footer: DEFAULT_FOOTER.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
}

impl WebhookPayload {
    /// Length of the compact JSON encoding, in characters. Non-ASCII text is not
    /// `\u`-escaped, so an emoji counts as one character.
    pub fn serialized_len(&self) -> usize {
        serde_json::to_string(self)
            .map(|s| s.chars().count())
            .unwrap_or(usize::MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    #[serde(default)]
    pub fields: Vec<EmbedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedThumbnail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedThumbnail {
    pub url: String,
}
