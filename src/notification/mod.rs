//! Webhook message rendering

pub mod builder;
pub mod payload;

pub use builder::{
    EmbedStyle, NotificationBuilder, CONTENT_SOFT_LIMIT, FALLBACK_EMBEDS, MAX_EMBEDS,
    PAYLOAD_LIMIT,
};
pub use payload::{Branding, Embed, EmbedField, EmbedFooter, EmbedThumbnail, WebhookPayload};
