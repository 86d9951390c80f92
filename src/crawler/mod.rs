//! Comment crawling
//!
//! This module drives the TikTok comment API: the HTTP transport, the
//! two-level pagination client, video id extraction and the batch pipeline.

pub mod comment;
pub mod fetcher;
pub mod pipeline;
pub mod url;

pub use comment::CommentClient;
pub use fetcher::{HttpTransport, Transport};

use anyhow::{Context, Result};

use crate::config::Config;

/// Comment client over the production HTTP transport
pub type HttpCommentClient = CommentClient<HttpTransport>;

/// Build a comment client from configuration
pub fn client_from_config(config: &Config) -> Result<HttpCommentClient> {
    config.validate().context("Invalid configuration")?;

    let transport = HttpTransport::new(&config.client).context("Failed to create HTTP client")?;
    Ok(CommentClient::from_config(transport, &config.client))
}
