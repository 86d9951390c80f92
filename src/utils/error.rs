//! Error types for the comment scraper
//!
//! This module defines the error types raised while talking to the comment API.

use thiserror::Error;

/// Errors that can occur while fetching a single page from the comment API
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status code
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Response body could not be decoded
    #[error("Decoding error: {0}")]
    Decode(String),

    /// Response body is a JSON object without a `comments` key
    #[error("Response has no comments field")]
    MissingComments,

    /// The platform reported an error inside a successful HTTP response
    #[error("API error {status_code}: {message}")]
    Api { status_code: i64, message: String },

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Transport-level failures, as opposed to malformed responses
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::ServerError(_) | Self::Timeout | Self::InvalidUrl(_)
        )
    }
}

/// A failed page request, tagged with the target whose pagination it aborted
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// Top-level comment pagination failed
    #[error("failed to fetch comments for video {video_id} (page {page}): {source}")]
    Video {
        video_id: String,
        page: u32,
        #[source]
        source: FetchError,
    },

    /// Reply pagination failed for one comment
    #[error(
        "failed to fetch replies for comment {comment_id} of video {video_id} (page {page}): {source}"
    )]
    Replies {
        video_id: String,
        comment_id: String,
        page: u32,
        #[source]
        source: FetchError,
    },
}

impl ScrapeError {
    /// Video whose fetch was abandoned
    pub fn video_id(&self) -> &str {
        match self {
            Self::Video { video_id, .. } | Self::Replies { video_id, .. } => video_id,
        }
    }

    /// Comment whose replies were being fetched, if any
    pub fn comment_id(&self) -> Option<&str> {
        match self {
            Self::Video { .. } => None,
            Self::Replies { comment_id, .. } => Some(comment_id),
        }
    }

    /// Underlying fetch failure
    pub fn fetch_error(&self) -> &FetchError {
        match self {
            Self::Video { source, .. } | Self::Replies { source, .. } => source,
        }
    }
}
