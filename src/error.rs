//! Unified error handling for the tokcomments crate
//!
//! This module provides a unified error type that consolidates the domain-specific
//! errors into a single `Error` enum, while keeping the detailed errors available.
//!
//! # Architecture
//!
//! - [`ToolErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! # Usage
//!
//! ```rust,ignore
//! use tokcomments::error::{Error, ToolErrorTrait};
//!
//! fn report(err: Error) {
//!     eprintln!("[{}] {}", err.category().desc(), err);
//! }
//! ```

use thiserror::Error;

pub use crate::utils::error::{FetchError, ScrapeError};

/// Common trait for all tokcomments error types
pub trait ToolErrorTrait: std::error::Error {
    /// Check if this error is likely transient (a later run may succeed)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, status codes)
    Network,
    /// Response decoding errors
    Parsing,
    /// Storage and I/O errors
    Storage,
}

impl ErrorCategory {
    /// Short human-readable description
    pub fn desc(&self) -> &'static str {
        match self {
            Self::Network => "network error",
            Self::Parsing => "parsing error",
            Self::Storage => "storage error",
        }
    }
}

impl ToolErrorTrait for FetchError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout => true,
            Self::ServerError(status) => matches!(status, 429 | 500 | 502 | 503 | 504),
            Self::Decode(_) | Self::MissingComments | Self::Api { .. } | Self::InvalidUrl(_) => {
                false
            }
        }
    }

    fn category(&self) -> ErrorCategory {
        if self.is_transport() {
            ErrorCategory::Network
        } else {
            ErrorCategory::Parsing
        }
    }
}

impl ToolErrorTrait for ScrapeError {
    fn is_recoverable(&self) -> bool {
        self.fetch_error().is_recoverable()
    }

    fn category(&self) -> ErrorCategory {
        self.fetch_error().category()
    }
}

/// Unified error type for the tokcomments crate
#[derive(Error, Debug)]
pub enum Error {
    /// Pagination of a video or comment failed
    #[error("Scrape error: {0}")]
    Scrape(#[from] ScrapeError),

    /// Output files could not be written; `context` carries the full cause chain
    #[error("Storage error: {context}")]
    Storage {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ToolErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Scrape(e) => e.is_recoverable(),
            Self::Storage { .. } => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Scrape(e) => e.category(),
            Self::Storage { .. } => ErrorCategory::Storage,
        }
    }
}

impl Error {
    /// Wrap an output failure, keeping every context layer in the message
    pub fn storage(err: anyhow::Error) -> Self {
        Self::Storage {
            context: format!("{err:#}"),
            source: err.into(),
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    use anyhow::Context;
    use std::error::Error as _;

    #[test]
    fn test_error_category() {
        let network = Error::Scrape(ScrapeError::Video {
            video_id: "1".to_string(),
            page: 1,
            source: FetchError::Timeout,
        });
        assert_eq!(network.category(), ErrorCategory::Network);

        let decode = Error::Scrape(ScrapeError::Video {
            video_id: "1".to_string(),
            page: 2,
            source: FetchError::MissingComments,
        });
        assert_eq!(decode.category(), ErrorCategory::Parsing);
    }

    #[test]
    fn test_is_recoverable() {
        assert!(FetchError::Timeout.is_recoverable());
        assert!(FetchError::ServerError(503).is_recoverable());
        assert!(!FetchError::ServerError(404).is_recoverable());
        assert!(!FetchError::Decode("eof".into()).is_recoverable());
    }

    #[test]
    fn test_scrape_error_conversion() {
        let scrape_err = ScrapeError::Video {
            video_id: "1".to_string(),
            page: 1,
            source: FetchError::ServerError(500),
        };
        let unified: Error = scrape_err.into();
        assert!(matches!(unified, Error::Scrape(_)));
        assert_eq!(unified.category(), ErrorCategory::Network);
        assert!(unified.is_recoverable());
    }

    #[test]
    fn test_storage_error_keeps_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only disk");
        let err = Error::storage(
            anyhow::Error::new(io).context("Failed to write file: out/1.json"),
        );

        assert_eq!(err.category(), ErrorCategory::Storage);
        assert_eq!(err.category().desc(), "storage error");
        assert!(!err.is_recoverable());

        let message = err.to_string();
        assert!(message.contains("Failed to write file: out/1.json"));
        assert!(message.contains("read-only disk"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_storage_error_from_result() {
        let result: anyhow::Result<()> = Err(std::io::Error::other("disk full")).context("saving");
        let err = result.map_err(Error::storage).unwrap_err();
        assert_eq!(err.to_string(), "Storage error: saving: disk full");
    }
}
