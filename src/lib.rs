//! tokcomments - TikTok comment and reply scraper
//!
//! Fetches every top-level comment of a video and every reply of each
//! comment by paginating the platform's comment API to exhaustion.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`crawler`] - Transport, two-level pagination client and batch pipeline
//! - [`models`] - Comments, replies and aggregated results
//! - [`storage`] - JSON, text and CSV output files
//! - [`error`] - Unified error type
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use tokcomments::config::Config;
//! use tokcomments::crawler::client_from_config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let client = client_from_config(&config)?;
//!     let set = client.fetch_all_comments("7488733265222798614").await?;
//!     println!("{} comments, {} replies", set.comments.len(), set.reply_count());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crawler;
pub mod error;
pub mod models;
pub mod storage;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::crawler::{CommentClient, HttpTransport, Transport};
    pub use crate::error::{Error, ErrorCategory, Result, ToolErrorTrait};
    pub use crate::models::{Comment, CommentSet, Reply, VideoRecord};
    pub use crate::storage::OutputWriter;
}

// Direct re-exports for convenience
pub use models::{Comment, CommentSet, Reply};
