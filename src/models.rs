// Core data structures for the comment scraper

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::utils::extract_tags;

/// Top-level comment attached directly to a video
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author_username: String,
    pub author_nickname: String,
    pub text: String,
    /// Server-reported timestamp, kept opaque
    pub created_at: String,
    pub avatar_url: Option<String>,
    /// Reply total claimed by the API; only decides whether replies are fetched
    pub reported_reply_count: u64,
    #[serde(default)]
    pub replies: Vec<Reply>,
}

/// Reply attached to a top-level comment.
///
/// The remote protocol has no third level, so a reply carries no replies of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub id: String,
    pub author_username: String,
    pub author_nickname: String,
    pub text: String,
    pub created_at: String,
    pub avatar_url: Option<String>,
    pub reported_reply_count: u64,
}

impl Comment {
    /// Whether the API claims this comment has replies worth fetching
    pub fn expects_replies(&self) -> bool {
        self.reported_reply_count > 0
    }

    /// This comment plus all of its replies
    pub fn total_count(&self) -> usize {
        1 + self.replies.len()
    }

    /// `created_at` interpreted as unix seconds, when it is numeric
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_unix_seconds(&self.created_at)
    }
}

impl Reply {
    /// `created_at` interpreted as unix seconds, when it is numeric
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_unix_seconds(&self.created_at)
    }
}

fn parse_unix_seconds(raw: &str) -> Option<DateTime<Utc>> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

/// Video-level metadata taken from the first comment of the first page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMeta {
    pub caption: Option<String>,
    pub video_url: Option<String>,
}

/// One page of top-level comments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentPage {
    pub comments: Vec<Comment>,
    /// Present only on a non-empty first page
    pub metadata: Option<VideoMeta>,
    pub has_more: bool,
}

impl CommentPage {
    /// Terminal page: no comments, no metadata, no continuation
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    /// Whether the aggregator should request the following page
    pub fn should_continue(&self) -> bool {
        !self.comments.is_empty() && self.has_more
    }
}

/// Every comment of one video with their replies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentSet {
    pub comments: Vec<Comment>,
    pub caption: Option<String>,
    pub video_url: Option<String>,
    /// Always true on a set handed back by the client
    pub exhausted: bool,
}

impl CommentSet {
    /// Fully drained result
    pub fn drained(comments: Vec<Comment>, metadata: Option<VideoMeta>) -> Self {
        let VideoMeta { caption, video_url } = metadata.unwrap_or_default();
        Self {
            comments,
            caption,
            video_url,
            exhausted: true,
        }
    }

    pub fn reply_count(&self) -> usize {
        self.comments.iter().map(|c| c.replies.len()).sum()
    }

    /// Top-level comments plus replies
    pub fn total_count(&self) -> usize {
        self.comments.iter().map(Comment::total_count).sum()
    }
}

/// Per-video output record written by the storage layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    pub original_url: String,
    pub video_id: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub tags: Vec<String>,
    pub total_comments: usize,
    pub comments: Vec<Comment>,
}

impl VideoRecord {
    pub fn new(original_url: &str, video_id: &str, set: CommentSet) -> Self {
        let tags = extract_tags(set.caption.as_deref().unwrap_or_default());
        Self {
            original_url: original_url.to_string(),
            video_id: video_id.to_string(),
            description: set.caption,
            video_url: set.video_url,
            tags,
            total_comments: set.comments.len(),
            comments: set.comments,
        }
    }
}

/// Outcome of a batch scrape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeSummary {
    pub total_urls: usize,
    pub successful_scrapes: usize,
    pub failed_scrapes: usize,
    /// Video id to failure message
    pub failures: BTreeMap<String, String>,
    pub extraction_date: DateTime<Utc>,
    pub videos: Vec<VideoRecord>,
}

impl ScrapeSummary {
    pub fn new(total_urls: usize) -> Self {
        Self {
            total_urls,
            successful_scrapes: 0,
            failed_scrapes: 0,
            failures: BTreeMap::new(),
            extraction_date: Utc::now(),
            videos: Vec::new(),
        }
    }

    pub fn record_success(&mut self, record: VideoRecord) {
        self.successful_scrapes += 1;
        self.videos.push(record);
    }

    pub fn record_failure(&mut self, video_id: &str, message: impl Into<String>) {
        self.failed_scrapes += 1;
        self.failures.insert(video_id.to_string(), message.into());
    }

    pub fn total_comments(&self) -> usize {
        self.videos.iter().map(|v| v.total_comments).sum()
    }
}
