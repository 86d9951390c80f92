//! TikTok comment API client
//!
//! This module fetches the top-level comments of a video and the replies of
//! each comment. The two endpoints paginate differently:
//!
//! - `/api/comment/list/` reports a `has_more` flag that is authoritative. The
//!   loop stops on an empty page or when the flag is false.
//! - `/api/comment/list/reply/` reports a flag that is not reliable. The loop
//!   stops on the first empty page and nothing else.
//!
//! Both endpoints take a zero-based `cursor` offset instead of a page number.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::crawler::fetcher::Transport;
use crate::models::{Comment, CommentPage, CommentSet, Reply, VideoMeta};
use crate::utils::error::{FetchError, ScrapeError};
use crate::utils::truncate_text;

// ============================================================================
// API Constants
// ============================================================================

/// Comment API endpoints and protocol constants
pub mod api {
    /// Top-level comment listing
    pub const COMMENT_LIST: &str = "/api/comment/list/";

    /// Replies of a single comment
    pub const REPLY_LIST: &str = "/api/comment/list/reply/";

    /// Application id sent as `aid`
    pub const APP_ID: u32 = 1988;

    /// Default page size (`count`)
    pub const PAGE_SIZE: u32 = 50;
}

// ============================================================================
// API Response Structures
// ============================================================================

/// Decoded body of either list endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentListResponse {
    /// `None` when the API sent `"comments": null`
    #[serde(default)]
    pub comments: Option<Vec<RawComment>>,

    /// Continuation flag; sent as a bool or as 0/1
    #[serde(default, deserialize_with = "lenient::flag")]
    pub has_more: bool,

    /// Platform status code, 0 on success
    #[serde(default, deserialize_with = "lenient::integer")]
    pub status_code: i64,

    #[serde(default, deserialize_with = "lenient::string")]
    pub status_msg: String,
}

impl CommentListResponse {
    /// Decode a response body.
    ///
    /// A body that is not an object, or an object without a `comments` key,
    /// is a decode failure. `"comments": null` and `"comments": []` both
    /// decode to an empty page.
    pub fn from_value(value: Value) -> Result<Self, FetchError> {
        let Some(object) = value.as_object() else {
            return Err(FetchError::Decode(format!(
                "expected a JSON object, got {}",
                json_kind(&value)
            )));
        };

        let has_comments = object.contains_key("comments");

        let response: Self =
            serde_json::from_value(value).map_err(|e| FetchError::Decode(e.to_string()))?;

        // Platform error bodies usually omit `comments`; report the status instead
        if response.status_code != 0 {
            return Err(FetchError::Api {
                status_code: response.status_code,
                message: response.status_msg,
            });
        }

        if !has_comments {
            return Err(FetchError::MissingComments);
        }

        Ok(response)
    }

    /// Raw comments of this page, empty when the API sent null
    pub fn into_comments(self) -> Vec<RawComment> {
        self.comments.unwrap_or_default()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Raw comment record.
///
/// Field names follow the platform's wire format; the aliases accept the
/// descriptive spelling (`comment_id`, `author`, `body`, ...). Every field is
/// optional and tolerates unexpected JSON types.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawComment {
    /// Comment id
    #[serde(default, alias = "comment_id", deserialize_with = "lenient::string")]
    pub cid: String,

    /// Comment body
    #[serde(default, alias = "body", deserialize_with = "lenient::string")]
    pub text: String,

    /// Creation time, usually unix seconds
    #[serde(default, alias = "created_at", deserialize_with = "lenient::string")]
    pub create_time: String,

    /// Reply total claimed by the API
    #[serde(default, alias = "reply_total", deserialize_with = "lenient::count")]
    pub reply_comment_total: u64,

    /// Author
    #[serde(default, alias = "author", deserialize_with = "lenient::object")]
    pub user: Option<RawUser>,

    /// Share metadata for the owning video
    #[serde(default, deserialize_with = "lenient::object")]
    pub share_info: Option<RawShareInfo>,

    /// Author image carried on the record itself rather than under `user`
    #[serde(default, deserialize_with = "lenient::object")]
    pub avatar_thumbnail: Option<RawImage>,
}

/// Author of a raw comment
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawUser {
    #[serde(default, alias = "username", deserialize_with = "lenient::string")]
    pub unique_id: String,

    #[serde(default, deserialize_with = "lenient::string")]
    pub nickname: String,

    #[serde(default, alias = "avatar_thumbnail", deserialize_with = "lenient::object")]
    pub avatar_thumb: Option<RawImage>,
}

/// Image resource, either a mirror list or a single resolved URL
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawImage {
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub url_list: Vec<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub first_url: Option<String>,
}

impl RawImage {
    /// `first_url` when present, else the first mirror
    pub fn primary_url(&self) -> Option<&str> {
        self.first_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .or_else(|| self.url_list.first().map(String::as_str))
    }
}

/// Share metadata embedded in every top-level comment
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawShareInfo {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub url: Option<String>,
}

impl RawComment {
    fn username(&self) -> String {
        self.user
            .as_ref()
            .map(|u| u.unique_id.clone())
            .unwrap_or_default()
    }

    fn nickname(&self) -> String {
        self.user
            .as_ref()
            .map(|u| u.nickname.clone())
            .unwrap_or_default()
    }

    fn avatar_url(&self) -> Option<String> {
        self.user
            .as_ref()
            .and_then(|u| u.avatar_thumb.as_ref())
            .and_then(RawImage::primary_url)
            .or_else(|| {
                self.avatar_thumbnail
                    .as_ref()
                    .and_then(RawImage::primary_url)
            })
            .map(str::to_string)
    }

    /// Caption and video URL from the embedded share metadata
    pub fn video_meta(&self) -> VideoMeta {
        let share = self.share_info.clone().unwrap_or_default();
        VideoMeta {
            caption: share.title,
            video_url: share.url,
        }
    }
}

// ============================================================================
// Normalization
// ============================================================================

/// Project a raw record into a top-level [`Comment`] without replies.
///
/// Missing fields become empty values; this never fails.
pub fn normalize_comment(raw: &RawComment) -> Comment {
    Comment {
        id: raw.cid.clone(),
        author_username: raw.username(),
        author_nickname: raw.nickname(),
        text: raw.text.clone(),
        created_at: raw.create_time.clone(),
        avatar_url: raw.avatar_url(),
        reported_reply_count: raw.reply_comment_total,
        replies: Vec::new(),
    }
}

/// Project a raw record into a [`Reply`]
pub fn normalize_reply(raw: &RawComment) -> Reply {
    Reply {
        id: raw.cid.clone(),
        author_username: raw.username(),
        author_nickname: raw.nickname(),
        text: raw.text.clone(),
        created_at: raw.create_time.clone(),
        avatar_url: raw.avatar_url(),
        reported_reply_count: raw.reply_comment_total,
    }
}

/// Zero-based offset for a one-based page number
pub fn cursor_for(page: u32, page_size: u32) -> u32 {
    page.saturating_sub(1).saturating_mul(page_size)
}

// ============================================================================
// Comment API Client
// ============================================================================

/// Comment API client.
///
/// Owns the transport it talks through. All requests for one video are
/// issued and awaited one after another.
pub struct CommentClient<T: Transport> {
    transport: T,
    app_id: u32,
    page_size: u32,
}

impl<T: Transport> CommentClient<T> {
    /// Create a client with the default app id and page size
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            app_id: api::APP_ID,
            page_size: api::PAGE_SIZE,
        }
    }

    /// Create a client using the app id and page size from configuration
    pub fn from_config(transport: T, config: &ClientConfig) -> Self {
        Self {
            transport,
            app_id: config.app_id,
            page_size: config.page_size.max(1),
        }
    }

    /// Override the page size (`count`); zero is raised to one
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Query parameters for one page of top-level comments
    pub fn comment_query(&self, video_id: &str, page: u32) -> Vec<(&'static str, String)> {
        vec![
            ("aid", self.app_id.to_string()),
            ("aweme_id", video_id.to_string()),
            ("count", self.page_size.to_string()),
            ("cursor", cursor_for(page, self.page_size).to_string()),
        ]
    }

    /// Query parameters for one page of replies
    pub fn reply_query(
        &self,
        video_id: &str,
        comment_id: &str,
        page: u32,
    ) -> Vec<(&'static str, String)> {
        vec![
            ("aid", self.app_id.to_string()),
            ("comment_id", comment_id.to_string()),
            ("item_id", video_id.to_string()),
            ("count", self.page_size.to_string()),
            ("cursor", cursor_for(page, self.page_size).to_string()),
        ]
    }

    async fn fetch_list(
        &self,
        endpoint: &str,
        query: &[(&'static str, String)],
    ) -> Result<CommentListResponse, FetchError> {
        let body = self.transport.get_json(endpoint, query).await?;
        CommentListResponse::from_value(body)
    }

    /// Fetch one page of top-level comments, resolving the replies of each.
    ///
    /// An empty page is terminal whatever the remote flag says. Metadata is
    /// only taken from a non-empty first page.
    pub async fn fetch_comment_page(
        &self,
        video_id: &str,
        page: u32,
    ) -> Result<CommentPage, ScrapeError> {
        let query = self.comment_query(video_id, page);

        tracing::debug!(
            video_id = %video_id,
            page,
            cursor = cursor_for(page, self.page_size),
            "Fetching comment page"
        );

        let response = self
            .fetch_list(api::COMMENT_LIST, &query)
            .await
            .map_err(|source| ScrapeError::Video {
                video_id: video_id.to_string(),
                page,
                source,
            })?;

        let has_more = response.has_more;
        let raw_comments = response.into_comments();

        let Some(first) = raw_comments.first() else {
            tracing::debug!(video_id = %video_id, page, "Empty comment page");
            return Ok(CommentPage::empty());
        };

        let metadata = (page == 1).then(|| first.video_meta());

        let mut comments = Vec::with_capacity(raw_comments.len());
        for raw in &raw_comments {
            comments.push(self.resolve_comment(video_id, raw).await?);
        }

        Ok(CommentPage {
            comments,
            metadata,
            has_more,
        })
    }

    /// Normalize a top-level record and attach its replies when the API
    /// reports any
    pub async fn resolve_comment(
        &self,
        video_id: &str,
        raw: &RawComment,
    ) -> Result<Comment, ScrapeError> {
        let mut comment = normalize_comment(raw);

        if comment.expects_replies() {
            comment.replies = self.fetch_all_replies(video_id, &comment.id).await?;
        }

        tracing::trace!(
            created_at = %comment.created_at,
            username = %comment.author_username,
            replies = comment.replies.len(),
            "{}",
            truncate_text(&comment.text, 80)
        );

        Ok(comment)
    }

    /// Fetch one page of replies for a comment
    pub async fn fetch_reply_page(
        &self,
        video_id: &str,
        comment_id: &str,
        page: u32,
    ) -> Result<Vec<Reply>, ScrapeError> {
        let query = self.reply_query(video_id, comment_id, page);

        tracing::debug!(
            video_id = %video_id,
            comment_id = %comment_id,
            page,
            cursor = cursor_for(page, self.page_size),
            "Fetching reply page"
        );

        let response = self
            .fetch_list(api::REPLY_LIST, &query)
            .await
            .map_err(|source| ScrapeError::Replies {
                video_id: video_id.to_string(),
                comment_id: comment_id.to_string(),
                page,
                source,
            })?;

        // has_more is not consulted; only an empty page ends the reply loop
        Ok(response.into_comments().iter().map(normalize_reply).collect())
    }

    /// Fetch every reply of a comment, stopping at the first empty page
    pub async fn fetch_all_replies(
        &self,
        video_id: &str,
        comment_id: &str,
    ) -> Result<Vec<Reply>, ScrapeError> {
        let mut all_replies = Vec::new();
        let mut page = 1;

        loop {
            let replies = self.fetch_reply_page(video_id, comment_id, page).await?;
            if replies.is_empty() {
                break;
            }

            all_replies.extend(replies);
            page += 1;
        }

        tracing::debug!(
            video_id = %video_id,
            comment_id = %comment_id,
            reply_count = all_replies.len(),
            pages = page,
            "Fetched replies for comment"
        );

        Ok(all_replies)
    }

    /// Fetch every top-level comment of a video with their replies.
    ///
    /// A video with no comments yields an empty, exhausted set. Any failed
    /// page abandons the whole video; nothing partial is returned.
    pub async fn fetch_all_comments(&self, video_id: &str) -> Result<CommentSet, ScrapeError> {
        let mut all_comments = Vec::new();
        let mut metadata: Option<VideoMeta> = None;
        let mut page = 1;

        loop {
            let result = self.fetch_comment_page(video_id, page).await?;

            if result.is_empty() {
                tracing::debug!(video_id = %video_id, page, "No more comments found");
                break;
            }

            let keep_going = result.should_continue();
            if metadata.is_none() {
                metadata = result.metadata;
            }
            all_comments.extend(result.comments);

            if !keep_going {
                tracing::debug!(video_id = %video_id, page, "Last page of comments reached");
                break;
            }

            page += 1;
        }

        let set = CommentSet::drained(all_comments, metadata);

        tracing::info!(
            video_id = %video_id,
            comments = set.comments.len(),
            replies = set.reply_count(),
            pages = page,
            "Fetched all comments"
        );

        Ok(set)
    }
}

// ============================================================================
// Lenient field decoding
// ============================================================================

/// Field deserializers that map unexpected JSON types to empty values
/// instead of failing the whole page.
mod lenient {
    use super::*;

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(opt_string(deserializer)?.unwrap_or_default())
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
    }

    /// Non-negative count. Fractions round up so that any positive claim
    /// stays nonzero; negatives and garbage are zero.
    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_u64().unwrap_or_else(|| positive_ceil(n.as_f64())),
            Value::String(s) => {
                let s = s.trim();
                s.parse()
                    .unwrap_or_else(|_| positive_ceil(s.parse::<f64>().ok()))
            }
            _ => 0,
        })
    }

    fn positive_ceil(value: Option<f64>) -> u64 {
        match value {
            Some(v) if v.is_finite() && v > 0.0 => v.ceil() as u64,
            _ => 0,
        }
    }

    pub fn integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_i64().unwrap_or(0),
            Value::String(s) => s.trim().parse().unwrap_or(0),
            _ => 0,
        })
    }

    pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Bool(b) => b,
            Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
            Value::String(s) => matches!(s.trim(), "1" | "true" | "True"),
            _ => false,
        })
    }

    pub fn string_list<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        })
    }

    pub fn object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let value = Value::deserialize(deserializer)?;
        if !value.is_object() {
            return Ok(None);
        }
        Ok(serde_json::from_value(value).ok())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    /// Request recorded by the scripted transport
    #[derive(Debug, Clone, PartialEq)]
    struct Call {
        endpoint: String,
        target: String,
        cursor: u32,
        count: u32,
    }

    /// In-memory transport answering from a script keyed by
    /// (endpoint, target id, cursor). Unscripted requests get an empty page.
    #[derive(Default)]
    struct ScriptedTransport {
        pages: HashMap<(String, String, u32), Value>,
        failures: HashSet<(String, String, u32)>,
        calls: Mutex<Vec<Call>>,
    }

    impl ScriptedTransport {
        fn comments(mut self, video_id: &str, cursor: u32, body: Value) -> Self {
            self.pages
                .insert((api::COMMENT_LIST.to_string(), video_id.to_string(), cursor), body);
            self
        }

        fn replies(mut self, comment_id: &str, cursor: u32, body: Value) -> Self {
            self.pages
                .insert((api::REPLY_LIST.to_string(), comment_id.to_string(), cursor), body);
            self
        }

        fn fail_comments(mut self, video_id: &str, cursor: u32) -> Self {
            self.failures
                .insert((api::COMMENT_LIST.to_string(), video_id.to_string(), cursor));
            self
        }

        fn fail_replies(mut self, comment_id: &str, cursor: u32) -> Self {
            self.failures
                .insert((api::REPLY_LIST.to_string(), comment_id.to_string(), cursor));
            self
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn calls_to(&self, endpoint: &str) -> Vec<Call> {
            self.calls()
                .into_iter()
                .filter(|c| c.endpoint == endpoint)
                .collect()
        }
    }

    fn param<'a>(query: &'a [(&str, String)], key: &str) -> &'a str {
        query
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or_default()
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn get_json(
            &self,
            endpoint: &str,
            query: &[(&str, String)],
        ) -> Result<Value, FetchError> {
            let target = if endpoint == api::REPLY_LIST {
                param(query, "comment_id")
            } else {
                param(query, "aweme_id")
            };
            let cursor: u32 = param(query, "cursor").parse().unwrap();
            let count: u32 = param(query, "count").parse().unwrap();

            self.calls.lock().unwrap().push(Call {
                endpoint: endpoint.to_string(),
                target: target.to_string(),
                cursor,
                count,
            });

            let key = (endpoint.to_string(), target.to_string(), cursor);
            if self.failures.contains(&key) {
                return Err(FetchError::ServerError(500));
            }

            Ok(self
                .pages
                .get(&key)
                .cloned()
                .unwrap_or_else(|| json!({"comments": [], "has_more": false})))
        }
    }

    fn raw(id: &str, reply_total: u64) -> Value {
        json!({
            "cid": id,
            "text": format!("comment {id}"),
            "create_time": 1700000000,
            "reply_comment_total": reply_total,
            "user": {
                "unique_id": format!("user_{id}"),
                "nickname": format!("User {id}"),
                "avatar_thumb": {"url_list": [format!("https://cdn.example/{id}.jpg")]}
            },
            "share_info": {"title": "Spring launch #beauty", "url": "https://www.tiktok.com/@brand/video/7100"}
        })
    }

    fn page(ids: &[(&str, u64)], has_more: bool) -> Value {
        let comments: Vec<Value> = ids.iter().map(|(id, n)| raw(id, *n)).collect();
        json!({"comments": comments, "has_more": if has_more { 1 } else { 0 }, "status_code": 0})
    }

    fn reply_page(ids: &[&str]) -> Value {
        let comments: Vec<Value> = ids.iter().map(|id| raw(id, 0)).collect();
        // The reply endpoint's flag is unreliable and must not end the loop
        json!({"comments": comments, "has_more": 0})
    }

    #[test]
    fn test_cursor_for() {
        assert_eq!(cursor_for(1, 50), 0);
        assert_eq!(cursor_for(2, 50), 50);
        assert_eq!(cursor_for(7, 20), 120);
        assert_eq!(cursor_for(0, 50), 0);
        for p in 1..100u32 {
            for s in [1u32, 2, 20, 50] {
                assert_eq!(cursor_for(p, s), (p - 1) * s);
            }
        }
    }

    #[test]
    fn test_normalize_full_record() {
        let record: RawComment = serde_json::from_value(raw("C1", 3)).unwrap();
        let comment = normalize_comment(&record);

        assert_eq!(comment.id, "C1");
        assert_eq!(comment.author_username, "user_C1");
        assert_eq!(comment.author_nickname, "User C1");
        assert_eq!(comment.text, "comment C1");
        assert_eq!(comment.created_at, "1700000000");
        assert_eq!(comment.avatar_url.as_deref(), Some("https://cdn.example/C1.jpg"));
        assert_eq!(comment.reported_reply_count, 3);
        assert!(comment.replies.is_empty());
    }

    #[test]
    fn test_normalize_sparse_record() {
        let record: RawComment = serde_json::from_value(json!({"cid": "7"})).unwrap();
        let comment = normalize_comment(&record);

        assert_eq!(comment.id, "7");
        assert_eq!(comment.author_username, "");
        assert_eq!(comment.author_nickname, "");
        assert_eq!(comment.text, "");
        assert_eq!(comment.created_at, "");
        assert!(comment.avatar_url.is_none());
        assert_eq!(comment.reported_reply_count, 0);
    }

    #[test]
    fn test_normalize_tolerates_wrong_types() {
        let record: RawComment = serde_json::from_value(json!({
            "cid": 7123,
            "text": null,
            "reply_comment_total": "4",
            "user": "deleted",
            "share_info": []
        }))
        .unwrap();
        let comment = normalize_comment(&record);

        assert_eq!(comment.id, "7123");
        assert_eq!(comment.text, "");
        assert_eq!(comment.reported_reply_count, 4);
        assert_eq!(comment.author_username, "");
        assert_eq!(record.video_meta(), VideoMeta::default());
    }

    #[test]
    fn test_normalize_descriptive_field_names() {
        let record: RawComment = serde_json::from_value(json!({
            "comment_id": "C9",
            "body": "hello",
            "created_at": "2024-05-01T10:00:00Z",
            "reply_total": 2,
            "author": {
                "username": "jdoe",
                "nickname": "J",
                "avatar_thumbnail": {"url_list": ["https://a/1.jpg", "https://a/2.jpg"]}
            }
        }))
        .unwrap();
        let reply = normalize_reply(&record);

        assert_eq!(reply.id, "C9");
        assert_eq!(reply.text, "hello");
        assert_eq!(reply.created_at, "2024-05-01T10:00:00Z");
        assert_eq!(reply.reported_reply_count, 2);
        assert_eq!(reply.author_username, "jdoe");
        assert_eq!(reply.avatar_url.as_deref(), Some("https://a/1.jpg"));
    }

    #[test]
    fn test_normalize_avatar_thumbnail_first_url() {
        let record: RawComment = serde_json::from_value(json!({
            "comment_id": "C1",
            "author": {"username": "jdoe", "nickname": "J"},
            "body": "hi",
            "created_at": "1700000000",
            "avatar_thumbnail": {"first_url": "https://a/1.jpg"},
            "reply_total": 0
        }))
        .unwrap();
        let comment = normalize_comment(&record);

        assert_eq!(comment.id, "C1");
        assert_eq!(comment.author_username, "jdoe");
        assert_eq!(comment.avatar_url.as_deref(), Some("https://a/1.jpg"));
    }

    #[test]
    fn test_avatar_prefers_user_thumbnail() {
        let record: RawComment = serde_json::from_value(json!({
            "cid": "C2",
            "user": {"avatar_thumb": {"url_list": ["https://wire/1.jpg"]}},
            "avatar_thumbnail": {"first_url": "https://flat/1.jpg"}
        }))
        .unwrap();
        assert_eq!(
            normalize_reply(&record).avatar_url.as_deref(),
            Some("https://wire/1.jpg")
        );

        let nested: RawComment = serde_json::from_value(json!({
            "cid": "C3",
            "author": {"avatar_thumbnail": {"first_url": "https://nested/1.jpg", "url_list": []}}
        }))
        .unwrap();
        assert_eq!(
            normalize_reply(&nested).avatar_url.as_deref(),
            Some("https://nested/1.jpg")
        );
    }

    #[test]
    fn test_reply_total_as_float() {
        let parse = |total: Value| {
            let record: RawComment =
                serde_json::from_value(json!({"cid": "C", "reply_comment_total": total})).unwrap();
            normalize_comment(&record).reported_reply_count
        };

        assert_eq!(parse(json!(3.0)), 3);
        assert_eq!(parse(json!(0.5)), 1);
        assert_eq!(parse(json!("2.0")), 2);
        assert_eq!(parse(json!(0.0)), 0);
        assert_eq!(parse(json!(-4)), 0);
    }

    #[test]
    fn test_response_status_reported_without_comments_key() {
        let result =
            CommentListResponse::from_value(json!({"status_code": 8, "status_msg": "blocked"}));
        match result {
            Err(FetchError::Api {
                status_code,
                message,
            }) => {
                assert_eq!(status_code, 8);
                assert_eq!(message, "blocked");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[test]
    fn test_response_missing_comments_key() {
        let result = CommentListResponse::from_value(json!({"has_more": 1}));
        assert!(matches!(result, Err(FetchError::MissingComments)));
    }

    #[test]
    fn test_response_null_comments_is_empty() {
        let response =
            CommentListResponse::from_value(json!({"comments": null, "has_more": 1})).unwrap();
        assert!(response.has_more);
        assert!(response.into_comments().is_empty());
    }

    #[test]
    fn test_response_not_an_object() {
        let result = CommentListResponse::from_value(json!([1, 2]));
        assert!(matches!(result, Err(FetchError::Decode(_))));
    }

    #[test]
    fn test_response_api_status() {
        let result = CommentListResponse::from_value(
            json!({"comments": null, "status_code": 5, "status_msg": "blocked"}),
        );
        match result {
            Err(FetchError::Api {
                status_code,
                message,
            }) => {
                assert_eq!(status_code, 5);
                assert_eq!(message, "blocked");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[test]
    fn test_comments_not_array_is_decode_error() {
        let result = CommentListResponse::from_value(json!({"comments": "oops"}));
        assert!(matches!(result, Err(FetchError::Decode(_))));
    }

    #[tokio::test]
    async fn test_two_level_scenario() {
        let transport = ScriptedTransport::default()
            .comments("7100", 0, page(&[("C1", 3), ("C2", 0)], true))
            .comments("7100", 2, page(&[("C3", 0), ("C4", 0)], false))
            .replies("C1", 0, reply_page(&["R1", "R2"]))
            .replies("C1", 2, reply_page(&["R3"]));
        let client = CommentClient::new(transport).with_page_size(2);

        let set = client.fetch_all_comments("7100").await.unwrap();

        assert!(set.exhausted);
        let ids: Vec<&str> = set.comments.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["C1", "C2", "C3", "C4"]);

        let reply_ids: Vec<&str> = set.comments[0].replies.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(reply_ids, vec!["R1", "R2", "R3"]);
        assert!(set.comments[1].replies.is_empty());

        let transport = client.transport();
        assert_eq!(transport.calls_to(api::COMMENT_LIST).len(), 2);

        let reply_calls = transport.calls_to(api::REPLY_LIST);
        assert_eq!(reply_calls.len(), 3);
        assert!(reply_calls.iter().all(|c| c.target == "C1"));
        let cursors: Vec<u32> = reply_calls.iter().map(|c| c.cursor).collect();
        assert_eq!(cursors, vec![0, 2, 4]);

        assert_eq!(set.caption.as_deref(), Some("Spring launch #beauty"));
        assert_eq!(
            set.video_url.as_deref(),
            Some("https://www.tiktok.com/@brand/video/7100")
        );
    }

    #[tokio::test]
    async fn test_zero_reply_count_never_fetches_replies() {
        let transport = ScriptedTransport::default()
            .comments("1", 0, page(&[("only", 0)], false))
            .replies("only", 0, reply_page(&["should-not-appear"]));
        let client = CommentClient::new(transport);

        let set = client.fetch_all_comments("1").await.unwrap();

        assert_eq!(set.comments.len(), 1);
        assert!(set.comments[0].replies.is_empty());
        assert!(client.transport().calls_to(api::REPLY_LIST).is_empty());
    }

    #[tokio::test]
    async fn test_has_more_false_stops_before_next_page() {
        let transport = ScriptedTransport::default()
            .comments("9", 0, page(&[("a", 0)], false))
            .comments("9", 50, page(&[("b", 0)], true));
        let client = CommentClient::new(transport);

        let set = client.fetch_all_comments("9").await.unwrap();

        assert_eq!(set.comments.len(), 1);
        let calls = client.transport().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].cursor, 0);
        assert_eq!(calls[0].count, 50);
    }

    #[tokio::test]
    async fn test_empty_page_ends_loop_despite_has_more() {
        let transport = ScriptedTransport::default()
            .comments("9", 0, page(&[("a", 0), ("b", 0)], true))
            .comments("9", 2, page(&[("c", 0), ("d", 0)], true))
            .comments("9", 4, json!({"comments": [], "has_more": 1}))
            .comments("9", 6, page(&[("never", 0)], true));
        let client = CommentClient::new(transport).with_page_size(2);

        let set = client.fetch_all_comments("9").await.unwrap();

        let ids: Vec<&str> = set.comments.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
        assert_eq!(client.transport().calls().len(), 3);
    }

    #[tokio::test]
    async fn test_first_page_empty_yields_empty_set() {
        let transport =
            ScriptedTransport::default().comments("0", 0, json!({"comments": null, "has_more": 1}));
        let client = CommentClient::new(transport);

        let set = client.fetch_all_comments("0").await.unwrap();

        assert!(set.exhausted);
        assert!(set.comments.is_empty());
        assert!(set.caption.is_none());
        assert!(set.video_url.is_none());
        assert_eq!(client.transport().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_metadata_only_from_first_page() {
        let transport = ScriptedTransport::default()
            .comments("5", 0, page(&[("a", 0)], true))
            .comments("5", 1, page(&[("b", 0)], false));
        let client = CommentClient::new(transport).with_page_size(1);

        let first = client.fetch_comment_page("5", 1).await.unwrap();
        assert!(first.metadata.is_some());

        let second = client.fetch_comment_page("5", 2).await.unwrap();
        assert!(second.metadata.is_none());
        assert!(!second.has_more);
    }

    #[tokio::test]
    async fn test_reply_loop_ignores_has_more() {
        let transport = ScriptedTransport::default()
            .replies("C1", 0, json!({"comments": [raw("R1", 0)], "has_more": 0}))
            .replies("C1", 1, json!({"comments": [raw("R2", 0)], "has_more": false}))
            .replies("C1", 2, json!({"comments": [], "has_more": 1}));
        let client = CommentClient::new(transport).with_page_size(1);

        let replies = client.fetch_all_replies("v", "C1").await.unwrap();

        assert_eq!(replies.len(), 2);
        assert_eq!(client.transport().calls().len(), 3);
    }

    #[tokio::test]
    async fn test_reply_query_scoped_by_video() {
        let client = CommentClient::new(ScriptedTransport::default());
        let query = client.reply_query("7100", "C1", 3);

        assert_eq!(param(&query, "aid"), "1988");
        assert_eq!(param(&query, "comment_id"), "C1");
        assert_eq!(param(&query, "item_id"), "7100");
        assert_eq!(param(&query, "count"), "50");
        assert_eq!(param(&query, "cursor"), "100");
    }

    #[tokio::test]
    async fn test_failure_on_second_page_abandons_video() {
        let transport = ScriptedTransport::default()
            .comments("3p", 0, page(&[("a", 0)], true))
            .fail_comments("3p", 1)
            .comments("3p", 2, page(&[("c", 0)], false));
        let client = CommentClient::new(transport).with_page_size(1);

        let err = client.fetch_all_comments("3p").await.unwrap_err();

        match &err {
            ScrapeError::Video { video_id, page, .. } => {
                assert_eq!(video_id, "3p");
                assert_eq!(*page, 2);
            }
            other => panic!("expected video error, got {other:?}"),
        }
        // Page 3 is never requested
        assert_eq!(client.transport().calls().len(), 2);
    }

    #[tokio::test]
    async fn test_reply_failure_is_tagged_with_comment() {
        let transport = ScriptedTransport::default()
            .comments("v1", 0, page(&[("ok", 1), ("bad", 2)], false))
            .replies("ok", 0, reply_page(&["r"]))
            .fail_replies("bad", 0);
        let client = CommentClient::new(transport);

        let err = client.fetch_all_comments("v1").await.unwrap_err();

        assert_eq!(err.video_id(), "v1");
        assert_eq!(err.comment_id(), Some("bad"));
        assert!(matches!(err.fetch_error(), FetchError::ServerError(500)));
    }

    #[tokio::test]
    async fn test_missing_comments_key_is_failure() {
        let transport = ScriptedTransport::default().comments("m", 0, json!({"has_more": 0}));
        let client = CommentClient::new(transport);

        let err = client.fetch_all_comments("m").await.unwrap_err();
        assert!(matches!(err.fetch_error(), FetchError::MissingComments));
    }

    #[test]
    fn test_from_config() {
        let config = ClientConfig {
            page_size: 20,
            app_id: 42,
            ..ClientConfig::default()
        };
        let client = CommentClient::from_config(ScriptedTransport::default(), &config);
        let query = client.comment_query("v", 2);

        assert_eq!(client.page_size(), 20);
        assert_eq!(param(&query, "aid"), "42");
        assert_eq!(param(&query, "aweme_id"), "v");
        assert_eq!(param(&query, "cursor"), "20");
    }

    #[test]
    fn test_fetch_all_replies_blocking() {
        let transport = ScriptedTransport::default()
            .replies("c1", 0, reply_page(&["r1"]))
            .replies("c1", 1, reply_page(&["r2"]));
        let client = CommentClient::new(transport).with_page_size(1);

        let replies = tokio_test::block_on(client.fetch_all_replies("v", "c1")).unwrap();

        assert_eq!(replies.len(), 2);
        assert_eq!(client.transport().calls_to(api::REPLY_LIST).len(), 3);
    }
}
