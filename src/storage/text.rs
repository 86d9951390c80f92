//! Plain-text report rendering with Handlebars
//!
//! Renders one [`VideoRecord`] as a human-readable report: video header, then
//! each comment with its replies indented underneath.

use anyhow::{Context, Result};
use handlebars::Handlebars;
use serde::Serialize;
use std::path::Path;

use crate::models::{Comment, Reply, VideoRecord};

/// Default report template
const DEFAULT_TEMPLATE: &str = include_str!("../../templates/video.hbs");

const TEMPLATE_NAME: &str = "video";

/// Template data for one video
#[derive(Debug, Serialize)]
struct VideoTemplateData {
    video_id: String,
    original_url: String,
    description: String,
    tags: String,
    video_url: String,
    total_comments: usize,
    comments: Vec<CommentTemplateData>,
}

#[derive(Debug, Serialize)]
struct CommentTemplateData {
    nickname: String,
    username: String,
    text: String,
    created_at: String,
    has_replies: bool,
    reply_count: usize,
    replies: Vec<ReplyTemplateData>,
}

#[derive(Debug, Serialize)]
struct ReplyTemplateData {
    nickname: String,
    username: String,
    text: String,
    created_at: String,
}

/// Unix timestamps are shown as UTC dates, anything else verbatim
fn display_time(raw: &str, parsed: Option<chrono::DateTime<chrono::Utc>>) -> String {
    parsed
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| raw.to_string())
}

impl From<&Reply> for ReplyTemplateData {
    fn from(reply: &Reply) -> Self {
        Self {
            nickname: reply.author_nickname.clone(),
            username: reply.author_username.clone(),
            text: reply.text.clone(),
            created_at: display_time(&reply.created_at, reply.created_at_utc()),
        }
    }
}

impl From<&Comment> for CommentTemplateData {
    fn from(comment: &Comment) -> Self {
        Self {
            nickname: comment.author_nickname.clone(),
            username: comment.author_username.clone(),
            text: comment.text.clone(),
            created_at: display_time(&comment.created_at, comment.created_at_utc()),
            has_replies: !comment.replies.is_empty(),
            reply_count: comment.replies.len(),
            replies: comment.replies.iter().map(ReplyTemplateData::from).collect(),
        }
    }
}

impl From<&VideoRecord> for VideoTemplateData {
    fn from(record: &VideoRecord) -> Self {
        Self {
            video_id: record.video_id.clone(),
            original_url: record.original_url.clone(),
            description: record.description.clone().unwrap_or_default(),
            tags: record.tags.join(" "),
            video_url: record.video_url.clone().unwrap_or_default(),
            total_comments: record.total_comments,
            comments: record.comments.iter().map(CommentTemplateData::from).collect(),
        }
    }
}

/// Text report renderer
pub struct TextRenderer<'a> {
    handlebars: Handlebars<'a>,
}

impl<'a> TextRenderer<'a> {
    /// Create a renderer with the built-in template
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars
            .register_template_string(TEMPLATE_NAME, DEFAULT_TEMPLATE)
            .context("Failed to register default video template")?;

        Ok(Self { handlebars })
    }

    /// Create a renderer with a custom template file
    pub fn with_template(template_path: &Path) -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars
            .register_template_file(TEMPLATE_NAME, template_path)
            .with_context(|| {
                format!("Failed to register template: {}", template_path.display())
            })?;

        Ok(Self { handlebars })
    }

    /// Render a video record to text
    pub fn render(&self, record: &VideoRecord) -> Result<String> {
        let data = VideoTemplateData::from(record);
        self.handlebars
            .render(TEMPLATE_NAME, &data)
            .context("Failed to render video template")
    }
}
