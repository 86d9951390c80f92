//! CSV export of comments and batch summaries
//!
//! Every field is quoted and embedded quotes are doubled.

use crate::models::{ScrapeSummary, VideoRecord};

/// Header of `{video_id}_comments.csv`
pub const COMMENT_HEADER: &[&str] = &[
    "video_id",
    "comment_id",
    "parent_id",
    "author_username",
    "author_nickname",
    "text",
    "created_at",
    "avatar_url",
    "reported_reply_count",
];

/// Header of `videos_summary.csv`
pub const VIDEO_HEADER: &[&str] = &[
    "Video ID",
    "Original URL",
    "Description",
    "Video URL",
    "Total Comments",
    "Tags",
];

/// Quote one CSV field
pub fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn row<S: AsRef<str>>(fields: &[S]) -> String {
    let quoted: Vec<String> = fields.iter().map(|f| quote(f.as_ref())).collect();
    format!("{}\n", quoted.join(","))
}

/// One row per comment followed by one row per reply; replies carry the
/// id of their comment in `parent_id`
pub fn comments_csv(record: &VideoRecord) -> String {
    let mut out = row(COMMENT_HEADER);

    for comment in &record.comments {
        out.push_str(&row(&[
            record.video_id.as_str(),
            comment.id.as_str(),
            "",
            comment.author_username.as_str(),
            comment.author_nickname.as_str(),
            comment.text.as_str(),
            comment.created_at.as_str(),
            comment.avatar_url.as_deref().unwrap_or_default(),
            comment.reported_reply_count.to_string().as_str(),
        ]));

        for reply in &comment.replies {
            out.push_str(&row(&[
                record.video_id.as_str(),
                reply.id.as_str(),
                comment.id.as_str(),
                reply.author_username.as_str(),
                reply.author_nickname.as_str(),
                reply.text.as_str(),
                reply.created_at.as_str(),
                reply.avatar_url.as_deref().unwrap_or_default(),
                reply.reported_reply_count.to_string().as_str(),
            ]));
        }
    }

    out
}

/// One row per successfully scraped video
pub fn videos_csv(summary: &ScrapeSummary) -> String {
    let mut out = row(VIDEO_HEADER);

    for video in &summary.videos {
        out.push_str(&row(&[
            video.video_id.as_str(),
            video.original_url.as_str(),
            video.description.as_deref().unwrap_or_default(),
            video.video_url.as_deref().unwrap_or_default(),
            video.total_comments.to_string().as_str(),
            video.tags.join(" ").as_str(),
        ]));
    }

    out
}
