//! Video id extraction from TikTok URLs and URL list files
//!
//! Supported inputs:
//! - Standard format: `https://www.tiktok.com/@{user}/video/{id}`
//! - Short link: `https://www.tiktok.com/t/{code}`
//! - Mobile share link: `https://vm.tiktok.com/{code}`
//! - Any path containing `/video/{id}`
//! - A bare numeric id

use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Patterns tried in order; the first capture group is the id
static VIDEO_ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"tiktok\.com/@[^/]+/video/(\d+)",
        r"tiktok\.com/t/(\w+)",
        r"vm\.tiktok\.com/(\w+)",
        r"/video/(\d+)",
        r"^(\d+)$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid video id pattern"))
    .collect()
});

/// Content written by `tokcomments init`
pub const SAMPLE_URL_FILE: &str = "# TikTok URLs to scrape (one per line)
# Lines starting with # are ignored
# Supported formats:
# - Full URLs: https://www.tiktok.com/@username/video/1234567890
# - Short URLs: https://vm.tiktok.com/abc123
# - Video IDs only: 1234567890

# Example URLs (remove # to use):
# https://www.tiktok.com/@lancome.official/video/7488733265222798614
# https://www.tiktok.com/@lancome.official/video/7170139292767882522
";

/// Extract a video id from a URL or a bare id
///
/// # Example
/// ```
/// use tokcomments::crawler::url::extract_video_id;
///
/// let id = extract_video_id("https://www.tiktok.com/@brand/video/7488733265222798614?lang=en");
/// assert_eq!(id.as_deref(), Some("7488733265222798614"));
/// assert!(extract_video_id("https://example.com/").is_none());
/// ```
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();

    VIDEO_ID_PATTERNS
        .iter()
        .find_map(|re| re.captures(input))
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}

/// One entry of a URL list file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlEntry {
    /// Line as written in the file
    pub original_url: String,
    pub video_id: String,
}

/// Parse URL list content: one entry per line, `#` comments and blank lines
/// ignored. Lines without a recognizable id are skipped with a warning.
pub fn parse_url_list(content: &str) -> Vec<UrlEntry> {
    content
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }

            match extract_video_id(line) {
                Some(video_id) => Some(UrlEntry {
                    original_url: line.to_string(),
                    video_id,
                }),
                None => {
                    tracing::warn!(line = index + 1, content = %line, "Could not extract video ID");
                    None
                }
            }
        })
        .collect()
}

/// Read and parse a URL list file
pub fn read_url_file(path: &Path) -> Result<Vec<UrlEntry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read URL file: {}", path.display()))?;

    Ok(parse_url_list(&content))
}
