//! Output files for scraped comments
//!
//! Layout of an output directory:
//! - `{video_id}.json` - full record with comments and replies
//! - `{video_id}.txt` - human-readable report
//! - `{video_id}_comments.csv` - one row per comment and reply
//! - `scraping_summary.json` / `videos_summary.csv` - batch summary

pub mod csv;
pub mod text;

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::OutputConfig;
use crate::models::{ScrapeSummary, VideoRecord};
use crate::utils::sanitize_filename;

pub use text::TextRenderer;

/// Summary file names
pub const SUMMARY_JSON: &str = "scraping_summary.json";
pub const SUMMARY_CSV: &str = "videos_summary.csv";

/// Writes per-video and summary files into one directory
pub struct OutputWriter<'a> {
    output_dir: PathBuf,
    renderer: TextRenderer<'a>,
    write_text: bool,
    write_csv: bool,
}

impl<'a> OutputWriter<'a> {
    /// Create a writer for `output_dir`, creating the directory if needed.
    /// Text and CSV files are enabled.
    pub fn new(output_dir: &Path) -> Result<Self> {
        fs::create_dir_all(output_dir).with_context(|| {
            format!("Failed to create output directory: {}", output_dir.display())
        })?;

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            renderer: TextRenderer::new()?,
            write_text: true,
            write_csv: true,
        })
    }

    /// Create a writer honoring the text/CSV switches and custom template
    /// of the configuration
    pub fn from_config(output_dir: &Path, config: &OutputConfig) -> Result<Self> {
        let mut writer = Self::new(output_dir)?;
        writer.write_text = config.write_text;
        writer.write_csv = config.write_csv;
        if let Some(template) = &config.template {
            writer.renderer = TextRenderer::with_template(template)?;
        }
        Ok(writer)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn path_for(&self, video_id: &str, suffix: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}{suffix}", sanitize_filename(video_id)))
    }

    fn write_file(path: &Path, content: &str) -> Result<()> {
        fs::write(path, content)
            .with_context(|| format!("Failed to write file: {}", path.display()))?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "Wrote output file");
        Ok(())
    }

    fn to_json<T: Serialize>(value: &T) -> Result<String> {
        serde_json::to_string_pretty(value).context("Failed to serialize JSON")
    }

    fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
        Self::write_file(path, &Self::to_json(value)?)
    }

    /// Write `{video_id}.json`
    pub fn write_json(&self, record: &VideoRecord) -> Result<PathBuf> {
        let path = self.path_for(&record.video_id, ".json");
        Self::write_json_file(&path, record)?;
        Ok(path)
    }

    /// Write `{video_id}.txt`
    pub fn write_text(&self, record: &VideoRecord) -> Result<PathBuf> {
        let path = self.path_for(&record.video_id, ".txt");
        let text = self.renderer.render(record)?;
        Self::write_file(&path, &text)?;
        Ok(path)
    }

    /// Write `{video_id}_comments.csv`
    pub fn write_comments_csv(&self, record: &VideoRecord) -> Result<PathBuf> {
        let path = self.path_for(&record.video_id, "_comments.csv");
        Self::write_file(&path, &csv::comments_csv(record))?;
        Ok(path)
    }

    /// Write every enabled per-video file, JSON always included.
    ///
    /// All contents are rendered before anything touches the disk. If a
    /// write fails, files already written for this video are removed so a
    /// failed video leaves no output behind.
    pub fn save_video(&self, record: &VideoRecord) -> Result<Vec<PathBuf>> {
        let mut outputs = vec![(
            self.path_for(&record.video_id, ".json"),
            Self::to_json(record)?,
        )];
        if self.write_text {
            outputs.push((
                self.path_for(&record.video_id, ".txt"),
                self.renderer.render(record)?,
            ));
        }
        if self.write_csv {
            outputs.push((
                self.path_for(&record.video_id, "_comments.csv"),
                csv::comments_csv(record),
            ));
        }

        let mut written = Vec::with_capacity(outputs.len());
        for (path, content) in outputs {
            if let Err(e) = Self::write_file(&path, &content) {
                Self::remove_partial(&written);
                return Err(e);
            }
            written.push(path);
        }

        Ok(written)
    }

    fn remove_partial(paths: &[PathBuf]) {
        for path in paths {
            if let Err(e) = fs::remove_file(path) {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove partial output");
            }
        }
    }

    /// Write `scraping_summary.json`
    pub fn write_summary(&self, summary: &ScrapeSummary) -> Result<PathBuf> {
        let path = self.output_dir.join(SUMMARY_JSON);
        Self::write_json_file(&path, summary)?;
        Ok(path)
    }

    /// Write `videos_summary.csv`
    pub fn write_videos_csv(&self, summary: &ScrapeSummary) -> Result<PathBuf> {
        let path = self.output_dir.join(SUMMARY_CSV);
        Self::write_file(&path, &csv::videos_csv(summary))?;
        Ok(path)
    }

    /// Write the JSON summary and, when enabled, the CSV summary
    pub fn save_summary(&self, summary: &ScrapeSummary) -> Result<Vec<PathBuf>> {
        let mut paths = vec![self.write_summary(summary)?];

        if self.write_csv {
            paths.push(self.write_videos_csv(summary)?);
        }

        Ok(paths)
    }
}
