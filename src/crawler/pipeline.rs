//! Batch scraping pipeline
//!
//! Videos are processed strictly one after another through a single
//! [`CommentClient`]. A failed video is recorded in the summary and the batch
//! moves on; results of videos already saved are never affected.
//!
//! # Example
//!
//! ```no_run
//! use tokcomments::config::Config;
//! use tokcomments::crawler::{client_from_config, pipeline::ScrapePipeline, url::read_url_file};
//! use tokcomments::storage::OutputWriter;
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::default();
//! let client = client_from_config(&config)?;
//! let writer = OutputWriter::new(Path::new("scraped_data"))?;
//! let pipeline = ScrapePipeline::new(client, writer);
//!
//! let entries = read_url_file(Path::new("urls.txt"))?;
//! let summary = pipeline.run(&entries).await?;
//! println!("{}/{} videos scraped", summary.successful_scrapes, summary.total_urls);
//! # Ok(())
//! # }
//! ```

use crate::crawler::comment::CommentClient;
use crate::crawler::fetcher::Transport;
use crate::crawler::url::UrlEntry;
use crate::error::{Error, Result, ToolErrorTrait};
use crate::models::{ScrapeSummary, VideoRecord};
use crate::storage::OutputWriter;

/// Sequential fetch-and-save driver
pub struct ScrapePipeline<'a, T: Transport> {
    client: CommentClient<T>,
    writer: OutputWriter<'a>,
}

impl<'a, T: Transport> ScrapePipeline<'a, T> {
    pub fn new(client: CommentClient<T>, writer: OutputWriter<'a>) -> Self {
        Self { client, writer }
    }

    /// Fetch one video and write its files
    pub async fn scrape_one(&self, entry: &UrlEntry) -> Result<VideoRecord> {
        let set = self.client.fetch_all_comments(&entry.video_id).await?;
        let record = VideoRecord::new(&entry.original_url, &entry.video_id, set);

        let paths = self.writer.save_video(&record).map_err(Error::storage)?;
        tracing::debug!(
            video_id = %entry.video_id,
            files = paths.len(),
            "Saved video output"
        );

        Ok(record)
    }

    /// Scrape every entry, then write the summary files
    pub async fn run(&self, entries: &[UrlEntry]) -> Result<ScrapeSummary> {
        let mut summary = ScrapeSummary::new(entries.len());

        for (i, entry) in entries.iter().enumerate() {
            tracing::info!(
                progress = %format!("{}/{}", i + 1, entries.len()),
                video_id = %entry.video_id,
                url = %entry.original_url,
                "Scraping video"
            );

            match self.scrape_one(entry).await {
                Ok(record) => {
                    tracing::info!(
                        video_id = %entry.video_id,
                        comments = record.total_comments,
                        "Successfully scraped video"
                    );
                    summary.record_success(record);
                }
                Err(e) => {
                    tracing::warn!(
                        video_id = %entry.video_id,
                        category = e.category().desc(),
                        recoverable = e.is_recoverable(),
                        error = %e,
                        "Failed to scrape video"
                    );
                    summary.record_failure(&entry.video_id, e.to_string());
                }
            }
        }

        self.writer.save_summary(&summary).map_err(Error::storage)?;

        tracing::info!(
            total = summary.total_urls,
            successful = summary.successful_scrapes,
            failed = summary.failed_scrapes,
            comments = summary.total_comments(),
            "Scraping complete"
        );

        Ok(summary)
    }
}
