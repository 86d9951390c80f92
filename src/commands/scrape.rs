use anyhow::{Context, Result};
use std::path::Path;

use tokcomments::config::Config;
use tokcomments::crawler::{client_from_config, HttpTransport};
use tokcomments::crawler::pipeline::ScrapePipeline;
use tokcomments::crawler::url::{extract_video_id, read_url_file, UrlEntry, SAMPLE_URL_FILE};
use tokcomments::models::ScrapeSummary;
use tokcomments::storage::OutputWriter;
use tokcomments::utils::truncate_text;

pub async fn scrape(config: &Config, urls_file: &Path) -> Result<()> {
    println!("TikTok Comment Scraper");
    println!("======================");

    let entries = read_url_file(urls_file)?;
    if entries.is_empty() {
        anyhow::bail!("No valid TikTok URLs found in {}", urls_file.display());
    }
    println!("Found {} URLs to process", entries.len());

    let summary = run_pipeline(config, &entries).await?;
    print_summary(config, &summary);

    Ok(())
}

pub async fn video(config: &Config, url: &str) -> Result<()> {
    let video_id = extract_video_id(url)
        .with_context(|| format!("Could not extract video ID from {url}"))?;

    println!("Scraping video {video_id}");

    let entry = UrlEntry {
        original_url: url.to_string(),
        video_id,
    };
    let pipeline = build_pipeline(config)?;
    let record = pipeline.scrape_one(&entry).await?;

    let replies: usize = record.comments.iter().map(|c| c.replies.len()).sum();
    println!();
    println!("Video ID:       {}", record.video_id);
    println!(
        "Description:    {}",
        truncate_text(record.description.as_deref().unwrap_or("(no description)"), 60)
    );
    println!("Tags:           {}", record.tags.join(" "));
    println!("Comments:       {}", record.total_comments);
    println!("Replies:        {replies}");
    println!("Output saved to: {}", config.output.dir.display());

    Ok(())
}

pub fn init(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }

    std::fs::write(path, SAMPLE_URL_FILE)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Created sample URLs file: {}", path.display());
    println!("Edit this file with your TikTok URLs, then run:");
    println!("  tokcomments scrape -f {}", path.display());

    Ok(())
}

fn build_pipeline(config: &Config) -> Result<ScrapePipeline<'static, HttpTransport>> {
    let client = client_from_config(config)?;
    let writer = OutputWriter::from_config(&config.output.dir, &config.output)?;
    Ok(ScrapePipeline::new(client, writer))
}

async fn run_pipeline(config: &Config, entries: &[UrlEntry]) -> Result<ScrapeSummary> {
    let pipeline = build_pipeline(config)?;
    Ok(pipeline.run(entries).await?)
}

fn print_summary(config: &Config, summary: &ScrapeSummary) {
    println!();
    println!("Scraping Summary");
    println!("================");
    println!("Total URLs:       {}", summary.total_urls);
    println!("Successful:       {}", summary.successful_scrapes);
    println!("Failed:           {}", summary.failed_scrapes);
    println!("Total comments:   {}", summary.total_comments());

    for video in &summary.videos {
        let replies: usize = video.comments.iter().map(|c| c.replies.len()).sum();
        println!(
            "  {} - {} comments, {} replies - {}",
            video.video_id,
            video.total_comments,
            replies,
            truncate_text(video.description.as_deref().unwrap_or("(no description)"), 50)
        );
    }

    if !summary.failures.is_empty() {
        println!();
        println!("Failures:");
        for (video_id, message) in &summary.failures {
            println!("  {video_id}: {message}");
        }
    }

    println!();
    println!("Output saved to: {}", config.output.dir.display());
}
