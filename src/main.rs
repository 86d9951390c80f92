use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tokcomments::config::Config;

mod commands;

#[derive(Parser)]
#[command(
    name = "tokcomments",
    version,
    about = "Scrape comments and replies from TikTok videos",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the config file
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// TOML configuration file (defaults come from the environment)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape comments from TikTok videos listed in a text file
    Scrape {
        /// Text file containing TikTok URLs (one per line)
        #[arg(short = 'f', long)]
        urls_file: PathBuf,

        /// Directory to save the output files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Scrape comments from a single video URL or id
    Video {
        /// TikTok video URL or numeric id
        url: String,

        /// Directory to save the output files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Create a sample URLs file
    Init {
        /// Path of the file to create
        #[arg(short, long, default_value = "sample_urls.txt")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    if let Some(format) = cli.log_format {
        config.logging.format = format;
        config.validate()?;
    }

    setup_tracing(&config, cli.verbose)?;

    tracing::debug!(config = ?config, "Loaded configuration");

    match cli.command {
        Commands::Scrape {
            urls_file,
            output_dir,
        } => {
            if let Some(dir) = output_dir {
                config.output.dir = dir;
            }
            tracing::info!(
                urls_file = %urls_file.display(),
                output_dir = %config.output.dir.display(),
                "Starting scrape command"
            );
            commands::scrape(&config, &urls_file).await?;
        }

        Commands::Video { url, output_dir } => {
            if let Some(dir) = output_dir {
                config.output.dir = dir;
            }
            tracing::info!(url = %url, "Starting video command");
            commands::video(&config, &url).await?;
        }

        Commands::Init { path } => {
            commands::init(&path)?;
        }
    }

    Ok(())
}

fn setup_tracing(config: &Config, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("tokcomments=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(format!("tokcomments={},warn", config.logging.level))
        })
    };

    match config.logging.format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
