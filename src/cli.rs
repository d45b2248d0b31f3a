//! CLI parsing and orchestration. Resolves listing pages, fetches chapters concurrently,
//! and writes the text file. Maps errors to exit codes.

use crate::assemble::{write_book, WriteError};
use crate::config::{self, Config};
use crate::model::{Book, ChapterLocator};
use crate::scraper::dispatch::DEFAULT_WORKERS;
use crate::scraper::{
    dispatch_all, resolve_listing, site_origin, HttpClient, Progress, ScraperError,
};
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// CLI error carrying exit code and message.
#[derive(Debug, Error)]
pub enum CliRunError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Scraper(#[from] ScraperError),

    #[error("{0}")]
    Write(#[from] WriteError),

    #[error("Failed to print chapter list: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliRunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliRunError::InvalidInput(_) => 1,
            CliRunError::Scraper(_) => 2,
            CliRunError::Write(_) | CliRunError::Json(_) => 3,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "novelfetch")]
#[command(about = "Download a serialized novel's chapters concurrently and write them to one text file")]
#[command(
    after_help = "Config file keys (title, listing_urls, output_dir, workers, listing_delay_ms, user_agent, timeout_secs) are read from ./novelfetch.toml or ~/.config/novelfetch/config.toml. CLI flags override config."
)]
pub struct Args {
    /// Book title. Also names the output file ({title}.txt).
    #[arg(long)]
    pub title: Option<String>,

    /// Listing page URL; repeat for paginated listings. Pages are read in the given order.
    #[arg(long = "listing", value_name = "URL")]
    pub listing_urls: Vec<String>,

    /// Output path. Default: ./{title}.txt.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of chapters fetched concurrently (default 10).
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// Delay between listing page fetches in milliseconds (default 1000).
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// HTTP User-Agent (overrides config).
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Request timeout in seconds (default: none).
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Read the listing pages and print the chapter list without fetching chapters or writing.
    #[arg(long)]
    pub dry_run: bool,

    /// With --dry-run, print the chapter list as JSON.
    #[arg(long, requires = "dry_run")]
    pub json: bool,

    /// Suppress progress output (warnings and errors only).
    #[arg(short, long)]
    pub quiet: bool,

    /// Debug logging and the full error chain on failure.
    #[arg(long)]
    pub verbose: bool,
}

/// Effective settings after merging CLI flags, config file, and built-in defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub title: String,
    pub listing_urls: Vec<String>,
    pub output_path: PathBuf,
    pub workers: usize,
    pub listing_delay: Duration,
    pub user_agent: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Settings {
    /// Precedence: CLI flag, then config file, then built-in constant.
    pub fn resolve(args: &Args, config: Option<&Config>) -> Result<Self, CliRunError> {
        let title = args
            .title
            .clone()
            .or_else(|| config.and_then(|c| c.title.clone()))
            .unwrap_or_else(|| config::DEFAULT_TITLE.to_string());
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(CliRunError::InvalidInput(
                "Book title must not be empty.".to_string(),
            ));
        }

        let listing_urls = if !args.listing_urls.is_empty() {
            args.listing_urls.clone()
        } else {
            config
                .and_then(|c| c.listing_urls.clone())
                .unwrap_or_else(|| {
                    config::DEFAULT_LISTING_URLS
                        .iter()
                        .map(|s| s.to_string())
                        .collect()
                })
        };
        if listing_urls.is_empty() {
            return Err(CliRunError::InvalidInput(
                ScraperError::NoListingUrls.to_string(),
            ));
        }
        for url in &listing_urls {
            site_origin(url).map_err(|e| {
                CliRunError::InvalidInput(format!(
                    "Expected a listing page URL, e.g. {}. {}",
                    config::DEFAULT_LISTING_URLS[0],
                    e
                ))
            })?;
        }

        let workers = args
            .workers
            .or_else(|| config.and_then(|c| c.workers))
            .unwrap_or(DEFAULT_WORKERS);
        if workers == 0 {
            return Err(CliRunError::InvalidInput(
                "Invalid worker count: must be at least 1.".to_string(),
            ));
        }

        let delay_ms = args
            .delay_ms
            .or_else(|| config.and_then(|c| c.listing_delay_ms))
            .unwrap_or(config::DEFAULT_LISTING_DELAY_MS);

        let output_path = match &args.output {
            Some(p) => p.clone(),
            None => {
                let dir = config
                    .and_then(|c| c.output_dir.clone())
                    .unwrap_or_else(|| PathBuf::from("."));
                default_output_path(&dir, &title)
            }
        };

        Ok(Settings {
            title,
            listing_urls,
            output_path,
            workers,
            listing_delay: Duration::from_millis(delay_ms),
            user_agent: args
                .user_agent
                .clone()
                .or_else(|| config.and_then(|c| c.user_agent.clone())),
            timeout_secs: args.timeout.or_else(|| config.and_then(|c| c.timeout_secs)),
        })
    }
}

/// Replace characters that are not allowed in file names. Keeps non-ASCII titles readable.
fn sanitize_title(title: &str) -> String {
    let s: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let s = s.trim().trim_matches('.').trim();
    if s.is_empty() {
        "book".to_string()
    } else {
        s.to_string()
    }
}

fn default_output_path(dir: &Path, title: &str) -> PathBuf {
    dir.join(format!("{}.txt", sanitize_title(title)))
}

/// Ensure output path parent exists.
fn validate_output_path(path: &Path) -> Result<(), CliRunError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(CliRunError::InvalidInput(format!(
                "Cannot write output: {}: parent directory does not exist.",
                path.display()
            )));
        }
    }
    Ok(())
}

/// One line of `--dry-run --json` output.
#[derive(Debug, Serialize)]
struct ListedChapter<'a> {
    ordinal: u32,
    label: &'a str,
    location: &'a str,
}

fn print_chapter_list(locators: &[ChapterLocator], json: bool) -> Result<(), CliRunError> {
    if json {
        let listed: Vec<ListedChapter> = (1u32..)
            .zip(locators)
            .map(|(ordinal, l)| ListedChapter {
                ordinal,
                label: &l.label,
                location: &l.location,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listed)?);
    } else {
        for (ordinal, l) in (1u32..).zip(locators) {
            println!("{}\t{}\t{}", ordinal, l.label, l.location);
        }
    }
    Ok(())
}

/// Entry point for the CLI. Returns Ok(()) on success; Err with exit code and message on failure.
pub fn run(args: &Args) -> Result<(), CliRunError> {
    let config = config::load_config().map_err(CliRunError::InvalidInput)?;
    let settings = Settings::resolve(args, config.as_ref())?;

    let mut builder = HttpClient::builder();
    if let Some(ua) = &settings.user_agent {
        builder = builder.user_agent(ua.clone());
    }
    if let Some(secs) = settings.timeout_secs {
        builder = builder.timeout_secs(secs);
    }
    let client = builder
        .build()
        .map_err(|e| CliRunError::InvalidInput(format!("Failed to create HTTP client: {}", e)))?;

    let locators = resolve_listing(&client, &settings.listing_urls, settings.listing_delay)?;
    if locators.is_empty() {
        warn!("no chapters found on any listing page");
    }

    if args.dry_run {
        print_chapter_list(&locators, args.json)?;
        eprintln!("Chapters: {}", locators.len());
        eprintln!("Output: {}", settings.output_path.display());
        return Ok(());
    }

    validate_output_path(&settings.output_path)?;

    let progress = if args.quiet {
        Progress::hidden(locators.len())
    } else {
        Progress::with_bar(locators.len())
    };
    let chapters = dispatch_all(&client, &locators, settings.workers, &progress)?;
    progress.finish();

    let book = Book {
        title: settings.title.clone(),
        chapters,
    };
    write_book(&book, &settings.output_path)?;

    let failed = book.failed_count();
    if failed > 0 {
        warn!("{} of {} chapters failed to download", failed, book.chapters.len());
    }
    info!(
        "wrote {} ({} chapters)",
        settings.output_path.display(),
        book.chapters.len()
    );
    Ok(())
}
