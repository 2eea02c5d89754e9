//! film-fans main entry point
//!
//! This is the command-line interface for the film-fans crawler.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use film_fans::config::{load_config_with_hash, Config};
use film_fans::crawler::{crawl_catalog, crawl_fans};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// film-fans: collects the five-star raters of popular films
///
/// The `catalog` step walks the popular films listing and writes a film
/// snapshot. The `fans` step walks each film's five-star reviews and keeps a
/// checkpoint that later runs append to.
#[derive(Parser, Debug)]
#[command(name = "film-fans")]
#[command(version)]
#[command(about = "Collects the five-star raters of popular films", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the film catalog and write the snapshot
    Catalog {
        /// First listing page, overriding the config
        #[arg(long)]
        from: Option<u32>,

        /// Last listing page, overriding the config
        #[arg(long)]
        to: Option<u32>,
    },

    /// Crawl the fans of every film in the snapshot
    Fans {
        /// Film to start at, overriding the config
        #[arg(long)]
        start: Option<String>,

        /// Film to stop before, overriding the config
        #[arg(long)]
        stop: Option<String>,
    },

    /// Validate the config and show what would be crawled
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    match cli.command {
        Command::Catalog { from, to } => {
            if let Some(from) = from {
                config.catalog.page_start = from;
            }
            if let Some(to) = to {
                config.catalog.page_end = to;
            }
            revalidate(&config)?;
            handle_catalog(&config).await
        }
        Command::Fans { start, stop } => {
            if start.is_some() {
                config.fans.start_marker = start;
            }
            if stop.is_some() {
                config.fans.stop_marker = stop;
            }
            revalidate(&config)?;
            handle_fans(&config).await
        }
        Command::Check => {
            handle_check(&config);
            Ok(())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("film_fans=info,warn"),
            1 => EnvFilter::new("film_fans=debug,info"),
            2 => EnvFilter::new("film_fans=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Command line overrides bypass the checks done at load time
fn revalidate(config: &Config) -> Result<()> {
    film_fans::config::validate(config).context("Invalid command line override")
}

/// Handles the `check` subcommand: shows the effective configuration
fn handle_check(config: &Config) {
    println!("=== film-fans configuration ===\n");

    println!("Fetch:");
    println!("  User agent: {}", config.fetch.user_agent);
    println!("  Fetch timeout: {}ms", config.fetch.fetch_timeout_ms);
    println!("  Content wait: {}ms", config.fetch.content_wait_timeout_ms);
    println!("  Poll interval: {}ms", config.fetch.poll_interval_ms);

    println!("\nCatalog:");
    println!("  Listing: {}", config.catalog.url_template);
    println!(
        "  Pages: {} to {} ({} films each, {:?} on mismatch)",
        config.catalog.page_start,
        config.catalog.page_end,
        config.catalog.expected_items,
        config.catalog.on_count_mismatch
    );
    println!("  Snapshot: {}", config.catalog.output_path);

    println!("\nFans:");
    println!("  Fan pages: {}", config.fans.url_template);
    println!("  Pages per film: {}", config.fans.max_pages);
    println!("  Recycle every: {} films", config.fans.recycle_every);
    println!(
        "  Start: {}",
        config.fans.start_marker.as_deref().unwrap_or("(first film)")
    );
    println!(
        "  Stop: {}",
        config.fans.stop_marker.as_deref().unwrap_or("(last film)")
    );
    println!("  Reads: {}", config.fans.catalog_path);
    println!("  Checkpoint: {}", config.fans.output_path);
    println!("  Dedupe: {}", config.fans.dedupe);

    println!("\n✓ Configuration is valid");
}

/// Handles the `catalog` subcommand
async fn handle_catalog(config: &Config) -> Result<()> {
    let films = crawl_catalog(config).await.context("Catalog crawl failed")?;
    tracing::info!("Catalog crawl completed with {} films", films.len());
    Ok(())
}

/// Handles the `fans` subcommand
async fn handle_fans(config: &Config) -> Result<()> {
    let summary = crawl_fans(config).await.context("Fan crawl failed")?;

    let elapsed = summary
        .finished_at
        .map(|finished| finished - summary.started_at)
        .unwrap_or_else(chrono::Duration::zero);
    tracing::info!(
        "Fan crawl completed in {}s: {} films crawled, {} fans added, {} session recycles",
        elapsed.num_seconds(),
        summary.processed,
        summary.fans_collected,
        summary.recycles
    );
    if summary.truncated > 0 {
        tracing::warn!(
            "{} films stopped early on a failed page; rerun them to complete their fans",
            summary.truncated
        );
    }
    if let Some(stop) = &summary.stopped_at {
        tracing::info!("Stopped before '{}'", stop);
    }
    Ok(())
}
