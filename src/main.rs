//! Kumo main entry point
//!
//! This is the command-line interface for the Kumo seed-driven crawler.

use clap::Parser;
use kumo::config::load_config_with_hash;
use kumo::crawler::{start_crawl, HttpTransport, LinkExtractor};
use kumo::output::{print_summary, write_markdown_summary};
use kumo::seeds::{resolve_seeds, SeedReference};
use kumo::store::SqliteStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Kumo: a seed-driven web crawler
///
/// Kumo resolves its start URLs from a document store at crawl time
/// (organization -> spider config -> URL collections) and crawls them with
/// bounded concurrency, retrying failures with exponential backoff.
#[derive(Parser, Debug)]
#[command(name = "kumo")]
#[command(version = "0.1.0")]
#[command(about = "A seed-driven web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Override the organization from the config file
    #[arg(long)]
    organization: Option<String>,

    /// Override the spider name from the config file
    #[arg(long)]
    spider: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Resolve and print the seed URLs without fetching anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let reference = SeedReference::new(
        cli.organization.unwrap_or_else(|| config.seed.organization.clone()),
        cli.spider.unwrap_or_else(|| config.seed.spider.clone()),
    );

    let store = SqliteStore::open(Path::new(&config.store.database_path))?;

    if cli.dry_run {
        handle_dry_run(&store, &reference).await?;
    } else {
        handle_crawl(&store, &reference, &config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("kumo=info,warn"),
            1 => EnvFilter::new("kumo=debug,info"),
            2 => EnvFilter::new("kumo=trace,debug"),
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

/// Handles --dry-run: resolves the seeds and shows what would be crawled
async fn handle_dry_run(store: &SqliteStore, reference: &SeedReference) -> anyhow::Result<()> {
    println!("=== Kumo Dry Run ===\n");
    println!(
        "Spider: organizations/{}/spiders/{}\n",
        reference.organization_id, reference.spider_id
    );

    let seeds = resolve_seeds(store, reference).await?;

    if seeds.is_empty() {
        println!("No seed URLs resolved; the crawl would do no work");
    } else {
        println!("Would crawl {} seed URLs:", seeds.len());
        for seed in &seeds {
            println!("  - {}", seed);
        }
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    store: &SqliteStore,
    reference: &SeedReference,
    config: &kumo::Config,
    config_hash: &str,
) -> anyhow::Result<()> {
    tracing::info!(
        "Starting crawl for organizations/{}/spiders/{}",
        reference.organization_id,
        reference.spider_id
    );

    let transport = Arc::new(HttpTransport::new(
        &config.user_agent,
        Duration::from_millis(config.crawler.fetch_timeout_ms),
    )?);

    let summary = start_crawl(
        store,
        reference,
        &config.crawler,
        transport,
        &LinkExtractor,
    )
    .await?;

    print_summary(&summary);

    let summary_path = Path::new(&config.output.summary_path);
    write_markdown_summary(&summary, Some(config_hash), summary_path)?;
    println!("\nSummary written to: {}", summary_path.display());

    Ok(())
}
