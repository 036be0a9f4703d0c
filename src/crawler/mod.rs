//! Crawler module
//!
//! This module contains the core crawling logic:
//! - The deduplicated crawl queue with retry bookkeeping
//! - The fetch transport boundary (reqwest-backed in production)
//! - The page handler boundary (link extraction by default)
//! - The bounded-concurrency dispatcher
//! - The `start_crawl` entry point wiring seed resolution into a run

mod dispatcher;
mod fetcher;
mod handler;
mod queue;

pub use dispatcher::{CrawlSummary, Dispatcher, StopSignal};
pub use fetcher::{build_http_client, FetchTransport, FetchedPage, HttpTransport, TransportError};
pub use handler::{extract_links, LinkExtractor, NoFollow, PageHandler};
pub use queue::{CrawlQueue, CrawlTask, FailureRecord, NextTask, QueueStats, RetryPolicy};

use crate::config::CrawlerConfig;
use crate::seeds::{resolve_seeds, SeedReference};
use crate::store::DocumentStore;
use crate::KumoError;
use std::sync::Arc;

/// Runs a complete crawl for a seed reference
///
/// Resolves the seed URLs from the document store, seeds the queue, and
/// drains it with a bounded-concurrency dispatcher. Individual page
/// failures never surface here; they are reported inside the summary.
/// The only error paths are store-level: an unreachable or corrupt
/// document store aborts before any fetch begins.
///
/// # Arguments
///
/// * `store` - Document store holding the spider config and URL collections
/// * `reference` - Which spider configuration to resolve
/// * `config` - Concurrency, retry, and timeout settings
/// * `transport` - Fetch transport (use [`HttpTransport`] in production)
/// * `handler` - Page handler invoked per fetched page
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - The run's accounting, even if every page failed
/// * `Err(KumoError)` - Seed resolution failed at the store level
pub async fn start_crawl(
    store: &dyn DocumentStore,
    reference: &SeedReference,
    config: &CrawlerConfig,
    transport: Arc<dyn FetchTransport>,
    handler: &dyn PageHandler,
) -> Result<CrawlSummary, KumoError> {
    let seeds = resolve_seeds(store, reference).await?;

    let queue = Arc::new(CrawlQueue::new(RetryPolicy::from_config(config)));
    let admitted = queue.seed(&seeds);
    tracing::info!(
        "Seeded crawl queue with {} of {} resolved URLs (duplicates and unusable URLs dropped)",
        admitted,
        seeds.len()
    );

    let dispatcher = Dispatcher::new(queue, transport, config.concurrency_limit as usize);
    Ok(dispatcher.run(handler).await)
}
