//! Crawl dispatcher
//!
//! Drains the crawl queue with a bounded pool of concurrent fetches. The
//! dispatcher is the sole owner of queue mutation during a run: it moves
//! tasks in flight, routes results to the page handler in completion
//! order, and feeds emitted follow-up URLs back into the queue.
//!
//! Termination is a fixed point, not a "queue empty" check: the run ends
//! only when nothing is pending, no retry is waiting out its backoff, and
//! no fetch is still in flight. A page handler may keep injecting new URLs
//! while other fetches are completing without risking a premature exit.

use crate::crawler::fetcher::{FetchTransport, FetchedPage, TransportError};
use crate::crawler::handler::PageHandler;
use crate::crawler::queue::{CrawlQueue, CrawlTask, FailureRecord, NextTask};
use crate::state::TaskState;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

/// Final accounting of a crawl run
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    /// URLs fetched and handled successfully
    pub succeeded: u64,

    /// URLs that exhausted their retries
    pub failed: u64,

    /// Settled fetch attempts, including retries
    pub total_attempts: u64,

    /// One record per terminally failed URL
    pub failures: Vec<FailureRecord>,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlSummary {
    /// Wall-clock duration of the run
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Cooperative stop signal for a running dispatcher
///
/// Signalling stop halts new dispatches; fetches already in flight drain
/// and their results are processed normally, so the returned summary
/// accounts for every fetch that was started.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    stopped: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that the dispatcher stop dequeuing new work
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Bounded-concurrency worker pool over a crawl queue
pub struct Dispatcher {
    queue: Arc<CrawlQueue>,
    transport: Arc<dyn FetchTransport>,
    concurrency_limit: usize,
    stop: StopSignal,
}

impl Dispatcher {
    /// Creates a dispatcher over an already-seeded queue
    pub fn new(
        queue: Arc<CrawlQueue>,
        transport: Arc<dyn FetchTransport>,
        concurrency_limit: usize,
    ) -> Self {
        Self {
            queue,
            transport,
            concurrency_limit: concurrency_limit.max(1),
            stop: StopSignal::new(),
        }
    }

    /// A handle that can stop this dispatcher from another task
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Runs the crawl to its fixed point (or until stopped)
    pub async fn run(&self, handler: &dyn PageHandler) -> CrawlSummary {
        let started_at = Utc::now();
        let mut in_flight: JoinSet<(CrawlTask, Result<FetchedPage, TransportError>)> =
            JoinSet::new();

        let mut succeeded: u64 = 0;
        let mut failed: u64 = 0;
        let mut total_attempts: u64 = 0;

        loop {
            // Fill free fetch slots; a stop request halts new dispatches
            // but leaves in-flight fetches to drain below.
            let mut retry_wait: Option<Duration> = None;
            if !self.stop.is_stopped() {
                while in_flight.len() < self.concurrency_limit {
                    match self.queue.next_ready(Instant::now()) {
                        NextTask::Ready(task) => {
                            tracing::debug!(
                                "Dispatching {} (attempt {})",
                                task.url,
                                task.attempt + 1
                            );
                            let transport = Arc::clone(&self.transport);
                            in_flight.spawn(async move {
                                let result = transport.fetch(&task.url).await;
                                (task, result)
                            });
                        }
                        NextTask::Delayed(wait) => {
                            retry_wait = Some(wait);
                            break;
                        }
                        NextTask::Empty => break,
                    }
                }
            }

            if in_flight.is_empty() {
                if self.stop.is_stopped() {
                    tracing::info!("Stop requested, returning partial summary");
                    break;
                }
                match retry_wait {
                    // Only delayed retries remain; wait them out.
                    Some(wait) => {
                        tokio::time::sleep(wait).await;
                        continue;
                    }
                    // Fixed point: nothing pending, nothing in flight.
                    None => break,
                }
            }

            // Wait for a fetch to settle; wake early if a delayed retry
            // becomes dispatchable into a free slot first.
            let joined = match retry_wait {
                Some(wait) if in_flight.len() < self.concurrency_limit => {
                    tokio::select! {
                        joined = in_flight.join_next() => joined,
                        _ = tokio::time::sleep(wait) => continue,
                    }
                }
                _ => in_flight.join_next().await,
            };

            let (task, result) = match joined {
                Some(Ok(settled)) => settled,
                Some(Err(e)) => {
                    // A fetch task panicked; its URL stays in the in-flight
                    // set and will not be retried.
                    tracing::error!("Fetch task aborted: {}", e);
                    continue;
                }
                None => continue,
            };

            total_attempts += 1;

            match result {
                Ok(page) => {
                    self.queue.mark_done(&task.url);
                    succeeded += 1;

                    // Completion-order invocation, on the dispatcher task
                    let follow_ups = handler.handle_page(&page);
                    let mut admitted = 0usize;
                    for url in &follow_ups {
                        if self.queue.enqueue(url) {
                            admitted += 1;
                        }
                    }
                    if !follow_ups.is_empty() {
                        tracing::debug!(
                            "Handler for {} emitted {} URLs ({} new)",
                            task.url,
                            follow_ups.len(),
                            admitted
                        );
                    }
                }
                Err(error) => {
                    match self.queue.mark_failed(&task, &error.to_string(), Instant::now()) {
                        TaskState::FailedTerminal => {
                            failed += 1;
                            tracing::warn!(
                                "Giving up on {} after {} attempts: {}",
                                task.url,
                                task.attempt + 1,
                                error
                            );
                        }
                        _ => {
                            tracing::warn!(
                                "Fetch failed for {} ({}), retry {} scheduled",
                                task.url,
                                error,
                                task.attempt + 1
                            );
                        }
                    }
                }
            }

            if total_attempts % 10 == 0 {
                let stats = self.queue.stats();
                tracing::info!(
                    "Progress: {} attempts, {} ok, {} failed, {} pending, {} in flight",
                    total_attempts,
                    succeeded,
                    failed,
                    stats.pending,
                    stats.in_flight
                );
            }
        }

        let finished_at = Utc::now();
        tracing::info!(
            "Crawl finished: {} succeeded, {} failed, {} attempts in {:?}",
            succeeded,
            failed,
            total_attempts,
            (finished_at - started_at).to_std().unwrap_or_default()
        );

        CrawlSummary {
            succeeded,
            failed,
            total_attempts,
            failures: self.queue.take_failures(),
            started_at,
            finished_at,
        }
    }
}
