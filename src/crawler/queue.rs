//! Crawl queue with deduplication and retry bookkeeping
//!
//! The queue is the only shared mutable state in a crawl. Every operation
//! takes the internal lock exactly once and never holds it across an
//! await, which is what makes the first-seen-wins guarantee hold under
//! concurrent enqueues.

use crate::config::CrawlerConfig;
use crate::state::TaskState;
use crate::url::normalize_url;
use chrono::{DateTime, Utc};
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// A unit of crawl work
///
/// Created when a URL is first seen (seed resolution or a page-handler
/// emission); the attempt counter increments on retry; the task is
/// destroyed on success or when retries are exhausted.
#[derive(Debug, Clone)]
pub struct CrawlTask {
    /// The normalized URL to fetch
    pub url: String,

    /// How many times this task has already failed (0 for a fresh task)
    pub attempt: u32,

    /// When the URL was first admitted to the queue
    pub enqueued_at: DateTime<Utc>,

    /// Earliest instant this task may be dispatched; set on retry to
    /// enforce the backoff delay
    pub(crate) not_before: Option<Instant>,
}

/// A URL that exhausted its retries, recorded for the final summary
#[derive(Debug, Clone)]
pub struct FailureRecord {
    pub url: String,

    /// Total fetch attempts made for this URL
    pub attempts: u32,

    /// The error from the last attempt
    pub error: String,
}

/// Exponential backoff schedule for failing URLs
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries (a URL is fetched at most max_retries + 1 times)
    pub max_retries: u32,

    /// Delay before the first retry
    pub base: Duration,

    /// Multiplier applied per further retry
    pub multiplier: f64,

    /// Upper bound on the delay
    pub cap: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base: Duration::from_millis(config.backoff_base_ms),
            multiplier: config.backoff_multiplier,
            cap: Duration::from_millis(config.backoff_cap_ms),
        }
    }

    /// Whether a task that has failed `attempt + 1` times should retry
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }

    /// Backoff delay after the given failed attempt (0-based)
    ///
    /// `base * multiplier^attempt`, capped at `cap`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let delay = self.base.as_secs_f64() * self.multiplier.powi(attempt as i32);
        let capped = delay.min(self.cap.as_secs_f64());
        Duration::from_secs_f64(capped)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default())
    }
}

/// Outcome of asking the queue for work
#[derive(Debug)]
pub enum NextTask {
    /// A task is ready; it has been moved to the in-flight set
    Ready(CrawlTask),

    /// Nothing is ready yet, but a retry becomes dispatchable after this delay
    Delayed(Duration),

    /// The pending queue is empty
    Empty,
}

#[derive(Debug, Default)]
struct QueueInner {
    pending: VecDeque<CrawlTask>,
    in_flight: HashSet<String>,
    seen: HashSet<String>,
    failures: Vec<FailureRecord>,
}

/// Snapshot of queue counters, for progress logging and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStats {
    pub pending: usize,
    pub in_flight: usize,
    pub seen: usize,
    pub failed: usize,
}

/// Deduplicated, ordered work queue of pending URL tasks
///
/// Invariants, preserved by taking the lock once per call:
/// - a URL in `seen` is never re-admitted by `enqueue` (first-seen-wins)
/// - `pending` and `in_flight` are disjoint
/// - only `mark_failed` may put a URL back into `pending`, and only for
///   the task that just failed
pub struct CrawlQueue {
    inner: Mutex<QueueInner>,
    policy: RetryPolicy,
}

impl CrawlQueue {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            inner: Mutex::new(QueueInner::default()),
            policy,
        }
    }

    /// Admits a URL to the queue
    ///
    /// The URL is normalized first so that spelling variants of one fetch
    /// target dedup together. Returns true if a new task was created,
    /// false for duplicates and unparseable URLs.
    pub fn enqueue(&self, url: &str) -> bool {
        let normalized = match normalize_url(url) {
            Ok(normalized) => normalized.to_string(),
            Err(e) => {
                tracing::debug!("Dropping unusable URL '{}': {}", url, e);
                return false;
            }
        };

        let mut inner = self.inner.lock().expect("queue mutex poisoned");
        if !inner.seen.insert(normalized.clone()) {
            return false;
        }

        inner.pending.push_back(CrawlTask {
            url: normalized,
            attempt: 0,
            enqueued_at: Utc::now(),
            not_before: None,
        });
        true
    }

    /// Seeds the queue from an ordered URL sequence
    ///
    /// Returns how many URLs were newly admitted; duplicates within the
    /// sequence collapse here.
    pub fn seed<I, S>(&self, urls: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        urls.into_iter()
            .filter(|url| self.enqueue(url.as_ref()))
            .count()
    }

    /// Takes the next dispatchable task, moving it to the in-flight set
    ///
    /// Tasks are served in admission order, except that a retried task is
    /// held back until its backoff delay has elapsed.
    pub fn next_ready(&self, now: Instant) -> NextTask {
        let mut inner = self.inner.lock().expect("queue mutex poisoned");

        let ready_idx = inner
            .pending
            .iter()
            .position(|task| task.not_before.map_or(true, |t| t <= now));

        if let Some(idx) = ready_idx {
            let task = inner.pending.remove(idx).expect("index within bounds");
            inner.in_flight.insert(task.url.clone());
            return NextTask::Ready(task);
        }

        let earliest = inner
            .pending
            .iter()
            .filter_map(|task| task.not_before)
            .min();

        match earliest {
            Some(t) => NextTask::Delayed(t.saturating_duration_since(now)),
            None => NextTask::Empty,
        }
    }

    /// Settles a task as succeeded
    pub fn mark_done(&self, url: &str) {
        let mut inner = self.inner.lock().expect("queue mutex poisoned");
        inner.in_flight.remove(url);
    }

    /// Settles a failed fetch: re-enqueue with backoff, or record a
    /// terminal failure once retries are exhausted
    ///
    /// Returns the task's new state, which is always either
    /// [`TaskState::Retrying`] or [`TaskState::FailedTerminal`].
    pub fn mark_failed(&self, task: &CrawlTask, error: &str, now: Instant) -> TaskState {
        let mut inner = self.inner.lock().expect("queue mutex poisoned");
        inner.in_flight.remove(&task.url);

        if self.policy.should_retry(task.attempt) {
            let delay = self.policy.backoff_for(task.attempt);
            inner.pending.push_back(CrawlTask {
                url: task.url.clone(),
                attempt: task.attempt + 1,
                enqueued_at: task.enqueued_at,
                not_before: Some(now + delay),
            });
            TaskState::Retrying
        } else {
            inner.failures.push(FailureRecord {
                url: task.url.clone(),
                attempts: task.attempt + 1,
                error: error.to_string(),
            });
            TaskState::FailedTerminal
        }
    }

    /// Where a URL currently sits in the task lifecycle
    ///
    /// Returns None for URLs the queue has never seen. A URL in `seen`
    /// with no live task and no failure record completed successfully.
    pub fn state_of(&self, url: &str) -> Option<TaskState> {
        let inner = self.inner.lock().expect("queue mutex poisoned");

        if inner.in_flight.contains(url) {
            return Some(TaskState::InFlight);
        }
        if let Some(task) = inner.pending.iter().find(|task| task.url == url) {
            return Some(if task.not_before.is_some() {
                TaskState::Retrying
            } else {
                TaskState::Pending
            });
        }
        if inner.failures.iter().any(|failure| failure.url == url) {
            return Some(TaskState::FailedTerminal);
        }
        if inner.seen.contains(url) {
            return Some(TaskState::Succeeded);
        }
        None
    }

    /// True once nothing is pending and nothing is in flight
    pub fn is_settled(&self) -> bool {
        let inner = self.inner.lock().expect("queue mutex poisoned");
        inner.pending.is_empty() && inner.in_flight.is_empty()
    }

    /// Current counters
    pub fn stats(&self) -> QueueStats {
        let inner = self.inner.lock().expect("queue mutex poisoned");
        QueueStats {
            pending: inner.pending.len(),
            in_flight: inner.in_flight.len(),
            seen: inner.seen.len(),
            failed: inner.failures.len(),
        }
    }

    /// Drains the terminal failure records (for the final summary)
    pub fn take_failures(&self) -> Vec<FailureRecord> {
        let mut inner = self.inner.lock().expect("queue mutex poisoned");
        std::mem::take(&mut inner.failures)
    }
}
