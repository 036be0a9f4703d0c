/// Task state definitions for tracking crawl progress
///
/// Every URL admitted to the crawl queue moves through these states:
/// `Pending -> InFlight -> {Succeeded | Retrying -> Pending | FailedTerminal}`.
use std::fmt;

/// Represents the current state of a crawl task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    /// Task is queued and waiting for a free fetch slot
    Pending,

    /// Task is currently being fetched
    InFlight,

    /// Fetch failed and the task is waiting out its backoff delay
    Retrying,

    /// Fetch completed and the page handler has been invoked
    Succeeded,

    /// Retries are exhausted; the task will never run again
    FailedTerminal,
}

impl TaskState {
    /// Returns true if this is a terminal state (no further processing)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::FailedTerminal)
    }

    /// Returns true if the task may still produce work
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// Converts the task state to its string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InFlight => "in_flight",
            Self::Retrying => "retrying",
            Self::Succeeded => "succeeded",
            Self::FailedTerminal => "failed_terminal",
        }
    }

    /// Parses a task state from its string representation
    ///
    /// Returns None if the string doesn't match any known state.
    pub fn from_str_repr(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "in_flight" => Some(Self::InFlight),
            "retrying" => Some(Self::Retrying),
            "succeeded" => Some(Self::Succeeded),
            "failed_terminal" => Some(Self::FailedTerminal),
            _ => None,
        }
    }

    /// Returns all possible task states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Pending,
            Self::InFlight,
            Self::Retrying,
            Self::Succeeded,
            Self::FailedTerminal,
        ]
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
