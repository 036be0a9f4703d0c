//! Document store boundary
//!
//! Kumo never owns a document database schema of its own; it consumes a
//! key-value document interface. A document lives at a slash-separated path
//! (`organizations/{org}/spiders/{spider}`) and carries a flat JSON object
//! of fields. Two implementations are provided: an in-memory store for
//! tests and fixtures, and a SQLite-backed store for local deployments.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during document store operations
///
/// Unlike fetch errors, store errors are fatal to a crawl: they abort seed
/// resolution before any fetch begins.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document store unavailable: {0}")]
    Unavailable(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Document at '{path}' is not valid JSON: {source}")]
    Corrupt {
        path: String,
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for document store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// A structured record fetched from the document store
///
/// Fields are a flat JSON object; absence of a field and a field of the
/// wrong shape are both ordinary, non-fatal conditions for callers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    pub fields: serde_json::Map<String, Value>,
}

impl Document {
    /// Creates an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a document from a JSON value
    ///
    /// Returns None if the value is not a JSON object.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// Gets a raw field value
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Reads a field as a list of strings
    ///
    /// Non-string entries are skipped; returns None when the field is
    /// absent or not an array.
    pub fn string_list(&self, field: &str) -> Option<Vec<String>> {
        match self.fields.get(field)? {
            Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
            ),
            _ => None,
        }
    }
}

/// Trait for read-only document lookup by path
///
/// Implementations must be safe to share across tasks, although Kumo only
/// reads from the store during seed resolution, before the fetch pool
/// starts.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetches the document at `path`
    ///
    /// * `Ok(Some(document))` - The document exists
    /// * `Ok(None)` - No document at this path (a valid outcome)
    /// * `Err(StoreError)` - The store itself failed
    async fn get_document(&self, path: &str) -> StoreResult<Option<Document>>;
}

/// Path of a spider configuration document
pub fn spider_path(organization: &str, spider: &str) -> String {
    format!("organizations/{}/spiders/{}", organization, spider)
}

/// Path of a named URL collection document
pub fn collection_path(organization: &str, collection: &str) -> String {
    format!("organizations/{}/urlscollections/{}", organization, collection)
}
