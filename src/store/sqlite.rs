//! SQLite-backed document store
//!
//! Stores each document as a row keyed by its path, with the fields
//! serialized as a JSON object. The connection lives behind a mutex; the
//! crawler only reads during seed resolution, so contention is not a
//! concern.

use crate::store::{Document, DocumentStore, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// SQL schema for the document database
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    path TEXT PRIMARY KEY,
    fields TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// A document store backed by a local SQLite database
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) a document database at the given path
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StoreError)` - Failed to open database
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        conn.execute_batch(SCHEMA_SQL)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory document database
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Inserts or replaces the document at `path`
    ///
    /// Lookup is the only operation the crawler itself needs; writes exist
    /// for provisioning spider configs and URL collections.
    pub fn put_document(&self, path: &str, document: &Document) -> StoreResult<()> {
        let fields = serde_json::to_string(&document.fields).map_err(|source| {
            StoreError::Corrupt {
                path: path.to_string(),
                source,
            }
        })?;
        let now = Utc::now().to_rfc3339();

        let conn = self.conn.lock().expect("store mutex poisoned");
        conn.execute(
            "INSERT INTO documents (path, fields, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(path) DO UPDATE SET fields = ?2, updated_at = ?3",
            params![path, fields, now],
        )?;
        Ok(())
    }

    /// Deletes the document at `path`, returning whether it existed
    pub fn delete_document(&self, path: &str) -> StoreResult<bool> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let affected = conn.execute("DELETE FROM documents WHERE path = ?1", params![path])?;
        Ok(affected > 0)
    }

    fn fetch(&self, path: &str) -> StoreResult<Option<Document>> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let raw: Option<String> = conn
            .query_row(
                "SELECT fields FROM documents WHERE path = ?1",
                params![path],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(json) => {
                let fields = serde_json::from_str(&json).map_err(|source| StoreError::Corrupt {
                    path: path.to_string(),
                    source,
                })?;
                Ok(Some(Document { fields }))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn get_document(&self, path: &str) -> StoreResult<Option<Document>> {
        self.fetch(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_missing_document() {
        let store = SqliteStore::open_in_memory().unwrap();
        let doc = store.get_document("organizations/x/spiders/y").await.unwrap();
        assert!(doc.is_none());
    }

    #[tokio::test]
    async fn test_put_and_get_document() {
        let store = SqliteStore::open_in_memory().unwrap();
        let doc = Document::from_json(json!({
            "urlsCollections": ["products", "news"],
        }))
        .unwrap();

        store.put_document("organizations/x/spiders/y", &doc).unwrap();

        let fetched = store
            .get_document("organizations/x/spiders/y")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            fetched.string_list("urlsCollections"),
            Some(vec!["products".to_string(), "news".to_string()])
        );
    }

    #[tokio::test]
    async fn test_put_replaces_existing() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .put_document("p", &Document::from_json(json!({"v": 1})).unwrap())
            .unwrap();
        store
            .put_document("p", &Document::from_json(json!({"v": 2})).unwrap())
            .unwrap();

        let fetched = store.get_document("p").await.unwrap().unwrap();
        assert_eq!(fetched.get("v"), Some(&json!(2)));
    }

    #[tokio::test]
    async fn test_delete_document() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .put_document("p", &Document::from_json(json!({"v": 1})).unwrap())
            .unwrap();

        assert!(store.delete_document("p").unwrap());
        assert!(!store.delete_document("p").unwrap());
        assert!(store.get_document("p").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("documents.db");

        let store = SqliteStore::open(&db_path).unwrap();
        store
            .put_document("p", &Document::from_json(json!({"v": 1})).unwrap())
            .unwrap();
        drop(store);

        // Reopen and read back
        let store = SqliteStore::open(&db_path).unwrap();
        let fetched = store.get_document("p").await.unwrap().unwrap();
        assert_eq!(fetched.get("v"), Some(&json!(1)));
    }
}
