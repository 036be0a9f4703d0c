//! In-memory document store
//!
//! Used by tests and fixtures; documents are inserted up front and the
//! store is read-only afterwards.

use crate::store::{Document, DocumentStore, StoreResult};
use async_trait::async_trait;
use std::collections::HashMap;

/// A document store backed by a plain map
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: HashMap<String, Document>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a document at the given path, replacing any existing one
    pub fn insert(&mut self, path: impl Into<String>, document: Document) {
        self.documents.insert(path.into(), document);
    }

    /// Builder-style insert for fixture setup
    pub fn with_document(mut self, path: impl Into<String>, document: Document) -> Self {
        self.insert(path, document);
        self
    }

    /// Returns the number of stored documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns whether the store holds no documents
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_document(&self, path: &str) -> StoreResult<Option<Document>> {
        Ok(self.documents.get(path).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_missing_document() {
        let store = MemoryStore::new();
        let doc = store.get_document("organizations/x/spiders/y").await.unwrap();
        assert!(doc.is_none());
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let doc = Document::from_json(json!({"urlsCollections": ["a"]})).unwrap();
        let store = MemoryStore::new().with_document("organizations/x/spiders/y", doc);

        let fetched = store
            .get_document("organizations/x/spiders/y")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            fetched.string_list("urlsCollections"),
            Some(vec!["a".to_string()])
        );
    }

    #[tokio::test]
    async fn test_insert_replaces() {
        let mut store = MemoryStore::new();
        store.insert("p", Document::from_json(json!({"v": 1})).unwrap());
        store.insert("p", Document::from_json(json!({"v": 2})).unwrap());

        let fetched = store.get_document("p").await.unwrap().unwrap();
        assert_eq!(fetched.get("v"), Some(&json!(2)));
        assert_eq!(store.len(), 1);
    }
}
