//! Two-stage seed resolution
//!
//! Stage one fetches the spider configuration and reads its collection
//! names; stage two fetches each named collection and concatenates the URL
//! lists. Absent or misshapen documents are non-fatal: a crawl with no
//! seeds is valid and simply does no work. Only store-level failures
//! propagate, aborting the crawl before any fetch begins.

use crate::seeds::{SeedReference, SpiderConfig, UrlCollection};
use crate::store::{collection_path, spider_path, DocumentStore, StoreResult};

/// Field on the spider document naming its URL collections
const FIELD_COLLECTIONS: &str = "urlsCollections";

/// Field on a collection document holding its URL list
const FIELD_URLS: &str = "urlsList";

/// Resolves a seed reference into a flat, ordered URL sequence
///
/// Collections are processed in declared order and their URL lists are
/// concatenated preserving within-collection order, so the output is
/// deterministic. No deduplication happens here; that is the crawl
/// queue's job.
///
/// # Arguments
///
/// * `store` - The document store to resolve against
/// * `reference` - Which spider configuration to resolve
///
/// # Returns
///
/// * `Ok(urls)` - The resolved seed URLs (possibly empty)
/// * `Err(StoreError)` - The store itself failed; the crawl must not start
pub async fn resolve_seeds(
    store: &dyn DocumentStore,
    reference: &SeedReference,
) -> StoreResult<Vec<String>> {
    let spider = match fetch_spider_config(store, reference).await? {
        Some(spider) => spider,
        None => return Ok(Vec::new()),
    };

    let mut urls = Vec::new();
    for name in &spider.collection_names {
        match fetch_collection(store, &reference.organization_id, name).await? {
            Some(collection) => {
                tracing::debug!(
                    "Collection '{}' resolved to {} URLs",
                    name,
                    collection.urls.len()
                );
                urls.extend(collection.urls);
            }
            None => {
                // Partial resolution: skip and keep going
                tracing::warn!(
                    "URL collection '{}' referenced by spider '{}' not found, skipping",
                    name,
                    spider.spider_id
                );
            }
        }
    }

    tracing::info!(
        "Resolved {} seed URLs from {} collections for spider '{}'",
        urls.len(),
        spider.collection_names.len(),
        spider.spider_id
    );

    Ok(urls)
}

/// Fetches and decodes the spider configuration document
///
/// Returns None when the document is absent or its `urlsCollections` field
/// has the wrong shape; the two cases log differently so an operator can
/// tell "not configured" from "misconfigured".
async fn fetch_spider_config(
    store: &dyn DocumentStore,
    reference: &SeedReference,
) -> StoreResult<Option<SpiderConfig>> {
    let path = spider_path(&reference.organization_id, &reference.spider_id);

    let document = match store.get_document(&path).await? {
        Some(document) => document,
        None => {
            tracing::warn!("Spider config not found at '{}', crawl has no seeds", path);
            return Ok(None);
        }
    };

    match document.string_list(FIELD_COLLECTIONS) {
        Some(collection_names) => Ok(Some(SpiderConfig {
            spider_id: reference.spider_id.clone(),
            collection_names,
        })),
        None => {
            tracing::warn!(
                "Spider config at '{}' has no usable '{}' field, crawl has no seeds",
                path,
                FIELD_COLLECTIONS
            );
            Ok(None)
        }
    }
}

/// Fetches and decodes a named URL collection document
async fn fetch_collection(
    store: &dyn DocumentStore,
    organization_id: &str,
    name: &str,
) -> StoreResult<Option<UrlCollection>> {
    let path = collection_path(organization_id, name);

    let document = match store.get_document(&path).await? {
        Some(document) => document,
        None => return Ok(None),
    };

    match document.string_list(FIELD_URLS) {
        Some(urls) => Ok(Some(UrlCollection {
            name: name.to_string(),
            urls,
        })),
        None => {
            tracing::warn!(
                "URL collection at '{}' has no usable '{}' field, skipping",
                path,
                FIELD_URLS
            );
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Document, MemoryStore};
    use serde_json::json;

    fn spider_doc(collections: &[&str]) -> Document {
        Document::from_json(json!({ "urlsCollections": collections })).unwrap()
    }

    fn collection_doc(urls: &[&str]) -> Document {
        Document::from_json(json!({ "urlsList": urls })).unwrap()
    }

    #[tokio::test]
    async fn test_absent_spider_config_yields_empty() {
        let store = MemoryStore::new();
        let reference = SeedReference::new("acme", "missing");

        let urls = resolve_seeds(&store, &reference).await.unwrap();
        assert!(urls.is_empty());
    }

    #[tokio::test]
    async fn test_spider_config_without_collections_field_yields_empty() {
        let store = MemoryStore::new().with_document(
            "organizations/acme/spiders/catalog",
            Document::from_json(json!({"somethingElse": true})).unwrap(),
        );
        let reference = SeedReference::new("acme", "catalog");

        let urls = resolve_seeds(&store, &reference).await.unwrap();
        assert!(urls.is_empty());
    }

    #[tokio::test]
    async fn test_resolution_preserves_order() {
        let store = MemoryStore::new()
            .with_document(
                "organizations/acme/spiders/catalog",
                spider_doc(&["first", "second"]),
            )
            .with_document(
                "organizations/acme/urlscollections/first",
                collection_doc(&["https://a/1", "https://a/2"]),
            )
            .with_document(
                "organizations/acme/urlscollections/second",
                collection_doc(&["https://b/1"]),
            );
        let reference = SeedReference::new("acme", "catalog");

        let urls = resolve_seeds(&store, &reference).await.unwrap();
        assert_eq!(urls, vec!["https://a/1", "https://a/2", "https://b/1"]);
    }

    #[tokio::test]
    async fn test_duplicate_collection_names_are_not_prededuplicated() {
        let store = MemoryStore::new()
            .with_document(
                "organizations/acme/spiders/catalog",
                spider_doc(&["a", "a", "b"]),
            )
            .with_document(
                "organizations/acme/urlscollections/a",
                collection_doc(&["https://u1", "https://u2"]),
            )
            .with_document(
                "organizations/acme/urlscollections/b",
                collection_doc(&["https://u3"]),
            );
        let reference = SeedReference::new("acme", "catalog");

        // The queue collapses duplicates later; resolution itself must not
        let urls = resolve_seeds(&store, &reference).await.unwrap();
        assert_eq!(
            urls,
            vec![
                "https://u1",
                "https://u2",
                "https://u1",
                "https://u2",
                "https://u3"
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_collection_is_skipped() {
        let store = MemoryStore::new()
            .with_document(
                "organizations/acme/spiders/catalog",
                spider_doc(&["present", "missing", "also-present"]),
            )
            .with_document(
                "organizations/acme/urlscollections/present",
                collection_doc(&["https://u1"]),
            )
            .with_document(
                "organizations/acme/urlscollections/also-present",
                collection_doc(&["https://u2"]),
            );
        let reference = SeedReference::new("acme", "catalog");

        let urls = resolve_seeds(&store, &reference).await.unwrap();
        assert_eq!(urls, vec!["https://u1", "https://u2"]);
    }

    #[tokio::test]
    async fn test_malformed_collection_is_skipped() {
        let store = MemoryStore::new()
            .with_document(
                "organizations/acme/spiders/catalog",
                spider_doc(&["bad", "good"]),
            )
            .with_document(
                "organizations/acme/urlscollections/bad",
                Document::from_json(json!({"urlsList": "not-a-list"})).unwrap(),
            )
            .with_document(
                "organizations/acme/urlscollections/good",
                collection_doc(&["https://u1"]),
            );
        let reference = SeedReference::new("acme", "catalog");

        let urls = resolve_seeds(&store, &reference).await.unwrap();
        assert_eq!(urls, vec!["https://u1"]);
    }
}
