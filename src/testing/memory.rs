//! In-memory collection store implementing `FixtureSink`.

use crate::sink::FixtureSink;
use bson::{Bson, Document};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use thiserror::Error;

/// Errors the in-memory sink can produce.
#[derive(Debug, Error)]
pub enum MemorySinkError {
    /// A document's `_id` collides with one already stored.
    #[error("duplicate key in collection {collection}: {id}")]
    DuplicateKey { collection: String, id: Bson },

    /// The collection was configured to reject writes.
    #[error("injected write failure for collection {collection}")]
    Injected { collection: String },
}

/// A fake collection store for exercising the loader without a server.
///
/// Enforces `_id` uniqueness the way a real collection with its default
/// index does, and can be told to reject writes to a named collection to
/// drive the write-failure paths.
#[derive(Debug, Default)]
pub struct MemorySink {
    collections: Mutex<HashMap<String, Vec<Document>>>,
    failing: HashSet<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject all writes to `collection` with an injected error.
    pub fn fail_on(mut self, collection: impl Into<String>) -> Self {
        self.failing.insert(collection.into());
        self
    }

    /// Documents stored for `collection`, in insertion order.
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Names of collections that have received at least one write.
    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.lock().unwrap().keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait::async_trait]
impl FixtureSink for MemorySink {
    type Error = MemorySinkError;

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<(), Self::Error> {
        if self.failing.contains(collection) {
            return Err(MemorySinkError::Injected {
                collection: collection.to_string(),
            });
        }

        let mut collections = self.collections.lock().unwrap();
        let stored = collections.entry(collection.to_string()).or_default();

        let mut seen: HashSet<String> = stored
            .iter()
            .filter_map(|doc| doc.get("_id"))
            .map(|id| id.to_string())
            .collect();
        for document in &documents {
            if let Some(id) = document.get("_id") {
                if !seen.insert(id.to_string()) {
                    return Err(MemorySinkError::DuplicateKey {
                        collection: collection.to_string(),
                        id: id.clone(),
                    });
                }
            }
        }

        stored.extend(documents);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let sink = MemorySink::new();
        sink.insert_many("users", vec![doc! {"_id": 1}, doc! {"_id": 2}])
            .await
            .unwrap();
        assert_eq!(sink.documents("users").len(), 2);
        assert_eq!(sink.collection_names(), vec!["users"]);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let sink = MemorySink::new();
        sink.insert_many("users", vec![doc! {"_id": 1}])
            .await
            .unwrap();
        let err = sink
            .insert_many("users", vec![doc! {"_id": 1}])
            .await
            .unwrap_err();
        assert!(matches!(err, MemorySinkError::DuplicateKey { .. }));
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let sink = MemorySink::new().fail_on("orders");
        let err = sink
            .insert_many("orders", vec![doc! {"n": 1}])
            .await
            .unwrap_err();
        assert!(matches!(err, MemorySinkError::Injected { .. }));
    }
}
