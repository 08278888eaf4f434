//! Fixture sink trait abstraction.
//!
//! The loader writes through `FixtureSink` instead of talking to the
//! MongoDB driver directly, so tests can run against an in-memory store
//! (see `testing::MemorySink`) and the database handle stays an explicit
//! parameter rather than ambient process state.

use bson::Document;

/// Destination for decoded fixture documents.
///
/// One call per collection: the loader accumulates a whole file into a
/// batch and submits it as a single bulk insert. Implementations report
/// their own error type; the loader wraps it into a collection-scoped
/// write error.
#[async_trait::async_trait]
pub trait FixtureSink: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Insert `documents` into `collection` as one ordered bulk write.
    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<(), Self::Error>;
}

#[async_trait::async_trait]
impl FixtureSink for mongodb::Database {
    type Error = mongodb::error::Error;

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<(), Self::Error> {
        self.collection::<Document>(collection)
            .insert_many(documents)
            .await?;
        Ok(())
    }
}
