//! Batch loading of fixtures into collections.
//!
//! For each (collection, path) pair the loader opens the file, drains the
//! document stream, converts every document to BSON, and submits the
//! whole batch as one bulk insert. Any failure aborts the entire load
//! immediately; collections committed before the failure stay committed.

use crate::decode::DocumentStream;
use crate::discovery::FixtureSet;
use crate::error::{DecodeError, LoadError};
use crate::sink::FixtureSink;
use bson::Document;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Loads a fixed set of fixtures into a database.
///
/// Holds only the collection → path mapping, so the same loader can be
/// run against several sinks (or the same sink repeatedly; note that
/// reloading is plain re-insertion, so a second run against a collection
/// with a uniqueness constraint fails with a write error).
pub struct Loader {
    fixtures: FixtureSet,
}

impl Loader {
    pub fn new(fixtures: FixtureSet) -> Self {
        Self { fixtures }
    }

    pub fn fixtures(&self) -> &FixtureSet {
        &self.fixtures
    }

    /// Load every fixture in the set into `sink`, one collection at a time.
    pub async fn load<S: FixtureSink>(&self, sink: &S) -> Result<(), LoadError> {
        let mut total = 0;
        for (collection, path) in self.fixtures.iter() {
            total += load_collection(sink, collection, path).await?;
        }
        tracing::info!(
            collections = self.fixtures.len(),
            documents = total,
            "fixture load completed"
        );
        Ok(())
    }
}

/// Discover fixtures under `root` and load them into `sink` in one shot.
pub async fn load_dir<S: FixtureSink>(
    sink: &S,
    root: impl AsRef<Path>,
) -> Result<(), LoadError> {
    let fixtures = FixtureSet::discover(root)?;
    Loader::new(fixtures).load(sink).await
}

async fn load_collection<S: FixtureSink>(
    sink: &S,
    collection: &str,
    path: &Path,
) -> Result<usize, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        collection: collection.to_string(),
        path: path.to_path_buf(),
        source,
    })?;

    let mut stream = DocumentStream::new(BufReader::new(file));
    let mut batch: Vec<Document> = Vec::new();
    while let Some(result) = stream.next_document() {
        let decoded = result.map_err(|e| match e {
            DecodeError::Syntax(source) => LoadError::Decode {
                collection: collection.to_string(),
                source,
            },
            DecodeError::TypeExtension(source) => LoadError::TypeExtension {
                collection: collection.to_string(),
                source,
            },
        })?;

        let document = extjson_types::forward::to_document(&decoded).map_err(|source| {
            LoadError::Conversion {
                collection: collection.to_string(),
                source,
            }
        })?;
        batch.push(document);
    }

    // An empty fixture is a valid way to pin a collection at zero
    // documents; the write call is skipped rather than submitting an
    // empty bulk operation.
    if batch.is_empty() {
        tracing::debug!(collection, "fixture contains no documents, skipping write");
        return Ok(0);
    }

    let count = batch.len();
    sink.insert_many(collection, batch)
        .await
        .map_err(|source| LoadError::Write {
            collection: collection.to_string(),
            source: Box::new(source),
        })?;
    tracing::info!(collection, documents = count, "loaded fixture");
    Ok(count)
}
