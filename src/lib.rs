//! mongodb-fixtures
//!
//! A library for loading test-fixture files into MongoDB collections, so
//! integration tests start from a known dataset.
//!
//! # How it works
//!
//! - Discovery: every regular file under a root directory, at any depth,
//!   feeds the collection named by its base name with the extension
//!   stripped (`users.json` → `users`)
//! - Decoding: each file is a sequence of concatenated extended JSON
//!   document literals, streamed one document at a time
//! - Loading: each file becomes one bulk insert into its collection; the
//!   first failure aborts the whole load, and already-committed
//!   collections are not rolled back
//!
//! # Usage
//!
//! ```ignore
//! let client = mongodb::Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("test_db");
//!
//! // One-shot: discover and load a fixture tree.
//! mongodb_fixtures::load_dir(&db, "tests/fixtures").await?;
//!
//! // Reusable: explicit mappings, loadable any number of times.
//! let mut fixtures = FixtureSet::default();
//! fixtures.insert("users", "tests/fixtures/users.json");
//! let loader = Loader::new(fixtures);
//! loader.load(&db).await?;
//! ```
//!
//! Fixtures are assumed small and trusted; there is no upsert, no schema
//! validation, and no incremental loading.

pub mod decode;
pub mod discovery;
pub mod error;
pub mod loader;
pub mod sink;
pub mod testing;

// Re-export the value crate for callers that build or inspect documents.
pub use extjson_types as extjson;

pub use decode::DocumentStream;
pub use discovery::FixtureSet;
pub use error::{DecodeError, LoadError};
pub use loader::{load_dir, Loader};
pub use sink::FixtureSink;
