//! Shared helpers for fixture tests.
//!
//! An in-memory sink that stands in for a MongoDB database, plus helpers
//! for writing fixture trees to disk from native documents.

pub mod fixtures;
pub mod memory;

pub use fixtures::{render_fixture, write_fixture};
pub use memory::{MemorySink, MemorySinkError};
