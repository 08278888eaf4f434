//! Error types for fixture loading.
//!
//! Every loader error names the collection (and, where it applies, the
//! file path) it occurred in, so a broken fixture can be identified from
//! the error alone. The first failure terminates the whole load;
//! collections committed before it stay committed.

use extjson_types::{ConversionError, TypeExtensionError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while pulling documents out of a fixture byte stream.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Malformed document syntax.
    #[error("malformed document syntax: {0}")]
    Syntax(#[from] serde_json::Error),

    /// A recognized extended-type tag with an invalid payload.
    #[error(transparent)]
    TypeExtension(#[from] TypeExtensionError),
}

/// Errors that can occur during a fixture load.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The fixture root or one of its subdirectories could not be read.
    #[error("failed to walk fixture root {}: {source}", root.display())]
    Discovery {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A fixture file could not be opened.
    #[error("failed to open file {} for collection {collection}: {source}", path.display())]
    Open {
        collection: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A fixture file contains a syntactically invalid document.
    #[error("failed to decode document for collection {collection}: {source}")]
    Decode {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    /// A fixture document uses an extended-type tag with a bad payload.
    #[error("invalid extended type in collection {collection}: {source}")]
    TypeExtension {
        collection: String,
        #[source]
        source: TypeExtensionError,
    },

    /// A decoded document could not be converted into a BSON document.
    #[error("failed to convert document for collection {collection}: {source}")]
    Conversion {
        collection: String,
        #[source]
        source: ConversionError,
    },

    /// The database rejected the bulk insert.
    #[error("failed to insert documents for collection {collection}: {source}")]
    Write {
        collection: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl LoadError {
    /// The collection the error occurred in, if it is collection-scoped.
    pub fn collection(&self) -> Option<&str> {
        match self {
            LoadError::Discovery { .. } => None,
            LoadError::Open { collection, .. }
            | LoadError::Decode { collection, .. }
            | LoadError::TypeExtension { collection, .. }
            | LoadError::Conversion { collection, .. }
            | LoadError::Write { collection, .. } => Some(collection),
        }
    }
}
