//! Extended JSON value model and BSON conversions for mongodb-fixtures.
//!
//! This crate owns the value side of fixture decoding:
//!
//! - [`value`] - `ExtendedValue` and `DecodedDocument`, the closed set of
//!   value kinds a fixture may contain
//! - [`tags`] - table-driven resolution of extended-type tags (`$oid`,
//!   `$date`, `$binary`, ...) from parsed JSON
//! - [`forward`] - `ExtendedValue` → BSON conversion
//! - [`reverse`] - BSON → `ExtendedValue` and canonical extended JSON
//!   rendering, used by fixture-writing helpers and round-trip tests
//!
//! Streaming fixture files and driving the database live in the
//! `mongodb-fixtures` crate; this crate has no I/O.

pub mod error;
pub mod forward;
pub mod reverse;
pub mod tags;
pub mod value;

pub use error::{ConversionError, TypeExtensionError};
pub use value::{DecodedDocument, ExtendedValue};
