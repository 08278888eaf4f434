//! Error types for extended JSON decoding and BSON conversion.

use thiserror::Error;

/// Errors raised when a recognized extended-type tag carries an invalid payload.
#[derive(Debug, Error)]
pub enum TypeExtensionError {
    /// ObjectId payload is not a 24-character hex string.
    #[error("invalid ObjectId '{value}': expected a 24-character hex string")]
    InvalidObjectId { value: String },

    /// Date payload is neither an RFC 3339 string nor a millisecond count.
    #[error("invalid $date payload '{value}'")]
    InvalidDate { value: String },

    /// Numeric tag payload does not parse as the tagged type.
    #[error("invalid {tag} payload '{value}'")]
    InvalidNumber { tag: &'static str, value: String },

    /// Binary payload has bad base64 data or a bad subtype.
    #[error("invalid $binary payload: {reason}")]
    InvalidBinary { reason: String },

    /// Invalid UUID string format.
    #[error("invalid UUID format: {value}")]
    InvalidUuid { value: String },

    /// Timestamp payload is missing `t`/`i` or they do not fit in u32.
    #[error("invalid $timestamp payload '{value}'")]
    InvalidTimestamp { value: String },

    /// Tag payload has the wrong JSON shape.
    #[error("invalid {tag} payload: expected {expected}")]
    InvalidPayload {
        tag: &'static str,
        expected: &'static str,
    },
}

/// Errors raised when a decoded document cannot be turned into a BSON document.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Decimal string rejected by the BSON Decimal128 parser.
    #[error("invalid Decimal128 value '{value}'")]
    InvalidDecimal { value: String },
}
