//! Streaming fixture decoding.
//!
//! A fixture file is a sequence of concatenated top-level extended JSON
//! object literals separated by whitespace; there is no outer array and no
//! separators between documents. `DocumentStream` pulls one document at a
//! time off an open byte stream, so fixture size never dictates memory.

use crate::error::DecodeError;
use extjson_types::{tags, DecodedDocument};
use serde_json::de::IoRead;
use serde_json::{Map, StreamDeserializer, Value};
use std::io::Read;

/// Lazy sequence of decoded fixture documents over a byte stream.
///
/// Call [`next_document`](Self::next_document) until it returns `None`
/// (normal end-of-stream). Not restartable; sequential single-threaded
/// iteration only.
pub struct DocumentStream<R: Read> {
    documents: StreamDeserializer<'static, IoRead<R>, Map<String, Value>>,
}

impl<R: Read> DocumentStream<R> {
    /// Wrap a reader positioned at the start of the first document literal.
    pub fn new(reader: R) -> Self {
        Self {
            documents: serde_json::Deserializer::from_reader(reader).into_iter(),
        }
    }

    /// Decode the next document, advancing the stream past it.
    ///
    /// Returns `None` once no top-level objects remain. A top-level value
    /// that is not an object is a syntax error, as is any malformed JSON;
    /// a recognized extended-type tag with a bad payload is a
    /// [`DecodeError::TypeExtension`].
    pub fn next_document(&mut self) -> Option<Result<DecodedDocument, DecodeError>> {
        let object = match self.documents.next()? {
            Ok(object) => object,
            Err(e) => return Some(Err(DecodeError::Syntax(e))),
        };
        Some(tags::document_from_json(&object).map_err(DecodeError::TypeExtension))
    }
}

impl<R: Read> Iterator for DocumentStream<R> {
    type Item = Result<DecodedDocument, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_document()
    }
}
