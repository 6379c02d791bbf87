//! Readers turning a serialized response into raw documents.
//!
//! Network retrieval is left to the caller; a reader only takes the response
//! body and produces the [`RawDocument`]s to feed into
//! [`Normalizer::normalize_all`](crate::Normalizer::normalize_all).

use crate::Result;
use crate::value::{RawDocument, RawValue};

/// Trait for implementing raw document readers.
pub trait DocumentReader {
    /// Read a string containing one or more raw documents.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not well-formed in the reader's format.
    fn read(&self, input: &str) -> Result<Vec<RawDocument>>;
}

/// Reader for documents already converted to JSON.
///
/// Accepts either a single document or an array of documents. `null` reads as
/// no documents.
///
/// # Examples
///
/// ```
/// use pubnorm::{DocumentReader, JsonReader};
///
/// let documents = JsonReader::new()
///     .read(r#"[{"MedlineCitation": {}}, null]"#)
///     .unwrap();
/// assert_eq!(documents.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonReader {}

impl JsonReader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentReader for JsonReader {
    fn read(&self, input: &str) -> Result<Vec<RawDocument>> {
        let value: RawValue = serde_json::from_str(input)?;
        Ok(value.into_items())
    }
}
