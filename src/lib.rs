//! Normalization of raw PubMed citation documents into stable article records.
//!
//! PubMed's efetch responses are loosely shaped: any element may be missing,
//! appear once, or repeat, and the same logical field can live in several
//! places. `pubnorm` maps each raw document onto a fixed five-field
//! [`ArticleRecord`] so exporters and analytics never have to check shapes.
//!
//! # Features
//!
//! - `xml` - Read PubMed efetch XML into raw document trees (enabled by default)
//! - `csv` - CSV export of normalized records (enabled by default)
//! - `parallel` - Normalize batches on the rayon thread pool (enabled by default)
//! - `cli` - The `pubnorm` command line tool
//!
//! # Basic Usage
//!
//! ```rust
//! use pubnorm::{DocumentReader, JsonReader, Normalizer};
//!
//! let input = r##"[{
//!     "MedlineCitation": {
//!         "PMID": {"@Version": "1", "#text": "12345"},
//!         "Article": {
//!             "ArticleTitle": "Test Title",
//!             "AuthorList": {"Author": {"ForeName": "John", "LastName": "Doe"}},
//!             "Journal": {"JournalIssue": {"PubDate": {"Year": "2023", "Month": "01", "Day": "01"}}}
//!         }
//!     }
//! }]"##;
//!
//! let documents = JsonReader::new().read(input).unwrap();
//! let records = Normalizer::new().normalize_all(&documents).unwrap();
//!
//! assert_eq!(records[0].pmid, "12345");
//! assert_eq!(records[0].authors, vec!["John Doe"]);
//! assert_eq!(records[0].publication_date.to_text(), "2023-01-01");
//! ```
//!
//! # Skipped Documents
//!
//! Documents without a `MedlineCitation` container (or empty placeholders) are
//! not errors: [`Normalizer::normalize_one`] returns `Ok(None)` and
//! [`Normalizer::normalize_all`] leaves them out. Only a document that is not a
//! mapping at all is reported as [`Error::NotAMapping`].
//!
//! # Thread Safety
//!
//! Normalization keeps no state between documents. A [`Normalizer`] can be
//! shared between threads, and with `run_in_parallel` the batch is spread over
//! rayon's pool while keeping input order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod export;
pub mod normalize;
pub mod reader;
pub mod value;
#[cfg(feature = "xml")]
pub mod xml;

// Reexports
#[cfg(feature = "csv")]
pub use export::CsvExporter;
pub use export::{JsonLinesExporter, RecordExporter};
pub use normalize::{Normalizer, NormalizerConfig};
pub use reader::{DocumentReader, JsonReader};
pub use value::{RawDocument, RawValue};
#[cfg(feature = "xml")]
pub use xml::PubmedXmlReader;

/// A specialized Result type for normalization and export operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised at the crate's boundaries.
///
/// Normalization itself only fails on [`Error::NotAMapping`]; incomplete
/// documents are skipped or filled with empty values instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Raw document must be a mapping, found {found}")]
    NotAMapping { found: &'static str },

    #[error("XML error: {0}")]
    Xml(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No records to export")]
    EmptyInput,

    #[error("Unknown record field: {0}")]
    UnknownField(String),
}

#[cfg(feature = "csv")]
impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err.to_string())
    }
}

#[cfg(feature = "xml")]
impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

#[cfg(feature = "xml")]
impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::Xml(err.to_string())
    }
}

/// Publication date as three independent text parts.
///
/// The parts are kept as text because PubMed uses month names and
/// placeholders as often as numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredDate {
    pub year: String,
    pub month: String,
    pub day: String,
}

impl StructuredDate {
    /// Returns `true` when all three parts are empty.
    pub fn is_empty(&self) -> bool {
        self.year.is_empty() && self.month.is_empty() && self.day.is_empty()
    }

    /// Joins the parts as `year-month-day`, see [`normalize::convert_to_text`].
    pub fn to_text(&self) -> String {
        normalize::convert_to_text(self)
    }
}

/// Publication date in the form selected by [`NormalizerConfig::convert_date`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PublicationDate {
    Structured(StructuredDate),
    Text(String),
}

impl Default for PublicationDate {
    fn default() -> Self {
        PublicationDate::Structured(StructuredDate::default())
    }
}

impl PublicationDate {
    /// The date as joined text, whichever form it is stored in.
    pub fn to_text(&self) -> String {
        match self {
            PublicationDate::Structured(date) => date.to_text(),
            PublicationDate::Text(text) => text.clone(),
        }
    }
}

impl From<StructuredDate> for PublicationDate {
    fn from(date: StructuredDate) -> Self {
        PublicationDate::Structured(date)
    }
}

/// A normalized article.
///
/// Every field is always present; missing source data shows up as an empty
/// string, an empty author list or an all-empty date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Article title with inline markup flattened to plain text
    pub title: String,
    /// Abstract sections joined in order, labelled sections as `LABEL: text`
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Author names as `given family`, one per source entry
    pub authors: Vec<String>,
    /// Publication date from the first source carrying any part of it
    pub publication_date: PublicationDate,
    /// PubMed identifier
    pub pmid: String,
}

/// Names of the [`ArticleRecord`] fields, used to select export columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    Title,
    Abstract,
    Authors,
    PublicationDate,
    Pmid,
}

impl RecordField {
    /// All fields in record order.
    pub const ALL: [RecordField; 5] = [
        RecordField::Title,
        RecordField::Abstract,
        RecordField::Authors,
        RecordField::PublicationDate,
        RecordField::Pmid,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RecordField::Title => "title",
            RecordField::Abstract => "abstract",
            RecordField::Authors => "authors",
            RecordField::PublicationDate => "publication_date",
            RecordField::Pmid => "pmid",
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        RecordField::ALL
            .into_iter()
            .find(|field| field.as_str() == s.trim())
            .ok_or_else(|| Error::UnknownField(s.to_string()))
    }
}
