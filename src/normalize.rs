//! Raw document to [`ArticleRecord`] normalization.
//!
//! [`Normalizer::normalize_one`] maps one `PubmedArticle` tree onto the fixed
//! record shape and [`Normalizer::normalize_all`] applies it to a batch. The
//! field extractors are exposed individually for callers holding only part of
//! a document.
//!
//! # Example
//!
//! ```
//! use pubnorm::{Normalizer, NormalizerConfig, PublicationDate, RawValue};
//!
//! let document: RawValue = serde_json::from_str(r##"{
//!     "MedlineCitation": {
//!         "PMID": {"#text": "12345"},
//!         "Article": {
//!             "ArticleTitle": "Test Title",
//!             "ArticleDate": {"Year": "2023", "Month": "02", "Day": "14"}
//!         }
//!     }
//! }"##).unwrap();
//!
//! let normalizer = Normalizer::new().with_config(NormalizerConfig {
//!     convert_date: true,
//!     ..Default::default()
//! });
//!
//! let record = normalizer.normalize_one(&document).unwrap().unwrap();
//! assert_eq!(record.title, "Test Title");
//! assert_eq!(record.publication_date, PublicationDate::Text("2023-02-14".into()));
//! ```

mod abstract_text;
mod authors;
mod date;
mod text;

pub use abstract_text::extract_abstract;
pub use authors::extract_authors;
pub use date::{convert_to_text, extract_date};
pub use text::extract_text;

use crate::value::{RawDocument, RawValue};
use crate::{ArticleRecord, Error, PublicationDate, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const MEDLINE_CITATION: &str = "MedlineCitation";
const ARTICLE: &str = "Article";
const PMID: &str = "PMID";
const ARTICLE_TITLE: &str = "ArticleTitle";
const ABSTRACT: &str = "Abstract";
const AUTHOR_LIST: &str = "AuthorList";

/// Options controlling the shape of produced records and how batches run.
///
/// # Examples
///
/// ```
/// use pubnorm::NormalizerConfig;
///
/// let config: NormalizerConfig = serde_json::from_str(r#"{"convert_date": true}"#).unwrap();
/// assert!(config.convert_date);
/// assert!(!config.run_in_parallel);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Emit `publication_date` as joined `year-month-day` text instead of
    /// the structured form.
    pub convert_date: bool,
    /// Normalize batches on the rayon thread pool. Output order is the same
    /// as sequential processing. Ignored without the `parallel` feature.
    pub run_in_parallel: bool,
}

/// Stateless normalizer for PubMed citation documents.
///
/// Holds only its configuration, so one instance can serve any number of
/// threads.
#[derive(Debug, Default, Clone)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    /// Creates a normalizer with the default configuration: structured dates,
    /// sequential batches.
    ///
    /// # Examples
    ///
    /// ```
    /// use pubnorm::Normalizer;
    /// let normalizer = Normalizer::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(mut self, config: NormalizerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Normalizes a single raw document.
    ///
    /// Returns `Ok(None)` when the document is an empty placeholder or has no
    /// `MedlineCitation` container; such documents are not usable records but
    /// are expected in bulk feeds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAMapping`] if a non-empty document is not a mapping.
    pub fn normalize_one(&self, raw: &RawDocument) -> Result<Option<ArticleRecord>> {
        if raw.is_empty() {
            return Ok(None);
        }
        if raw.as_node().is_none() {
            warn!(kind = raw.kind(), "raw document is not a mapping");
            return Err(Error::NotAMapping { found: raw.kind() });
        }
        let Some(citation) = raw.get(MEDLINE_CITATION).filter(|c| c.as_node().is_some()) else {
            return Ok(None);
        };

        let article = citation.child(ARTICLE);
        let date = date::extract_citation_date(citation, article);
        let publication_date = if self.config.convert_date {
            PublicationDate::Text(convert_to_text(&date))
        } else {
            PublicationDate::Structured(date)
        };

        Ok(Some(ArticleRecord {
            title: extract_text(article.child(ARTICLE_TITLE)),
            abstract_text: extract_abstract(article.child(ABSTRACT)),
            authors: extract_authors(article.child(AUTHOR_LIST)),
            publication_date,
            pmid: extract_pmid(citation),
        }))
    }

    /// Normalizes a batch, leaving out skipped documents.
    ///
    /// The surviving records keep their relative input order, also when
    /// running in parallel. Output positions therefore do not line up with
    /// input positions once anything was skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAMapping`] if any non-empty document is not a mapping.
    pub fn normalize_all(&self, raws: &[RawDocument]) -> Result<Vec<ArticleRecord>> {
        let records = if self.config.run_in_parallel {
            self.normalize_parallel(raws)?
        } else {
            self.normalize_sequential(raws)?
        };
        debug!(
            documents = raws.len(),
            records = records.len(),
            "normalized batch"
        );
        Ok(records)
    }

    #[cfg(feature = "parallel")]
    fn normalize_parallel(&self, raws: &[RawDocument]) -> Result<Vec<ArticleRecord>> {
        use rayon::prelude::*;

        raws.par_iter()
            .enumerate()
            .map(|(index, raw)| self.normalize_indexed(index, raw))
            .filter_map(|outcome| outcome.transpose())
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn normalize_parallel(&self, raws: &[RawDocument]) -> Result<Vec<ArticleRecord>> {
        self.normalize_sequential(raws)
    }

    fn normalize_sequential(&self, raws: &[RawDocument]) -> Result<Vec<ArticleRecord>> {
        raws.iter()
            .enumerate()
            .map(|(index, raw)| self.normalize_indexed(index, raw))
            .filter_map(|outcome| outcome.transpose())
            .collect()
    }

    fn normalize_indexed(&self, index: usize, raw: &RawDocument) -> Result<Option<ArticleRecord>> {
        let record = self.normalize_one(raw)?;
        if record.is_none() {
            debug!(index, "skipping document without citation");
        }
        Ok(record)
    }
}

/// The PMID element carries a `Version` attribute, so its value normally sits
/// under `#text`; a bare text PMID is accepted as well.
fn extract_pmid(citation: &RawValue) -> String {
    citation.field_text(PMID)
}
