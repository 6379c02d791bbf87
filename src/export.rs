//! Exporters writing normalized records to tabular and line-oriented formats.
//!
//! Every exporter writes the same selectable set of [`RecordField`]s, by
//! default all five in record order. Exporting nothing is treated as a caller
//! error rather than producing an empty file.
//!
//! # Example
//!
//! ```
//! use pubnorm::{ArticleRecord, JsonLinesExporter, RecordExporter, RecordField};
//!
//! let records = vec![ArticleRecord {
//!     title: "Example".to_string(),
//!     pmid: "1".to_string(),
//!     ..Default::default()
//! }];
//!
//! let mut out = Vec::new();
//! JsonLinesExporter::new()
//!     .with_fields(vec![RecordField::Pmid, RecordField::Title])
//!     .export(&records, &mut out)
//!     .unwrap();
//! assert_eq!(String::from_utf8(out).unwrap(), "{\"pmid\":\"1\",\"title\":\"Example\"}\n");
//! ```

use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::{ArticleRecord, Error, RecordField, Result};

/// Separator placed between author names in single-cell formats.
pub const AUTHOR_SEPARATOR: &str = "; ";

/// Trait for implementing record exporters.
pub trait RecordExporter {
    /// Write `records` to `writer`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyInput`] if `records` is empty, or the underlying
    /// write error.
    fn export<W: Write>(&self, records: &[ArticleRecord], writer: W) -> Result<()>;

    /// Write `records` to a file, creating missing parent directories.
    fn export_to_path<P: AsRef<Path>>(&self, records: &[ArticleRecord], path: P) -> Result<()> {
        ensure_records(records)?;
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        self.export(records, BufWriter::new(File::create(path)?))?;
        info!(records = records.len(), path = %path.display(), "exported records");
        Ok(())
    }
}

/// Parse a comma separated list of field names, e.g. `"title,pmid"`.
///
/// # Errors
///
/// Returns [`Error::UnknownField`] for a name that is not a record field.
pub fn parse_fields(names: &str) -> Result<Vec<RecordField>> {
    names
        .split(',')
        .filter(|name| !name.trim().is_empty())
        .map(|name| name.parse::<RecordField>())
        .collect()
}

fn ensure_records(records: &[ArticleRecord]) -> Result<()> {
    if records.is_empty() {
        Err(Error::EmptyInput)
    } else {
        Ok(())
    }
}

/// An empty selection means all fields.
fn selected_fields(fields: &[RecordField]) -> &[RecordField] {
    if fields.is_empty() {
        &RecordField::ALL
    } else {
        fields
    }
}

/// Single-cell text of a field: authors joined, dates in `year-month-day` form.
pub fn field_text(record: &ArticleRecord, field: RecordField) -> Cow<'_, str> {
    match field {
        RecordField::Title => Cow::Borrowed(&record.title),
        RecordField::Abstract => Cow::Borrowed(&record.abstract_text),
        RecordField::Authors => Cow::Owned(record.authors.join(AUTHOR_SEPARATOR)),
        RecordField::PublicationDate => Cow::Owned(record.publication_date.to_text()),
        RecordField::Pmid => Cow::Borrowed(&record.pmid),
    }
}

/// CSV exporter: a header row of field names, then one row per record.
///
/// # Examples
///
/// ```
/// use pubnorm::{CsvExporter, RecordExporter, RecordField};
///
/// let exporter = CsvExporter::new()
///     .with_fields(vec![RecordField::Title, RecordField::Authors])
///     .with_delimiter(b';');
/// ```
#[cfg(feature = "csv")]
#[derive(Debug, Clone)]
pub struct CsvExporter {
    fields: Vec<RecordField>,
    delimiter: u8,
}

#[cfg(feature = "csv")]
impl Default for CsvExporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "csv")]
impl CsvExporter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            fields: RecordField::ALL.to_vec(),
            delimiter: b',',
        }
    }

    /// Selects the columns to write, in order.
    #[must_use]
    pub fn with_fields(mut self, fields: Vec<RecordField>) -> Self {
        self.fields = fields;
        self
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

#[cfg(feature = "csv")]
impl RecordExporter for CsvExporter {
    fn export<W: Write>(&self, records: &[ArticleRecord], writer: W) -> Result<()> {
        ensure_records(records)?;
        let fields = selected_fields(&self.fields);
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(writer);

        csv_writer.write_record(fields.iter().map(|field| field.as_str()))?;
        for record in records {
            csv_writer.write_record(
                fields
                    .iter()
                    .map(|&field| field_text(record, field).into_owned()),
            )?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

/// JSON Lines exporter: one JSON object per record.
///
/// Values keep their record types, so authors stay an array and a structured
/// date stays an object.
#[derive(Debug, Clone)]
pub struct JsonLinesExporter {
    fields: Vec<RecordField>,
}

impl Default for JsonLinesExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonLinesExporter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            fields: RecordField::ALL.to_vec(),
        }
    }

    /// Selects the keys to write, in order.
    #[must_use]
    pub fn with_fields(mut self, fields: Vec<RecordField>) -> Self {
        self.fields = fields;
        self
    }
}

impl RecordExporter for JsonLinesExporter {
    fn export<W: Write>(&self, records: &[ArticleRecord], mut writer: W) -> Result<()> {
        ensure_records(records)?;
        let fields = selected_fields(&self.fields);
        for record in records {
            let values = serde_json::to_value(record)?;
            serde_json::to_writer(&mut writer, &SelectedFields { fields, values: &values })?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Serializes the chosen keys of a record in selection order.
struct SelectedFields<'a> {
    fields: &'a [RecordField],
    values: &'a serde_json::Value,
}

impl Serialize for SelectedFields<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.fields.iter().filter_map(|field| {
            self.values
                .get(field.as_str())
                .map(|value| (field.as_str(), value))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PublicationDate, StructuredDate};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_records() -> Vec<ArticleRecord> {
        vec![
            ArticleRecord {
                title: "Test Article 1".to_string(),
                abstract_text: "Test Abstract 1".to_string(),
                authors: vec!["John Doe".to_string(), "Jane Smith".to_string()],
                publication_date: PublicationDate::Structured(StructuredDate {
                    year: "2023".to_string(),
                    month: "01".to_string(),
                    day: "01".to_string(),
                }),
                pmid: "12345".to_string(),
            },
            ArticleRecord {
                title: "Test Article 2, revisited".to_string(),
                abstract_text: "Test Abstract 2".to_string(),
                authors: vec!["Bob Johnson".to_string()],
                publication_date: PublicationDate::Text("2023-02-02".to_string()),
                pmid: "67890".to_string(),
            },
        ]
    }

    #[cfg(feature = "csv")]
    #[test]
    fn test_csv_export() {
        let mut out = Vec::new();
        CsvExporter::new()
            .export(&sample_records(), &mut out)
            .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "title,abstract,authors,publication_date,pmid\n\
             Test Article 1,Test Abstract 1,John Doe; Jane Smith,2023-01-01,12345\n\
             \"Test Article 2, revisited\",Test Abstract 2,Bob Johnson,2023-02-02,67890\n"
        );
    }

    #[cfg(feature = "csv")]
    #[test]
    fn test_csv_field_subset_and_delimiter() {
        let mut out = Vec::new();
        CsvExporter::new()
            .with_fields(parse_fields("pmid, title").unwrap())
            .with_delimiter(b'\t')
            .export(&sample_records(), &mut out)
            .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "pmid\ttitle\n12345\tTest Article 1\n67890\tTest Article 2, revisited\n"
        );
    }

    #[cfg(feature = "csv")]
    #[test]
    fn test_csv_empty_input() {
        let result = CsvExporter::new().export(&[], Vec::new());
        assert!(matches!(result, Err(Error::EmptyInput)));
    }

    #[test]
    fn test_jsonl_export() {
        let mut out = Vec::new();
        JsonLinesExporter::new()
            .export(&sample_records(), &mut out)
            .unwrap();
        let lines: Vec<serde_json::Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(
            lines,
            vec![
                json!({
                    "title": "Test Article 1",
                    "abstract": "Test Abstract 1",
                    "authors": ["John Doe", "Jane Smith"],
                    "publication_date": {"year": "2023", "month": "01", "day": "01"},
                    "pmid": "12345"
                }),
                json!({
                    "title": "Test Article 2, revisited",
                    "abstract": "Test Abstract 2",
                    "authors": ["Bob Johnson"],
                    "publication_date": "2023-02-02",
                    "pmid": "67890"
                }),
            ]
        );
    }

    #[test]
    fn test_jsonl_keeps_selection_order() {
        let mut out = Vec::new();
        JsonLinesExporter::new()
            .with_fields(vec![RecordField::Title, RecordField::Pmid])
            .export(&sample_records()[..1], &mut out)
            .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\"title\":\"Test Article 1\",\"pmid\":\"12345\"}\n"
        );
    }

    #[test]
    fn test_jsonl_empty_input() {
        let result = JsonLinesExporter::new().export(&[], Vec::new());
        assert!(matches!(result, Err(Error::EmptyInput)));
    }

    #[test]
    fn test_parse_fields() {
        assert_eq!(
            parse_fields("title,authors").unwrap(),
            vec![RecordField::Title, RecordField::Authors]
        );
        assert!(parse_fields("").unwrap().is_empty());
        assert!(matches!(
            parse_fields("title,journal"),
            Err(Error::UnknownField(name)) if name == "journal"
        ));
    }

    #[test]
    fn test_empty_selection_means_all_fields() {
        let mut out = Vec::new();
        JsonLinesExporter::new()
            .with_fields(Vec::new())
            .export(&sample_records()[..1], &mut out)
            .unwrap();
        let line: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(line.as_object().map(|o| o.len()), Some(5));
    }

    #[test]
    fn test_field_text() {
        let records = sample_records();
        assert_eq!(field_text(&records[0], RecordField::Authors), "John Doe; Jane Smith");
        assert_eq!(
            field_text(&records[0], RecordField::PublicationDate),
            "2023-01-01"
        );
        assert_eq!(
            field_text(&ArticleRecord::default(), RecordField::PublicationDate),
            ""
        );
    }

    #[test]
    fn test_export_to_path_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("records.jsonl");
        JsonLinesExporter::new()
            .export_to_path(&sample_records(), &path)
            .unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 2);
    }

    #[test]
    fn test_export_to_path_rejects_empty_input_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.jsonl");
        let result = JsonLinesExporter::new().export_to_path(&[], &path);
        assert!(matches!(result, Err(Error::EmptyInput)));
        assert!(!path.exists());
    }
}
