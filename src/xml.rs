//! PubMed efetch XML reader.
//!
//! Converts XML into the [`RawValue`] tree convention used by the normalizer:
//! attributes as `@name` keys, an element's own text under `#text`, repeated
//! sibling elements as a sequence.
//!
//! # Example
//!
//! ```
//! use pubnorm::{DocumentReader, PubmedXmlReader};
//!
//! let input = r#"<?xml version="1.0" ?>
//! <PubmedArticleSet>
//!   <PubmedArticle>
//!     <MedlineCitation Status="MEDLINE" Owner="NLM">
//!       <PMID Version="1">12345</PMID>
//!       <Article><ArticleTitle>Example Title</ArticleTitle></Article>
//!     </MedlineCitation>
//!   </PubmedArticle>
//! </PubmedArticleSet>"#;
//!
//! let documents = PubmedXmlReader::new().read(input).unwrap();
//! assert_eq!(documents.len(), 1);
//! ```

use compact_str::CompactString;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::collections::btree_map::Entry;
use tracing::debug;

use crate::reader::DocumentReader;
use crate::value::{ATTRIBUTE_PREFIX, RawDocument, RawNode, RawValue, TEXT_KEY};
use crate::{Error, Result};

const ARTICLE_SET: &str = "PubmedArticleSet";
const PUBMED_ARTICLE: &str = "PubmedArticle";

/// Reader for PubMed efetch responses (`retmode=xml`).
///
/// Yields one document per `PubmedArticle` element. Other entries of the
/// set, such as `PubmedBookArticle`, are not returned.
#[derive(Debug, Clone, Default)]
pub struct PubmedXmlReader {}

impl PubmedXmlReader {
    /// Creates a new efetch XML reader.
    ///
    /// # Examples
    ///
    /// ```
    /// use pubnorm::PubmedXmlReader;
    /// let reader = PubmedXmlReader::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentReader for PubmedXmlReader {
    fn read(&self, input: &str) -> Result<Vec<RawDocument>> {
        let documents = parse_article_set(input)?;
        debug!(documents = documents.len(), "read efetch article set");
        Ok(documents)
    }
}

/// Parse an efetch response into its `PubmedArticle` documents.
///
/// A response without articles (or without an article set) yields no
/// documents.
pub fn parse_article_set(xml: &str) -> Result<Vec<RawDocument>> {
    let RawValue::Node(mut root) = parse_tree(xml)? else {
        return Ok(Vec::new());
    };
    let articles = match root.remove(ARTICLE_SET) {
        Some(RawValue::Node(mut set)) => set.remove(PUBMED_ARTICLE),
        _ => None,
    };
    Ok(articles.map(RawValue::into_items).unwrap_or_default())
}

/// Parse a whole XML document into a tree keyed by its root element.
///
/// # Errors
///
/// Returns [`Error::Xml`] for malformed XML, including unclosed elements.
pub fn parse_tree(xml: &str) -> Result<RawValue> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut root = Frame::default();
    let mut open: Vec<Frame> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => open.push(Frame::open(&e)?),
            Event::Empty(e) => {
                let (name, value) = Frame::open(&e)?.close();
                open.last_mut()
                    .unwrap_or(&mut root)
                    .insert_child(name, value);
            }
            Event::Text(e) => open
                .last_mut()
                .unwrap_or(&mut root)
                .text
                .push_str(&e.unescape()?),
            Event::CData(e) => open
                .last_mut()
                .unwrap_or(&mut root)
                .text
                .push_str(&String::from_utf8_lossy(&e.into_inner())),
            Event::End(_) => {
                let Some(frame) = open.pop() else {
                    return Err(Error::Xml("closing tag without open element".to_string()));
                };
                let (name, value) = frame.close();
                open.last_mut()
                    .unwrap_or(&mut root)
                    .insert_child(name, value);
            }
            Event::Eof => break,
            _ => (),
        }
        buf.clear();
    }

    if let Some(frame) = open.last() {
        return Err(Error::Xml(format!(
            "unexpected end of document inside <{}>",
            frame.name
        )));
    }
    Ok(RawValue::Node(root.node))
}

/// An element whose closing tag has not been seen yet.
#[derive(Debug, Default)]
struct Frame {
    name: String,
    node: RawNode,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart) -> Result<Self> {
        let mut node = RawNode::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = format!(
                "{ATTRIBUTE_PREFIX}{}",
                String::from_utf8_lossy(attr.key.as_ref())
            );
            node.insert(key.into(), RawValue::Text(attr.unescape_value()?.into_owned()));
        }
        Ok(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            node,
            text: String::new(),
        })
    }

    /// A bare element becomes text (or null when empty), anything with
    /// attributes or children a node.
    fn close(self) -> (String, RawValue) {
        let text = self.text.trim();
        let value = if self.node.is_empty() {
            if text.is_empty() {
                RawValue::Null
            } else {
                RawValue::Text(text.to_string())
            }
        } else {
            let mut node = self.node;
            if !text.is_empty() {
                node.insert(TEXT_KEY.into(), RawValue::Text(text.to_string()));
            }
            RawValue::Node(node)
        };
        (self.name, value)
    }

    /// The second occurrence of a name turns its entry into a sequence.
    fn insert_child(&mut self, name: String, value: RawValue) {
        match self.node.entry(CompactString::from(name)) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(mut slot) => match slot.get_mut() {
                RawValue::Sequence(items) => items.push(value),
                existing => {
                    let first = std::mem::take(existing);
                    *existing = RawValue::Sequence(vec![first, value]);
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn to_json(value: &RawValue) -> serde_json::Value {
        serde_json::to_value(value).unwrap()
    }

    const SAMPLE: &str = r#"<?xml version="1.0" ?>
<!DOCTYPE PubmedArticleSet PUBLIC "-//NLM//DTD PubMedArticle, 1st January 2024//EN" "https://dtd.nlm.nih.gov/ncbi/pubmed/out/pubmed_240101.dtd">
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation Status="MEDLINE" Owner="NLM">
      <PMID Version="1">12345</PMID>
      <DateCompleted><Year>2023</Year><Month>03</Month><Day>02</Day></DateCompleted>
      <Article PubModel="Print">
        <Journal>
          <JournalIssue CitedMedium="Internet">
            <PubDate><Year>2023</Year><Month>Jan</Month></PubDate>
          </JournalIssue>
        </Journal>
        <ArticleTitle>Effects of <i>Lactobacillus</i> on gut &amp; brain.</ArticleTitle>
        <Abstract>
          <AbstractText Label="BACKGROUND" NlmCategory="BACKGROUND">Background text.</AbstractText>
          <AbstractText Label="METHODS" NlmCategory="METHODS">Methods text.</AbstractText>
        </Abstract>
        <AuthorList CompleteYN="Y">
          <Author ValidYN="Y"><LastName>Doe</LastName><ForeName>John</ForeName><Initials>J</Initials></Author>
          <Author ValidYN="Y"><LastName>Smith</LastName><ForeName>Jane</ForeName><Initials>J</Initials></Author>
        </AuthorList>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
  <PubmedArticle>
    <MedlineCitation Status="In-Process" Owner="NLM">
      <PMID Version="1">67890</PMID>
      <Article PubModel="Electronic">
        <ArticleTitle>Second article</ArticleTitle>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
</PubmedArticleSet>
"#;

    #[test]
    fn test_parse_article_set() {
        let documents = parse_article_set(SAMPLE).unwrap();
        assert_eq!(documents.len(), 2);

        let citation = documents[0].child("MedlineCitation");
        assert_eq!(
            to_json(citation.child("PMID")),
            json!({"@Version": "1", "#text": "12345"})
        );
        assert_eq!(
            to_json(citation.child("Article").child("ArticleTitle")),
            json!({"i": "Lactobacillus", "#text": "Effects of  on gut & brain."})
        );
        assert_eq!(
            to_json(citation.path(["Article", "Abstract", "AbstractText"]).unwrap()),
            json!([
                {"@Label": "BACKGROUND", "@NlmCategory": "BACKGROUND", "#text": "Background text."},
                {"@Label": "METHODS", "@NlmCategory": "METHODS", "#text": "Methods text."}
            ])
        );
        assert_eq!(
            to_json(citation.path(["Article", "AuthorList", "Author"]).unwrap()).as_array().map(Vec::len),
            Some(2)
        );
    }

    #[test]
    fn test_single_article_is_not_a_sequence() {
        let xml = "<PubmedArticleSet><PubmedArticle><MedlineCitation><PMID>1</PMID></MedlineCitation></PubmedArticle></PubmedArticleSet>";
        let documents = parse_article_set(xml).unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(
            to_json(&documents[0]),
            json!({"MedlineCitation": {"PMID": "1"}})
        );
    }

    #[test]
    fn test_empty_elements() {
        let tree = parse_tree(r#"<Root><Empty/><Blank>  </Blank><Flagged Flag="Y"/></Root>"#).unwrap();
        assert_eq!(
            to_json(&tree),
            json!({"Root": {"Empty": null, "Blank": null, "Flagged": {"@Flag": "Y"}}})
        );
    }

    #[test]
    fn test_cdata_is_text() {
        let tree = parse_tree("<Title><![CDATA[a < b]]></Title>").unwrap();
        assert_eq!(to_json(&tree), json!({"Title": "a < b"}));
    }

    #[test]
    fn test_no_articles() {
        assert!(parse_article_set("<PubmedArticleSet></PubmedArticleSet>").unwrap().is_empty());
        assert!(parse_article_set("<eSearchResult><Count>0</Count></eSearchResult>").unwrap().is_empty());
        assert!(parse_article_set("").unwrap().is_empty());
    }

    #[test]
    fn test_book_articles_are_not_returned() {
        let xml = "<PubmedArticleSet><PubmedBookArticle><BookDocument/></PubmedBookArticle></PubmedArticleSet>";
        assert!(parse_article_set(xml).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_xml() {
        assert!(matches!(
            parse_tree("<PubmedArticleSet><PubmedArticle></PubmedArticleSet>"),
            Err(Error::Xml(_))
        ));
        assert!(matches!(
            parse_tree("<PubmedArticleSet><PubmedArticle>"),
            Err(Error::Xml(_))
        ));
    }

    #[test]
    fn test_reader_trait() {
        let documents = PubmedXmlReader::new().read(SAMPLE).unwrap();
        assert_eq!(documents.len(), 2);
    }
}
