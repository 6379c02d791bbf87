//! Untyped document tree as handed over by the retrieval layer.
//!
//! PubMed responses are XML converted to nested mappings following the
//! attribute/text convention popularised by `xmltodict`:
//!
//! - attributes become keys prefixed with `@` (`@Label`, `@Version`)
//! - an element's own character data lives under `#text` when the element also
//!   carries attributes or children
//! - an element occurring once is a single value, an element occurring more than
//!   once is a sequence
//!
//! The last rule means no key has a fixed cardinality. [`RawValue::items`] is the
//! single coercion point every extractor goes through.

use compact_str::CompactString;
use either::Either;
use itertools::Itertools;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, Serializer};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// Key holding an element's own text when it also has attributes or children.
pub const TEXT_KEY: &str = "#text";

/// Prefix marking attribute keys.
pub const ATTRIBUTE_PREFIX: char = '@';

/// Keyed children of a [`RawValue::Node`].
pub type RawNode = BTreeMap<CompactString, RawValue>;

/// One raw citation document, e.g. a single `PubmedArticle` entry.
pub type RawDocument = RawValue;

static MISSING: RawValue = RawValue::Null;

/// A value in a raw document tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RawValue {
    /// Absent or empty element.
    #[default]
    Null,
    /// Plain text leaf.
    Text(String),
    /// Boolean leaf from a typed source such as JSON.
    Bool(bool),
    /// Numeric leaf from a typed source such as JSON.
    Number(serde_json::Number),
    /// Mapping of child keys to values.
    Node(RawNode),
    /// Repeated element.
    Sequence(Vec<RawValue>),
}

impl RawValue {
    /// Looks up a child by key. Anything but a node has no children.
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        match self {
            RawValue::Node(node) => node.get(key),
            _ => None,
        }
    }

    /// Like [`RawValue::get`], but a missing child reads as `Null`.
    pub fn child(&self, key: &str) -> &RawValue {
        self.get(key).unwrap_or(&MISSING)
    }

    /// Follows a chain of keys, stopping at the first missing step.
    ///
    /// ```
    /// use pubnorm::RawValue;
    ///
    /// let doc: RawValue = serde_json::from_str(r#"{"a": {"b": "c"}}"#).unwrap();
    /// assert_eq!(doc.path(["a", "b"]).and_then(RawValue::as_text), Some("c"));
    /// assert!(doc.path(["a", "x"]).is_none());
    /// ```
    pub fn path<'k>(&self, keys: impl IntoIterator<Item = &'k str>) -> Option<&RawValue> {
        keys.into_iter().try_fold(self, |value, key| value.get(key))
    }

    /// Looks up an attribute (`@name`) of a node.
    pub fn attribute(&self, name: &str) -> Option<&RawValue> {
        self.as_node()?
            .iter()
            .find(|(key, _)| key.strip_prefix(ATTRIBUTE_PREFIX) == Some(name))
            .map(|(_, value)| value)
    }

    /// Iterates the value as a sequence: nothing for `Null`, the value itself
    /// for a scalar or node, and the items of a sequence.
    pub fn items(&self) -> impl Iterator<Item = &RawValue> {
        match self {
            RawValue::Sequence(items) => Either::Left(items.iter()),
            RawValue::Null => Either::Right(None.into_iter()),
            other => Either::Right(Some(other).into_iter()),
        }
    }

    /// Owned counterpart of [`RawValue::items`].
    pub fn into_items(self) -> Vec<RawValue> {
        match self {
            RawValue::Sequence(items) => items,
            RawValue::Null => Vec::new(),
            other => vec![other],
        }
    }

    /// Returns `true` for null, empty text, `false`, zero, empty nodes and
    /// empty sequences.
    pub fn is_empty(&self) -> bool {
        match self {
            RawValue::Null => true,
            RawValue::Text(text) => text.is_empty(),
            RawValue::Bool(flag) => !flag,
            RawValue::Number(number) => number.as_f64() == Some(0.0),
            RawValue::Node(node) => node.is_empty(),
            RawValue::Sequence(items) => items.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&RawNode> {
        match self {
            RawValue::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Text representation of any shape, see the [`fmt::Display`] impl.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            RawValue::Text(text) => Cow::Borrowed(text),
            RawValue::Null => Cow::Borrowed(""),
            other => Cow::Owned(other.to_string()),
        }
    }

    /// Text representation of a child, empty when the child is missing.
    pub fn field_text(&self, key: &str) -> String {
        self.get(key)
            .map(|value| value.text().into_owned())
            .unwrap_or_default()
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            RawValue::Null => "null",
            RawValue::Text(_) => "text",
            RawValue::Bool(_) => "bool",
            RawValue::Number(_) => "number",
            RawValue::Node(_) => "node",
            RawValue::Sequence(_) => "sequence",
        }
    }
}

/// Null renders as nothing, a node as its `#text` entry and a sequence as its
/// items separated by single spaces.
impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Null => Ok(()),
            RawValue::Text(text) => f.write_str(text),
            RawValue::Bool(flag) => write!(f, "{flag}"),
            RawValue::Number(number) => write!(f, "{number}"),
            RawValue::Node(node) => match node.get(TEXT_KEY) {
                Some(text) => fmt::Display::fmt(text, f),
                None => Ok(()),
            },
            RawValue::Sequence(items) => write!(f, "{}", items.iter().format(" ")),
        }
    }
}

impl From<&str> for RawValue {
    fn from(text: &str) -> Self {
        RawValue::Text(text.to_string())
    }
}

impl From<String> for RawValue {
    fn from(text: String) -> Self {
        RawValue::Text(text)
    }
}

impl From<Vec<RawValue>> for RawValue {
    fn from(items: Vec<RawValue>) -> Self {
        RawValue::Sequence(items)
    }
}

impl<K: Into<CompactString>> FromIterator<(K, RawValue)> for RawValue {
    fn from_iter<I: IntoIterator<Item = (K, RawValue)>>(iter: I) -> Self {
        RawValue::Node(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<'de> Deserialize<'de> for RawValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RawValueVisitor)
    }
}

/// Booleans and numbers keep their type so `false` and `0` stay falsy.
struct RawValueVisitor;

impl<'de> Visitor<'de> for RawValueVisitor {
    type Value = RawValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, number, boolean, null, sequence or map")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<RawValue, E> {
        Ok(RawValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<RawValue, E> {
        Ok(RawValue::Number(v.into()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<RawValue, E> {
        Ok(RawValue::Number(v.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<RawValue, E> {
        Ok(serde_json::Number::from_f64(v)
            .map_or_else(|| RawValue::Text(v.to_string()), RawValue::Number))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<RawValue, E> {
        Ok(RawValue::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<RawValue, E> {
        Ok(RawValue::Text(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<RawValue, E> {
        Ok(RawValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<RawValue, E> {
        Ok(RawValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<RawValue, D::Error> {
        RawValue::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<RawValue, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(RawValue::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawValue, A::Error> {
        let mut node = RawNode::new();
        while let Some((key, value)) = map.next_entry::<String, RawValue>()? {
            node.insert(key.into(), value);
        }
        Ok(RawValue::Node(node))
    }
}

impl Serialize for RawValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RawValue::Null => serializer.serialize_unit(),
            RawValue::Text(text) => serializer.serialize_str(text),
            RawValue::Bool(flag) => serializer.serialize_bool(*flag),
            RawValue::Number(number) => number.serialize(serializer),
            RawValue::Node(node) => {
                serializer.collect_map(node.iter().map(|(key, value)| (key.as_str(), value)))
            }
            RawValue::Sequence(items) => serializer.collect_seq(items),
        }
    }
}
