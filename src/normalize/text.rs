use crate::value::{RawValue, TEXT_KEY};
use itertools::Itertools;

/// Inline markup elements, in the order they are folded into the main text.
const INLINE_MARKUP: [&str; 4] = ["i", "b", "sup", "sub"];

/// Flatten a text-bearing element into plain text.
///
/// Plain text is returned unchanged. For an element with inline markup
/// children (`<i>`, `<b>`, `<sup>`, `<sub>`) the markup content is put in
/// front of the main fragment, separated by a single space unless the main
/// fragment already starts with one, and the result is trimmed.
///
/// ```
/// use pubnorm::normalize::extract_text;
/// use pubnorm::RawValue;
///
/// let title: RawValue = serde_json::from_str(r##"{"i": "Caption", "#text": "text"}"##).unwrap();
/// assert_eq!(extract_text(&title), "Caption text");
/// ```
pub fn extract_text(node: &RawValue) -> String {
    match node {
        RawValue::Text(text) => text.clone(),
        RawValue::Node(_) => flatten_markup(node),
        RawValue::Sequence(items) => items.iter().map(extract_text).join(" "),
        RawValue::Null => String::new(),
        scalar => scalar.to_string(),
    }
}

fn flatten_markup(node: &RawValue) -> String {
    INLINE_MARKUP
        .iter()
        .filter_map(|tag| node.get(tag))
        .fold(node.field_text(TEXT_KEY), |main, markup| {
            let fragment = extract_text(markup);
            if main.starts_with(' ') {
                fragment + &main
            } else {
                format!("{fragment} {main}")
            }
        })
        .trim()
        .to_string()
}
