use super::text::extract_text;
use crate::value::RawValue;
use itertools::Itertools;

const ABSTRACT_TEXT: &str = "AbstractText";
const LABEL: &str = "Label";

/// Join the sections of an `Abstract` element.
///
/// Labelled sections of a structured abstract render as `LABEL: content`,
/// unlabelled ones as their content alone, all joined with single spaces in
/// source order. A missing or empty abstract gives an empty string.
///
/// Section content is flattened like [`extract_text`], so it is trimmed and
/// any inline markup is kept as plain text.
pub fn extract_abstract(node: &RawValue) -> String {
    node.child(ABSTRACT_TEXT).items().map(render_section).join(" ")
}

fn render_section(section: &RawValue) -> String {
    let content = extract_text(section);
    match section.attribute(LABEL).map(RawValue::text) {
        Some(label) if !label.is_empty() => format!("{label}: {content}"),
        _ => content,
    }
}
