use crate::value::RawValue;

const AUTHOR: &str = "Author";
const FORE_NAME: &str = "ForeName";
const LAST_NAME: &str = "LastName";

/// Render the entries of an `AuthorList` as `"<ForeName> <LastName>"`.
///
/// One name is produced per `Author` entry, in order. Entries without any
/// name (e.g. collective authors) yield an empty string rather than being
/// dropped.
pub fn extract_authors(author_list: &RawValue) -> Vec<String> {
    author_list.child(AUTHOR).items().map(render_author).collect()
}

fn render_author(author: &RawValue) -> String {
    format!(
        "{} {}",
        author.field_text(FORE_NAME),
        author.field_text(LAST_NAME)
    )
    .trim()
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawValue {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_authors_empty() {
        assert_eq!(extract_authors(&RawValue::Null), Vec::<String>::new());
        assert_eq!(extract_authors(&raw(json!({}))), Vec::<String>::new());
    }

    #[test]
    fn test_authors_single() {
        let list = raw(json!({"Author": {"ForeName": "John", "LastName": "Doe"}}));
        assert_eq!(extract_authors(&list), vec!["John Doe"]);
    }

    #[test]
    fn test_authors_multiple() {
        let list = raw(json!({
            "@CompleteYN": "Y",
            "Author": [
                {"@ValidYN": "Y", "ForeName": "John", "LastName": "Doe", "Initials": "J"},
                {"ForeName": "Jane", "LastName": "Smith"}
            ]
        }));
        assert_eq!(extract_authors(&list), vec!["John Doe", "Jane Smith"]);
    }

    #[test]
    fn test_partial_names_are_trimmed() {
        let list = raw(json!({
            "Author": [
                {"LastName": "Doe"},
                {"ForeName": "Jane"}
            ]
        }));
        assert_eq!(extract_authors(&list), vec!["Doe", "Jane"]);
    }

    #[test]
    fn test_author_count_is_preserved() {
        let list = raw(json!({
            "Author": [
                {"ForeName": "John", "LastName": "Doe"},
                {"CollectiveName": "The Test Consortium"},
                null,
                {"ForeName": "Jane", "LastName": "Smith"}
            ]
        }));
        assert_eq!(
            extract_authors(&list),
            vec!["John Doe", "", "", "Jane Smith"]
        );
    }
}
