use crate::StructuredDate;
use crate::value::RawValue;

const ARTICLE_DATE: &str = "ArticleDate";
const PUB_DATE: [&str; 3] = ["Journal", "JournalIssue", "PubDate"];
const DATE_COMPLETED: &str = "DateCompleted";

const YEAR: &str = "Year";
const MONTH: &str = "Month";
const DAY: &str = "Day";

/// Pick the publication date of an `Article` element.
///
/// Candidates are tried in order: `ArticleDate`, then
/// `Journal/JournalIssue/PubDate`, then `DateCompleted`. The first candidate
/// with a non-empty year, month or day supplies all three parts; parts are
/// never mixed between candidates. Without any dated candidate the result is
/// the all-empty date.
pub fn extract_date(article: &RawValue) -> StructuredDate {
    date_from_candidates(article, article.get(DATE_COMPLETED))
}

/// [`extract_date`] for a whole `MedlineCitation`.
///
/// PubMed records `DateCompleted` next to `Article` rather than inside it, so
/// the completion candidate is also looked up on the citation when the article
/// does not carry one.
pub(crate) fn extract_citation_date(citation: &RawValue, article: &RawValue) -> StructuredDate {
    let completed = article
        .get(DATE_COMPLETED)
        .or_else(|| citation.get(DATE_COMPLETED));
    date_from_candidates(article, completed)
}

fn date_from_candidates(article: &RawValue, completed: Option<&RawValue>) -> StructuredDate {
    [article.get(ARTICLE_DATE), article.path(PUB_DATE), completed]
        .into_iter()
        .flatten()
        .filter(|candidate| !candidate.is_empty())
        .find_map(first_dated_entry)
        .unwrap_or_default()
}

/// A repeated candidate (e.g. several `ArticleDate` types) contributes its
/// first entry carrying any date part.
fn first_dated_entry(candidate: &RawValue) -> Option<StructuredDate> {
    candidate
        .items()
        .map(|entry| StructuredDate {
            year: entry.field_text(YEAR),
            month: entry.field_text(MONTH),
            day: entry.field_text(DAY),
        })
        .find(|date| !date.is_empty())
}

/// Join a date as `year-month-day`.
///
/// The parts are joined verbatim, with no padding or validation, so partial
/// dates keep their empty slots (`"2023--"`). The all-empty date becomes an
/// empty string rather than `"--"`.
///
/// ```
/// use pubnorm::StructuredDate;
/// use pubnorm::normalize::convert_to_text;
///
/// let date = StructuredDate { year: "2023".into(), month: "Jan".into(), day: "".into() };
/// assert_eq!(convert_to_text(&date), "2023-Jan-");
/// assert_eq!(convert_to_text(&StructuredDate::default()), "");
/// ```
pub fn convert_to_text(date: &StructuredDate) -> String {
    if date.is_empty() {
        return String::new();
    }
    format!("{}-{}-{}", date.year, date.month, date.day)
}
