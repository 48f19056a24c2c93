//! Classification: keyword matching, date extraction, and the decision
//! combining them.

pub mod dates;
pub mod keywords;
pub mod patterns;

pub use dates::{diagnostic_snippet, DateExtractor, MIN_YEAR};
pub use keywords::{KeywordMatcher, DEFAULT_DENY, DEFAULT_KEYWORDS};

use crate::models::document::{Classification, ExtractedDate, KeywordMatch};

/// Combine keyword and date results into a classification.
///
/// Date presence is sufficient for a Dated outcome; the allow-keyword set
/// is diagnostic only. A deny hit is the single documented veto and
/// routes the document to the commande bucket.
pub fn classify(keywords: &KeywordMatch, date: Option<&ExtractedDate>) -> Classification {
    if keywords.denied {
        return Classification::Undated;
    }
    match date {
        Some(d) => Classification::Dated {
            year: d.year,
            month: d.month,
        },
        None => Classification::Undated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::RecognizerClass;

    fn dated(year: i32, month: u32) -> ExtractedDate {
        ExtractedDate {
            year,
            month,
            raw: String::new(),
            recognizer: RecognizerClass::IsoYmd,
        }
    }

    #[test]
    fn test_date_presence_is_sufficient() {
        // No keyword match, but a date: still Dated.
        let outcome = classify(&KeywordMatch::default(), Some(&dated(2024, 1)));
        assert_eq!(outcome, Classification::Dated { year: 2024, month: 1 });
    }

    #[test]
    fn test_no_date_is_undated_never_guessed() {
        let outcome = classify(&KeywordMatch::default(), None);
        assert_eq!(outcome, Classification::Undated);
    }

    #[test]
    fn test_deny_vetoes_a_dated_outcome() {
        let keywords = KeywordMatch {
            denied: true,
            ..Default::default()
        };
        let outcome = classify(&keywords, Some(&dated(2024, 1)));
        assert_eq!(outcome, Classification::Undated);
    }
}
