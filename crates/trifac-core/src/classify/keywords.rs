//! Invoice keyword matching.

use std::collections::BTreeSet;

use crate::models::document::KeywordMatch;

/// Built-in invoice keywords, covering French, English and German.
pub const DEFAULT_KEYWORDS: [&str; 5] = ["facture", "invoice", "rechnung", "facturation", "repas"];

/// Phrases that mark a document as an explicit non-invoice.
pub const DEFAULT_DENY: [&str; 1] = ["ceci n'est pas une facture"];

/// Case-insensitive substring scanner over a document's full text.
///
/// The match result is diagnostic: classification is driven by date
/// presence, not keyword presence. The deny list is the one exception and
/// forces the commande bucket.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    keywords: Vec<String>,
    deny: Vec<String>,
}

impl KeywordMatcher {
    /// Matcher with the built-in keyword and deny sets.
    pub fn new() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            deny: DEFAULT_DENY.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Extend the keyword set with caller-supplied additions.
    pub fn with_extra<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for keyword in extra {
            let keyword = keyword.as_ref().trim().to_lowercase();
            if !keyword.is_empty() && !self.keywords.contains(&keyword) {
                self.keywords.push(keyword);
            }
        }
        self
    }

    /// Extend the deny list with caller-supplied phrases.
    pub fn with_extra_deny<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for phrase in extra {
            let phrase = phrase.as_ref().trim().to_lowercase();
            if !phrase.is_empty() && !self.deny.contains(&phrase) {
                self.deny.push(phrase);
            }
        }
        self
    }

    /// Scan the text and return the subset of keywords present.
    pub fn matches(&self, text: &str) -> KeywordMatch {
        let haystack = text.to_lowercase();

        let matched: BTreeSet<String> = self
            .keywords
            .iter()
            .filter(|k| haystack.contains(k.as_str()))
            .cloned()
            .collect();

        let denied = self.deny.iter().any(|p| haystack.contains(p.as_str()));

        KeywordMatch { matched, denied }
    }

    /// The configured keyword set, for diagnostics.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl Default for KeywordMatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keywords_case_insensitive() {
        let matcher = KeywordMatcher::new();
        let result = matcher.matches("FACTURE No.123, date 15/01/2024, total 230€");
        assert!(result.matched.contains("facture"));
        assert!(!result.denied);
    }

    #[test]
    fn test_no_match_is_empty_set() {
        let matcher = KeywordMatcher::new();
        let result = matcher.matches("bon de livraison du 03/02/2024");
        assert!(result.is_empty());
    }

    #[test]
    fn test_extra_keywords() {
        let matcher = KeywordMatcher::new().with_extra(["Receipt"]);
        let result = matcher.matches("receipt #42");
        assert!(result.matched.contains("receipt"));
    }

    #[test]
    fn test_deny_phrase() {
        let matcher = KeywordMatcher::new();
        let result = matcher.matches("Ceci n'est pas une facture - bon de commande");
        assert!(result.denied);
        // The allow set still matches; deny is a separate signal.
        assert!(result.matched.contains("facture"));
    }

    #[test]
    fn test_multiple_matches_deduplicated() {
        let matcher = KeywordMatcher::new().with_extra(["invoice"]);
        let result = matcher.matches("invoice invoice facture");
        assert_eq!(result.matched.len(), 2);
    }
}
