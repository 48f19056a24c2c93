//! Date extraction cascade for invoice text.
//!
//! Recognizer classes are tried in a fixed priority order; the first
//! class that yields any in-bound candidate anywhere in the text wins,
//! and within that class the earliest occurrence in document order is
//! selected. Swapping the order changes selection on dual-format text,
//! so the cascade in [`RecognizerClass::CASCADE`] is load-bearing.

use chrono::{Datelike, Utc};
use tracing::debug;

use super::patterns::{
    month_from_name, DATE_DAY_MONTH_NAME, DATE_DMY, DATE_DMY_SHORT, DATE_ISO, DATE_MONTH_NAME_DAY,
};
use crate::models::document::{ExtractedDate, RecognizerClass};

/// Years below this are parsing noise, not invoice dates.
pub const MIN_YEAR: i32 = 1990;

/// Maximum length of the diagnostic snippet surfaced when no date is
/// found.
const SNIPPET_LEN: usize = 200;

/// Multi-format, multi-language date extractor.
#[derive(Debug, Clone)]
pub struct DateExtractor {
    /// Upper plausibility bound: current year + 1.
    max_year: i32,
}

impl DateExtractor {
    pub fn new() -> Self {
        Self::with_current_year(Utc::now().year())
    }

    /// Pin the reference year; tests use this to keep the two-digit-year
    /// window deterministic.
    pub fn with_current_year(current_year: i32) -> Self {
        Self {
            max_year: current_year + 1,
        }
    }

    /// Select exactly one date from the text, or report none.
    pub fn extract(&self, text: &str) -> Option<ExtractedDate> {
        for class in RecognizerClass::CASCADE {
            if let Some(date) = self.extract_class(text, class) {
                debug!(
                    "date {:04}-{:02} via {:?} (from: {})",
                    date.year, date.month, date.recognizer, date.raw
                );
                return Some(date);
            }
        }
        None
    }

    fn extract_class(&self, text: &str, class: RecognizerClass) -> Option<ExtractedDate> {
        match class {
            RecognizerClass::IsoYmd => DATE_ISO.captures_iter(text).find_map(|caps| {
                let year: i32 = caps[1].parse().ok()?;
                let month: u32 = caps[2].parse().ok()?;
                let day: u32 = caps[3].parse().ok()?;
                self.candidate(year, month, day, &caps[0], class)
            }),
            RecognizerClass::NumericDmy => DATE_DMY.captures_iter(text).find_map(|caps| {
                let day: u32 = caps[1].parse().ok()?;
                let month: u32 = caps[2].parse().ok()?;
                let year: i32 = caps[3].parse().ok()?;
                self.candidate(year, month, day, &caps[0], class)
            }),
            RecognizerClass::NumericDmyShort => {
                DATE_DMY_SHORT.captures_iter(text).find_map(|caps| {
                    let day: u32 = caps[1].parse().ok()?;
                    let month: u32 = caps[2].parse().ok()?;
                    let short: i32 = caps[3].parse().ok()?;
                    // Window into the 2000s; anything landing past
                    // current_year + 1 is noise for this class.
                    self.candidate(2000 + short, month, day, &caps[0], class)
                })
            }
            RecognizerClass::MonthName => self.extract_month_name(text),
        }
    }

    /// Month-name class: day-first (`25 avril 2025`, `13 Jul 2023`) and
    /// month-first (`January 5, 2024`) forms compete on text position.
    fn extract_month_name(&self, text: &str) -> Option<ExtractedDate> {
        let day_first = DATE_DAY_MONTH_NAME.captures_iter(text).find_map(|caps| {
            let full = caps.get(0)?;
            let day: u32 = caps[1].parse().ok()?;
            let month = month_from_name(&caps[2])?;
            let year: i32 = caps[3].parse().ok()?;
            self.candidate(year, month, day, full.as_str(), RecognizerClass::MonthName)
                .map(|d| (full.start(), d))
        });

        let month_first = DATE_MONTH_NAME_DAY.captures_iter(text).find_map(|caps| {
            let full = caps.get(0)?;
            let month = month_from_name(&caps[1])?;
            let day: u32 = caps[2].parse().ok()?;
            let year: i32 = caps[3].parse().ok()?;
            self.candidate(year, month, day, full.as_str(), RecognizerClass::MonthName)
                .map(|d| (full.start(), d))
        });

        match (day_first, month_first) {
            (Some((a, da)), Some((b, db))) => Some(if a <= b { da } else { db }),
            (Some((_, d)), None) | (None, Some((_, d))) => Some(d),
            (None, None) => None,
        }
    }

    /// Validate positional day/month values and the year plausibility
    /// bound; out-of-range candidates are excluded even when the
    /// surrounding syntax matched.
    fn candidate(
        &self,
        year: i32,
        month: u32,
        day: u32,
        raw: &str,
        recognizer: RecognizerClass,
    ) -> Option<ExtractedDate> {
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return None;
        }
        if !(MIN_YEAR..=self.max_year).contains(&year) {
            return None;
        }
        Some(ExtractedDate {
            year,
            month,
            raw: raw.to_string(),
            recognizer,
        })
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// First ~200 characters of the text, cut on a char boundary, for
/// surfacing when no date is found.
pub fn diagnostic_snippet(text: &str) -> &str {
    match text.char_indices().nth(SNIPPET_LEN) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
