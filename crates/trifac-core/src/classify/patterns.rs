//! Regex patterns for date recognition and scan exclusions.
//!
//! The date patterns are deliberately loose on day/month values; range
//! validation happens in the extractor so that a syntactically matched
//! candidate with month > 12 is discarded rather than silently skipped.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// `yyyy-mm-dd`, the least ambiguous form.
    pub static ref DATE_ISO: Regex = Regex::new(
        r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b"
    ).unwrap();

    /// `dd/mm/yyyy`, `dd.mm.yyyy`, `dd-mm-yyyy` or `dd mm yyyy`. The
    /// space-separated form shows up in OCR output where separators get
    /// lost; digit-group runs that are not dates (phone numbers) fall to
    /// the day/month range validation.
    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b(\d{1,2})[./\-\s](\d{1,2})[./\-\s](\d{4})\b"
    ).unwrap();

    /// `dd/mm/yy` and friends, space-separated included. The trailing
    /// word boundary keeps the pattern from biting into a 4-digit year,
    /// and lets a time suffix like `25/04/25-14:14:28` match on the date
    /// portion only.
    pub static ref DATE_DMY_SHORT: Regex = Regex::new(
        r"\b(\d{1,2})[./\-\s](\d{1,2})[./\-\s](\d{2})\b"
    ).unwrap();

    /// `dd <month name> yyyy`, with the French `1er` ordinal and an
    /// optional abbreviation dot: `25 avril 2025`, `13 Jul. 2023`.
    pub static ref DATE_DAY_MONTH_NAME: Regex = Regex::new(
        r"(?i)\b(\d{1,2})(?:er)?\s+(\p{L}+)\.?,?\s+(\d{4})\b"
    ).unwrap();

    /// `<Month name> dd, yyyy`: `January 5, 2024`. Same cascade class as
    /// the day-first form.
    pub static ref DATE_MONTH_NAME_DAY: Regex = Regex::new(
        r"(?i)\b(\p{L}+)\.?\s+(\d{1,2}),?\s+(\d{4})\b"
    ).unwrap();

    /// Directory names that must never be rescanned as input: already
    /// sorted year folders in [2000, 2099].
    pub static ref YEAR_DIR: Regex = Regex::new(r"^20\d{2}$").unwrap();
}

/// Look up a month name, French or English, full or abbreviated.
///
/// Abbreviations need at least three letters (`avr`, `jul`, `sept`);
/// unaccented French spellings are accepted since OCR output often drops
/// diacritics.
pub fn month_from_name(token: &str) -> Option<u32> {
    const FRENCH: [&str; 12] = [
        "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août", "septembre",
        "octobre", "novembre", "décembre",
    ];
    const FRENCH_PLAIN: [&str; 12] = [
        "janvier", "fevrier", "mars", "avril", "mai", "juin", "juillet", "aout", "septembre",
        "octobre", "novembre", "decembre",
    ];
    const ENGLISH: [&str; 12] = [
        "january", "february", "march", "april", "may", "june", "july", "august", "september",
        "october", "november", "december",
    ];

    let token = token.to_lowercase();

    for table in [&FRENCH, &FRENCH_PLAIN, &ENGLISH] {
        if let Some(i) = table.iter().position(|name| *name == token.as_str()) {
            return Some(i as u32 + 1);
        }
    }

    if token.chars().count() >= 3 {
        for table in [&FRENCH, &FRENCH_PLAIN, &ENGLISH] {
            if let Some(i) = table.iter().position(|name| name.starts_with(&token)) {
                return Some(i as u32 + 1);
            }
        }
    }

    None
}
