// src/extractors/affiliation.rs

// --- Imports ---
use crate::utils::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;

// --- Regex Patterns (Lazy Static) ---
// Affiliation index between words: " 2 " or " 1,3 "
static SPACED_INDEX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r" \d(?:,\d)? ").expect("Failed to compile SPACED_INDEX_RE")
});

// Affiliation index glued to a comma: "Smirnov1, Ivanov2"
static INDEX_COMMA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d,").expect("Failed to compile INDEX_COMMA_RE")
});

static SPACE_BEFORE_COMMA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r" +,").expect("Failed to compile SPACE_BEFORE_COMMA_RE")
});

// Two consecutive capital initials, Latin or Cyrillic: "A. B." / "А. Б."
static SPACED_INITIALS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-ZА-ЯЁ]\.) +([A-ZА-ЯЁ]\.)").expect("Failed to compile SPACED_INITIALS_RE")
});

static MULTI_SPACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s{2,}").expect("Failed to compile MULTI_SPACE_RE")
});

// Boundary between the author list and the affiliations
const AUTHORS_END: &str = ". ";

/// Authors and first affiliation recovered from a byline block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Byline {
    pub authors: String,
    pub organizations: String,
}

/// Cleans footnote and affiliation markers out of a raw author/organization block.
///
/// Affiliation indices between words become a double space, which later acts as
/// the separator between affiliations.
pub fn normalize_block(raw: &str) -> String {
    let text = raw.replace('*', "");
    let text = SPACED_INDEX_RE.replace_all(&text, "  ");
    let text = INDEX_COMMA_RE.replace_all(&text, "");
    let mut text = SPACE_BEFORE_COMMA_RE.replace_all(&text, ",").into_owned();

    // Repeat until stable: "A. B. C." needs two passes since matches can't overlap
    loop {
        let tightened = SPACED_INITIALS_RE.replace_all(&text, "$1$2").into_owned();
        if tightened == text {
            break;
        }
        text = tightened;
    }

    text
}

/// Splits `text` at the first occurrence of `delimiter` into exactly two parts.
///
/// No occurrence means the boundary can't be located and the split is ambiguous.
pub fn split_in_two<'a>(text: &'a str, delimiter: &str) -> Result<(&'a str, &'a str), ExtractError> {
    text.split_once(delimiter).ok_or_else(|| {
        ExtractError::Ambiguous(format!("no '{}' boundary in '{}'", delimiter.escape_debug(), text))
    })
}

/// Recovers authors and the first organization from an author/organization block.
pub fn parse_byline(raw: &str) -> Result<Byline, ExtractError> {
    let normalized = normalize_block(raw);
    let (authors, rest) = split_in_two(&normalized, AUTHORS_END)?;

    // Only the first affiliation is kept
    let organizations = MULTI_SPACE_RE
        .split(rest)
        .next()
        .unwrap_or_default()
        .trim()
        .trim_end_matches(',')
        .trim_end();

    Ok(Byline {
        authors: authors.trim().to_string(),
        organizations: organizations.to_string(),
    })
}
