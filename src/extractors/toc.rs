// src/extractors/toc.rs

// --- Imports ---
use crate::source::Document;
use crate::utils::error::ExtractError;
use crate::utils::AppError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

// --- Constants ---
/// Literal heading that opens the table of contents in the issues we process.
pub const DEFAULT_TOC_MARKER: &str = "СОДЕРЖАНИЕ";

// Coarse pre-filter applied before the leader pattern
const ELLIPSIS: &str = "...";

// --- Regex Patterns (Lazy Static) ---
// Trailing page number of the accumulated TOC text; the final line break is allowed
static TRAILING_DIGITS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+)\n?$").expect("Failed to compile TRAILING_DIGITS_RE")
});

// End of a logical entry: a leader of 4+ periods, then the page number
static ENTRY_TERMINATOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\.{4,}\n*\s*\d+$").expect("Failed to compile ENTRY_TERMINATOR_RE")
});

// Title (shortest match), optional space, leader of 3+ periods, page number
static ENTRY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+?)\s?\.{3,}\s*(\d+)$").expect("Failed to compile ENTRY_RE")
});

// --- Data Structures ---
/// One parsed table-of-contents line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    /// Title as printed in the TOC; approximate, spacing and case may differ from the article page.
    pub raw_title: String,
    /// 1-based page number as printed.
    pub start_page: usize,
}

/// Outcome of parsing a single logical line, kept for debug output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// No `...` anywhere, not a candidate entry.
    Skipped,
    Parsed(TocEntry),
    Dropped,
}

// --- Main Extractor Structure ---
pub struct TocExtractor {
    marker: String,
}

impl TocExtractor {
    pub fn new(marker: impl Into<String>) -> Self {
        Self { marker: marker.into() }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Collects the raw TOC region text.
    ///
    /// Scanning starts at the first fragment containing the marker. From then on
    /// every non-emphasized fragment is appended as its own line; emphasized ones
    /// are section headings and skipped. The first trailing number seen in the
    /// accumulated text becomes the last page index to scan. The bound is only
    /// checked between pages, so the page on which it was found is always
    /// finished.
    pub fn collect(&self, document: &Document) -> Result<String, AppError> {
        let page_count = document.page_count();
        let mut toc_text = String::new();
        let mut collecting = false;
        let mut bound = page_count;
        let mut bound_fixed = false;

        for page_index in 0..page_count {
            if page_index > bound {
                tracing::debug!("Passed TOC bound {} at page index {}", bound, page_index);
                break;
            }

            let page = document.page(page_index)?;

            for fragment in page.fragments() {
                let text = fragment.text.trim();

                if !collecting && text.contains(self.marker.as_str()) {
                    tracing::info!("Found TOC marker '{}' on page index {}", self.marker, page_index);
                    collecting = true;
                }

                if !collecting || fragment.emphasized {
                    continue;
                }

                toc_text.push_str(text);
                toc_text.push('\n');

                if !bound_fixed {
                    if let Some(digits) = TRAILING_DIGITS_RE.captures(&toc_text).and_then(|caps| caps.get(1)) {
                        // The first match fixes the bound even when it doesn't fit a usize
                        let number = digits.as_str().parse::<usize>().unwrap_or(usize::MAX);
                        tracing::debug!("TOC end bound fixed at {} from page index {}", number, page_index);
                        bound = number;
                        bound_fixed = true;
                    }
                }
            }
        }

        if toc_text.is_empty() {
            return Err(ExtractError::NotFound(format!(
                "Table of contents marker '{}' not found",
                self.marker
            ))
            .into());
        }

        tracing::debug!("Collected {} bytes of TOC text", toc_text.len());
        Ok(toc_text)
    }

    /// Merges wrapped physical lines into logical entries.
    ///
    /// A line (or the buffer plus the line) ending in a leader and a page number
    /// closes the current entry. When the buffer is empty such a line is a stray
    /// leader fragment and is discarded.
    pub fn reassemble(&self, raw_text: &str) -> Vec<String> {
        let mut logical_lines = Vec::new();
        let mut buffer = String::new();

        for line in raw_text.lines() {
            let line = line.trim();
            let candidate = format!("{} {}", buffer, line);
            // Leaders split across spans only reach four periods when glued back together
            let glued = format!("{}{}", buffer, line);

            if ENTRY_TERMINATOR_RE.is_match(line) || ENTRY_TERMINATOR_RE.is_match(&glued) {
                if buffer.is_empty() {
                    tracing::trace!("Discarding leader line with nothing buffered: '{}'", line);
                    continue;
                }
                logical_lines.push(candidate.trim().to_string());
                buffer.clear();
            } else {
                buffer = candidate;
            }
        }

        // Whitespace-only leftovers come from blank physical lines
        if !buffer.trim().is_empty() {
            logical_lines.push(buffer.trim().to_string());
        }

        logical_lines
    }

    /// Parses one logical line.
    pub fn parse_line(&self, line: &str) -> Result<Option<TocEntry>, ExtractError> {
        if !line.contains(ELLIPSIS) {
            return Ok(None);
        }

        let caps = ENTRY_RE
            .captures(line)
            .ok_or_else(|| ExtractError::UnparseableLine(line.to_string()))?;

        let start_page = caps[2]
            .parse::<usize>()
            .map_err(|_| ExtractError::UnparseableLine(line.to_string()))?;

        Ok(Some(TocEntry {
            raw_title: caps[1].trim().to_string(),
            start_page,
        }))
    }

    /// Like [`Self::parse_line`], but folds the result into a [`LineOutcome`].
    pub fn classify_line(&self, line: &str) -> LineOutcome {
        match self.parse_line(line) {
            Ok(Some(entry)) => LineOutcome::Parsed(entry),
            Ok(None) => LineOutcome::Skipped,
            Err(_) => LineOutcome::Dropped,
        }
    }

    /// Parses logical lines into entries, in order of appearance.
    /// Unparseable lines are logged and dropped.
    pub fn parse<S: AsRef<str>>(&self, logical_lines: &[S]) -> Vec<TocEntry> {
        let mut entries = Vec::new();
        for line in logical_lines {
            match self.parse_line(line.as_ref()) {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => {}
                Err(e) => tracing::warn!("{}", e),
            }
        }
        entries
    }
}

impl Default for TocExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_TOC_MARKER)
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{Document, Fragment, Page};

    fn page(fragments: &[(&str, bool)]) -> Page {
        Page::new(
            fragments
                .iter()
                .map(|(text, emphasized)| Fragment::new(*text, *emphasized, 0))
                .collect(),
        )
    }

    #[test]
    fn test_collect_skips_headers_and_stops_after_bound() {
        let doc = Document::new(vec![
            page(&[("Journal of Things", false)]),
            page(&[
                ("СОДЕРЖАНИЕ", true),
                ("Physics", true),
                ("Introduction to Systems", false),
                ("........ 2", false),
                ("More on the same page", false),
            ]),
            page(&[("Still scanned", false)]),
            page(&[("Past the bound", false)]),
        ]);

        let text = TocExtractor::default().collect(&doc).unwrap();
        assert_eq!(
            text,
            "Introduction to Systems\n........ 2\nMore on the same page\nStill scanned\n"
        );
    }

    #[test]
    fn test_collect_keeps_plain_marker_line() {
        let doc = Document::new(vec![page(&[
            ("Before", false),
            ("СОДЕРЖАНИЕ", false),
            ("Appendix ..... 9", false),
        ])]);
        let text = TocExtractor::default().collect(&doc).unwrap();
        assert_eq!(text, "СОДЕРЖАНИЕ\nAppendix ..... 9\n");
    }

    #[test]
    fn test_collect_without_marker_is_not_found() {
        let doc = Document::new(vec![page(&[("Contents", false), ("Intro ..... 3", false)])]);
        let result = TocExtractor::default().collect(&doc);
        assert!(matches!(result, Err(AppError::Extraction(ExtractError::NotFound(_)))));
    }

    #[test]
    fn test_collect_only_headers_is_not_found() {
        let doc = Document::new(vec![page(&[("СОДЕРЖАНИЕ", true), ("SECTION", true)])]);
        assert!(matches!(
            TocExtractor::default().collect(&doc),
            Err(AppError::Extraction(ExtractError::NotFound(_)))
        ));
    }

    #[test]
    fn test_collect_oversized_first_number_still_fixes_bound() {
        let doc = Document::new(vec![
            page(&[("СОДЕРЖАНИЕ", false), ("Issue 123456789012345678901234567890", false)]),
            page(&[("Intro ..... 1", false)]),
            page(&[("Third page is still scanned", false)]),
        ]);
        let text = TocExtractor::default().collect(&doc).unwrap();
        assert!(text.ends_with("Third page is still scanned\n"));
    }

    #[test]
    fn test_collect_custom_marker() {
        let doc = Document::new(vec![page(&[("CONTENTS", false), ("A .... 4", false)])]);
        let text = TocExtractor::new("CONTENTS").collect(&doc).unwrap();
        assert!(text.starts_with("CONTENTS\n"));
    }

    #[test]
    fn test_reassemble_wrapped_entries() {
        let extractor = TocExtractor::default();
        let raw = "First part of a long\ntitle that wraps\n.......... 5\nSecond\n......... 12\n";
        let lines = extractor.reassemble(raw);
        assert_eq!(
            lines,
            vec![
                "First part of a long title that wraps .......... 5",
                "Second ......... 12",
            ]
        );
    }

    #[test]
    fn test_reassemble_discards_leader_with_empty_buffer() {
        let extractor = TocExtractor::default();
        let lines = extractor.reassemble("....... 3\nOrphan title\n");
        assert_eq!(lines, vec!["Orphan title"]);
    }

    #[test]
    fn test_reassemble_joins_leader_split_across_spans() {
        let extractor = TocExtractor::default();
        // Neither "..." piece is a leader alone; glued together they are
        let lines = extractor.reassemble("Title One ...\n... 5\nTitle Two ....... 9\n");
        assert_eq!(lines, vec!["Title One ... ... 5"]);
        let entries = extractor.parse(&lines);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].start_page, 5);
    }

    #[test]
    fn test_reassemble_is_idempotent_on_single_line() {
        let extractor = TocExtractor::default();
        let once = extractor.reassemble("Appendix ... 42");
        assert_eq!(once, vec!["Appendix ... 42"]);
        let twice = extractor.reassemble(&once.join("\n"));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_parse_example_toc() {
        let extractor = TocExtractor::default();
        let raw = "СОДЕРЖАНИЕ\nIntroduction to Systems .......... 5\nAppendix ... 42\n";
        let physical: Vec<&str> = raw.lines().collect();
        let entries = extractor.parse(&physical);
        assert_eq!(
            entries,
            vec![
                TocEntry { raw_title: "Introduction to Systems".to_string(), start_page: 5 },
                TocEntry { raw_title: "Appendix".to_string(), start_page: 42 },
            ]
        );
    }

    #[test]
    fn test_parse_preserves_appearance_order() {
        let extractor = TocExtractor::default();
        let entries = extractor.parse(&["Later .... 30", "Earlier .... 7"]);
        let pages: Vec<usize> = entries.iter().map(|e| e.start_page).collect();
        assert_eq!(pages, vec![30, 7]);
    }

    #[test]
    fn test_parse_drops_unparseable_lines() {
        let extractor = TocExtractor::default();
        let lines = ["Good one .... 3", "Broken ... no page", "Another .... 8"];
        let entries = extractor.parse(&lines);
        assert_eq!(entries.len(), 2);
        assert!(entries.len() <= lines.len());
        assert_eq!(extractor.classify_line(lines[1]), LineOutcome::Dropped);
        assert_eq!(extractor.classify_line("No leader at all"), LineOutcome::Skipped);
    }

    #[test]
    fn test_full_toc_pipeline_on_split_spans() {
        let extractor = TocExtractor::default();
        let doc = Document::new(vec![
            page(&[("СОДЕРЖАНИЕ", true), ("ФИЗИКА", true)]),
            page(&[
                ("ANALYSIS OF NETWORK", false),
                ("LATENCY", false),
                ("............. 3", false),
                ("On Things", false),
                ("............. 4", false),
            ]),
        ]);
        let raw = extractor.collect(&doc).unwrap();
        let entries = extractor.parse(&extractor.reassemble(&raw));
        assert_eq!(
            entries,
            vec![
                TocEntry { raw_title: "ANALYSIS OF NETWORK LATENCY".to_string(), start_page: 3 },
                TocEntry { raw_title: "On Things".to_string(), start_page: 4 },
            ]
        );
    }
}
