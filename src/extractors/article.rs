// src/extractors/article.rs

// --- Imports ---
use std::collections::HashMap;

use crate::extractors::affiliation::{self, Byline};
use crate::extractors::toc::TocEntry;
use crate::source::{Document, Fragment, Page};
use crate::utils::error::SourceError;
use serde::Serialize;

// --- Constants ---
// Lower-cased markers that end the author/organization block
const EMAIL_MARKERS: [&str; 2] = ["email", "e-mail"];

// --- Data Structures ---
/// Metadata recovered for one TOC entry.
///
/// `title`, `authors` and `organizations` are all `None` when the byline
/// could not be split; that is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleRecord {
    pub toc_title: String,
    pub start_page: usize,
    /// Exclusive end bound as a 0-based page index.
    pub end_page: usize,
    pub title: Option<String>,
    pub authors: Option<String>,
    pub organizations: Option<String>,
}

impl ArticleRecord {
    pub fn is_resolved(&self) -> bool {
        self.title.is_some()
    }
}

/// Page range of one article: where it starts and where the next one does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpan {
    pub start_index: usize,
    /// Exclusive. Only the start page is scanned today.
    pub end_index: usize,
}

/// Scanner states, in the order they are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Seeking,
    Title,
    AuthOrg,
    Done,
}

/// What a single fragment does to the accumulated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect<'a> {
    Ignore,
    AppendTitle(&'a str),
    AppendByline(&'a str),
    Stop,
}

/// Title and byline text gathered so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accumulator {
    pub title: String,
    pub byline: String,
}

impl Accumulator {
    pub fn apply(mut self, effect: &Effect) -> Self {
        match effect {
            Effect::AppendTitle(text) => {
                self.title.push_str(text);
                self.title.push(' ');
            }
            Effect::AppendByline(text) => {
                self.byline.push_str(text);
                self.byline.push(' ');
            }
            Effect::Ignore | Effect::Stop => {}
        }
        self
    }
}

// --- Anchor selection ---
/// Orders `title_words` by where each first appears in `header_words`.
///
/// Words found in the header come first, sorted by first header position (ties
/// keep title order); words missing from the header follow in title order.
pub fn reorder_by_first_appearance<'a>(title_words: &[&'a str], header_words: &[&str]) -> Vec<&'a str> {
    let mut first_index: HashMap<&str, usize> = HashMap::new();
    for (index, word) in header_words.iter().enumerate() {
        first_index.entry(*word).or_insert(index);
    }

    let (mut found, missing): (Vec<&str>, Vec<&str>) = title_words
        .iter()
        .copied()
        .partition(|word| first_index.contains_key(word));

    // Stable sort, so duplicates stay in title order
    found.sort_by_key(|word| first_index[word]);
    found.extend(missing);
    found
}

/// Picks the title word that appears earliest in the page's emphasized text.
pub fn select_anchor_word(raw_title: &str, page: &Page) -> Option<String> {
    let header: String = page
        .fragments()
        .iter()
        .filter(|f| f.emphasized)
        .map(|f| f.text.trim())
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase();
    let header_words: Vec<&str> = header.split_whitespace().collect();

    let title = raw_title.to_uppercase();
    let title_words: Vec<&str> = title.split_whitespace().collect();

    reorder_by_first_appearance(&title_words, &header_words)
        .first()
        .map(|word| word.to_string())
}

// --- State machine ---
fn is_numeric(text: &str) -> bool {
    !text.is_empty() && text.chars().all(char::is_numeric)
}

fn has_email_marker(text: &str) -> bool {
    let lower = text.to_lowercase();
    EMAIL_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Advances the scanner by one fragment.
///
/// The anchor is compared against the fragment's words as written; title pages
/// set their headings in capitals, matching the upper-cased anchor.
pub fn transition<'a>(state: ScanState, fragment: &'a Fragment, anchor: &str) -> (ScanState, Effect<'a>) {
    let text = fragment.text.trim();
    match state {
        ScanState::Seeking => {
            if fragment.emphasized
                && !is_numeric(text)
                && text.split(' ').any(|word| word == anchor)
            {
                (ScanState::Title, Effect::AppendTitle(text))
            } else {
                (ScanState::Seeking, Effect::Ignore)
            }
        }
        ScanState::Title => {
            if fragment.emphasized {
                (ScanState::Title, Effect::AppendTitle(text))
            } else {
                (ScanState::AuthOrg, Effect::AppendByline(text))
            }
        }
        ScanState::AuthOrg => {
            if has_email_marker(text) {
                (ScanState::Done, Effect::Stop)
            } else {
                (ScanState::AuthOrg, Effect::AppendByline(text))
            }
        }
        ScanState::Done => (ScanState::Done, Effect::Stop),
    }
}

/// Runs the scanner over a page's fragments until it stops or the page ends.
pub fn scan_page(fragments: &[Fragment], anchor: &str) -> (ScanState, Accumulator) {
    let mut state = ScanState::Seeking;
    let mut acc = Accumulator::default();

    for fragment in fragments {
        let (next, effect) = transition(state, fragment, anchor);
        acc = acc.apply(&effect);
        state = next;
        if state == ScanState::Done {
            tracing::trace!("Email marker reached at fragment {}", fragment.order);
            break;
        }
    }

    (state, acc)
}

// --- Main Extractor Structure ---
pub struct ArticleExtractor;

impl ArticleExtractor {
    pub fn new() -> Self {
        Self {}
    }

    /// Computes each entry's page span. The end bound is the next entry's start
    /// page, or the last page index for the final entry.
    pub fn page_spans(&self, entries: &[TocEntry], page_count: usize) -> Result<Vec<PageSpan>, SourceError> {
        let last_index = page_count.saturating_sub(1);
        entries
            .iter()
            .enumerate()
            .map(|(i, entry)| -> Result<PageSpan, SourceError> {
                let start_index = entry
                    .start_page
                    .checked_sub(1)
                    .ok_or(SourceError::InvalidPageNumber(entry.start_page))?;
                let end_index = entries
                    .get(i + 1)
                    .map(|next| next.start_page.saturating_sub(1))
                    .unwrap_or(last_index);
                Ok(PageSpan { start_index, end_index })
            })
            .collect()
    }

    /// Produces one record per entry, in entry order.
    pub fn locate(&self, document: &Document, entries: &[TocEntry]) -> Result<Vec<ArticleRecord>, SourceError> {
        let spans = self.page_spans(entries, document.page_count())?;

        entries
            .iter()
            .zip(spans)
            .map(|(entry, span)| -> Result<ArticleRecord, SourceError> {
                let page = document.page(span.start_index)?;
                Ok(self.extract(page, entry, span))
            })
            .collect()
    }

    /// Recovers title, authors and organizations for one article from its start page.
    pub fn extract(&self, page: &Page, entry: &TocEntry, span: PageSpan) -> ArticleRecord {
        let mut record = ArticleRecord {
            toc_title: entry.raw_title.clone(),
            start_page: entry.start_page,
            end_page: span.end_index,
            title: None,
            authors: None,
            organizations: None,
        };

        let anchor = select_anchor_word(&entry.raw_title, page).unwrap_or_default();
        tracing::debug!("Anchor word for '{}': '{}'", entry.raw_title, anchor);

        let (state, acc) = scan_page(page.fragments(), &anchor);
        tracing::trace!("Scan of page {} ended in {:?}", entry.start_page, state);

        match affiliation::parse_byline(acc.byline.trim()) {
            Ok(Byline { authors, organizations }) => {
                record.title = Some(acc.title.trim().to_string());
                record.authors = Some(authors);
                record.organizations = Some(organizations);
            }
            Err(e) => {
                tracing::warn!("Article '{}' on page {}: {}", entry.raw_title, entry.start_page, e);
            }
        }

        record
    }
}

impl Default for ArticleExtractor {
    fn default() -> Self {
        Self::new()
    }
}
