// src/source/models.rs
use serde::{Deserialize, Serialize};

use crate::utils::error::SourceError;

/// One styled run of text on a page, in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub text: String,
    /// Rendered in a visually distinct (bold) style.
    pub emphasized: bool,
    /// Position within the page's reading order. Assigned by the source.
    #[serde(default)]
    pub order: usize,
}

impl Fragment {
    pub fn new(text: impl Into<String>, emphasized: bool, order: usize) -> Self {
        Self { text: text.into(), emphasized, order }
    }
}

/// Ordered fragments of one page. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    fragments: Vec<Fragment>,
}

impl Page {
    /// Builds a page, numbering fragments in the order given.
    pub fn new(fragments: Vec<Fragment>) -> Self {
        let fragments = fragments
            .into_iter()
            .enumerate()
            .map(|(order, fragment)| Fragment { order, ..fragment })
            .collect();
        Self { fragments }
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }
}

/// An opened paginated document. Pages are indexed from 0.
///
/// Dropping the document releases it; there is no separate close step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pages: Vec<Page>,
}

impl Document {
    pub fn new(pages: Vec<Page>) -> Self {
        Self { pages }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: usize) -> Result<&Page, SourceError> {
        self.pages.get(index).ok_or(SourceError::IndexOutOfRange {
            index,
            page_count: self.pages.len(),
        })
    }

    /// Parses a JSON fragment dump: `{"pages":[{"fragments":[{"text":..,"emphasized":..}]}]}`.
    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        let raw: Document = serde_json::from_str(json)
            .map_err(|e| SourceError::Unavailable(format!("Invalid fragment dump: {}", e)))?;
        // Renumber so `order` always matches position, whatever the dump said
        let pages = raw
            .pages
            .into_iter()
            .map(|page| Page::new(page.fragments))
            .collect();
        Ok(Self { pages })
    }
}
