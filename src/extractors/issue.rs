// src/extractors/issue.rs

// --- Imports ---
use crate::extractors::article::{ArticleExtractor, ArticleRecord};
use crate::extractors::toc::{TocEntry, TocExtractor};
use crate::source::Document;
use crate::utils::AppError;

// --- Data Structures ---
/// Everything recovered from one issue, including the intermediate TOC text
/// kept for debug output.
#[derive(Debug, Clone)]
pub struct IssueExtraction {
    pub toc_text: String,
    pub logical_lines: Vec<String>,
    pub entries: Vec<TocEntry>,
    pub records: Vec<ArticleRecord>,
}

impl IssueExtraction {
    pub fn resolved_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_resolved()).count()
    }
}

// --- Main Extractor Structure ---
pub struct IssueExtractor {
    toc: TocExtractor,
    articles: ArticleExtractor,
}

impl IssueExtractor {
    pub fn new(toc_marker: &str) -> Self {
        Self {
            toc: TocExtractor::new(toc_marker),
            articles: ArticleExtractor::new(),
        }
    }

    pub fn toc(&self) -> &TocExtractor {
        &self.toc
    }

    /// Runs the whole pipeline: TOC region, logical lines, entries, then one
    /// record per entry. A missing TOC or an unreadable start page aborts.
    pub fn extract(&self, document: &Document) -> Result<IssueExtraction, AppError> {
        tracing::info!("Looking for table of contents (marker '{}')", self.toc.marker());
        let toc_text = self.toc.collect(document)?;

        let logical_lines = self.toc.reassemble(&toc_text);
        tracing::debug!("Reassembled {} logical TOC lines", logical_lines.len());

        let entries = self.toc.parse(&logical_lines);
        tracing::info!("Parsed {} TOC entries", entries.len());

        let records = self.articles.locate(document, &entries)?;

        let extraction = IssueExtraction { toc_text, logical_lines, entries, records };
        tracing::info!(
            "Resolved {} of {} articles",
            extraction.resolved_count(),
            extraction.records.len()
        );
        Ok(extraction)
    }
}
