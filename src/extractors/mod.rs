// src/extractors/mod.rs
pub mod affiliation;
pub mod article;
pub mod issue;
pub mod toc;

// Re-export key extraction types for convenience
#[allow(unused_imports)]
pub use article::{ArticleExtractor, ArticleRecord, PageSpan};
#[allow(unused_imports)]
pub use issue::{IssueExtraction, IssueExtractor};
#[allow(unused_imports)]
pub use toc::{LineOutcome, TocEntry, TocExtractor, DEFAULT_TOC_MARKER};
