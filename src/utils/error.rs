// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Document source unavailable: {0}")]
    Unavailable(String), // Unreadable path, unknown format, converter failure

    #[error("Page index {index} out of range (document has {page_count} pages)")]
    IndexOutOfRange { index: usize, page_count: usize },

    #[error("Printed page number {0} has no page index")]
    InvalidPageNumber(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Not found: {0}")]
    NotFound(String),

    // Non-fatal: the line is logged and dropped by the entry parser
    #[error("Unparseable TOC line: {0}")]
    UnparseableLine(String),

    // Non-fatal: the article record is reported with all fields absent
    #[error("Ambiguous authors/organizations block: {0}")]
    Ambiguous(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Document source failed: {0}")]
    Source(#[from] SourceError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
