// src/source/mod.rs
pub mod models;
pub mod pdftohtml;

use std::path::Path;

use crate::utils::error::SourceError;
pub use models::{Document, Fragment, Page};

/// Opens a document and reads every page's fragments.
///
/// The format is picked by extension: `.pdf` goes through `pdftohtml`,
/// `.xml` is a saved `pdftohtml -xml` dump, `.json` is a fragment dump.
pub fn open(path: &Path, pdftohtml_bin: &str) -> Result<Document, SourceError> {
    if !path.is_file() {
        return Err(SourceError::Unavailable(format!("Cannot read {}", path.display())));
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let document = match extension.as_str() {
        "pdf" => pdftohtml::convert_pdf(pdftohtml_bin, path)?,
        "xml" => pdftohtml::parse_xml(&std::fs::read_to_string(path)?)?,
        "json" => Document::from_json(&std::fs::read_to_string(path)?)?,
        other => {
            return Err(SourceError::Unavailable(format!(
                "Unsupported document type '{}' for {}",
                other,
                path.display()
            )))
        }
    };

    tracing::info!("Opened {} ({} pages)", path.display(), document.page_count());
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_open_missing_file() {
        let result = open(Path::new("/nonexistent/issue.pdf"), "pdftohtml");
        assert!(matches!(result, Err(SourceError::Unavailable(_))));
    }

    #[test]
    fn test_open_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("issue.docx");
        fs::write(&path, "whatever").unwrap();
        assert!(matches!(open(&path, "pdftohtml"), Err(SourceError::Unavailable(_))));
    }

    #[test]
    fn test_open_json_dump() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("issue.JSON");
        fs::write(
            &path,
            r#"{"pages":[{"fragments":[{"text":"A","emphasized":false}]}]}"#,
        )
        .unwrap();
        let doc = open(&path, "pdftohtml").unwrap();
        assert_eq!(doc.page_count(), 1);
    }
}
