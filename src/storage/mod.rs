// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};
use crate::extractors::IssueExtraction;
use crate::utils::error::StorageError;

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Directory for one document's artifacts: /base_dir/<stem>/
    pub fn document_dir(&self, document_stem: &str) -> Result<PathBuf, StorageError> {
        let target_dir = self.base_dir.join(document_stem);
        if !target_dir.exists() {
            fs::create_dir_all(&target_dir)
                .map_err(StorageError::IoError)?;
        }
        Ok(target_dir)
    }

    /// Saves the article records as a JSON array
    pub fn save_records(&self, document_stem: &str, extraction: &IssueExtraction) -> Result<PathBuf, StorageError> {
        let file_path = self
            .document_dir(document_stem)?
            .join(format!("{}_articles.json", document_stem));

        let records_str = serde_json::to_string_pretty(&extraction.records)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, records_str)
            .map_err(StorageError::IoError)?;

        tracing::info!("Saved {} records to {}", extraction.records.len(), file_path.display());

        Ok(file_path)
    }

    /// Saves metadata about the run in JSON format
    pub fn save_metadata(&self, document_stem: &str, source: &Path, extraction: &IssueExtraction) -> Result<PathBuf, StorageError> {
        let file_path = self
            .document_dir(document_stem)?
            .join(format!("{}_meta.json", document_stem));

        let resolved = extraction.resolved_count();
        let metadata = serde_json::json!({
            "source": source.display().to_string(),
            "toc_lines": extraction.logical_lines.len(),
            "entries": extraction.entries.len(),
            "resolved": resolved,
            "ambiguous": extraction.records.len() - resolved,
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, metadata_str)
            .map_err(StorageError::IoError)?;

        tracing::info!("Saved metadata to {}", file_path.display());

        Ok(file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::{ArticleRecord, TocEntry};

    fn sample_extraction() -> IssueExtraction {
        IssueExtraction {
            toc_text: "Intro\n..... 3\n".to_string(),
            logical_lines: vec!["Intro ..... 3".to_string()],
            entries: vec![TocEntry { raw_title: "Intro".to_string(), start_page: 3 }],
            records: vec![ArticleRecord {
                toc_title: "Intro".to_string(),
                start_page: 3,
                end_page: 9,
                title: None,
                authors: None,
                organizations: None,
            }],
        }
    }

    #[test]
    fn test_save_records_and_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path().join("out")).unwrap();
        let extraction = sample_extraction();

        let records_path = storage.save_records("issue_1", &extraction).unwrap();
        assert!(records_path.ends_with("issue_1/issue_1_articles.json"));
        let saved: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&records_path).unwrap()).unwrap();
        assert_eq!(saved[0]["toc_title"], "Intro");
        assert!(saved[0]["title"].is_null());

        let meta_path = storage
            .save_metadata("issue_1", Path::new("issue_1.pdf"), &extraction)
            .unwrap();
        let meta: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&meta_path).unwrap()).unwrap();
        assert_eq!(meta["entries"], 1);
        assert_eq!(meta["resolved"], 0);
        assert_eq!(meta["ambiguous"], 1);
        assert!(meta["extraction_timestamp"].is_string());
    }
}
