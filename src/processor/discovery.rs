//! Invoice file discovery
//!
//! Finds the workbooks to process in the input folder and leaves out the
//! lock and temp files office suites create next to open documents.

use crate::constants::LOCK_FILE_MARKER;
use crate::error::{ProcessorError, Result};
use glob::Pattern;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File discovery component for an invoice folder
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    input_dir: PathBuf,
    pattern: String,
}

impl FileDiscovery {
    pub fn new(input_dir: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            input_dir: input_dir.into(),
            pattern: pattern.into(),
        }
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    /// Matching files sorted by file name
    ///
    /// Sorting makes the record order of a run independent of the order the
    /// filesystem happens to list entries in.
    pub fn discover_invoice_files(&self) -> Result<Vec<PathBuf>> {
        if !self.input_dir.is_dir() {
            return Err(ProcessorError::InputNotFound {
                path: self.input_dir.clone(),
            });
        }

        let full_pattern = format!(
            "{}/{}",
            Pattern::escape(&self.input_dir.to_string_lossy()),
            self.pattern
        );
        debug!("Searching for invoice files: {}", full_pattern);

        let entries = glob::glob(&full_pattern).map_err(|source| ProcessorError::FilePattern {
            pattern: self.pattern.clone(),
            source,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            match entry {
                Ok(path) => {
                    if !path.is_file() {
                        continue;
                    }
                    if is_lock_file(&path) {
                        debug!("Skipping lock file {}", path.display());
                        continue;
                    }
                    files.push(path);
                }
                Err(e) => warn!("Cannot read directory entry: {}", e),
            }
        }

        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        debug!("Found {} invoice files", files.len());

        Ok(files)
    }
}

/// True for editor lock files and temporary copies
pub fn is_lock_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().contains(LOCK_FILE_MARKER))
        .unwrap_or(false)
}

/// File name of a path as text, for record provenance and messages
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_lock_file_detection() {
        assert!(is_lock_file(Path::new("/in/~$счет.xlsx")));
        assert!(is_lock_file(Path::new("счет~.xlsx")));
        assert!(!is_lock_file(Path::new("/in/счет сентябрь.xlsx")));
    }

    #[test]
    fn test_discovery_filters_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join("b_invoice.xlsx"), b"").unwrap();
        fs::write(dir.join("a_invoice.xlsx"), b"").unwrap();
        fs::write(dir.join("~$a_invoice.xlsx"), b"").unwrap();
        fs::write(dir.join("notes.txt"), b"").unwrap();
        fs::create_dir(dir.join("archive.xlsx")).unwrap();

        let files = FileDiscovery::new(dir, "*.xlsx")
            .discover_invoice_files()
            .unwrap();
        let names: Vec<String> = files.iter().map(|p| display_name(p)).collect();

        assert_eq!(names, vec!["a_invoice.xlsx", "b_invoice.xlsx"]);
    }

    #[test]
    fn test_missing_input_dir() {
        let temp_dir = TempDir::new().unwrap();
        let err = FileDiscovery::new(temp_dir.path().join("absent"), "*.xlsx")
            .discover_invoice_files()
            .unwrap_err();
        assert!(matches!(err, ProcessorError::InputNotFound { .. }));
    }

    #[test]
    fn test_invalid_pattern() {
        let temp_dir = TempDir::new().unwrap();
        let err = FileDiscovery::new(temp_dir.path(), "[*.xlsx")
            .discover_invoice_files()
            .unwrap_err();
        assert!(matches!(err, ProcessorError::FilePattern { .. }));
    }
}
