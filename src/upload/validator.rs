use super::types::{display_name, RejectedFile, SelectedFile};
use crate::config::UploaderConfig;
use crate::error::ValidationError;
use glob::{MatchOptions, Pattern};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

const PDF_SIGNATURE: &[u8; 4] = b"%PDF";

/// Decides whether a picked or dropped file may be uploaded.
#[derive(Debug, Clone)]
pub struct FileValidator {
    patterns: Vec<Pattern>,
    max_size: u64,
    require_pdf_signature: bool,
}

impl FileValidator {
    pub fn new(patterns: Vec<Pattern>, max_size: u64, require_pdf_signature: bool) -> Self {
        Self {
            patterns,
            max_size,
            require_pdf_signature,
        }
    }

    /// Patterns that fail to compile are skipped; `UploaderConfig::validate`
    /// has already rejected them for loaded configs.
    pub fn from_config(config: &UploaderConfig) -> Self {
        let patterns = config
            .accepted_patterns
            .iter()
            .filter_map(|p| Pattern::new(p).ok())
            .collect();
        Self::new(
            patterns,
            config.max_file_size_bytes,
            config.require_pdf_signature,
        )
    }

    pub fn check(&self, path: &Path) -> Result<SelectedFile, RejectedFile> {
        self.inspect(path)
            .map(|size| SelectedFile::new(path, size))
            .map_err(|reason| RejectedFile::new(path, reason))
    }

    /// Splits a batch of dropped files into the one to select and the rest.
    /// The first acceptable file wins; every other candidate is rejected.
    pub fn check_many(&self, paths: &[PathBuf]) -> (Option<SelectedFile>, Vec<RejectedFile>) {
        let mut chosen = None;
        let mut rejected = Vec::new();

        for path in paths {
            if chosen.is_some() {
                rejected.push(RejectedFile::new(path, ValidationError::TooMany));
                continue;
            }
            match self.check(path) {
                Ok(file) => chosen = Some(file),
                Err(rejection) => rejected.push(rejection),
            }
        }

        (chosen, rejected)
    }

    fn inspect(&self, path: &Path) -> Result<u64, ValidationError> {
        let name = display_name(path);
        let options = MatchOptions {
            case_sensitive: false,
            ..MatchOptions::new()
        };
        if !self
            .patterns
            .iter()
            .any(|pattern| pattern.matches_with(&name, options))
        {
            return Err(ValidationError::UnsupportedType);
        }

        let metadata =
            std::fs::metadata(path).map_err(|e| ValidationError::Unreadable(e.to_string()))?;
        if !metadata.is_file() {
            return Err(ValidationError::Unreadable("not a regular file".to_string()));
        }

        let size = metadata.len();
        if size > self.max_size {
            return Err(ValidationError::TooLarge {
                size,
                limit: self.max_size,
            });
        }

        if self.require_pdf_signature {
            let mut header = [0u8; 4];
            let mut file =
                File::open(path).map_err(|e| ValidationError::Unreadable(e.to_string()))?;
            if file.read_exact(&mut header).is_err() || &header != PDF_SIGNATURE {
                return Err(ValidationError::NotPdf);
            }
        }

        Ok(size)
    }
}
