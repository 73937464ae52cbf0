use crate::error::ValidationError;
use crate::results::Payload;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;

/// The one file currently chosen for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
}

impl SelectedFile {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        let path = path.into();
        Self {
            name: display_name(&path),
            path,
            size,
        }
    }
}

/// A candidate the file picker or validator turned away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedFile {
    pub name: String,
    pub reason: ValidationError,
}

impl RejectedFile {
    pub fn new(path: &Path, reason: ValidationError) -> Self {
        Self {
            name: display_name(path),
            reason,
        }
    }
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Failure reported by the transport. Either field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportError {
    /// Structured `error` field from the response body, when there is one.
    pub detail: Option<String>,
    /// Generic message: HTTP status line, network or I/O error text.
    pub message: Option<String>,
}

impl TransportError {
    pub const FALLBACK: &'static str = "Upload failed";

    pub fn with_detail(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
            message: None,
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            detail: None,
            message: Some(message.into()),
        }
    }

    pub fn display_message(&self) -> &str {
        self.detail
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.message.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or(Self::FALLBACK)
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_message())
    }
}

impl std::error::Error for TransportError {}

#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Upload progress in percent (0..=100). Always precedes the terminal event.
    Progress(f32),
    Succeeded(Payload),
    Failed(TransportError),
}

/// Capability that ships one file to the backend.
///
/// Implementations must return immediately; events arrive on the returned
/// channel in order, ending with exactly one `Succeeded` or `Failed`.
pub trait Transport {
    fn submit_file(&self, file: &SelectedFile) -> Receiver<TransportEvent>;
}
