//! Error types shared across the uploader.

use crate::config::ConfigError;

/// Local, non-fatal rejections raised by [`crate::session::UploadSession::submit`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("no file selected")]
    NoFileSelected,
    #[error("an upload is already in progress")]
    SubmissionInProgress,
}

/// Why a candidate file was turned away before it reached the session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("file type not accepted")]
    UnsupportedType,
    #[error("file is {size} bytes, limit is {limit} bytes")]
    TooLarge { size: u64, limit: u64 },
    #[error("file does not look like a PDF")]
    NotPdf,
    #[error("cannot read file: {0}")]
    Unreadable(String),
    #[error("only one file can be uploaded at a time")]
    TooMany,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to init logging: {0}")]
    Logging(String),
    #[error("GUI error: {0}")]
    Gui(String),
}

impl From<eframe::Error> for AppError {
    fn from(err: eframe::Error) -> Self {
        Self::Gui(err.to_string())
    }
}
