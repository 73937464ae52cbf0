//! Single-file patent uploader.
//!
//! [`session::UploadSession`] drives one upload at a time through a
//! [`upload::Transport`]; every settlement lands in a
//! [`results::ResultTable`], whose columns are inferred from whatever fields
//! the backend returns.

pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod results;
pub mod session;
pub mod upload;
pub mod utils;
