//! Configuration loading for the uploader.
//!
//! Every field has a default, so a missing config file is not an error.

use crate::utils::color::ColorExt;
use egui::Color32;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV: &str = "PATENT_UPLOADER_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploaderConfig {
    pub endpoint: String,
    pub form_field: String,
    pub request_timeout_ms: u64,
    pub reset_delay_ms: u64,
    pub max_file_size_bytes: u64,
    pub accepted_patterns: Vec<String>,
    pub require_pdf_signature: bool,
    pub accent_color: String,
    pub log_level: String,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000/patent".to_string(),
            form_field: "file".to_string(),
            request_timeout_ms: 60_000,
            reset_delay_ms: 2_000,
            max_file_size_bytes: 50 * 1024 * 1024,
            accepted_patterns: vec!["*.pdf".to_string()],
            require_pdf_signature: true,
            accent_color: "#A159E1".to_string(),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl UploaderConfig {
    /// Resolves the config path from `--config`, the environment, or the user
    /// config directory. Falls back to defaults when none of them exist.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = config_path_from_args().or_else(config_path_from_env);
        let config = match explicit {
            Some(path) => Self::from_path(&path)?,
            None => match default_config_path().filter(|path| path.is_file()) {
                Some(path) => Self::from_path(&path)?,
                None => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "endpoint",
                reason: "must not be empty".to_string(),
            });
        }
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "endpoint",
                reason: "must be an http(s) URL".to_string(),
            });
        }
        if self.form_field.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "form_field",
                reason: "must not be empty".to_string(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.max_file_size_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_file_size_bytes",
                reason: "must be > 0".to_string(),
            });
        }
        if self.accepted_patterns.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "accepted_patterns",
                reason: "must list at least one pattern".to_string(),
            });
        }
        for pattern in &self.accepted_patterns {
            if let Err(e) = glob::Pattern::new(pattern) {
                return Err(ConfigError::InvalidValue {
                    field: "accepted_patterns",
                    reason: format!("'{}': {}", pattern, e),
                });
            }
        }
        if Color32::parse_hex(&self.accent_color).is_none() {
            return Err(ConfigError::InvalidValue {
                field: "accent_color",
                reason: "must be a #RRGGBB or #RGB hex colour".to_string(),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn reset_delay(&self) -> Duration {
        Duration::from_millis(self.reset_delay_ms)
    }

    pub fn accent(&self) -> Color32 {
        Color32::parse_hex(&self.accent_color).unwrap_or(Color32::from_rgb(161, 89, 225))
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var(CONFIG_ENV).ok().map(PathBuf::from)
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("patent-uploader").join("config.toml"))
}
