//! Core runtime configuration.
//!
//! # Responsibility
//! - Describe the knobs the CLI/edge layer passes into core.
//! - Load them from a JSON document with per-field defaults.

use crate::logging::default_log_level;
use crate::search::SnippetOptions;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Configuration loading failures.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config document: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}

/// Runtime configuration; every field is optional in the JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// SQLite database file.
    pub database_path: Option<PathBuf>,
    /// `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files; logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    pub snippet: SnippetOptions,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            snippet: SnippetOptions::default(),
        }
    }
}

impl CoreConfig {
    pub fn from_json_str(document: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(document).map_err(ConfigError::Parse)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&document)
    }
}

#[cfg(test)]
mod tests {
    use super::CoreConfig;
    use crate::search::SnippetOptions;

    #[test]
    fn empty_document_uses_defaults() {
        let config = CoreConfig::from_json_str("{}").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.snippet.words_around, 5);
        assert_eq!(config.snippet.preview_chars, 150);
    }

    #[test]
    fn partial_snippet_section_keeps_other_defaults() {
        let config = CoreConfig::from_json_str(
            r#"{"database_path": "/tmp/docs.sqlite3", "snippet": {"highlight_open": "<mark>", "highlight_close": "</mark>"}}"#,
        )
        .unwrap();
        assert_eq!(
            config.database_path.as_deref(),
            Some(std::path::Path::new("/tmp/docs.sqlite3"))
        );
        assert_eq!(
            config.snippet,
            SnippetOptions {
                highlight_open: "<mark>".to_string(),
                highlight_close: "</mark>".to_string(),
                ..SnippetOptions::default()
            }
        );
    }

    #[test]
    fn malformed_document_is_rejected() {
        assert!(CoreConfig::from_json_str("{\"snippet\": 3}").is_err());
    }
}
