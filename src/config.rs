//! Configuration file support
//!
//! Loads settings from ~/.syntok.toml (or %USERPROFILE%\.syntok.toml on Windows)
//!
//! Example:
//! ```text
//! # label for text no rule classifies
//! default-label = "normal"
//! builtin-grammars = true
//! grammar-dirs = ["/usr/share/syntok/grammars"]
//! ```

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::warn;

use crate::error::Result;
use crate::syntax::DEFAULT_LABEL;

/// Configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Label for unclassified text in grammars that don't set their own
    pub default_label: String,
    /// Whether to register the built-in grammars
    pub builtin_grammars: bool,
    /// Directories whose `*.toml` files are registered as grammars
    pub grammar_dirs: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_label: DEFAULT_LABEL.to_string(),
            builtin_grammars: true,
            grammar_dirs: Vec::new(),
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|home| PathBuf::from(home).join(".syntok.toml"))
        }

        #[cfg(not(windows))]
        {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".syntok.toml"))
        }
    }

    /// Load configuration from file
    ///
    /// A missing or malformed file gives the defaults.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Config::default();
        };
        let Ok(contents) = fs::read_to_string(&path) else {
            return Config::default();
        };
        match Self::parse(&contents) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), %err, "ignoring malformed config file");
                Config::default()
            }
        }
    }

    /// Parse config file contents
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}
