//! Rewriter configuration.
//!
//! Defaults match the browser host. A TOML file may override them:
//!
//! ```toml
//! attribute = "data-lang"
//! selector = 'div[class*="language-"]'
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use langlabel::{DEFAULT_SELECTOR, LABEL_ATTRIBUTE};
use lol_html::Selector;
use lol_html::errors::SelectorError;
use serde::Deserialize;
use thiserror::Error;

/// What to label and where to store the label.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Attribute that receives the label.
    pub attribute: String,
    /// CSS selector for candidate elements.
    pub selector: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            attribute: LABEL_ATTRIBUTE.to_string(),
            selector: DEFAULT_SELECTOR.to_string(),
        }
    }
}

impl Config {
    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the attribute name is writable and the selector parses.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_attribute_name(&self.attribute) {
            return Err(ConfigError::InvalidAttribute(self.attribute.clone()));
        }
        self.selector
            .parse::<Selector>()
            .map_err(|source| ConfigError::InvalidSelector {
                selector: self.selector.clone(),
                source,
            })?;
        Ok(())
    }
}

// HTML attribute names exclude whitespace, controls, quotes, `>`, `/` and `=`.
fn is_valid_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|c| {
            !c.is_whitespace() && !c.is_control() && !matches!(c, '"' | '\'' | '>' | '/' | '=')
        })
}

/// Errors from loading or validating a [`Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid attribute name: {0:?}")]
    InvalidAttribute(String),

    #[error("invalid selector {selector:?}: {source}")]
    InvalidSelector {
        selector: String,
        #[source]
        source: SelectorError,
    },
}
