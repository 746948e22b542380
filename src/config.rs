//! Application configuration, stored as TOML.
//!
//! ```toml
//! [corpus]
//! dir = "data/corpus"
//! default_locale = "en"
//!
//! [lexicon]
//! path = "lexicon.json"
//!
//! [search]
//! min_accept_score = 0.7
//! cross_locale_penalty = 0.85
//! ```

use std::path::{Path, PathBuf};

use dentfaq_search::{Locale, SearchConfig};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where the per-locale corpus files live.
    pub corpus: CorpusConfig,
    /// Optional lexicon override.
    pub lexicon: LexiconConfig,
    /// Ranking knobs passed straight to the search engine.
    pub search: SearchConfig,
}

/// Corpus location and the locale used when a caller names none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Directory holding `en.json` and `zh.json`.
    pub dir: PathBuf,
    pub default_locale: Locale,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data/corpus"),
            default_locale: Locale::En,
        }
    }
}

/// Stopword and synonym table override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconConfig {
    /// JSON lexicon file replacing the built-in table (None = built-in).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/dentfaq/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("dentfaq").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("dentfaq")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/dentfaq-config/config.toml")
        }
    }

    /// Check every section.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] for an empty corpus directory and
    /// [`AppError::Search`] for invalid ranking knobs.
    pub fn validate(&self) -> Result<()> {
        if self.corpus.dir.as_os_str().is_empty() {
            return Err(AppError::Config("corpus.dir must not be empty".into()));
        }
        self.search.validate()?;
        Ok(())
    }
}
