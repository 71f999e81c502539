//! libchinese-grid
//!
//! Reading lattice and best-path search for phonetic Chinese input.
//!
//! Readings (e.g. Bopomofo syllables) are fed to a `ReadingBuilder`, which
//! asks a `LanguageModel` for every phrase spanning up to `MAX_SPAN_LENGTH`
//! readings and stores them as `Node`s in a `Grid`. A `Walker` then picks the
//! highest-scoring decomposition of the whole reading sequence. User
//! selections are pinned on the grid and always win over statistics.
//!
//! Public API:
//! - `KeyValuePair`, `Unigram` - reading/text pairs and their scores
//! - `Node`, `Span`, `Grid`, `NodeAnchor` - the lattice
//! - `Walker` - best path and exhaustive path dump
//! - `LanguageModel` - candidate source, with `InMemoryLanguageModel` and
//!   `CachedLanguageModel`
//! - `ReadingBuilder` - keeps a grid in step with edited readings
//! - `Config` - builder and cache settings
//!
//! ```
//! use libchinese_grid::{values_of, InMemoryLanguageModel, ReadingBuilder};
//!
//! let mut lm = InMemoryLanguageModel::new();
//! lm.insert("ㄋㄧˇ", "你", -3.0);
//! lm.insert("ㄏㄠˇ", "好", -3.0);
//! lm.insert("ㄋㄧˇ-ㄏㄠˇ", "你好", -4.0);
//!
//! let mut builder = ReadingBuilder::new(lm);
//! builder.insert_reading_at_cursor("ㄋㄧˇ");
//! builder.insert_reading_at_cursor("ㄏㄠˇ");
//! assert_eq!(values_of(&builder.walk()), vec!["你好"]);
//! ```
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod key_value;
pub use key_value::KeyValuePair;

pub mod unigram;
pub use unigram::Unigram;

pub mod language_model;
pub use language_model::{CachedLanguageModel, InMemoryLanguageModel, LanguageModel};

pub mod node;
pub use node::{Node, SELECTED_CANDIDATE_SCORE};

pub mod span;
pub use span::Span;

pub mod node_anchor;
pub use node_anchor::NodeAnchor;

pub mod grid;
pub use grid::{Grid, MAX_SPAN_LENGTH};

pub mod walker;
pub use walker::{path_score, readings_of, values_of, Walker, DROPPED_PATH_SCORE};

pub mod builder;
pub use builder::ReadingBuilder;

/// Capacity used by `CachedLanguageModel` when none is configured.
pub const DEFAULT_LM_CACHE_SIZE: usize = 1000;

/// Reading builder and model cache settings.
///
/// Missing TOML fields take their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Separator placed between readings when building phrase keys
    /// ("ㄋㄧˇ-ㄏㄠˇ").
    pub join_separator: String,

    /// Longest phrase, in readings, the builder asks the model for.
    /// Clamped to `1..=MAX_SPAN_LENGTH`.
    pub max_build_span_length: usize,

    /// Entries kept by `CachedLanguageModel`; 0 means the default.
    pub lm_cache_size: usize,

    /// NFC-normalise readings before inserting them.
    pub normalize_readings: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            join_separator: "-".to_string(),
            max_build_span_length: MAX_SPAN_LENGTH,
            lm_cache_size: DEFAULT_LM_CACHE_SIZE,
            normalize_readings: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parse config {}", path.display()))
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        std::fs::write(path, content).with_context(|| format!("write config {}", path.display()))?;
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// `max_build_span_length` clamped to what the grid supports.
    pub fn effective_span_length(&self) -> usize {
        self.max_build_span_length.clamp(1, MAX_SPAN_LENGTH)
    }
}

/// Utility helpers.
pub mod utils {
    use unicode_normalization::UnicodeNormalization;

    /// NFC-normalise a reading. Whitespace is kept: `" "` is a valid reading.
    pub fn normalize_reading(s: &str) -> String {
        s.nfc().collect()
    }
}
