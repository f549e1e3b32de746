//! Configuration management

pub mod commands;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::terms::ExtractionConfig;

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_NAME: &str = "tra-glossary";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub corpus: CorpusConfig,

    #[serde(default)]
    pub extraction: ExtractionSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Root of the TRA tree (`<source_dir>/<game>/<lang>/<file_name>`)
    #[serde(default)]
    pub source_dir: Option<String>,

    /// Default glossary output path
    #[serde(default)]
    pub output: Option<String>,

    /// JSON indent width, 0 for compact output
    #[serde(default = "default_indent")]
    pub indent: usize,
}

fn default_indent() -> usize {
    2
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            source_dir: None,
            output: None,
            indent: default_indent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    #[serde(default = "default_source_lang")]
    pub source_lang: String,

    #[serde(default = "default_target_lang")]
    pub target_lang: String,

    #[serde(default = "default_file_name")]
    pub file_name: String,
}

fn default_source_lang() -> String {
    "en_US".to_string()
}

fn default_target_lang() -> String {
    "ja_JP".to_string()
}

fn default_file_name() -> String {
    "dialog.tra".to_string()
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            source_lang: default_source_lang(),
            target_lang: default_target_lang(),
            file_name: default_file_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSettings {
    /// Entries a capitalized span must appear in
    #[serde(default = "default_min_span_count")]
    pub min_span_count: u32,

    /// Entries a stock phrase must appear in
    #[serde(default = "default_min_phrase_count")]
    pub min_phrase_count: u32,

    #[serde(default = "default_max_span_words")]
    pub max_span_words: usize,

    #[serde(default = "default_min_phrase_chars")]
    pub min_phrase_chars: usize,

    #[serde(default = "default_max_phrase_chars")]
    pub max_phrase_chars: usize,

    #[serde(default = "default_max_phrase_words")]
    pub max_phrase_words: usize,

    /// Pattern table TOML replacing the built-in one
    #[serde(default)]
    pub patterns_file: Option<String>,
}

fn default_min_span_count() -> u32 {
    ExtractionConfig::default().min_span_count
}

fn default_min_phrase_count() -> u32 {
    ExtractionConfig::default().min_phrase_count
}

fn default_max_span_words() -> usize {
    ExtractionConfig::default().max_span_words
}

fn default_min_phrase_chars() -> usize {
    ExtractionConfig::default().min_phrase_chars
}

fn default_max_phrase_chars() -> usize {
    ExtractionConfig::default().max_phrase_chars
}

fn default_max_phrase_words() -> usize {
    ExtractionConfig::default().max_phrase_words
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            min_span_count: default_min_span_count(),
            min_phrase_count: default_min_phrase_count(),
            max_span_words: default_max_span_words(),
            min_phrase_chars: default_min_phrase_chars(),
            max_phrase_chars: default_max_phrase_chars(),
            max_phrase_words: default_max_phrase_words(),
            patterns_file: None,
        }
    }
}

impl ExtractionSettings {
    pub fn to_extraction_config(&self) -> ExtractionConfig {
        ExtractionConfig {
            min_span_count: self.min_span_count,
            min_phrase_count: self.min_phrase_count,
            max_span_words: self.max_span_words,
            min_phrase_chars: self.min_phrase_chars,
            max_phrase_chars: self.max_phrase_chars,
            max_phrase_words: self.max_phrase_words,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_NAME))
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join(CONFIG_FILE_NAME))
    }

    /// Load config from default location, falling back to defaults
    pub fn load() -> Result<Self> {
        let Some(path) = Self::config_path() else {
            tracing::debug!("No config directory on this platform, using defaults");
            return Ok(Self::default());
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml_str(&content).context("Failed to parse config file")
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Save config to default location
    pub fn save(&self) -> Result<PathBuf> {
        let dir = Self::config_dir().context("Could not determine config directory")?;
        fs::create_dir_all(&dir).context("Failed to create config directory")?;

        let path = dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, content).context("Failed to write config file")?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.general.indent, 2);
        assert_eq!(config.corpus.source_lang, "en_US");
        assert_eq!(config.corpus.target_lang, "ja_JP");
        assert_eq!(config.corpus.file_name, "dialog.tra");
        assert_eq!(
            config.extraction.to_extraction_config(),
            ExtractionConfig::default()
        );
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml_str(
            r#"
[general]
source_dir = "/data/source_tra"

[extraction]
min_span_count = 3
"#,
        )
        .unwrap();
        assert_eq!(config.general.source_dir.as_deref(), Some("/data/source_tra"));
        assert_eq!(config.general.indent, 2);
        let extraction = config.extraction.to_extraction_config();
        assert_eq!(extraction.min_span_count, 3);
        assert_eq!(extraction.min_phrase_count, 5);
    }

    #[test]
    fn test_serialized_defaults_parse_back() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let config = Config::from_toml_str(&text).unwrap();
        assert_eq!(config.extraction.max_phrase_chars, 50);
        assert!(config.extraction.patterns_file.is_none());
    }
}
