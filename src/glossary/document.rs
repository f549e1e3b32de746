//! Serialized glossary document

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::builder::SkipTally;
use super::{Game, GlossaryEntry};
use crate::terms::TermIndex;

pub const GLOSSARY_VERSION: &str = "1.0";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatistics {
    pub total: usize,
    pub with_translation: usize,
    pub with_gender_variant: usize,
    pub skipped: SkipTally,
}

impl GameStatistics {
    pub fn collect(entries: &[GlossaryEntry], skipped: SkipTally) -> Self {
        Self {
            total: entries.len(),
            with_translation: entries.iter().filter(|e| e.translation.has_any()).count(),
            with_gender_variant: entries
                .iter()
                .filter(|e| e.translation.is_gendered())
                .count(),
            skipped,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlossaryMetadata {
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub source_games: Vec<Game>,
    pub total_entries: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<BTreeMap<String, GameStatistics>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlossaryDocument {
    pub metadata: GlossaryMetadata,
    pub entries: Vec<GlossaryEntry>,
    pub term_frequency: TermIndex,
}

impl GlossaryDocument {
    pub fn new(games: &[Game], entries: Vec<GlossaryEntry>, term_frequency: TermIndex) -> Self {
        Self {
            metadata: GlossaryMetadata {
                version: GLOSSARY_VERSION.to_string(),
                generated_at: Utc::now(),
                source_games: games.to_vec(),
                total_entries: entries.len(),
                statistics: None,
            },
            entries,
            term_frequency,
        }
    }

    pub fn with_statistics(mut self, statistics: BTreeMap<String, GameStatistics>) -> Self {
        self.metadata.statistics = Some(statistics);
        self
    }

    /// Write as UTF-8 JSON (non-ASCII kept as-is) with the given indent width.
    pub fn write<P: AsRef<Path>>(&self, path: P, indent: usize) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create output directory")?;
        }
        let json = to_json_string(self, indent)?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write glossary: {}", path.display()))?;
        Ok(())
    }
}

pub fn to_json_string<T: Serialize>(value: &T, indent: usize) -> Result<String> {
    if indent == 0 {
        return serde_json::to_string(value).context("Failed to serialize JSON");
    }
    let indent = " ".repeat(indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .context("Failed to serialize JSON")?;
    String::from_utf8(buf).context("Serialized JSON is not UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glossary::TranslationVariant;

    fn sample_entries() -> Vec<GlossaryEntry> {
        vec![
            GlossaryEntry::new(
                Game::Bg1ee,
                1,
                "Hello.".to_string(),
                TranslationVariant::single("こんにちは。"),
            ),
            GlossaryEntry::new(
                Game::Bg1ee,
                2,
                "Hi.".to_string(),
                TranslationVariant::gendered("よう。", "こんにちは。"),
            ),
        ]
    }

    #[test]
    fn test_statistics() {
        let mut skipped = SkipTally::default();
        skipped.untranslated = 4;
        let stats = GameStatistics::collect(&sample_entries(), skipped);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.with_translation, 2);
        assert_eq!(stats.with_gender_variant, 1);
        assert_eq!(stats.skipped.total(), 4);
    }

    #[test]
    fn test_json_shape() {
        let doc = GlossaryDocument::new(&[Game::Bg1ee], sample_entries(), TermIndex::new());
        let json = to_json_string(&doc, 2).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["metadata"]["version"], "1.0");
        assert_eq!(value["metadata"]["source_games"][0], "bg1ee");
        assert_eq!(value["metadata"]["total_entries"], 2);
        assert!(value["metadata"].get("statistics").is_none());
        assert_eq!(value["entries"][0]["id"], "bg1ee:1");
        assert_eq!(value["entries"][0]["translation"]["default"], "こんにちは。");
        assert!(value["entries"][0]["translation"]["male"].is_null());
        assert_eq!(value["entries"][1]["metadata"]["target_char_count"], 3);
        assert!(json.contains("こんにちは"), "non-ASCII should not be escaped");
        assert!(json.contains("\n  \"metadata\""));
    }

    #[test]
    fn test_compact_json() {
        let doc = GlossaryDocument::new(&[Game::Bg2ee], Vec::new(), TermIndex::new());
        let json = to_json_string(&doc, 0).unwrap();
        assert!(!json.contains('\n'));
    }
}
