//! Glossary data model

pub mod builder;
pub mod document;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::utils::char_count;

// <CHARNAME>, <SIRMAAM>, ...
pub static VARIABLE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[A-Z_]+>").expect("valid variable tag regex"));

pub static SOUND_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[A-Z0-9]+\]").expect("valid sound reference regex"));

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Game {
    Bg1ee,
    Bg2ee,
}

impl Game {
    pub const ALL: [Game; 2] = [Game::Bg1ee, Game::Bg2ee];

    pub fn as_str(&self) -> &'static str {
        match self {
            Game::Bg1ee => "bg1ee",
            Game::Bg2ee => "bg2ee",
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationVariant {
    pub default: Option<String>,
    pub male: Option<String>,
    pub female: Option<String>,
}

impl TranslationVariant {
    pub fn single(text: impl Into<String>) -> Self {
        Self {
            default: Some(text.into()),
            male: None,
            female: None,
        }
    }

    pub fn gendered(male: impl Into<String>, female: impl Into<String>) -> Self {
        Self {
            default: None,
            male: Some(male.into()),
            female: Some(female.into()),
        }
    }

    pub fn has_any(&self) -> bool {
        self.default.is_some() || self.male.is_some() || self.female.is_some()
    }

    pub fn is_gendered(&self) -> bool {
        self.default.is_none() && (self.male.is_some() || self.female.is_some())
    }

    pub fn primary(&self) -> Option<&str> {
        self.default.as_deref().or(self.male.as_deref())
    }

    pub fn primary_is_male(&self) -> bool {
        self.default.is_none() && self.male.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    pub game: Game,
    pub original_id: u32,
    pub has_variable_tag: bool,
    pub has_sound_reference: bool,
    pub source_char_count: usize,
    pub target_char_count: usize,
}

impl EntryMetadata {
    pub fn derive(
        game: Game,
        original_id: u32,
        source_text: &str,
        translation: &TranslationVariant,
    ) -> Self {
        Self {
            game,
            original_id,
            has_variable_tag: VARIABLE_TAG_RE.is_match(source_text),
            has_sound_reference: SOUND_REF_RE.is_match(source_text),
            source_char_count: char_count(source_text),
            target_char_count: translation.primary().map(char_count).unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub id: String,
    pub source_text: String,
    pub translation: TranslationVariant,
    pub metadata: EntryMetadata,
}

impl GlossaryEntry {
    pub fn new(
        game: Game,
        original_id: u32,
        source_text: String,
        translation: TranslationVariant,
    ) -> Self {
        let metadata = EntryMetadata::derive(game, original_id, &source_text, &translation);
        Self {
            id: entry_id(game, original_id),
            source_text,
            translation,
            metadata,
        }
    }
}

pub fn entry_id(game: Game, original_id: u32) -> String {
    format!("{}:{}", game, original_id)
}
