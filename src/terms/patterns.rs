//! Stop words and category matchers, loaded from a TOML table

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const BUILTIN_PATTERNS: &str = include_str!("default_patterns.toml");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Class,
    ClassRace,
    Creature,
    Deity,
    Location,
    Organization,
    ProperNoun,
    Race,
    Spell,
    Title,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Class => "class",
            Category::ClassRace => "class_race",
            Category::Creature => "creature",
            Category::Deity => "deity",
            Category::Location => "location",
            Category::Organization => "organization",
            Category::ProperNoun => "proper_noun",
            Category::Race => "race",
            Category::Spell => "spell",
            Category::Title => "title",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("failed to read pattern table {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid pattern table: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid {category} pattern '{pattern}'")]
    Regex {
        category: Category,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternTable {
    #[serde(default)]
    pub stop_words: Vec<String>,

    /// Lowercase words allowed between two capitalized words of one term
    #[serde(default)]
    pub connectors: Vec<String>,

    #[serde(default, rename = "category")]
    pub categories: Vec<CategoryPatterns>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPatterns {
    pub name: Category,

    /// Whole-word matches anywhere in the term
    #[serde(default)]
    pub keywords: Vec<String>,

    /// First word of a multi-word term
    #[serde(default)]
    pub prefixes: Vec<String>,

    /// Last word of a multi-word term
    #[serde(default)]
    pub suffixes: Vec<String>,

    /// Regular expressions tested against the whole term
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl PatternTable {
    pub fn builtin() -> Result<Self, PatternError> {
        Self::from_toml_str(BUILTIN_PATTERNS)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PatternError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| PatternError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, PatternError> {
        Ok(toml::from_str(content)?)
    }

    pub fn compile(&self) -> Result<TermPatterns, PatternError> {
        let matchers = self
            .categories
            .iter()
            .map(CategoryMatcher::compile)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TermPatterns {
            stop_words: self.stop_words.iter().map(|w| w.to_lowercase()).collect(),
            connectors: self.connectors.iter().map(|w| w.to_lowercase()).collect(),
            matchers,
        })
    }
}

#[derive(Debug)]
struct CategoryMatcher {
    category: Category,
    keywords: Option<Regex>,
    prefixes: HashSet<String>,
    suffixes: HashSet<String>,
    patterns: Vec<Regex>,
}

impl CategoryMatcher {
    fn compile(table: &CategoryPatterns) -> Result<Self, PatternError> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|source| PatternError::Regex {
                category: table.name,
                pattern: pattern.to_string(),
                source,
            })
        };

        let keywords = if table.keywords.is_empty() {
            None
        } else {
            let alternation = table
                .keywords
                .iter()
                .map(|k| regex::escape(k))
                .collect::<Vec<_>>()
                .join("|");
            Some(compile(format!(r"\b(?:{})\b", alternation).as_str())?)
        };

        Ok(Self {
            category: table.name,
            keywords,
            prefixes: table.prefixes.iter().cloned().collect(),
            suffixes: table.suffixes.iter().cloned().collect(),
            patterns: table
                .patterns
                .iter()
                .map(|p| compile(p.as_str()))
                .collect::<Result<_, _>>()?,
        })
    }

    fn matches(&self, term: &str, words: &[&str]) -> bool {
        if self.keywords.as_ref().is_some_and(|re| re.is_match(term)) {
            return true;
        }
        if words.len() > 1 {
            if self.prefixes.contains(words[0]) {
                return true;
            }
            if self.suffixes.contains(words[words.len() - 1]) {
                return true;
            }
        }
        self.patterns.iter().any(|re| re.is_match(term))
    }
}

#[derive(Debug)]
pub struct TermPatterns {
    stop_words: HashSet<String>,
    connectors: HashSet<String>,
    matchers: Vec<CategoryMatcher>,
}

impl TermPatterns {
    pub fn builtin() -> Result<Self, PatternError> {
        PatternTable::builtin()?.compile()
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(&word.to_lowercase())
    }

    pub fn is_connector(&self, word: &str) -> bool {
        self.connectors.contains(word)
    }

    pub fn categorize(&self, term: &str) -> BTreeSet<Category> {
        let words: Vec<&str> = term.split_whitespace().collect();
        let mut categories: BTreeSet<Category> = self
            .matchers
            .iter()
            .filter(|m| m.matches(term, &words))
            .map(|m| m.category)
            .collect();

        if categories.is_empty() {
            categories.insert(Category::Other);
        }
        categories
    }
}
