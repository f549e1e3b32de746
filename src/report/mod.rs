//! Views over a finalized term index: the category-grouped noun glossary
//! and the translation consistency report.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::glossary::document::{GLOSSARY_VERSION, to_json_string};
use crate::terms::patterns::Category;
use crate::terms::{TermIndex, TermRecord};
use crate::utils::truncate_display;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NounTerm {
    pub term: String,
    pub translation: String,
    pub count: usize,
    pub entry_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub count: usize,
    pub terms: Vec<NounTerm>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NounMetadata {
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub total_terms: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NounGlossary {
    pub metadata: NounMetadata,
    pub categories: BTreeMap<Category, CategoryGroup>,
}

impl NounGlossary {
    /// Group terms under every category they belong to, sorted
    /// case-insensitively within each group.
    pub fn from_index(index: &TermIndex) -> Self {
        let mut categories: BTreeMap<Category, CategoryGroup> = BTreeMap::new();

        for record in index.values() {
            for category in &record.categories {
                let group = categories.entry(*category).or_default();
                group.terms.push(NounTerm {
                    term: record.term.clone(),
                    translation: record.canonical.clone(),
                    count: record.total_count,
                    entry_ids: record.occurrence_entry_ids.clone(),
                });
            }
        }

        for group in categories.values_mut() {
            group.terms.sort_by(|a, b| {
                a.term
                    .to_lowercase()
                    .cmp(&b.term.to_lowercase())
                    .then_with(|| a.term.cmp(&b.term))
            });
            group.count = group.terms.len();
        }

        Self {
            metadata: NounMetadata {
                version: GLOSSARY_VERSION.to_string(),
                generated_at: Utc::now(),
                total_terms: index.len(),
            },
            categories,
        }
    }

    pub fn write<P: AsRef<Path>>(&self, path: P, indent: usize) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create output directory")?;
        }
        fs::write(path, to_json_string(self, indent)?)
            .with_context(|| format!("Failed to write noun glossary: {}", path.display()))
    }
}

/// Terms translated more than one way, most frequent first.
pub fn inconsistent_terms(index: &TermIndex, limit: usize) -> Vec<&TermRecord> {
    let mut terms: Vec<&TermRecord> = index.values().filter(|r| !r.is_consistent()).collect();
    terms.sort_by(|a, b| {
        b.total_count
            .cmp(&a.total_count)
            .then_with(|| a.term.cmp(&b.term))
    });
    terms.truncate(limit);
    terms
}

pub fn print_consistency_report(index: &TermIndex, limit: usize) {
    let total = index.values().filter(|r| !r.is_consistent()).count();
    println!();
    println!("{}", "[Report] Translation consistency".cyan());
    println!(
        "  {} of {} terms have more than one translation",
        total,
        index.len()
    );

    for record in inconsistent_terms(index, limit) {
        println!(
            "  {} ({} occurrences) -> {}",
            record.term.bold(),
            record.total_count,
            record.canonical.green()
        );
        let mut others: Vec<(&String, &u32)> = record
            .translations
            .iter()
            .filter(|(text, _)| **text != record.canonical)
            .collect();
        others.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (text, count) in others {
            println!("      {} x{}", truncate_display(text, 40).yellow(), count);
        }
    }
}
