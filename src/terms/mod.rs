//! Term extraction: recurring proper nouns and stock phrases

pub mod candidates;
pub mod patterns;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::glossary::GlossaryEntry;
use candidates::{capitalized_spans, clean_text, phrases};
use patterns::{Category, TermPatterns};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionConfig {
    pub min_span_count: u32,
    pub min_phrase_count: u32,
    pub max_span_words: usize,
    pub min_phrase_chars: usize,
    pub max_phrase_chars: usize,
    pub max_phrase_words: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_span_count: 2,
            min_phrase_count: 5,
            max_span_words: 6,
            min_phrase_chars: 3,
            max_phrase_chars: 50,
            max_phrase_words: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermKind {
    Span,
    Phrase,
    Both,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationVote {
    pub count: u32,
    pub from_male: bool,
    // smallest contributing id, not the first one seen
    pub first_entry: String,
}

impl TranslationVote {
    fn absorb(&mut self, other: &TranslationVote) {
        self.count += other.count;
        self.from_male |= other.from_male;
        if other.first_entry < self.first_entry {
            self.first_entry.clone_from(&other.first_entry);
        }
    }

    fn rank(&self, other: &TranslationVote) -> Ordering {
        self.count
            .cmp(&other.count)
            .then(self.from_male.cmp(&other.from_male))
            .then_with(|| other.first_entry.cmp(&self.first_entry))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Tally {
    span_hits: u32,
    phrase_hits: u32,
    votes: BTreeMap<String, TranslationVote>,
    entry_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermAccumulator {
    tallies: HashMap<String, Tally>,
    entries_seen: usize,
}

impl TermAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn candidate_count(&self) -> usize {
        self.tallies.len()
    }

    pub fn entries_seen(&self) -> usize {
        self.entries_seen
    }

    pub fn merge(&mut self, other: TermAccumulator) {
        self.entries_seen += other.entries_seen;
        for (term, theirs) in other.tallies {
            let ours = self.tallies.entry(term).or_default();
            ours.span_hits += theirs.span_hits;
            ours.phrase_hits += theirs.phrase_hits;
            ours.entry_ids.extend(theirs.entry_ids);
            for (translation, vote) in theirs.votes {
                match ours.votes.get_mut(&translation) {
                    Some(existing) => existing.absorb(&vote),
                    None => {
                        ours.votes.insert(translation, vote);
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRecord {
    pub term: String,
    pub kind: TermKind,
    pub categories: BTreeSet<Category>,
    pub canonical: String,
    pub translations: BTreeMap<String, u32>,
    pub occurrence_entry_ids: Vec<String>,
    pub total_count: usize,
}

impl TermRecord {
    pub fn is_consistent(&self) -> bool {
        self.translations.len() <= 1
    }
}

pub type TermIndex = BTreeMap<String, TermRecord>;

pub struct TermExtractor {
    config: ExtractionConfig,
    patterns: TermPatterns,
}

impl TermExtractor {
    pub fn new(config: ExtractionConfig, patterns: TermPatterns) -> Self {
        Self { config, patterns }
    }

    pub fn extract(&self, entries: &[GlossaryEntry]) -> TermIndex {
        self.finalize(&self.accumulate(entries))
    }

    pub fn accumulate(&self, entries: &[GlossaryEntry]) -> TermAccumulator {
        let mut acc = TermAccumulator::new();
        for entry in entries {
            self.observe(&mut acc, entry);
        }
        tracing::debug!(
            "Scanned {} entries, {} candidate terms",
            acc.entries_seen,
            acc.tallies.len()
        );
        acc
    }

    // female text never votes
    pub fn observe(&self, acc: &mut TermAccumulator, entry: &GlossaryEntry) {
        acc.entries_seen += 1;
        let Some(vote_text) = entry.translation.primary() else {
            return;
        };
        let from_male = entry.translation.primary_is_male();

        let cleaned = clean_text(&entry.source_text);
        let mut found: BTreeMap<String, (bool, bool)> = BTreeMap::new();
        for span in capitalized_spans(&cleaned, &self.patterns, &self.config) {
            found.entry(span).or_default().0 = true;
        }
        for phrase in phrases(&cleaned, &self.config) {
            found.entry(phrase).or_default().1 = true;
        }

        for (term, (is_span, is_phrase)) in found {
            let tally = acc.tallies.entry(term).or_default();
            if is_span {
                tally.span_hits += 1;
            }
            if is_phrase {
                tally.phrase_hits += 1;
            }
            tally.entry_ids.push(entry.id.clone());

            match tally.votes.get_mut(vote_text) {
                Some(vote) => vote.absorb(&TranslationVote {
                    count: 1,
                    from_male,
                    first_entry: entry.id.clone(),
                }),
                None => {
                    tally.votes.insert(
                        vote_text.to_string(),
                        TranslationVote {
                            count: 1,
                            from_male,
                            first_entry: entry.id.clone(),
                        },
                    );
                }
            }
        }
    }

    /// Thresholds need global counts, so this runs once on the merged
    /// accumulator, never per partition.
    pub fn finalize(&self, acc: &TermAccumulator) -> TermIndex {
        let mut index = TermIndex::new();

        for (term, tally) in &acc.tallies {
            let span_ok = tally.span_hits >= self.config.min_span_count;
            let phrase_ok = tally.phrase_hits >= self.config.min_phrase_count;
            let kind = match (span_ok, phrase_ok) {
                (true, true) => TermKind::Both,
                (true, false) => TermKind::Span,
                (false, true) => TermKind::Phrase,
                (false, false) => continue,
            };
            let Some(canonical) = select_canonical(&tally.votes) else {
                continue;
            };

            index.insert(
                term.clone(),
                TermRecord {
                    term: term.clone(),
                    kind,
                    categories: self.patterns.categorize(term),
                    canonical: canonical.to_string(),
                    translations: tally
                        .votes
                        .iter()
                        .map(|(text, vote)| (text.clone(), vote.count))
                        .collect(),
                    occurrence_entry_ids: tally.entry_ids.clone(),
                    total_count: tally.entry_ids.len(),
                },
            );
        }

        tracing::info!(
            "Finalized {} terms from {} candidates",
            index.len(),
            acc.tallies.len()
        );
        index
    }
}

fn select_canonical(votes: &BTreeMap<String, TranslationVote>) -> Option<&str> {
    votes
        .iter()
        .max_by(|(a_text, a), (b_text, b)| a.rank(b).then_with(|| b_text.cmp(a_text)))
        .map(|(text, _)| text.as_str())
}
