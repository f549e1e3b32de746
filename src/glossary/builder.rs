//! Pairs source and target TRA records into glossary entries

use serde::{Deserialize, Serialize};

use super::{Game, GlossaryEntry, TranslationVariant};
use crate::tra::{RawRecord, RecordMap};

pub const NO_TEXT: &str = "<NO TEXT>";
pub const PLACEHOLDER: &str = "placeholder";

const MAX_FIXTURE_DIGITS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    Placeholder,
    EmptySource,
    TestFixture,
    Untranslated,
    EmptyTranslation,
    MalformedSegments,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipTally {
    pub placeholder: usize,
    pub empty_source: usize,
    pub test_fixture: usize,
    pub untranslated: usize,
    pub empty_translation: usize,
    pub malformed_segments: usize,
}

impl SkipTally {
    pub fn record(&mut self, reason: SkipReason) {
        let slot = match reason {
            SkipReason::Placeholder => &mut self.placeholder,
            SkipReason::EmptySource => &mut self.empty_source,
            SkipReason::TestFixture => &mut self.test_fixture,
            SkipReason::Untranslated => &mut self.untranslated,
            SkipReason::EmptyTranslation => &mut self.empty_translation,
            SkipReason::MalformedSegments => &mut self.malformed_segments,
        };
        *slot += 1;
    }

    pub fn total(&self) -> usize {
        self.placeholder
            + self.empty_source
            + self.test_fixture
            + self.untranslated
            + self.empty_translation
            + self.malformed_segments
    }
}

#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
    pub entries: Vec<GlossaryEntry>,
    pub skipped: SkipTally,
}

pub fn is_placeholder(text: &str) -> bool {
    text == NO_TEXT || text.eq_ignore_ascii_case(PLACEHOLDER)
}

pub fn is_test_fixture(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty()
        && text.len() <= MAX_FIXTURE_DIGITS
        && text.bytes().all(|b| b.is_ascii_digit())
}

pub struct EntryBuilder {
    game: Game,
}

impl EntryBuilder {
    pub fn new(game: Game) -> Self {
        Self { game }
    }

    pub fn build(&self, source: &RecordMap, target: &RecordMap) -> BuildOutput {
        tracing::info!(
            "Building {} entries from {} source / {} target records",
            self.game,
            source.len(),
            target.len()
        );

        let mut output = BuildOutput::default();
        for (id, record) in source {
            match self.pair(record, target.get(id)) {
                Ok(entry) => output.entries.push(entry),
                Err(reason) => {
                    tracing::trace!("{}:{} skipped ({:?})", self.game, id, reason);
                    output.skipped.record(reason);
                }
            }
        }

        tracing::info!(
            "Created {} {} entries, skipped {}",
            output.entries.len(),
            self.game,
            output.skipped.total()
        );
        output
    }

    fn pair(
        &self,
        source: &RawRecord,
        target: Option<&RawRecord>,
    ) -> Result<GlossaryEntry, SkipReason> {
        let source_text = match source.text() {
            Some(text) => text,
            None if source.segments.is_empty() => return Err(SkipReason::EmptySource),
            None => return Err(SkipReason::MalformedSegments),
        };

        if is_placeholder(source_text) {
            return Err(SkipReason::Placeholder);
        }
        if source_text.trim().is_empty() {
            return Err(SkipReason::EmptySource);
        }
        if is_test_fixture(source_text) {
            return Err(SkipReason::TestFixture);
        }

        let target = target.ok_or(SkipReason::Untranslated)?;
        let translation = variant_from(target)?;
        if !translation.has_any() {
            return Err(SkipReason::EmptyTranslation);
        }

        Ok(GlossaryEntry::new(
            self.game,
            source.id,
            source_text.to_string(),
            translation,
        ))
    }
}

// Target text is trimmed so padded and unpadded segments vote together
fn variant_from(record: &RawRecord) -> Result<TranslationVariant, SkipReason> {
    let segments: Vec<&str> = record.segments.iter().map(|s| s.trim()).collect();
    if !segments.is_empty() && segments.iter().all(|s| is_placeholder(s)) {
        return Ok(TranslationVariant::default());
    }
    match segments.as_slice() {
        [only] => Ok(TranslationVariant::single(*only)),
        [male, female] => Ok(TranslationVariant::gendered(*male, *female)),
        [] => Err(SkipReason::EmptyTranslation),
        _ => Err(SkipReason::MalformedSegments),
    }
}
