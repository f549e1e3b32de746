//! Candidate term generation from source-language text

use regex::Regex;
use std::sync::LazyLock;

use super::ExtractionConfig;
use super::patterns::TermPatterns;
use crate::glossary::{SOUND_REF_RE, VARIABLE_TAG_RE};
use crate::utils::{
    char_count, has_bracket_leftover, is_punctuation_only, normalize_whitespace, starts_uppercase,
};

static SENTENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[^.!?]+(?:[.!?]+["'”’)]*)?"#).expect("valid sentence regex")
});

pub fn clean_text(text: &str) -> String {
    let text = VARIABLE_TAG_RE.replace_all(text, "");
    let text = SOUND_REF_RE.replace_all(&text, "");
    normalize_whitespace(&text)
}

pub fn capitalized_spans(
    cleaned: &str,
    patterns: &TermPatterns,
    config: &ExtractionConfig,
) -> Vec<String> {
    let mut spans = SpanCollector::new(patterns, config);

    for token in cleaned.split_whitespace() {
        if has_bracket_leftover(token) || is_punctuation_only(token) {
            spans.flush();
            continue;
        }

        let (opens, word, closes) = split_token(token);
        if opens {
            spans.flush();
        }

        if starts_uppercase(word) {
            spans.push_word(word);
        } else if spans.in_run() && !closes && patterns.is_connector(word) {
            spans.push_connector(word);
        } else {
            spans.flush();
        }

        if closes {
            spans.flush();
        }
    }

    spans.finish()
}

struct SpanCollector<'a, 't> {
    patterns: &'a TermPatterns,
    config: &'a ExtractionConfig,
    run: Vec<&'t str>,
    pending: Vec<&'t str>,
    spans: Vec<String>,
}

impl<'a, 't> SpanCollector<'a, 't> {
    const MAX_CONNECTORS: usize = 2;

    fn new(patterns: &'a TermPatterns, config: &'a ExtractionConfig) -> Self {
        Self {
            patterns,
            config,
            run: Vec::new(),
            pending: Vec::new(),
            spans: Vec::new(),
        }
    }

    fn in_run(&self) -> bool {
        !self.run.is_empty()
    }

    fn push_word(&mut self, word: &'t str) {
        self.run.append(&mut self.pending);
        self.run.push(word);
    }

    // held back until another capitalized word follows
    fn push_connector(&mut self, word: &'t str) {
        if self.pending.len() < Self::MAX_CONNECTORS {
            self.pending.push(word);
        } else {
            self.flush();
        }
    }

    fn flush(&mut self) {
        self.pending.clear();
        if let Some(span) = self.finish_run() {
            self.spans.push(span);
        }
        self.run.clear();
    }

    fn finish_run(&self) -> Option<String> {
        let is_edge_noise =
            |w: &&str| self.patterns.is_stop_word(w) || self.patterns.is_connector(w);
        let start = self.run.iter().position(|w| !is_edge_noise(w))?;
        let end = self.run.iter().rposition(|w| !is_edge_noise(w))?;
        let words = &self.run[start..=end];

        if words.len() > self.config.max_span_words {
            return None;
        }
        let span = words.join(" ");
        if words.len() == 1 && char_count(&span) < 2 {
            return None;
        }
        Some(span)
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.spans
    }
}

/// (had leading punctuation, word, had trailing punctuation). Inner
/// apostrophes and hyphens stay.
fn split_token(token: &str) -> (bool, &str, bool) {
    let word = token.trim_start_matches(|c: char| !c.is_alphanumeric());
    let opens = word.len() != token.len();
    let trimmed = word.trim_end_matches(|c: char| !c.is_alphanumeric());
    let closes = trimmed.len() != word.len();
    (opens, trimmed, closes)
}

pub fn phrases(cleaned: &str, config: &ExtractionConfig) -> Vec<String> {
    SENTENCE_RE
        .find_iter(cleaned)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty() && !has_bracket_leftover(s))
        .filter(|s| {
            let chars = char_count(s);
            chars >= config.min_phrase_chars
                && chars <= config.max_phrase_chars
                && s.split_whitespace().count() <= config.max_phrase_words
        })
        .map(str::to_string)
        .collect()
}
