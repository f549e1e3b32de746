//! TRA record parsing

use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

use crate::utils::truncate_display;

const DELIMITER: char = '~';
const SNIPPET_LEN: usize = 80;

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@(\d+)\s*=\s*(.*)$").expect("valid header regex"));

// Comments are cut off before this is applied
static TRAILER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:\[[A-Za-z0-9_]*\])?\s*$").expect("valid trailer regex"));

#[derive(Debug, Error)]
pub enum TraError {
    #[error("{origin}:{line}: malformed record: {snippet}")]
    MalformedRecord {
        origin: String,
        line: usize,
        snippet: String,
    },

    #[error("{origin}:{line}: record text is never closed with '~'")]
    UnterminatedRecord { origin: String, line: usize },

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid UTF-8", path.display())]
    Encoding {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

impl TraError {
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::MalformedRecord { line, .. } | Self::UnterminatedRecord { line, .. } => {
                Some(*line)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub id: u32,
    pub segments: Vec<String>,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentShape {
    Single,
    GenderPair,
    Anomalous(usize),
}

impl RawRecord {
    pub fn shape(&self) -> SegmentShape {
        match self.segments.len() {
            1 => SegmentShape::Single,
            2 => SegmentShape::GenderPair,
            n => SegmentShape::Anomalous(n),
        }
    }

    pub fn is_anomalous(&self) -> bool {
        matches!(self.shape(), SegmentShape::Anomalous(_))
    }

    pub fn text(&self) -> Option<&str> {
        match self.segments.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }
}

pub type RecordMap = BTreeMap<u32, RawRecord>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub records: usize,
    pub single: usize,
    pub gender_pairs: usize,
    pub anomalous: usize,
    pub duplicates: usize,
    pub ignored_lines: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedFile {
    pub records: RecordMap,
    pub stats: ParseStats,
}

impl ParsedFile {
    pub fn anomalies(&self) -> impl Iterator<Item = &RawRecord> {
        self.records.values().filter(|r| r.is_anomalous())
    }
}

pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<ParsedFile, TraError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| TraError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let content = String::from_utf8(bytes).map_err(|source| TraError::Encoding {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed = parse_str(&content, &path.display().to_string())?;
    tracing::info!(
        "Parsed {} records ({} anomalous) from {}",
        parsed.stats.records,
        parsed.stats.anomalous,
        path.display()
    );
    Ok(parsed)
}

pub fn parse_str(content: &str, origin: &str) -> Result<ParsedFile, TraError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut parsed = ParsedFile::default();
    let mut lines = content.lines().enumerate();

    while let Some((idx, line)) = lines.next() {
        let line_number = idx + 1;
        let trimmed = line.trim_start();

        if !trimmed.starts_with('@') {
            if !trimmed.is_empty() {
                tracing::debug!("{}:{}: ignoring non-record line", origin, line_number);
                parsed.stats.ignored_lines += 1;
            }
            continue;
        }

        let malformed = || TraError::MalformedRecord {
            origin: origin.to_string(),
            line: line_number,
            snippet: truncate_display(trimmed, SNIPPET_LEN),
        };

        let caps = HEADER_RE.captures(trimmed).ok_or_else(malformed)?;
        let id: u32 = caps[1].parse().map_err(|_| malformed())?;
        let mut body = caps[2].to_string();

        if !body.starts_with(DELIMITER) {
            return Err(malformed());
        }

        // `~` is never escaped, so an odd count means the text continues
        while is_open(&body) {
            match lines.next() {
                Some((_, next)) => {
                    body.push('\n');
                    body.push_str(next);
                }
                None => {
                    return Err(TraError::UnterminatedRecord {
                        origin: origin.to_string(),
                        line: line_number,
                    });
                }
            }
        }

        let segments = split_segments(strip_comment(&body)).ok_or_else(malformed)?;
        let record = RawRecord {
            id,
            segments,
            line: line_number,
        };

        match record.shape() {
            SegmentShape::Single => parsed.stats.single += 1,
            SegmentShape::GenderPair => parsed.stats.gender_pairs += 1,
            SegmentShape::Anomalous(n) => {
                tracing::debug!("{}:{}: @{} has {} segments", origin, line_number, id, n);
                parsed.stats.anomalous += 1;
            }
        }

        if let Some(previous) = parsed.records.insert(id, record) {
            tracing::warn!(
                "{}:{}: duplicate @{} (first seen on line {}), keeping the later record",
                origin,
                line_number,
                id,
                previous.line
            );
            parsed.stats.duplicates += 1;
        }
    }

    parsed.stats.records = parsed.records.len();
    Ok(parsed)
}

// Cut a `//` or `/*` comment that starts outside of record text
fn strip_comment(body: &str) -> &str {
    let mut in_text = false;
    for (i, c) in body.char_indices() {
        match c {
            DELIMITER => in_text = !in_text,
            '/' if !in_text => {
                let rest = &body[i + 1..];
                if rest.starts_with('/') || rest.starts_with('*') {
                    return &body[..i];
                }
            }
            _ => {}
        }
    }
    body
}

fn is_open(body: &str) -> bool {
    strip_comment(body).matches(DELIMITER).count() % 2 == 1
}

// Odd fragments are segment text, the gaps between them must be blank
fn split_segments(body: &str) -> Option<Vec<String>> {
    let fragments: Vec<&str> = body.split(DELIMITER).collect();
    let last = fragments.len() - 1;
    let mut segments = Vec::new();

    for (i, fragment) in fragments.iter().enumerate().skip(1) {
        if i % 2 == 1 {
            if !fragment.trim().is_empty() {
                segments.push(fragment.to_string());
            }
        } else if i == last {
            if !TRAILER_RE.is_match(fragment) {
                return None;
            }
        } else if !fragment.trim().is_empty() {
            return None;
        }
    }

    Some(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> ParsedFile {
        parse_str(content, "test.tra").unwrap()
    }

    #[test]
    fn test_single_segment() {
        let parsed = parse("@1 = ~Hello there.~\n");
        let record = &parsed.records[&1];
        assert_eq!(record.segments, vec!["Hello there."]);
        assert_eq!(record.shape(), SegmentShape::Single);
        assert_eq!(record.text(), Some("Hello there."));
    }

    #[test]
    fn test_gender_pair() {
        let parsed = parse("@6 = ~しかし俺は何もやっちゃいない！~ ~でも私は何もしていないわ！~");
        let record = &parsed.records[&6];
        assert_eq!(record.shape(), SegmentShape::GenderPair);
        assert_eq!(record.segments[0], "しかし俺は何もやっちゃいない！");
        assert_eq!(record.segments[1], "でも私は何もしていないわ！");
        assert_eq!(record.text(), None);
    }

    #[test]
    fn test_whitespace_variants() {
        let parsed = parse("@12=~tight~\n@13   =   ~loose~   \n");
        assert_eq!(parsed.records[&12].text(), Some("tight"));
        assert_eq!(parsed.records[&13].text(), Some("loose"));
    }

    #[test]
    fn test_multi_line_record() {
        let parsed = parse("@3 = ~First line\nsecond line~\n@4 = ~Next~");
        assert_eq!(parsed.records[&3].text(), Some("First line\nsecond line"));
        assert_eq!(parsed.records[&4].line, 3);
    }

    #[test]
    fn test_trailing_sound_and_comment() {
        let parsed = parse("@7 = ~Die!~ [ZOMBI01]\n@8 = ~Run!~ // battle cry\n");
        assert_eq!(parsed.records[&7].text(), Some("Die!"));
        assert_eq!(parsed.records[&8].text(), Some("Run!"));
    }

    #[test]
    fn test_tilde_inside_trailing_comment() {
        let parsed = parse("@1 = ~Hi~ // old text was ~Hey\n@2 = ~Yo~\n@3 = ~Z~ /* ~ */\n");
        assert_eq!(parsed.stats.records, 3);
        assert_eq!(parsed.records[&1].text(), Some("Hi"));
        assert_eq!(parsed.records[&2].text(), Some("Yo"));
        assert_eq!(parsed.records[&3].text(), Some("Z"));
    }

    #[test]
    fn test_slashes_inside_text_are_kept() {
        let parsed = parse("@1 = ~See http://example.org~ // link\n@2 = ~a /* b~\n");
        assert_eq!(parsed.records[&1].text(), Some("See http://example.org"));
        assert_eq!(parsed.records[&2].text(), Some("a /* b"));
    }

    #[test]
    fn test_non_record_lines_ignored() {
        let parsed = parse("// dialog.tra\n\n@0 = ~<NO TEXT>~\nBACKUP stuff\n");
        assert_eq!(parsed.stats.records, 1);
        assert_eq!(parsed.stats.ignored_lines, 2);
        assert_eq!(parsed.records[&0].text(), Some("<NO TEXT>"));
    }

    #[test]
    fn test_anomalous_segment_count_is_retained() {
        let parsed = parse("@9 = ~a~ ~b~ ~c~\n@10 = ~~\n");
        assert_eq!(parsed.records[&9].shape(), SegmentShape::Anomalous(3));
        assert_eq!(parsed.records[&10].shape(), SegmentShape::Anomalous(0));
        assert_eq!(parsed.stats.anomalous, 2);
        assert_eq!(parsed.anomalies().count(), 2);
    }

    #[test]
    fn test_blank_segment_is_dropped() {
        let parsed = parse("@2 = ~男~ ~  ~");
        assert_eq!(parsed.records[&2].segments, vec!["男"]);
    }

    #[test]
    fn test_duplicate_id_keeps_later() {
        let parsed = parse("@5 = ~old~\n@5 = ~new~\n");
        assert_eq!(parsed.records[&5].text(), Some("new"));
        assert_eq!(parsed.stats.duplicates, 1);
        assert_eq!(parsed.stats.records, 1);
    }

    #[test]
    fn test_missing_delimiter_is_malformed() {
        let err = parse_str("@1 = ~ok~\n@2 = no tildes", "dialog.tra").unwrap_err();
        assert!(matches!(err, TraError::MalformedRecord { line: 2, .. }));
        assert!(err.to_string().starts_with("dialog.tra:2:"));
    }

    #[test]
    fn test_text_between_segments_is_malformed() {
        let err = parse_str("@1 = ~a~ junk ~b~", "x").unwrap_err();
        assert_eq!(err.line(), Some(1));
    }

    #[test]
    fn test_bad_header_is_malformed() {
        assert!(parse_str("@abc = ~text~", "x").is_err());
        assert!(parse_str("@99999999999 = ~overflow~", "x").is_err());
    }

    #[test]
    fn test_unterminated_record() {
        let err = parse_str("@1 = ~fine~\n\n@2 = ~never closed\nstill open", "x").unwrap_err();
        assert!(matches!(err, TraError::UnterminatedRecord { line: 3, .. }));
    }

    #[test]
    fn test_ascending_order() {
        let parsed = parse("@20 = ~b~\n@3 = ~a~\n@11 = ~c~");
        let ids: Vec<u32> = parsed.records.keys().copied().collect();
        assert_eq!(ids, vec![3, 11, 20]);
    }
}
