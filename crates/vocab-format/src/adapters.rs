use anyhow::{Context, Result, anyhow};
use tracing::debug;
use vocab_types::{Document, Entry, MarkerSet};

use crate::{ParseDiagnostics, Parsed, parser::parse_vocabulary};

/// Anything that turns source text into an ordered entry sequence.
pub trait SourceAdapter {
    /// Short name used in logs and error context.
    fn name(&self) -> &'static str;

    fn parse(&self, text: &str) -> Result<Parsed>;
}

/// The canonical header + entry + context line format.
#[derive(Clone, Debug, Default)]
pub struct VocabularyFormat {
    pub markers: MarkerSet,
}

impl VocabularyFormat {
    pub fn new(markers: MarkerSet) -> Self {
        Self { markers }
    }
}

impl SourceAdapter for VocabularyFormat {
    fn name(&self) -> &'static str {
        "vocabulary"
    }

    fn parse(&self, text: &str) -> Result<Parsed> {
        Ok(parse_vocabulary(text, &self.markers))
    }
}

/// Flashcard exports: non-blank lines alternate source, target, source, ...
///
/// A trailing unpaired line is dropped. There is no header and no context.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlternatingPairs;

impl SourceAdapter for AlternatingPairs {
    fn name(&self) -> &'static str {
        "alternating pairs"
    }

    fn parse(&self, text: &str) -> Result<Parsed> {
        let all_lines: Vec<&str> = text.lines().collect();
        let lines: Vec<&str> = all_lines
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect();

        let mut diagnostics = ParseDiagnostics {
            lines_read: all_lines.len(),
            blank_lines: all_lines.len() - lines.len(),
            unpaired_trailing_line: lines.len() % 2 == 1,
            ..ParseDiagnostics::default()
        };

        let mut entries = Vec::with_capacity(lines.len() / 2);
        for pair in lines.chunks_exact(2) {
            let (source, target) = (pair[0], pair[1]);
            if source.is_empty() || target.is_empty() {
                diagnostics.dropped_rows += 1;
                continue;
            }
            entries.push(Entry::new(source, target));
        }
        if diagnostics.unpaired_trailing_line {
            debug!("dropping unpaired trailing line {:?}", lines[lines.len() - 1]);
        }

        Ok(Parsed {
            document: Document::new("", entries),
            diagnostics,
        })
    }
}

/// Column names looked up (case-sensitively) in a tabular header row.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TabularColumns {
    pub source: String,
    pub target: String,
}

impl Default for TabularColumns {
    fn default() -> Self {
        Self {
            source: "english".into(),
            target: "lummi".into(),
        }
    }
}

/// CSV with a header row naming the source and target columns.
#[derive(Clone, Debug, Default)]
pub struct Tabular {
    pub columns: TabularColumns,
}

impl Tabular {
    pub fn new(columns: TabularColumns) -> Self {
        Self { columns }
    }
}

impl SourceAdapter for Tabular {
    fn name(&self) -> &'static str {
        "tabular csv"
    }

    fn parse(&self, text: &str) -> Result<Parsed> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());
        let headers = reader.headers().context("read csv header")?.clone();
        let mut diagnostics = ParseDiagnostics {
            lines_read: text.lines().count(),
            ..ParseDiagnostics::default()
        };
        if headers.is_empty() {
            return Ok(Parsed {
                document: Document::default(),
                diagnostics,
            });
        }

        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| anyhow!("csv header has no `{name}` column"))
        };
        let source_idx = column(&self.columns.source)?;
        let target_idx = column(&self.columns.target)?;

        let mut entries = Vec::new();
        for record in reader.records() {
            let record = record.context("read csv record")?;
            let source = record.get(source_idx).unwrap_or("").trim();
            let target = record.get(target_idx).unwrap_or("").trim();
            if source.is_empty() || target.is_empty() {
                debug!(
                    "csv line {}: missing source or target",
                    record.position().map_or(0, |p| p.line())
                );
                diagnostics.dropped_rows += 1;
                continue;
            }
            entries.push(Entry::new(source, target));
        }

        Ok(Parsed {
            document: Document::new("", entries),
            diagnostics,
        })
    }
}
