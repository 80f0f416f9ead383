use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::ValueEnum;
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use vocab_format::{
    AlternatingPairs, LoadMode, Parsed, SourceAdapter, Tabular, TabularColumns, VocabularyFormat,
    collect_leading_orphans, load_text, parse_vocabulary, read_document, write_document,
};
use vocab_merge::{merge, reassign};
use vocab_types::{Document, MarkerSet};

use crate::clean::{NormalizeOptions, TokenizeMethod, normalize, tokenize};
use crate::report::{CleanReport, FixReport, InputSummary, MergeReport, Report};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read {}: {cause:#}", .path.display())]
    Read { path: PathBuf, cause: anyhow::Error },
    #[error("failed to write {}: {cause:#}", .path.display())]
    Write { path: PathBuf, cause: anyhow::Error },
    #[error("invalid input {0:?}: expected [vocab:|quizlet:|pairs:]<path>")]
    InvalidInput(String),
}

/// How the files of one run are read.
#[derive(Clone, Debug)]
pub struct ReadSettings {
    pub markers: MarkerSet,
    pub columns: TabularColumns,
    pub load_mode: LoadMode,
}

impl Default for ReadSettings {
    fn default() -> Self {
        Self {
            markers: MarkerSet::extended(),
            columns: TabularColumns::default(),
            load_mode: LoadMode::Owned,
        }
    }
}

/// Input formats, named by their `<name>:<path>` input prefix everywhere.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum SourceFormat {
    /// Header, `source,target` lines, trailing context lines.
    #[serde(rename = "vocab")]
    Vocabulary,
    /// Flashcard export with alternating source/target lines.
    #[serde(rename = "quizlet")]
    Alternating,
    /// CSV with named source/target columns.
    #[serde(rename = "pairs")]
    Tabular,
}

impl SourceFormat {
    pub fn name(self) -> &'static str {
        match self {
            SourceFormat::Vocabulary => "vocab",
            SourceFormat::Alternating => "quizlet",
            SourceFormat::Tabular => "pairs",
        }
    }

    fn adapter(self, settings: &ReadSettings) -> Box<dyn SourceAdapter> {
        match self {
            SourceFormat::Vocabulary => Box::new(VocabularyFormat::new(settings.markers.clone())),
            SourceFormat::Alternating => Box::new(AlternatingPairs),
            SourceFormat::Tabular => Box::new(Tabular::new(settings.columns.clone())),
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An input path and the format to read it with.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InputSpec {
    pub format: SourceFormat,
    pub path: PathBuf,
}

impl InputSpec {
    pub fn new(format: SourceFormat, path: impl Into<PathBuf>) -> Self {
        Self {
            format,
            path: path.into(),
        }
    }
}

impl FromStr for InputSpec {
    type Err = PipelineError;

    /// `quizlet:<path>`, `pairs:<path>`, `vocab:<path>`, or a bare vocabulary path.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (format, path) = if let Some(path) = raw.strip_prefix("quizlet:") {
            (SourceFormat::Alternating, path)
        } else if let Some(path) = raw.strip_prefix("pairs:") {
            (SourceFormat::Tabular, path)
        } else if let Some(path) = raw.strip_prefix("vocab:") {
            (SourceFormat::Vocabulary, path)
        } else {
            (SourceFormat::Vocabulary, raw)
        };
        if path.trim().is_empty() {
            return Err(PipelineError::InvalidInput(raw.to_string()));
        }
        Ok(Self::new(format, path))
    }
}

/// Which orphaned context lines a repair pass reassigns.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OrphanScope {
    /// The run of context lines directly below the header.
    #[default]
    Leading,
    /// Every context line the parser could not attach.
    All,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CleanOp {
    Normalize(NormalizeOptions),
    Tokenize(TokenizeMethod),
}

pub fn read_input(spec: &InputSpec, settings: &ReadSettings) -> Result<Parsed, PipelineError> {
    let adapter = spec.format.adapter(settings);
    read_document(&spec.path, &*adapter, settings.load_mode).map_err(|cause| {
        PipelineError::Read {
            path: spec.path.clone(),
            cause,
        }
    })
}

/// Read every input, merge them in order, and write the result.
pub fn run_merge(
    inputs: &[InputSpec],
    output: &Path,
    settings: &ReadSettings,
) -> Result<Report, PipelineError> {
    let mut summaries = Vec::with_capacity(inputs.len());
    let mut documents = Vec::with_capacity(inputs.len());
    for spec in inputs {
        let parsed = read_input(spec, settings)?;
        summaries.push(summarize(spec, &parsed));
        documents.push(parsed.document);
    }

    let merged = merge(documents);
    write(output, &merged.document)?;

    Ok(Report::Merge(MergeReport {
        inputs: summaries,
        output: output.to_path_buf(),
        stats: merged.stats,
    }))
}

/// Reattach orphaned context lines in `primary` using `reference`.
pub fn run_fix(
    primary: &Path,
    reference: &Path,
    output: &Path,
    scope: OrphanScope,
    settings: &ReadSettings,
) -> Result<Report, PipelineError> {
    let primary_spec = InputSpec::new(SourceFormat::Vocabulary, primary);
    let text = load_text(primary, settings.load_mode).map_err(|cause| PipelineError::Read {
        path: primary.to_path_buf(),
        cause,
    })?;
    let parsed = parse_vocabulary(&text, &settings.markers);
    let reference_spec = InputSpec::new(SourceFormat::Vocabulary, reference);
    let reference_parsed = read_input(&reference_spec, settings)?;

    let orphans: Vec<String> = match scope {
        OrphanScope::Leading => collect_leading_orphans(&text, &settings.markers),
        OrphanScope::All => parsed
            .diagnostics
            .orphaned_context
            .iter()
            .map(|o| o.text.clone())
            .collect(),
    };
    info!(
        "found {} orphaned context lines ({:?}) in {}",
        orphans.len(),
        scope,
        primary.display()
    );

    let primary_summary = summarize(&primary_spec, &parsed);
    let reference_summary = summarize(&reference_spec, &reference_parsed);
    let fixed = reassign(
        parsed.document.entries,
        &reference_parsed.document.entries,
        &orphans,
    );
    let document = Document::new(parsed.document.header, fixed.entries);
    write(output, &document)?;

    Ok(Report::Fix(FixReport {
        primary: primary_summary,
        reference: reference_summary,
        output: output.to_path_buf(),
        orphan_scope: scope,
        entries: document.entries.len(),
        stats: fixed.stats,
    }))
}

/// Normalize or tokenize the terms of a vocabulary file.
pub fn run_clean(
    input: &Path,
    output: &Path,
    op: CleanOp,
    settings: &ReadSettings,
) -> Result<Report, PipelineError> {
    let spec = InputSpec::new(SourceFormat::Vocabulary, input);
    let parsed = read_input(&spec, settings)?;
    let summary = summarize(&spec, &parsed);
    let before = parsed.document.clone();

    let (operation, cleaned) = match op {
        CleanOp::Normalize(options) => ("Normalize", normalize(parsed.document, options)),
        CleanOp::Tokenize(method) => ("Tokenize", tokenize(parsed.document, method)),
    };
    let changed = before
        .entries
        .iter()
        .zip(&cleaned.entries)
        .filter(|(a, b)| a.source_term != b.source_term || a.target_term != b.target_term)
        .count();
    write(output, &cleaned)?;

    Ok(Report::Clean(CleanReport {
        operation: operation.to_string(),
        input: summary,
        output: output.to_path_buf(),
        changed,
    }))
}

fn summarize(spec: &InputSpec, parsed: &Parsed) -> InputSummary {
    InputSummary {
        path: spec.path.clone(),
        format: spec.format,
        entries: parsed.document.entries.len(),
        diagnostics: parsed.diagnostics.clone(),
    }
}

fn write(path: &Path, document: &Document) -> Result<(), PipelineError> {
    write_document(path, document).map_err(|cause| PipelineError::Write {
        path: path.to_path_buf(),
        cause,
    })?;
    info!("wrote {} entries to {}", document.entries.len(), path.display());
    Ok(())
}
