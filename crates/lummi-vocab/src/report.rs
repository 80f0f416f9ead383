use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::Serialize;
use vocab_format::ParseDiagnostics;
use vocab_merge::{MergeStats, ReassignStats};

use crate::pipeline::{OrphanScope, SourceFormat};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// One input file as it was read.
#[derive(Clone, Debug, Serialize)]
pub struct InputSummary {
    pub path: PathBuf,
    pub format: SourceFormat,
    pub entries: usize,
    pub diagnostics: ParseDiagnostics,
}

#[derive(Clone, Debug, Serialize)]
pub struct MergeReport {
    pub inputs: Vec<InputSummary>,
    pub output: PathBuf,
    pub stats: MergeStats,
}

#[derive(Clone, Debug, Serialize)]
pub struct FixReport {
    pub primary: InputSummary,
    pub reference: InputSummary,
    pub output: PathBuf,
    pub orphan_scope: OrphanScope,
    pub entries: usize,
    pub stats: ReassignStats,
}

#[derive(Clone, Debug, Serialize)]
pub struct CleanReport {
    pub operation: String,
    pub input: InputSummary,
    pub output: PathBuf,
    /// Entries whose source or target text changed.
    pub changed: usize,
}

/// Summary of one command run.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Report {
    Merge(MergeReport),
    Fix(FixReport),
    Clean(CleanReport),
}

pub fn render(report: &Report, format: ReportFormat) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(report.to_string()),
        ReportFormat::Json => serde_json::to_string_pretty(report),
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Merge(r) => {
                writeln!(f, "Merge complete!")?;
                for input in &r.inputs {
                    writeln!(
                        f,
                        "{} entries ({}): {}",
                        input.format,
                        input.path.display(),
                        input.entries
                    )?;
                }
                writeln!(
                    f,
                    "Total entries before deduplication: {}",
                    r.stats.input_entries
                )?;
                writeln!(
                    f,
                    "Total entries after deduplication: {}",
                    r.stats.output_entries
                )?;
                writeln!(f, "Duplicates removed: {}", r.stats.duplicates_removed)?;
                write!(f, "Written to {}", r.output.display())
            }
            Report::Fix(r) => {
                writeln!(f, "Fix complete!")?;
                writeln!(f, "Entries processed: {}", r.primary.entries)?;
                writeln!(f, "Reference entries: {}", r.reference.entries)?;
                writeln!(f, "Orphaned contexts processed: {}", r.stats.orphans)?;
                writeln!(
                    f,
                    "Reassigned: {} exact, {} by prefix, {} dropped",
                    r.stats.exact_matches, r.stats.prefix_matches, r.stats.dropped
                )?;
                write!(f, "Written to {}", r.output.display())
            }
            Report::Clean(r) => {
                writeln!(f, "{} complete!", r.operation)?;
                writeln!(f, "Entries processed: {}", r.input.entries)?;
                writeln!(f, "Entries changed: {}", r.changed)?;
                write!(f, "Written to {}", r.output.display())
            }
        }
    }
}
