//! Read and write line-oriented bilingual vocabulary files.
//!
//! The canonical format is a header line followed by `source,target` entry
//! lines, each trailed by zero or more context lines that begin with a marker
//! character. Other corpora (flashcard exports with alternating lines, tabular
//! CSV with named columns) are read through [`SourceAdapter`]s that produce the
//! same [`Document`] shape, so every source can feed the same merge.
//!
//! Nothing in this crate rejects a malformed record. Lines without a comma,
//! context lines with no owning entry, and adapter rows missing a field are
//! skipped and counted in [`ParseDiagnostics`]. Only I/O, UTF-8 decoding, and
//! CSV structure errors are returned as errors.
//!
//! # Example
//! ```no_run
//! use vocab_format::{LoadMode, VocabularyFormat, read_document, serialize};
//! use vocab_types::MarkerSet;
//!
//! # fn main() -> anyhow::Result<()> {
//! let adapter = VocabularyFormat::new(MarkerSet::extended());
//! let parsed = read_document("raw_data/Lummi_vocab.csv", &adapter, LoadMode::Owned)?;
//! println!(
//!     "{} entries, {} malformed lines",
//!     parsed.document.entries.len(),
//!     parsed.diagnostics.malformed_lines
//! );
//! let text = serialize(&parsed.document.header, &parsed.document.entries);
//! # let _ = text;
//! # Ok(()) }
//! ```
//!
//! For a runnable demo, see `cargo run -p vocab-format --example stats -- <file>`.

mod adapters;
mod parser;
mod writer;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use memmap2::Mmap;
use serde::Serialize;
use tracing::{info, warn};
use vocab_types::Document;

pub use adapters::{AlternatingPairs, SourceAdapter, Tabular, TabularColumns, VocabularyFormat};
pub use parser::{collect_leading_orphans, parse_vocabulary};
pub use writer::{serialize, write_document};

/// Strategy for loading input files.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map the file before decoding.
    Mmap,
    /// Read the file into an owned buffer.
    Owned,
}

enum Buffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Buffer {
    fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Mmap(m) => m.as_ref(),
            Buffer::Owned(v) => v.as_slice(),
        }
    }
}

/// A context line that had no entry to attach to.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct OrphanLine {
    /// 1-based line number in the source text.
    pub line_number: usize,
    pub text: String,
}

/// Counts of everything a reader skipped or could not attach.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ParseDiagnostics {
    pub lines_read: usize,
    pub blank_lines: usize,
    /// Entry-looking lines without a comma.
    pub malformed_lines: usize,
    pub orphaned_context: Vec<OrphanLine>,
    /// Adapter rows or pairs with an empty source or target.
    pub dropped_rows: usize,
    /// Alternating input had an odd number of lines.
    pub unpaired_trailing_line: bool,
}

impl ParseDiagnostics {
    /// Records that never made it into the document.
    pub fn skipped(&self) -> usize {
        self.malformed_lines
            + self.orphaned_context.len()
            + self.dropped_rows
            + usize::from(self.unpaired_trailing_line)
    }
}

/// A document plus what was skipped while reading it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Parsed {
    pub document: Document,
    pub diagnostics: ParseDiagnostics,
}

/// Read a file fully and decode it as UTF-8.
pub fn load_text(path: impl AsRef<Path>, mode: LoadMode) -> Result<String> {
    let path = path.as_ref();
    let buffer = load_file(path, mode)?;
    let text = std::str::from_utf8(buffer.as_slice())
        .with_context(|| format!("decode utf-8 {}", path.display()))?;
    Ok(text.to_owned())
}

/// Load a file and hand its text to `adapter`.
pub fn read_document(
    path: impl AsRef<Path>,
    adapter: &dyn SourceAdapter,
    mode: LoadMode,
) -> Result<Parsed> {
    let path = path.as_ref();
    let text = load_text(path, mode)?;
    let parsed = adapter
        .parse(&text)
        .with_context(|| format!("parse {} as {}", path.display(), adapter.name()))?;
    info!(
        "read {} entries from {} ({})",
        parsed.document.entries.len(),
        path.display(),
        adapter.name()
    );
    if parsed.diagnostics.skipped() > 0 {
        warn!(
            "{}: skipped {} malformed lines, {} orphaned context lines, {} incomplete rows",
            path.display(),
            parsed.diagnostics.malformed_lines,
            parsed.diagnostics.orphaned_context.len(),
            parsed.diagnostics.dropped_rows
                + usize::from(parsed.diagnostics.unpaired_trailing_line)
        );
    }
    Ok(parsed)
}

fn load_file(path: &Path, mode: LoadMode) -> Result<Buffer> {
    match mode {
        LoadMode::Mmap => {
            let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            // Zero-length files cannot be mapped on every platform.
            let len = file
                .metadata()
                .with_context(|| format!("stat {}", path.display()))?
                .len();
            if len == 0 {
                return Ok(Buffer::Owned(Vec::new()));
            }
            unsafe { Mmap::map(&file) }
                .map(Buffer::Mmap)
                .with_context(|| format!("mmap {}", path.display()))
        }
        LoadMode::Owned => {
            let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)
                .with_context(|| format!("read {}", path.display()))?;
            Ok(Buffer::Owned(buf))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_with(contents: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents).unwrap();
        file
    }

    #[test]
    fn loads_text_with_both_modes() {
        let file = temp_with("English,Lummi\ndog,sqʷəméy̓\n".as_bytes());
        let owned = load_text(file.path(), LoadMode::Owned).unwrap();
        let mapped = load_text(file.path(), LoadMode::Mmap).unwrap();
        assert_eq!(owned, mapped);
        assert!(owned.starts_with("English,Lummi"));
    }

    #[test]
    fn empty_file_maps_to_empty_text() {
        let file = temp_with(b"");
        assert_eq!(load_text(file.path(), LoadMode::Mmap).unwrap(), "");
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        let file = temp_with(&[0xff, 0xfe, b'a']);
        let err = load_text(file.path(), LoadMode::Owned).unwrap_err();
        assert!(err.to_string().contains("decode utf-8"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_text(dir.path().join("absent.csv"), LoadMode::Owned).unwrap_err();
        assert!(err.to_string().starts_with("open "));
    }
}
