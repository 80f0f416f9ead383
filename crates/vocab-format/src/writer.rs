use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use vocab_types::{Document, Entry};

/// Render a header and entries in the canonical line format.
///
/// Targets are written unquoted; commas inside them survive a round trip
/// only through [`parse_vocabulary`](crate::parse_vocabulary), which splits
/// on the first comma.
pub fn serialize(header: &str, entries: &[Entry]) -> String {
    let mut out = String::with_capacity(header.len() + 1 + entries.len() * 32);
    out.push_str(header);
    out.push('\n');
    for entry in entries {
        out.push_str(&entry.source_term);
        out.push(',');
        out.push_str(&entry.target_term);
        out.push('\n');
        for line in &entry.context {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

/// Write a document to `path`, replacing any existing file.
pub fn write_document(path: impl AsRef<Path>, document: &Document) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(path, serialize(&document.header, &document.entries))
        .with_context(|| format!("write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_vocabulary;
    use vocab_types::MarkerSet;

    #[test]
    fn writes_entries_with_context_below() {
        let entries = vec![
            Entry::new("cat", "pus").with_context(["_ex one", "(note)"]),
            Entry::new("go", "to run, quickly"),
        ];
        assert_eq!(
            serialize("English,Lummi", &entries),
            "English,Lummi\ncat,pus\n_ex one\n(note)\ngo,to run, quickly\n"
        );
    }

    #[test]
    fn canonical_text_round_trips() {
        let text = "English,Lummi\napple,lum1\n_an apple\n\"red one\"\ngo,to run, quickly\nmango,\nzebra,lum3\n";
        let parsed = parse_vocabulary(text, &MarkerSet::extended());
        assert_eq!(
            serialize(&parsed.document.header, &parsed.document.entries),
            text
        );
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("vocab.csv");
        let doc = Document::new("h", vec![Entry::new("a", "b")]);
        write_document(&path, &doc).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "h\na,b\n");
    }
}
