//! Shared types for line-oriented bilingual vocabulary files.
//!
//! A vocabulary file is a header line followed by entry lines of the form
//! `source,target`, each optionally trailed by context lines that start with
//! a marker character (`_`, and in the extended set also `(` and `"`).
//!
//! Use [`MarkerSet`] and [`classify`] to decide what a line is, [`Entry`] and
//! [`Document`] to hold parsed records, and [`is_all_uppercase`] for the
//! headword preference applied when duplicates are merged.
//!
//! ```rust
//! use vocab_types::{Entry, LineKind, MarkerSet, classify};
//!
//! let markers = MarkerSet::extended();
//! assert_eq!(classify("dog,sqʷəméy̓", &markers), LineKind::MainEntry);
//! assert_eq!(classify("(a pet, a dog)", &markers), LineKind::Context);
//! assert_eq!(classify("(a pet, a dog)", &MarkerSet::legacy()), LineKind::MainEntry);
//!
//! let entry = Entry::new("Dog", "sqʷəméy̓");
//! assert_eq!(entry.key(), "dog");
//! ```

use std::fmt;
use std::str::FromStr;

/// Header used when a document has no lines at all.
pub const DEFAULT_HEADER: &str = "English,Lummi";

/// One vocabulary record: a source term, its gloss, and attached context lines.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Entry {
    pub source_term: String,
    pub target_term: String,
    pub context: Vec<String>,
}

impl Entry {
    pub fn new(source_term: impl Into<String>, target_term: impl Into<String>) -> Self {
        Self {
            source_term: source_term.into(),
            target_term: target_term.into(),
            context: Vec::new(),
        }
    }

    pub fn with_context<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.context.extend(lines.into_iter().map(Into::into));
        self
    }

    /// Grouping and sort key: the lowercased source term.
    pub fn key(&self) -> String {
        self.source_term.to_lowercase()
    }
}

/// A header line carried verbatim plus ordered entries.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Document {
    pub header: String,
    pub entries: Vec<Entry>,
}

impl Document {
    pub fn new(header: impl Into<String>, entries: Vec<Entry>) -> Self {
        Self {
            header: header.into(),
            entries,
        }
    }

    /// Total number of context lines across all entries.
    pub fn context_count(&self) -> usize {
        self.entries.iter().map(|e| e.context.len()).sum()
    }
}

/// Leading characters that mark a line as context for the preceding entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MarkerSet {
    markers: Vec<char>,
}

impl MarkerSet {
    /// Build a marker set from arbitrary characters; duplicates are ignored.
    pub fn new(markers: impl IntoIterator<Item = char>) -> Self {
        let mut out = Vec::new();
        for c in markers {
            if !out.contains(&c) {
                out.push(c);
            }
        }
        Self { markers: out }
    }

    /// Only `_` marks context.
    pub fn legacy() -> Self {
        Self::new(['_'])
    }

    /// `_`, `(` and `"` mark context.
    pub fn extended() -> Self {
        Self::new(['_', '(', '"'])
    }

    pub fn chars(&self) -> &[char] {
        &self.markers
    }

    /// True when the (already trimmed) line starts with one of the markers.
    pub fn is_context(&self, line: &str) -> bool {
        line.chars()
            .next()
            .is_some_and(|first| self.markers.contains(&first))
    }
}

impl Default for MarkerSet {
    fn default() -> Self {
        Self::extended()
    }
}

impl fmt::Display for MarkerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::legacy() {
            return f.write_str("legacy");
        }
        if *self == Self::extended() {
            return f.write_str("extended");
        }
        for c in &self.markers {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// Error returned when a marker specification is empty.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmptyMarkerSet;

impl fmt::Display for EmptyMarkerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("marker set must contain at least one character")
    }
}

impl std::error::Error for EmptyMarkerSet {}

impl FromStr for MarkerSet {
    type Err = EmptyMarkerSet;

    /// Accepts `legacy`, `extended`, or a literal list of marker characters.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "legacy" => Ok(Self::legacy()),
            "extended" => Ok(Self::extended()),
            "" => Err(EmptyMarkerSet),
            chars => Ok(Self::new(chars.chars().filter(|c| !c.is_whitespace()))),
        }
    }
}

/// What a single trimmed line is.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum LineKind {
    Blank,
    /// Starts with a configured marker.
    Context,
    /// Contains a comma and is not context.
    MainEntry,
    /// Looks like an entry but has no comma; skipped by readers.
    Malformed,
}

/// Classify a line against a marker set. Surrounding whitespace is ignored.
pub fn classify(line: &str, markers: &MarkerSet) -> LineKind {
    let line = line.trim();
    if line.is_empty() {
        LineKind::Blank
    } else if markers.is_context(line) {
        LineKind::Context
    } else if line.contains(',') {
        LineKind::MainEntry
    } else {
        LineKind::Malformed
    }
}

/// Split an entry line on its first comma into trimmed `(source, target)`.
///
/// The target keeps any later commas.
pub fn split_entry_line(line: &str) -> Option<(&str, &str)> {
    line.split_once(',')
        .map(|(source, target)| (source.trim(), target.trim()))
}

/// True when `text` has at least one cased letter and no lowercase letters.
pub fn is_all_uppercase(text: &str) -> bool {
    let mut saw_upper = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            saw_upper = true;
        }
    }
    saw_upper
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_lines_by_marker_set() {
        let legacy = MarkerSet::legacy();
        let extended = MarkerSet::extended();
        assert_eq!(classify("   ", &legacy), LineKind::Blank);
        assert_eq!(classify("_example", &legacy), LineKind::Context);
        assert_eq!(classify("\"quoted, line\"", &legacy), LineKind::MainEntry);
        assert_eq!(classify("\"quoted, line\"", &extended), LineKind::Context);
        assert_eq!(classify("(note)", &extended), LineKind::Context);
        assert_eq!(classify("no comma here", &extended), LineKind::Malformed);
        assert_eq!(classify("  dog , lum ", &extended), LineKind::MainEntry);
    }

    #[test]
    fn splits_on_first_comma_only() {
        assert_eq!(
            split_entry_line("go, to run, quickly"),
            Some(("go", "to run, quickly"))
        );
        assert_eq!(split_entry_line("dog,"), Some(("dog", "")));
        assert_eq!(split_entry_line("dog"), None);
    }

    #[test]
    fn uppercase_requires_a_cased_letter() {
        assert!(is_all_uppercase("DOG"));
        assert!(is_all_uppercase("DOG (N.)"));
        assert!(is_all_uppercase("ÉCOLE"));
        assert!(!is_all_uppercase("Dog"));
        assert!(!is_all_uppercase("123-!"));
        assert!(!is_all_uppercase(""));
    }

    #[test]
    fn parses_marker_specs() {
        assert_eq!("legacy".parse::<MarkerSet>(), Ok(MarkerSet::legacy()));
        assert_eq!("extended".parse::<MarkerSet>(), Ok(MarkerSet::extended()));
        let custom: MarkerSet = "_#_".parse().unwrap();
        assert_eq!(custom.chars(), &['_', '#']);
        assert_eq!(custom.to_string(), "_#");
        assert_eq!("".parse::<MarkerSet>(), Err(EmptyMarkerSet));
    }

    #[test]
    fn key_is_lowercased_source() {
        let entry = Entry::new("MANGO", "lum").with_context(["_ex"]);
        assert_eq!(entry.key(), "mango");
        assert_eq!(entry.context, vec!["_ex".to_string()]);
    }
}
