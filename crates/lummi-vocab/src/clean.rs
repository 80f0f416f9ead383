use clap::ValueEnum;
use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use vocab_types::{Document, Entry};

lazy_static! {
    // `\w` includes combining marks, so glottalized letters stay one token.
    static ref WORD_OR_PUNCT: Regex = Regex::new(r"\w+|[^\w\s]").unwrap();
}

/// Which normalization steps to apply to entry terms.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NormalizeOptions {
    pub lowercase: bool,
    pub nfc: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            lowercase: true,
            nfc: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum TokenizeMethod {
    /// Collapse whitespace runs to single spaces.
    #[default]
    Whitespace,
    /// Split word runs from punctuation, space-separated.
    Punct,
}

/// Trim, optionally lowercase and NFC-compose, then collapse whitespace.
pub fn normalize_text(text: &str, options: NormalizeOptions) -> String {
    let mut out = text.trim().to_string();
    if options.lowercase {
        out = out.to_lowercase();
    }
    if options.nfc {
        out = out.nfc().collect();
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn tokenize_text(text: &str, method: TokenizeMethod) -> String {
    match method {
        TokenizeMethod::Whitespace => text.split_whitespace().collect::<Vec<_>>().join(" "),
        TokenizeMethod::Punct => WORD_OR_PUNCT
            .find_iter(text)
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// Normalize both terms of every entry. Context lines and header are kept.
pub fn normalize(document: Document, options: NormalizeOptions) -> Document {
    map_terms(document, |t| normalize_text(t, options))
}

/// Tokenize both terms of every entry. Context lines and header are kept.
pub fn tokenize(document: Document, method: TokenizeMethod) -> Document {
    map_terms(document, |t| tokenize_text(t, method))
}

fn map_terms(document: Document, f: impl Fn(&str) -> String) -> Document {
    let entries = document
        .entries
        .into_iter()
        .map(|entry| Entry {
            source_term: f(&entry.source_term),
            target_term: f(&entry.target_term),
            context: entry.context,
        })
        .collect();
    Document {
        header: document.header,
        entries,
    }
}
