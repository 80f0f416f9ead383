use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use vocab_format::{LoadMode, VocabularyFormat, read_document};
use vocab_types::{MarkerSet, is_all_uppercase};

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let path = args
        .next()
        .map(PathBuf::from)
        .context("usage: cargo run -p vocab-format --example stats -- <vocab-file> [markers]")?;
    let markers: MarkerSet = match args.next() {
        Some(spec) => spec.parse()?,
        None => MarkerSet::extended(),
    };

    let parsed = read_document(&path, &VocabularyFormat::new(markers.clone()), LoadMode::Mmap)
        .with_context(|| format!("reading {}", path.display()))?;
    let doc = &parsed.document;
    let diag = &parsed.diagnostics;

    let uppercase = doc
        .entries
        .iter()
        .filter(|e| is_all_uppercase(&e.source_term))
        .count();
    let empty_targets = doc.entries.iter().filter(|e| e.target_term.is_empty()).count();
    let with_context = doc.entries.iter().filter(|e| !e.context.is_empty()).count();

    println!("File         : {}", path.display());
    println!("Markers      : {}", markers);
    println!("Header       : {}", doc.header);
    println!("Lines        : {}", diag.lines_read);
    println!("Entries      : {}", doc.entries.len());
    println!("Upper-case headwords: {}", uppercase);
    println!("Empty targets: {}", empty_targets);
    println!("Entries with context: {}", with_context);
    println!("Context lines: {}", doc.context_count());
    println!("Blank lines  : {}", diag.blank_lines);
    println!("Malformed    : {}", diag.malformed_lines);
    println!("Orphaned context: {}", diag.orphaned_context.len());
    for orphan in diag.orphaned_context.iter().take(5) {
        println!("  line {}: {}", orphan.line_number, orphan.text);
    }

    Ok(())
}
