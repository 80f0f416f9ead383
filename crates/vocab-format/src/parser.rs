use tracing::debug;
use vocab_types::{DEFAULT_HEADER, Document, Entry, LineKind, MarkerSet, classify, split_entry_line};

use crate::{OrphanLine, ParseDiagnostics, Parsed};

/// Parse a vocabulary document: header line, entry lines, trailing context.
///
/// Context capture after an entry only takes strictly consecutive context
/// lines; a blank or any other line ends it. Context lines seen outside such a
/// run are recorded as orphans rather than attached.
pub fn parse_vocabulary(text: &str, markers: &MarkerSet) -> Parsed {
    let lines: Vec<&str> = text.lines().collect();
    let header = lines
        .first()
        .map(|h| h.trim().to_string())
        .unwrap_or_else(|| DEFAULT_HEADER.to_string());

    let mut diagnostics = ParseDiagnostics {
        lines_read: lines.len(),
        ..ParseDiagnostics::default()
    };
    let mut entries = Vec::new();

    let mut i = 1;
    while i < lines.len() {
        let line = lines[i].trim();
        match classify(line, markers) {
            LineKind::Blank => {
                diagnostics.blank_lines += 1;
                i += 1;
            }
            LineKind::Context => {
                debug!("line {}: orphaned context line", i + 1);
                diagnostics.orphaned_context.push(OrphanLine {
                    line_number: i + 1,
                    text: line.to_string(),
                });
                i += 1;
            }
            LineKind::Malformed => {
                debug!("line {}: entry line without a comma", i + 1);
                diagnostics.malformed_lines += 1;
                i += 1;
            }
            LineKind::MainEntry => {
                let Some((source, target)) = split_entry_line(line) else {
                    diagnostics.malformed_lines += 1;
                    i += 1;
                    continue;
                };
                let mut entry = Entry::new(source, target);
                let mut j = i + 1;
                while j < lines.len() {
                    let next = lines[j].trim();
                    if !markers.is_context(next) {
                        break;
                    }
                    entry.context.push(next.to_string());
                    j += 1;
                }
                entries.push(entry);
                i = j;
            }
        }
    }

    Parsed {
        document: Document { header, entries },
        diagnostics,
    }
}

/// Context lines directly after the header, before the first other line.
///
/// These are the lines a repair pass reassigns; any blank or entry line ends
/// the run.
pub fn collect_leading_orphans(text: &str, markers: &MarkerSet) -> Vec<String> {
    text.lines()
        .skip(1)
        .map(str::trim)
        .take_while(|line| markers.is_context(line))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Parsed {
        parse_vocabulary(text, &MarkerSet::extended())
    }

    #[test]
    fn attaches_consecutive_context_lines() {
        let parsed = parse("English,Lummi\ndog,sqʷəméy̓\n_a pet dog\n(domestic)\ncat,pus\n");
        let entries = &parsed.document.entries;
        assert_eq!(parsed.document.header, "English,Lummi");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].context, vec!["_a pet dog", "(domestic)"]);
        assert!(entries[1].context.is_empty());
        assert_eq!(parsed.diagnostics.skipped(), 0);
    }

    #[test]
    fn blank_line_ends_context_capture() {
        let parsed = parse("h\ndog,lum\n_first\n\n_second\ncat,pus\n");
        let entries = &parsed.document.entries;
        assert_eq!(entries[0].context, vec!["_first"]);
        assert_eq!(parsed.diagnostics.blank_lines, 1);
        assert_eq!(
            parsed.diagnostics.orphaned_context,
            vec![OrphanLine {
                line_number: 5,
                text: "_second".into()
            }]
        );
        assert!(entries[1].context.is_empty());
    }

    #[test]
    fn splits_on_first_comma_and_keeps_empty_targets() {
        let parsed = parse("h\ngo, to run, quickly\nempty,\n");
        let entries = &parsed.document.entries;
        assert_eq!(entries[0].source_term, "go");
        assert_eq!(entries[0].target_term, "to run, quickly");
        assert_eq!(entries[1].source_term, "empty");
        assert_eq!(entries[1].target_term, "");
    }

    #[test]
    fn skips_lines_without_commas_and_their_context() {
        let parsed = parse("h\nheading only\n_note\ndog,lum\n");
        assert_eq!(parsed.document.entries.len(), 1);
        assert_eq!(parsed.diagnostics.malformed_lines, 1);
        assert_eq!(parsed.diagnostics.orphaned_context.len(), 1);
    }

    #[test]
    fn legacy_markers_treat_parentheses_as_entries() {
        let text = "h\ndog,lum\n(pet, animal)\n";
        let legacy = parse_vocabulary(text, &MarkerSet::legacy());
        assert_eq!(legacy.document.entries.len(), 2);
        assert_eq!(legacy.document.entries[1].source_term, "(pet");
        let extended = parse(text);
        assert_eq!(extended.document.entries.len(), 1);
        assert_eq!(extended.document.entries[0].context, vec!["(pet, animal)"]);
    }

    #[test]
    fn empty_text_uses_default_header() {
        let parsed = parse("");
        assert_eq!(parsed.document.header, DEFAULT_HEADER);
        assert!(parsed.document.entries.is_empty());
    }

    #[test]
    fn header_only_document_is_valid() {
        let parsed = parse("English,Lummi\n");
        assert_eq!(parsed.document.header, "English,Lummi");
        assert!(parsed.document.entries.is_empty());
    }

    #[test]
    fn handles_crlf_line_endings() {
        let parsed = parse("h\r\ndog,lum\r\n_ex\r\n");
        assert_eq!(parsed.document.header, "h");
        assert_eq!(parsed.document.entries[0].target_term, "lum");
        assert_eq!(parsed.document.entries[0].context, vec!["_ex"]);
    }

    #[test]
    fn collects_only_the_leading_orphan_run() {
        let text = "h\n_one\n\"two\"\ndog,lum\n_three\n";
        let orphans = collect_leading_orphans(text, &MarkerSet::extended());
        assert_eq!(orphans, vec!["_one", "\"two\""]);
        assert!(collect_leading_orphans("h\n\n_late\n", &MarkerSet::extended()).is_empty());
    }
}
