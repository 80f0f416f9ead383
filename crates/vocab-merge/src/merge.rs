use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info};
use vocab_types::{Document, Entry, is_all_uppercase};

/// What a merge collapsed.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct MergeStats {
    pub documents: usize,
    pub input_entries: usize,
    pub output_entries: usize,
    /// Keys that had more than one entry.
    pub duplicate_groups: usize,
    pub duplicates_removed: usize,
    /// Duplicate groups whose base was picked for being upper-case.
    pub uppercase_bases: usize,
}

/// Merged document plus counts.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Merged {
    pub document: Document,
    pub stats: MergeStats,
}

/// Merge documents in call order into one sorted, deduplicated document.
///
/// The first document's header is kept; an empty input yields an empty
/// header and no entries.
pub fn merge<I>(documents: I) -> Merged
where
    I: IntoIterator<Item = Document>,
{
    let mut stats = MergeStats::default();
    let mut header: Option<String> = None;
    // Insertion order within a group decides the base entry.
    let mut groups: IndexMap<String, Vec<Entry>> = IndexMap::new();

    for doc in documents {
        stats.documents += 1;
        header.get_or_insert(doc.header);
        for entry in doc.entries {
            stats.input_entries += 1;
            groups.entry(entry.key()).or_default().push(entry);
        }
    }

    let mut resolved: Vec<(String, Entry)> = Vec::with_capacity(groups.len());
    for (key, group) in groups {
        if group.len() > 1 {
            stats.duplicate_groups += 1;
            debug!("collapsing {} entries for key {:?}", group.len(), key);
        }
        let (entry, uppercase_base) = resolve_group(group);
        if uppercase_base {
            stats.uppercase_bases += 1;
        }
        resolved.push((key, entry));
    }
    resolved.sort_by(|a, b| a.0.cmp(&b.0));

    let entries: Vec<Entry> = resolved.into_iter().map(|(_, entry)| entry).collect();
    stats.output_entries = entries.len();
    stats.duplicates_removed = stats.input_entries - stats.output_entries;
    info!(
        "merged {} entries from {} documents into {} ({} duplicates removed)",
        stats.input_entries, stats.documents, stats.output_entries, stats.duplicates_removed
    );

    Merged {
        document: Document {
            header: header.unwrap_or_default(),
            entries,
        },
        stats,
    }
}

/// Merge `addition` into `original`; the original's header wins.
pub fn merge_pair(original: Document, addition: Document) -> Merged {
    merge([original, addition])
}

/// Collapse one key's entries. Returns the entry and whether the upper-case
/// rule chose its base.
fn resolve_group(mut group: Vec<Entry>) -> (Entry, bool) {
    if group.len() == 1 {
        return (group.remove(0), false);
    }

    let uppercase = group.iter().position(|e| is_all_uppercase(&e.source_term));
    let base = &group[uppercase.unwrap_or(0)];

    let mut seen: HashSet<String> = HashSet::new();
    let mut context = Vec::new();
    for line in group.iter().flat_map(|e| e.context.iter()) {
        if seen.insert(line.to_lowercase()) {
            context.push(line.clone());
        }
    }

    let merged = Entry {
        source_term: base.source_term.clone(),
        target_term: base.target_term.clone(),
        context,
    };
    (merged, uppercase.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(entries: Vec<Entry>) -> Document {
        Document::new("English,Lummi", entries)
    }

    #[test]
    fn prefers_uppercase_regardless_of_order() {
        let lower = Entry::new("dog", "lum1");
        let upper = Entry::new("DOG", "lum2").with_context(["_ex1"]);
        for entries in [
            vec![lower.clone(), upper.clone()],
            vec![upper.clone(), lower.clone()],
        ] {
            let merged = merge([doc(entries)]);
            assert_eq!(merged.document.entries.len(), 1);
            let dog = &merged.document.entries[0];
            assert_eq!(dog.source_term, "DOG");
            assert_eq!(dog.target_term, "lum2");
            assert_eq!(dog.context, vec!["_ex1"]);
            assert_eq!(merged.stats.uppercase_bases, 1);
        }
    }

    #[test]
    fn keeps_context_of_discarded_entries() {
        let merged = merge([doc(vec![
            Entry::new("cat", "lum1").with_context(["_a"]),
            Entry::new("CAT", "lum2"),
        ])]);
        assert_eq!(
            merged.document.entries,
            vec![Entry::new("CAT", "lum2").with_context(["_a"])]
        );
    }

    #[test]
    fn first_entry_wins_without_uppercase() {
        let merged = merge([
            doc(vec![Entry::new("Bird", "lumA")]),
            doc(vec![Entry::new("bird", "lumB").with_context(["_x"])]),
        ]);
        assert_eq!(
            merged.document.entries,
            vec![Entry::new("Bird", "lumA").with_context(["_x"])]
        );
        assert_eq!(merged.stats.uppercase_bases, 0);
        assert_eq!(merged.stats.duplicate_groups, 1);
    }

    #[test]
    fn first_uppercase_entry_wins_among_several() {
        let merged = merge([doc(vec![
            Entry::new("Fish", "a"),
            Entry::new("FISH", "b"),
            Entry::new("FISH", "c"),
        ])]);
        assert_eq!(merged.document.entries[0].target_term, "b");
    }

    #[test]
    fn symbols_only_terms_are_not_uppercase() {
        let merged = merge([doc(vec![Entry::new("1-2", "first"), Entry::new("1-2", "second")])]);
        assert_eq!(merged.document.entries[0].target_term, "first");
        assert_eq!(merged.stats.uppercase_bases, 0);
    }

    #[test]
    fn sorts_by_lowercased_key() {
        let merged = merge([doc(vec![
            Entry::new("zebra", "z"),
            Entry::new("apple", "a"),
            Entry::new("Mango", "m"),
        ])]);
        let sources: Vec<&str> = merged
            .document
            .entries
            .iter()
            .map(|e| e.source_term.as_str())
            .collect();
        assert_eq!(sources, vec!["apple", "Mango", "zebra"]);
    }

    #[test]
    fn dedups_context_case_insensitively_in_order() {
        let merged = merge([doc(vec![
            Entry::new("sun", "a").with_context(["_Bright", "_hot"]),
            Entry::new("Sun", "b").with_context(["_bright", "(star)", "_HOT"]),
        ])]);
        assert_eq!(
            merged.document.entries[0].context,
            vec!["_Bright", "_hot", "(star)"]
        );
    }

    #[test]
    fn singleton_groups_pass_through_unchanged() {
        let entry = Entry::new("moon", "x").with_context(["_a", "_A"]);
        let merged = merge([doc(vec![entry.clone()])]);
        assert_eq!(merged.document.entries, vec![entry]);
        assert_eq!(merged.stats.duplicate_groups, 0);
    }

    #[test]
    fn keeps_first_header_and_counts() {
        let merged = merge_pair(
            Document::new("English,Lummi", vec![Entry::new("a", "1"), Entry::new("b", "2")]),
            Document::new("ignored", vec![Entry::new("A", "3"), Entry::new("c", "4")]),
        );
        assert_eq!(merged.document.header, "English,Lummi");
        assert_eq!(
            merged.stats,
            MergeStats {
                documents: 2,
                input_entries: 4,
                output_entries: 3,
                duplicate_groups: 1,
                duplicates_removed: 1,
                uppercase_bases: 1,
            }
        );
    }

    #[test]
    fn empty_input_is_empty_document() {
        let merged = merge(Vec::<Document>::new());
        assert_eq!(merged.document, Document::default());
        assert_eq!(merged.stats.documents, 0);
    }

    #[test]
    fn header_only_documents_merge_cleanly() {
        let merged = merge([Document::new("h", Vec::new()), doc(vec![Entry::new("a", "1")])]);
        assert_eq!(merged.document.header, "h");
        assert_eq!(merged.document.entries.len(), 1);
    }

    #[test]
    fn merging_twice_changes_nothing() {
        let a = doc(vec![
            Entry::new("dog", "lum1").with_context(["_pet"]),
            Entry::new("Zebra", "z"),
            Entry::new("bird", "b1"),
        ]);
        let b = doc(vec![
            Entry::new("DOG", "lum2").with_context(["_PET", "_loyal"]),
            Entry::new("apple", "a"),
            Entry::new("Bird", "b2").with_context(["(small)"]),
        ]);
        let once = merge([a, b]);
        let twice = merge([once.document.clone()]);
        assert_eq!(twice.document, once.document);
        assert_eq!(twice.stats.duplicates_removed, 0);
        let self_merge = merge([once.document.clone(), once.document.clone()]);
        assert_eq!(self_merge.document, once.document);
    }
}
