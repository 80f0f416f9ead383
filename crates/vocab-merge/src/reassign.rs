use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info, warn};
use vocab_types::Entry;

/// Where each orphaned line ended up.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ReassignStats {
    pub orphans: usize,
    pub exact_matches: usize,
    pub prefix_matches: usize,
    pub dropped: usize,
    /// Target entries lost because another entry had the same exact source term.
    pub collapsed_entries: usize,
}

/// Repaired entries plus counts.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Reassigned {
    pub entries: Vec<Entry>,
    pub stats: ReassignStats,
}

/// One reference association, lowercased once up front.
struct RefContext<'a> {
    lowered: String,
    /// Lowercased text before the first comma.
    lowered_head: String,
    owner: &'a str,
}

/// Attach orphaned context lines to target entries using a reference
/// document's context-to-entry associations.
///
/// A line matching a reference context case-insensitively goes to that
/// context's owner, taking the first match whose owner exists in `target`.
/// Only when no reference context matches at all does the line fall back to
/// the first reference context (in reference order) whose text before its
/// first comma is a case-insensitive prefix of the line. Unmatched lines are
/// dropped and counted.
///
/// Reference contexts that appear under several entries belong to the last
/// one. Target entries are keyed by exact source term, so entries differing
/// only by case do not collide but exact duplicates keep only the last. The
/// result is stably sorted by lowercased source term.
pub fn reassign(target: Vec<Entry>, reference: &[Entry], orphans: &[String]) -> Reassigned {
    let mut owners: IndexMap<&str, &str> = IndexMap::new();
    for entry in reference {
        for line in &entry.context {
            owners.insert(line.as_str(), entry.source_term.as_str());
        }
    }
    let contexts: Vec<RefContext<'_>> = owners
        .iter()
        .map(|(line, owner)| {
            let head = line.split_once(',').map_or(*line, |(head, _)| head);
            RefContext {
                lowered: line.to_lowercase(),
                lowered_head: head.to_lowercase(),
                owner,
            }
        })
        .collect();

    let target_len = target.len();
    let mut by_source: IndexMap<String, Entry> = IndexMap::with_capacity(target_len);
    for entry in target {
        by_source.insert(entry.source_term.clone(), entry);
    }

    let mut stats = ReassignStats {
        orphans: orphans.len(),
        collapsed_entries: target_len - by_source.len(),
        ..ReassignStats::default()
    };

    for line in orphans {
        let lowered = line.to_lowercase();
        let exact = contexts.iter().any(|c| c.lowered == lowered);
        let owner = if exact {
            contexts
                .iter()
                .filter(|c| c.lowered == lowered)
                .map(|c| c.owner)
                .find(|owner| by_source.contains_key(*owner))
        } else {
            contexts
                .iter()
                .filter(|c| lowered.starts_with(&c.lowered_head))
                .map(|c| c.owner)
                .find(|owner| by_source.contains_key(*owner))
        };

        match owner.and_then(|owner| by_source.get_mut(owner)) {
            Some(entry) => {
                debug!("attaching {:?} to {:?}", line, entry.source_term);
                entry.context.push(line.clone());
                if exact {
                    stats.exact_matches += 1;
                } else {
                    stats.prefix_matches += 1;
                }
            }
            None => {
                debug!("no owner for orphaned line {:?}", line);
                stats.dropped += 1;
            }
        }
    }

    let mut entries: Vec<Entry> = by_source.into_values().collect();
    entries.sort_by_cached_key(Entry::key);

    info!(
        "reassigned {} of {} orphaned lines ({} exact, {} by prefix)",
        stats.exact_matches + stats.prefix_matches,
        stats.orphans,
        stats.exact_matches,
        stats.prefix_matches
    );
    if stats.dropped > 0 {
        warn!("dropped {} orphaned lines with no matching entry", stats.dropped);
    }

    Reassigned { entries, stats }
}
