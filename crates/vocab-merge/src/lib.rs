//! Merge vocabulary documents and repair misplaced context lines.
//!
//! [`merge`] combines any number of documents into one: entries are grouped
//! by their lowercased source term, each group collapses to a single entry,
//! and the result is sorted by that key. Within a duplicate group the first
//! entry whose source term is entirely upper-case supplies the source and
//! target text (falling back to the first entry), while the context lines of
//! every member are kept, deduplicated without regard to case.
//!
//! [`reassign`] attaches context lines that lost their entry during parsing,
//! using a reference document's context-to-entry associations.
//!
//! Both return counts alongside the result so callers can see what was
//! collapsed or dropped without parsing log output.
//!
//! # Example
//! ```rust
//! use vocab_merge::merge;
//! use vocab_types::{Document, Entry};
//!
//! let original = Document::new(
//!     "English,Lummi",
//!     vec![Entry::new("dog", "lum1"), Entry::new("zebra", "lum3")],
//! );
//! let flashcards = Document::new("", vec![Entry::new("DOG", "lum2").with_context(["_ex1"])]);
//!
//! let merged = merge([original, flashcards]);
//! let dog = &merged.document.entries[0];
//! assert_eq!((dog.source_term.as_str(), dog.target_term.as_str()), ("DOG", "lum2"));
//! assert_eq!(dog.context, vec!["_ex1"]);
//! assert_eq!(merged.document.header, "English,Lummi");
//! assert_eq!(merged.stats.duplicates_removed, 1);
//! ```

mod merge;
mod reassign;

pub use merge::{MergeStats, Merged, merge, merge_pair};
pub use reassign::{ReassignStats, Reassigned, reassign};
