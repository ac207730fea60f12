//! Linear substring search over in-memory entries.
//!
//! # Invariants
//! - An entry matches when `name`, `description` or `website` contains the
//!   query, compared case-insensitively.
//! - The query is used verbatim (no trimming); an empty query matches all.
//! - Hits are yielded lazily in collection order.

use crate::model::entry::Entry;

/// Returns a lazy iterator over entries matching `query`.
pub fn filter_entries<'a>(
    entries: &'a [Entry],
    query: &str,
) -> impl Iterator<Item = &'a Entry> + 'a {
    filter_positions(entries, query).map(|(_, entry)| entry)
}

/// Like [`filter_entries`], also yielding each hit's collection position.
pub fn filter_positions<'a>(
    entries: &'a [Entry],
    query: &str,
) -> impl Iterator<Item = (usize, &'a Entry)> + 'a {
    let lowered = query.to_lowercase();
    entries
        .iter()
        .enumerate()
        .filter(move |(_, entry)| entry.matches_lowered(&lowered))
}
