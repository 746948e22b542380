//! Result deduplication by entry id and top-N selection.
//!
//! Keeps the highest-scored instance of each entry id (the first one seen
//! on ties), sorts survivors by descending score and truncates. The sort is
//! stable, so equal scores keep their encounter order and identical inputs
//! always produce identical rankings.

use std::collections::HashMap;

use crate::types::ScoredEntry;

/// Collapse scored entries sharing an id, keeping the best-scored one.
///
/// Output keeps the order in which each id was first encountered.
pub fn deduplicate(scored: Vec<ScoredEntry>) -> Vec<ScoredEntry> {
    let mut position: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<ScoredEntry> = Vec::with_capacity(scored.len());

    for candidate in scored {
        match position.get(&candidate.entry.id) {
            Some(&index) => {
                if candidate.score > kept[index].score {
                    kept[index] = candidate;
                }
            }
            None => {
                position.insert(candidate.entry.id.clone(), kept.len());
                kept.push(candidate);
            }
        }
    }

    kept
}

/// Deduplicate, sort by score descending and truncate to `limit`.
pub fn select_top(scored: Vec<ScoredEntry>, limit: usize) -> Vec<ScoredEntry> {
    let mut ranked = deduplicate(scored);
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(limit);
    ranked
}
