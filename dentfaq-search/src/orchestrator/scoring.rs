//! Multi-signal entry scoring with priority tie-breaks.
//!
//! Signals, strongest first:
//! - tag match (exact, else partial): [`SearchConfig::tag_exact_score`] /
//!   [`SearchConfig::tag_partial_score`]
//! - title overlap: [`SearchConfig::title_overlap_score`]
//! - body overlap: capped by [`SearchConfig::body_match_cap`] (0 by default,
//!   so body-only matches never score)
//!
//! No signal counts unless the entry first passes the domain gate: a tag
//! match, a title overlap, or a dental term somewhere in the query. A
//! candidate only replaces the running score when it beats it by more than
//! [`SearchConfig::tie_break_epsilon`]; within epsilon the reasons merge.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use crate::config::SearchConfig;
use crate::corpus::{Corpus, IndexedEntry};
use crate::lexicon::ExpandedQuery;
use crate::types::{CandidateTrace, Reason, ScoredEntry};

/// Callback receiving one [`CandidateTrace`] per evaluated entry.
pub type CandidateObserver = Arc<dyn Fn(&CandidateTrace) + Send + Sync>;

/// Which leg of the locale fallback an entry is scored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreMode {
    /// The requested locale; no penalty.
    Primary,
    /// The other locale; every score is multiplied by
    /// [`SearchConfig::cross_locale_penalty`].
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagMatch {
    None,
    Partial,
    Exact,
}

/// Exact membership first, then substring containment in either direction.
fn match_tags(tags: &[String], tokens: &HashSet<String>) -> TagMatch {
    if tags.iter().any(|tag| tokens.contains(tag)) {
        return TagMatch::Exact;
    }
    let partial = tags.iter().any(|tag| {
        tokens
            .iter()
            .any(|token| tag.contains(token.as_str()) || token.contains(tag.as_str()))
    });
    if partial {
        TagMatch::Partial
    } else {
        TagMatch::None
    }
}

/// Running best score and the reasons that produced it.
struct Resolution {
    score: f64,
    reasons: BTreeSet<Reason>,
    epsilon: f64,
}

impl Resolution {
    fn new(epsilon: f64) -> Self {
        Self {
            score: 0.0,
            reasons: BTreeSet::new(),
            epsilon,
        }
    }

    fn offer(&mut self, score: f64, reason: Reason) {
        if score <= 0.0 {
            return;
        }
        if score > self.score + self.epsilon {
            self.score = score;
            self.reasons.clear();
            self.reasons.insert(reason);
        } else if (score - self.score).abs() <= self.epsilon {
            self.reasons.insert(reason);
        }
    }
}

/// Score one entry against an expanded query.
///
/// Always returns a [`ScoredEntry`]; entries that fail the domain gate or
/// match nothing come back with score 0 and no reasons.
pub fn score_entry(
    indexed: &IndexedEntry,
    query: &ExpandedQuery,
    config: &SearchConfig,
    mode: ScoreMode,
) -> ScoredEntry {
    let tag_match = match_tags(&indexed.tags, &query.tokens);
    let tag_overlap = usize::from(tag_match != TagMatch::None);
    let title_overlap = indexed
        .title_tokens
        .iter()
        .filter(|token| query.words.contains(*token))
        .count();
    let domain_gate = tag_overlap > 0 || title_overlap > 0 || query.has_domain_term;

    let mut resolution = Resolution::new(config.tie_break_epsilon);

    if domain_gate {
        match tag_match {
            TagMatch::Exact => resolution.offer(config.tag_exact_score, Reason::TagExact),
            TagMatch::Partial => resolution.offer(config.tag_partial_score, Reason::TagPartial),
            TagMatch::None => {}
        }
        if title_overlap > 0 {
            resolution.offer(config.title_overlap_score, Reason::TitleOverlap);
        }
        let body_matches = query
            .tokens
            .iter()
            .filter(|token| indexed.body_tokens.contains(*token))
            .count();
        if body_matches > 0 {
            let ratio = body_matches as f64 / query.tokens.len() as f64;
            resolution.offer(ratio.min(config.body_match_cap), Reason::BodyOverlap);
        }
    }

    let Resolution {
        mut score,
        mut reasons,
        ..
    } = resolution;

    if score > 0.0 {
        if query.has_domain_term {
            reasons.insert(Reason::DentalTerm);
        }
        if mode == ScoreMode::Fallback {
            score *= config.cross_locale_penalty;
            reasons.insert(Reason::CrossLocalePenalty);
        }
    }

    ScoredEntry {
        entry: Arc::clone(&indexed.entry),
        score: score.clamp(0.0, 1.0),
        reasons,
        tag_overlap,
        title_overlap,
        domain_gate,
    }
}

/// Score every candidate in `corpus` and keep the positive ones, in corpus
/// order.
///
/// `tag_filter` holds normalized tags; when non-empty, entries carrying none
/// of them are not candidates. `observer`, when present, sees every
/// candidate including the dropped ones.
pub fn score_corpus(
    corpus: &Corpus,
    query: &ExpandedQuery,
    config: &SearchConfig,
    mode: ScoreMode,
    tag_filter: &HashSet<String>,
    observer: Option<&CandidateObserver>,
) -> Vec<ScoredEntry> {
    let mut sorted_tokens: Option<Vec<String>> = None;

    corpus
        .entries()
        .iter()
        .filter(|indexed| tag_filter.is_empty() || indexed.has_any_tag(tag_filter))
        .filter_map(|indexed| {
            let scored = score_entry(indexed, query, config, mode);

            tracing::trace!(
                id = %scored.entry.id,
                locale = %corpus.locale(),
                score = scored.score,
                tag_overlap = scored.tag_overlap,
                title_overlap = scored.title_overlap,
                domain_gate = scored.domain_gate,
                "scored candidate"
            );

            if let Some(observer) = observer {
                let tokens = sorted_tokens
                    .get_or_insert_with(|| {
                        let mut tokens: Vec<String> = query.tokens.iter().cloned().collect();
                        tokens.sort();
                        tokens
                    })
                    .clone();
                observer(&CandidateTrace {
                    entry_id: scored.entry.id.clone(),
                    title: scored.entry.title.clone(),
                    locale: corpus.locale(),
                    score: scored.score,
                    reasons: scored.reasons.clone(),
                    tokens,
                    tag_overlap: scored.tag_overlap,
                    title_overlap: scored.title_overlap,
                    domain_gate: scored.domain_gate,
                });
            }

            (scored.score > 0.0).then_some(scored)
        })
        .collect()
}
