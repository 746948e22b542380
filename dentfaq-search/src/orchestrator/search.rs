//! Locale fallback controller: primary locale, then the other one.
//!
//! # Pipeline
//!
//! 1. Load and score the requested locale without penalty
//! 2. Keep hits at or above [`SearchConfig::min_accept_score`]; if any
//!    remain, dedup, rank and return them
//! 3. Otherwise load and score the other locale with the cross-locale
//!    penalty and accept any positive hit
//! 4. Dedup, sort by score (descending), truncate to the effective limit
//!
//! The primary locale must clear the quality bar; the fallback is
//! best-effort, because a penalised partial match beats no answer at all.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use crate::config::SearchConfig;
use crate::corpus::Corpus;
use crate::error::Result;
use crate::lexicon::ExpandedQuery;
use crate::types::{Hit, Locale, SearchResult};

use super::dedup::select_top;
use super::scoring::{score_corpus, CandidateObserver, ScoreMode};

/// Everything one search call needs besides the corpora.
pub struct SearchRequest<'a> {
    pub locale: Locale,
    pub query: &'a ExpandedQuery,
    /// Normalized tag filter; empty means no filter.
    pub tag_filter: &'a HashSet<String>,
    pub limit: Option<usize>,
    pub config: &'a SearchConfig,
    pub observer: Option<&'a CandidateObserver>,
}

/// Run the primary/fallback flow, loading corpora through `load`.
///
/// # Errors
///
/// Propagates the first corpus load failure. The fallback locale is only
/// loaded when the primary locale is not accepted.
pub async fn orchestrate_search<L, Fut>(request: SearchRequest<'_>, load: L) -> Result<SearchResult>
where
    L: Fn(Locale) -> Fut,
    Fut: Future<Output = Result<Arc<Corpus>>>,
{
    let SearchRequest {
        locale,
        query,
        tag_filter,
        limit,
        config,
        observer,
    } = request;
    let limit = config.effective_limit(limit);

    // 1. Primary locale, no penalty.
    let primary = load(locale).await?;
    let scored = score_corpus(&primary, query, config, ScoreMode::Primary, tag_filter, observer);
    let positive = scored.len();

    // 2. Quality bar.
    let accepted: Vec<_> = scored
        .into_iter()
        .filter(|candidate| candidate.score >= config.min_accept_score)
        .collect();

    if !accepted.is_empty() {
        let hits: Vec<Hit> = select_top(accepted, limit).into_iter().map(Hit::from).collect();
        tracing::debug!(%locale, hits = hits.len(), "primary locale accepted");
        return Ok(SearchResult::from_hits(hits, vec![locale]));
    }

    // 3. Fallback locale, penalised, no threshold.
    let fallback = locale.other();
    tracing::debug!(
        %locale,
        %fallback,
        positive,
        threshold = config.min_accept_score,
        "primary locale not accepted, trying fallback"
    );

    let secondary = load(fallback).await?;
    let scored = score_corpus(
        &secondary,
        query,
        config,
        ScoreMode::Fallback,
        tag_filter,
        observer,
    );

    // 4. Rank whatever the fallback produced.
    let hits: Vec<Hit> = select_top(scored, limit).into_iter().map(Hit::from).collect();
    tracing::debug!(%fallback, hits = hits.len(), "fallback locale searched");

    Ok(SearchResult::from_hits(hits, vec![locale, fallback]))
}
