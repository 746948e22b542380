//! Core types for knowledge-base entries, queries and search results.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// The two locales a knowledge base is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English.
    En,
    /// Chinese.
    Zh,
}

impl Locale {
    /// Returns the short locale code used in corpus files (`"en"`, `"zh"`).
    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Zh => "zh",
        }
    }

    /// Returns the single other supported locale, used as the fallback.
    pub fn other(&self) -> Locale {
        match self {
            Self::En => Self::Zh,
            Self::Zh => Self::En,
        }
    }

    /// Returns both supported locales.
    pub fn all() -> &'static [Locale] {
        &[Self::En, Self::Zh]
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "zh" => Ok(Self::Zh),
            other => Err(SearchError::Config(format!("unsupported locale: {other}"))),
        }
    }
}

/// A single knowledge-base article, as stored in a corpus file.
///
/// Entries are created once at corpus load time and shared read-only
/// between the cache and every result that references them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Stable identifier, unique within a corpus.
    pub id: String,
    pub title: String,
    /// Locale the entry is written in.
    pub locale: Locale,
    /// Topic tags, e.g. `"root-canal"`. Order is irrelevant.
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub body: String,
    pub updated_at: DateTime<Utc>,
}

/// Per-call search options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Only entries carrying at least one of these tags are candidates.
    /// Empty means no filter.
    pub tags: HashSet<String>,
    /// Requested number of hits; always capped by
    /// [`SearchConfig::max_results_cap`](crate::SearchConfig::max_results_cap).
    pub limit: Option<usize>,
}

impl SearchOptions {
    /// Options with only a result limit set.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Default::default()
        }
    }
}

/// Why an entry received its score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Reason {
    /// A query token equals one of the entry's tags.
    TagExact,
    /// A query token and a tag contain one another.
    TagPartial,
    /// Title tokens appear among the query words.
    TitleOverlap,
    /// Query tokens appear in the excerpt or body.
    BodyOverlap,
    /// The query mentions a known dental concept.
    DentalTerm,
    /// The entry came from the fallback locale.
    CrossLocalePenalty,
}

impl Reason {
    /// Returns the stable label of this reason.
    pub fn label(&self) -> &'static str {
        match self {
            Self::TagExact => "tag-exact",
            Self::TagPartial => "tag-partial",
            Self::TitleOverlap => "title-overlap",
            Self::BodyOverlap => "body-overlap",
            Self::DentalTerm => "dental-term",
            Self::CrossLocalePenalty => "cross-locale-penalty",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An entry paired with the outcome of scoring it against one query.
#[derive(Debug, Clone)]
pub struct ScoredEntry {
    pub entry: Arc<Entry>,
    /// Final score in `[0, 1]`, penalty included.
    pub score: f64,
    pub reasons: BTreeSet<Reason>,
    /// 1 when a tag matched (exactly or partially), else 0.
    pub tag_overlap: usize,
    /// Number of title tokens found among the query words.
    pub title_overlap: usize,
    /// Whether the entry passed the topical-relevance precondition.
    pub domain_gate: bool,
}

/// One ranked entry in a [`SearchResult`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hit {
    pub entry: Arc<Entry>,
    pub score: f64,
    pub reasons: BTreeSet<Reason>,
}

impl From<ScoredEntry> for Hit {
    fn from(scored: ScoredEntry) -> Self {
        Self {
            entry: scored.entry,
            score: scored.score,
            reasons: scored.reasons,
        }
    }
}

/// Outcome of a [`KnowledgeBase::search`](crate::KnowledgeBase::search) call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Hits sorted by descending score, unique by entry id.
    pub hits: Vec<Hit>,
    /// Score of the first hit, or 0 when there are none.
    pub max_score: f64,
    /// Locales consulted, in order.
    pub locales_tried: Vec<Locale>,
}

impl SearchResult {
    /// A result with no hits.
    pub fn empty(locales_tried: Vec<Locale>) -> Self {
        Self {
            hits: Vec::new(),
            max_score: 0.0,
            locales_tried,
        }
    }

    /// Build a result from already ranked hits.
    pub fn from_hits(hits: Vec<Hit>, locales_tried: Vec<Locale>) -> Self {
        let max_score = hits.first().map_or(0.0, |hit| hit.score);
        Self {
            hits,
            max_score,
            locales_tried,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Diagnostic record of one evaluated candidate, handed to an installed
/// candidate observer.
#[derive(Debug, Clone)]
pub struct CandidateTrace {
    pub entry_id: String,
    pub title: String,
    pub locale: Locale,
    /// Score after the penalty; 0 when the entry was dropped.
    pub score: f64,
    pub reasons: BTreeSet<Reason>,
    /// Expanded query tokens the entry was scored against.
    pub tokens: Vec<String>,
    pub tag_overlap: usize,
    pub title_overlap: usize,
    pub domain_gate: bool,
}
