//! Search configuration with the production defaults.
//!
//! [`SearchConfig`] holds every numeric knob the scorer and the locale
//! fallback controller consult. The defaults reproduce the production
//! ranking exactly; in particular [`SearchConfig::body_match_cap`] is `0.0`,
//! which keeps body-only matches from ever producing a positive score.

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Configuration for scoring and result selection.
///
/// Use [`Default::default()`] for the production values, or construct with
/// field overrides. Call [`SearchConfig::validate`] before use; the
/// [`KnowledgeBase`](crate::KnowledgeBase) constructor does this for you.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Minimum top score a primary-locale search needs to be accepted
    /// without consulting the other locale.
    pub min_accept_score: f64,
    /// Multiplier applied to every score found in the fallback locale.
    pub cross_locale_penalty: f64,
    /// Two candidate scores closer than this are treated as equal; the
    /// current score is kept and reason labels are merged.
    pub tie_break_epsilon: f64,
    /// Hard upper bound on the number of hits, whatever the caller asks for.
    pub max_results_cap: usize,
    /// Score awarded when a query token equals a normalized entry tag.
    pub tag_exact_score: f64,
    /// Score awarded when a query token and a tag contain one another.
    pub tag_partial_score: f64,
    /// Score awarded when title tokens appear among the query words.
    pub title_overlap_score: f64,
    /// Upper bound on the body-token contribution.
    pub body_match_cap: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_accept_score: 0.7,
            cross_locale_penalty: 0.85,
            tie_break_epsilon: 1e-4,
            max_results_cap: 3,
            tag_exact_score: 1.0,
            tag_partial_score: 1.0,
            title_overlap_score: 0.9,
            body_match_cap: 0.0,
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `max_results_cap` must be greater than 0
    /// - `cross_locale_penalty` must lie in `(0, 1)`
    /// - `min_accept_score` must lie in `(0, 1]`
    /// - signal scores must lie in `(0, 1]`, `body_match_cap` in `[0, 1]`
    /// - `tie_break_epsilon` must be finite and non-negative
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_results_cap == 0 {
            return Err(SearchError::Config(
                "max_results_cap must be greater than 0".into(),
            ));
        }
        if !(self.cross_locale_penalty > 0.0 && self.cross_locale_penalty < 1.0) {
            return Err(SearchError::Config(
                "cross_locale_penalty must be between 0 and 1 (exclusive)".into(),
            ));
        }
        if !(self.min_accept_score > 0.0 && self.min_accept_score <= 1.0) {
            return Err(SearchError::Config(
                "min_accept_score must be in (0, 1]".into(),
            ));
        }
        for (name, value) in [
            ("tag_exact_score", self.tag_exact_score),
            ("tag_partial_score", self.tag_partial_score),
            ("title_overlap_score", self.title_overlap_score),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(SearchError::Config(format!("{name} must be in (0, 1]")));
            }
        }
        if !(0.0..=1.0).contains(&self.body_match_cap) {
            return Err(SearchError::Config(
                "body_match_cap must be in [0, 1]".into(),
            ));
        }
        if !self.tie_break_epsilon.is_finite() || self.tie_break_epsilon < 0.0 {
            return Err(SearchError::Config(
                "tie_break_epsilon must be a finite, non-negative number".into(),
            ));
        }
        Ok(())
    }

    /// Number of hits to return for a requested limit:
    /// `max(1, min(requested, max_results_cap))`.
    ///
    /// A missing limit means "as many as the cap allows".
    pub fn effective_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.max_results_cap)
            .min(self.max_results_cap)
            .max(1)
    }
}
