//! Search orchestrator: scoring, locale fallback, dedup and ranking.
//!
//! Scores every candidate of the requested locale, falls back to the other
//! locale with a penalty when nothing clears the acceptance threshold,
//! deduplicates by entry id and returns a sorted, truncated hit list.

pub mod dedup;
pub mod scoring;
pub mod search;
