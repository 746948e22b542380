//! # dentfaq-search
//!
//! Bilingual lexical search over a dental FAQ knowledge base.
//!
//! Answers "does this free-text question match a knowledge-base entry, and
//! which one best?" for an English/Chinese assistant, without embeddings or
//! a persistent index.
//!
//! ## Design
//!
//! - Normalizes and tokenizes text the same way on both sides, with a
//!   bilingual stopword list and compound phrase tokens
//! - Expands queries through fixed synonym groups (procedure names,
//!   abbreviations, translations)
//! - Scores entries by tag, title and (capped) body signals behind a domain
//!   gate, with strict priority and an epsilon tie-break
//! - Searches the requested locale first and falls back to the other one
//!   with a score penalty
//! - Deduplicates by entry id and returns at most three hits
//! - Loads each locale's corpus once, sharing in-flight loads between
//!   concurrent callers
//!
//! ## Example
//!
//! ```no_run
//! # async fn example() -> dentfaq_search::Result<()> {
//! use dentfaq_search::{FileCorpusSource, KnowledgeBase, Locale, SearchConfig, SearchOptions};
//!
//! let kb = KnowledgeBase::new(FileCorpusSource::new("data/corpus"), SearchConfig::default())?;
//! let result = kb.search(Locale::En, "Does a root canal hurt?", &SearchOptions::default()).await?;
//! for hit in &result.hits {
//!     println!("{:.2} {} {:?}", hit.score, hit.entry.title, hit.reasons);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod corpus;
pub mod error;
pub mod knowledge_base;
pub mod ledger;
pub mod lexicon;
pub mod orchestrator;
pub mod text;
pub mod types;

pub use config::SearchConfig;
pub use corpus::{Corpus, CorpusSource, FileCorpusSource, MemoryCorpusSource};
pub use error::{Result, SearchError};
pub use knowledge_base::KnowledgeBase;
pub use ledger::ReasonLedger;
pub use lexicon::{ExpandedQuery, Lexicon};
pub use types::{CandidateTrace, Entry, Hit, Locale, Reason, SearchOptions, SearchResult};
