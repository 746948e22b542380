//! dentfaq: dental FAQ lookup for a bilingual clinic assistant.
//!
//! This crate wires the [`dentfaq_search`] engine to the outside world:
//! - **Config**: a TOML file naming the corpus directory, the default
//!   locale, an optional lexicon override and the ranking knobs
//! - **Startup**: builds a file-backed [`KnowledgeBase`] from that config
//!   and can pre-load both locale corpora
//! - **CLI**: the `dentfaq` binary answers questions from the shell and
//!   prints results as JSON

pub mod config;
pub mod error;
pub mod startup;

pub use config::AppConfig;
pub use dentfaq_search::{KnowledgeBase, Locale, SearchOptions, SearchResult};
pub use error::{AppError, Result};
pub use startup::{FileKnowledgeBase, open_knowledge_base, warm_up};
