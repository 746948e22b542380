//! Startup: build the knowledge base from config and optionally pre-load it.
//!
//! Call [`open_knowledge_base`] once and share the result; corpora load
//! lazily on first search. [`warm_up`] loads both locales eagerly so the
//! first question does not pay for file reads.

use std::time::Instant;

use dentfaq_search::{FileCorpusSource, KnowledgeBase, Lexicon, Locale};
use tracing::info;

use crate::config::AppConfig;
use crate::error::Result;

/// File-backed knowledge base, as built from [`AppConfig`].
pub type FileKnowledgeBase = KnowledgeBase<FileCorpusSource>;

/// Validate `config` and construct a knowledge base over its corpus
/// directory, with the lexicon override applied when one is configured.
///
/// # Errors
///
/// Returns an error if the config is invalid or the lexicon file cannot be
/// read or parsed. Corpus files are not touched here.
pub fn open_knowledge_base(config: &AppConfig) -> Result<FileKnowledgeBase> {
    config.validate()?;

    let lexicon = match &config.lexicon.path {
        Some(path) => {
            let lexicon = Lexicon::from_file(path)?;
            info!(
                path = %path.display(),
                groups = lexicon.group_count(),
                "using lexicon override"
            );
            lexicon
        }
        None => Lexicon::builtin(),
    };

    let source = FileCorpusSource::new(&config.corpus.dir);
    let kb = KnowledgeBase::new(source, config.search.clone())?.with_lexicon(lexicon);
    Ok(kb)
}

/// Load every locale's corpus, returning the entry count per locale.
///
/// # Errors
///
/// Stops at the first locale that fails to load.
pub async fn warm_up(kb: &FileKnowledgeBase) -> Result<Vec<(Locale, usize)>> {
    let start = Instant::now();
    let mut counts = Vec::with_capacity(Locale::all().len());
    for &locale in Locale::all() {
        let corpus = kb.load_corpus(locale).await?;
        counts.push((locale, corpus.len()));
    }
    info!(
        elapsed = ?start.elapsed(),
        ?counts,
        "knowledge base warmed up"
    );
    Ok(counts)
}
