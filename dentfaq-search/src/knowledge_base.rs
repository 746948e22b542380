//! The search entry point: one knowledge base over two locale corpora.

use std::collections::HashSet;
use std::sync::Arc;

use crate::cache::CorpusCache;
use crate::config::SearchConfig;
use crate::corpus::{load_corpus, Corpus, CorpusSource};
use crate::error::{Result, SearchError};
use crate::ledger::ReasonLedger;
use crate::lexicon::Lexicon;
use crate::orchestrator::scoring::CandidateObserver;
use crate::orchestrator::search::{orchestrate_search, SearchRequest};
use crate::text::normalize;
use crate::types::{CandidateTrace, Locale, SearchOptions, SearchResult};

/// A bilingual FAQ knowledge base.
///
/// Corpora are loaded lazily, once per locale, and then served from memory
/// for the life of the value. Share one instance (e.g. behind an [`Arc`])
/// across tasks so they share the cache.
pub struct KnowledgeBase<S> {
    source: S,
    config: SearchConfig,
    lexicon: Lexicon,
    cache: CorpusCache,
    ledger: ReasonLedger,
    observer: Option<CandidateObserver>,
}

impl<S: CorpusSource> KnowledgeBase<S> {
    /// Create a knowledge base reading corpora from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`](crate::SearchError::Config) if
    /// `config` fails validation.
    pub fn new(source: S, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            config,
            lexicon: Lexicon::builtin(),
            cache: CorpusCache::new(),
            ledger: ReasonLedger::new(),
            observer: None,
        })
    }

    /// Replace the built-in lexicon. Call before the first load: corpora
    /// already cached keep the tokens of the lexicon they were indexed with.
    pub fn with_lexicon(mut self, lexicon: Lexicon) -> Self {
        self.lexicon = lexicon;
        self
    }

    /// Install a development-time callback that sees every evaluated
    /// candidate. Without one, no trace records are built.
    pub fn with_candidate_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&CandidateTrace) + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(observer));
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Reasons behind the hits of the most recent search.
    pub fn reasons(&self) -> &ReasonLedger {
        &self.ledger
    }

    /// Load (or fetch from cache) the corpus for `locale`.
    ///
    /// Concurrent callers share one in-flight load. Failures are not
    /// cached.
    pub async fn load_corpus(&self, locale: Locale) -> Result<Arc<Corpus>> {
        self.cache
            .get_or_load(locale, load_corpus(&self.source, locale, &self.lexicon))
            .await
    }

    /// Fetch a fresh copy of the corpus for `locale` and swap it in.
    ///
    /// On failure the previously cached corpus, if any, stays in place.
    pub async fn reload_corpus(&self, locale: Locale) -> Result<Arc<Corpus>> {
        let corpus = load_corpus(&self.source, locale, &self.lexicon).await?;
        tracing::info!(%locale, entries = corpus.len(), "corpus reloaded");
        Ok(self.cache.replace(corpus).await)
    }

    /// Whether `locale`'s corpus is already in memory.
    pub fn is_loaded(&self, locale: Locale) -> bool {
        self.cache.contains(locale)
    }

    /// Answer `query` from the `locale` corpus, falling back to the other
    /// locale with a score penalty when the primary locale has no
    /// acceptable hit.
    ///
    /// A query that normalizes to nothing returns an empty result without
    /// loading any corpus.
    ///
    /// # Errors
    ///
    /// Returns the corpus load error if a needed corpus cannot be loaded, and
    /// [`SearchError::Config`] when `options.tags` is non-empty but every tag
    /// normalizes to nothing.
    pub async fn search(
        &self,
        locale: Locale,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchResult> {
        tracing::trace!(%locale, query, "search");

        let tag_filter: HashSet<String> = options
            .tags
            .iter()
            .map(|tag| normalize(tag))
            .filter(|tag| !tag.is_empty())
            .collect();
        if !options.tags.is_empty() && tag_filter.is_empty() {
            return Err(SearchError::Config(format!(
                "tag filter has no usable tags: {:?}",
                options.tags
            )));
        }

        if normalize(query).is_empty() {
            tracing::debug!(%locale, "empty query");
            self.ledger.clear();
            return Ok(SearchResult::empty(vec![locale]));
        }

        let expanded = self.lexicon.analyze_query(query);

        let request = SearchRequest {
            locale,
            query: &expanded,
            tag_filter: &tag_filter,
            limit: options.limit,
            config: &self.config,
            observer: self.observer.as_ref(),
        };
        let result = orchestrate_search(request, |l| self.load_corpus(l)).await?;

        self.ledger.record(&result.hits);
        tracing::debug!(
            %locale,
            hits = result.hits.len(),
            max_score = result.max_score,
            locales_tried = ?result.locales_tried,
            "search complete"
        );
        Ok(result)
    }
}

impl<S> std::fmt::Debug for KnowledgeBase<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeBase")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .field("observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}
