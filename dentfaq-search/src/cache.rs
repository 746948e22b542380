//! Per-locale corpus cache.
//!
//! Each locale slot is populated at most once: concurrent callers asking for
//! the same uncached locale await a single in-flight load via
//! [`moka`]'s `try_get_with`. A failed load is not cached, so the next call
//! tries again. Slots are never evicted; [`CorpusCache::replace`] is the only
//! way to swap a loaded corpus.

use std::future::Future;
use std::sync::Arc;

use moka::future::Cache;

use crate::corpus::Corpus;
use crate::error::{Result, SearchError};
use crate::types::Locale;

/// Loaded corpora keyed by locale.
#[derive(Clone)]
pub struct CorpusCache {
    slots: Cache<Locale, Arc<Corpus>>,
}

impl Default for CorpusCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CorpusCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorpusCache")
            .field("entries", &self.slots.entry_count())
            .finish()
    }
}

impl CorpusCache {
    /// An empty cache with room for every supported locale and no expiry.
    pub fn new() -> Self {
        Self {
            slots: Cache::builder()
                .initial_capacity(Locale::all().len())
                .build(),
        }
    }

    /// Return the cached corpus for `locale`, running `load` if the slot is
    /// empty.
    ///
    /// When several callers miss at once, only one `load` runs; the others
    /// wait for its outcome. Errors are returned to every waiter and leave
    /// the slot empty.
    pub async fn get_or_load<F>(&self, locale: Locale, load: F) -> Result<Arc<Corpus>>
    where
        F: Future<Output = Result<Corpus>>,
    {
        self.slots
            .try_get_with(locale, async move { load.await.map(Arc::new) })
            .await
            .map_err(SearchError::from)
    }

    /// The cached corpus for `locale`, without loading.
    pub async fn get(&self, locale: Locale) -> Option<Arc<Corpus>> {
        self.slots.get(&locale).await
    }

    /// Store `corpus` in its locale's slot, replacing any previous one.
    pub async fn replace(&self, corpus: Corpus) -> Arc<Corpus> {
        let corpus = Arc::new(corpus);
        self.slots.insert(corpus.locale(), Arc::clone(&corpus)).await;
        corpus
    }

    /// Whether `locale` has a loaded corpus.
    pub fn contains(&self, locale: Locale) -> bool {
        self.slots.contains_key(&locale)
    }
}
