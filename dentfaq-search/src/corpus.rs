//! Corpus sources and parsing.
//!
//! A [`CorpusSource`] fetches the raw JSON array for one locale; the parser
//! turns it into [`Entry`] values, skipping malformed records instead of
//! failing the whole load, and [`Corpus::index`] precomputes the token sets
//! the scorer compares against.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Result, SearchError};
use crate::lexicon::Lexicon;
use crate::text::normalize;
use crate::types::{Entry, Locale};

/// Where corpus payloads come from.
///
/// Implementations only fetch bytes; parsing and locale filtering happen in
/// [`parse_corpus`]. All implementations must be `Send + Sync` so one
/// knowledge base can serve concurrent queries.
pub trait CorpusSource: Send + Sync {
    /// Fetch the serialized entry array for `locale`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Load`] (or [`SearchError::Io`]) when the
    /// payload cannot be fetched.
    fn fetch(&self, locale: Locale) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Human-readable origin of the corpus for `locale`, used in logs.
    fn describe(&self, locale: Locale) -> String;
}

/// Reads `<dir>/<locale>.json`, e.g. `corpus/en.json`.
#[derive(Debug, Clone)]
pub struct FileCorpusSource {
    dir: PathBuf,
}

impl FileCorpusSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the corpus file for `locale`.
    pub fn path_for(&self, locale: Locale) -> PathBuf {
        self.dir.join(format!("{}.json", locale.code()))
    }
}

impl CorpusSource for FileCorpusSource {
    async fn fetch(&self, locale: Locale) -> Result<Vec<u8>> {
        let path = self.path_for(locale);
        tokio::fs::read(&path)
            .await
            .map_err(|e| SearchError::Load(format!("{}: {e}", path.display())))
    }

    fn describe(&self, locale: Locale) -> String {
        self.path_for(locale).display().to_string()
    }
}

/// Serves corpus payloads held in memory. Handy for embedding a corpus in
/// the binary and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryCorpusSource {
    documents: HashMap<Locale, Arc<str>>,
}

impl MemoryCorpusSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the JSON payload served for `locale`.
    pub fn with_locale(mut self, locale: Locale, json: impl Into<Arc<str>>) -> Self {
        self.documents.insert(locale, json.into());
        self
    }
}

impl CorpusSource for MemoryCorpusSource {
    async fn fetch(&self, locale: Locale) -> Result<Vec<u8>> {
        self.documents
            .get(&locale)
            .map(|json| json.as_bytes().to_vec())
            .ok_or_else(|| SearchError::Load(format!("no corpus registered for locale {locale}")))
    }

    fn describe(&self, locale: Locale) -> String {
        format!("memory:{locale}")
    }
}

/// Parse a corpus payload for `locale`.
///
/// The payload must be a JSON array. Elements that fail to decode, have an
/// empty id, or repeat an id already seen are skipped with a warning;
/// elements whose `locale` differs from `locale` are skipped silently (at
/// debug level).
///
/// # Errors
///
/// Returns [`SearchError::Parse`] when the payload is not a JSON array.
pub fn parse_corpus(locale: Locale, bytes: &[u8]) -> Result<Vec<Entry>> {
    let records: Vec<serde_json::Value> = serde_json::from_slice(bytes)
        .map_err(|e| SearchError::Parse(format!("{locale} corpus is not a JSON array: {e}")))?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut entries = Vec::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        let entry: Entry = match serde_json::from_value(record) {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(%locale, index, error = %err, "skipping malformed corpus entry");
                continue;
            }
        };
        if entry.id.trim().is_empty() {
            tracing::warn!(%locale, index, "skipping corpus entry with empty id");
            continue;
        }
        if entry.locale != locale {
            tracing::debug!(
                %locale,
                id = %entry.id,
                entry_locale = %entry.locale,
                "skipping corpus entry from another locale"
            );
            continue;
        }
        if !seen.insert(entry.id.clone()) {
            tracing::warn!(%locale, id = %entry.id, "skipping duplicate corpus entry id");
            continue;
        }
        entries.push(entry);
    }

    Ok(entries)
}

/// An entry with the token sets the scorer compares against.
#[derive(Debug, Clone)]
pub struct IndexedEntry {
    pub entry: Arc<Entry>,
    /// Normalized, non-empty tags.
    pub tags: Vec<String>,
    pub title_tokens: HashSet<String>,
    /// Tokens of `excerpt + " " + body`.
    pub body_tokens: HashSet<String>,
}

impl IndexedEntry {
    pub fn new(entry: Entry, lexicon: &Lexicon) -> Self {
        let mut tags: Vec<String> = entry
            .tags
            .iter()
            .map(|tag| normalize(tag))
            .filter(|tag| !tag.is_empty())
            .collect();
        tags.sort();
        tags.dedup();
        let title_tokens = lexicon.tokenize(&entry.title);
        let body_tokens = lexicon.tokenize(&format!("{} {}", entry.excerpt, entry.body));
        Self {
            entry: Arc::new(entry),
            tags,
            title_tokens,
            body_tokens,
        }
    }

    /// Whether this entry carries any of `filter` (normalized tags).
    pub fn has_any_tag(&self, filter: &HashSet<String>) -> bool {
        self.tags.iter().any(|tag| filter.contains(tag))
    }
}

/// All entries of one locale, ready for scoring.
#[derive(Debug, Clone)]
pub struct Corpus {
    locale: Locale,
    entries: Vec<IndexedEntry>,
}

impl Corpus {
    /// Index parsed entries with `lexicon`.
    pub fn index(locale: Locale, entries: Vec<Entry>, lexicon: &Lexicon) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| IndexedEntry::new(entry, lexicon))
            .collect();
        Self { locale, entries }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn entries(&self) -> &[IndexedEntry] {
        &self.entries
    }

    /// The loaded entries, in corpus order.
    pub fn iter_entries(&self) -> impl Iterator<Item = &Arc<Entry>> {
        self.entries.iter().map(|indexed| &indexed.entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fetch, parse and index the corpus for `locale`.
pub async fn load_corpus<S: CorpusSource>(
    source: &S,
    locale: Locale,
    lexicon: &Lexicon,
) -> Result<Corpus> {
    let origin = source.describe(locale);
    tracing::debug!(%locale, %origin, "loading corpus");

    let bytes = source.fetch(locale).await.inspect_err(|err| {
        tracing::warn!(%locale, %origin, error = %err, "corpus fetch failed");
    })?;
    let entries = parse_corpus(locale, &bytes)?;
    let corpus = Corpus::index(locale, entries, lexicon);

    tracing::debug!(%locale, entries = corpus.len(), "corpus loaded");
    Ok(corpus)
}
