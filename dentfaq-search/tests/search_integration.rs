//! Integration tests for the knowledge-base search pipeline.
//!
//! These tests exercise tokenize → expand → score → fallback → dedup →
//! rank → truncate through the public API, with corpora served from
//! memory (no filesystem or network).

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dentfaq_search::{
    CorpusSource, KnowledgeBase, Locale, MemoryCorpusSource, Reason, SearchConfig, SearchError,
    SearchOptions, SearchResult,
};

const EN_CORPUS: &str = r#"[
    {"id": "en-rc", "title": "Does a root canal hurt?", "locale": "en",
     "tags": ["root-canal", "pain"], "excerpt": "Usually no more than a filling.",
     "body": "Modern anesthesia keeps the procedure comfortable.",
     "updatedAt": "2024-02-01T09:00:00Z"},
    {"id": "en-rc-cost", "title": "How much does a root canal cost?", "locale": "en",
     "tags": ["cost"], "excerpt": "Prices depend on the tooth.", "body": "Molars cost more.",
     "updatedAt": "2024-02-02T09:00:00Z"},
    {"id": "en-implant", "title": "Dental implants", "locale": "en",
     "tags": ["implant"], "excerpt": "A titanium post replaces the root.", "body": "",
     "updatedAt": "2024-02-03T09:00:00Z"},
    {"id": "en-hours", "title": "Opening hours", "locale": "en",
     "tags": ["clinic"], "excerpt": "We open at nine.", "body": "Closed on Sundays.",
     "updatedAt": "2024-02-04T09:00:00Z"},
    {"id": "en-whitening", "title": "Whitening options", "locale": "en",
     "tags": ["whitening"], "excerpt": "In-office or take-home.", "body": "",
     "updatedAt": "2024-02-05T09:00:00Z"},
    {"id": "en-crown", "title": "What is a crown?", "locale": "en",
     "tags": ["crown"], "excerpt": "A cap over a damaged tooth.", "body": "",
     "updatedAt": "2024-02-06T09:00:00Z"},
    {"id": "en-crown-care", "title": "Caring for a new crown", "locale": "en",
     "tags": ["aftercare"], "excerpt": "Avoid sticky food for a day.", "body": "",
     "updatedAt": "2024-02-07T09:00:00Z"},
    {"id": "en-stray", "title": "智齒", "locale": "zh", "tags": ["智齒"],
     "excerpt": "", "body": "", "updatedAt": "2024-02-08T09:00:00Z"},
    {"id": "en-broken", "title": "Missing timestamp", "locale": "en", "tags": ["crown"]}
]"#;

const ZH_CORPUS: &str = r#"[
    {"id": "zh-wisdom", "title": "智齒一定要拔嗎", "locale": "zh",
     "tags": ["智齒"], "excerpt": "視情況而定。", "body": "",
     "updatedAt": "2024-03-01T09:00:00Z"},
    {"id": "zh-rc", "title": "根管治療會痛嗎", "locale": "zh",
     "tags": ["根管治療"], "excerpt": "通常不會。", "body": "",
     "updatedAt": "2024-03-02T09:00:00Z"},
    {"id": "zh-scaling", "title": "多久洗牙一次", "locale": "zh",
     "tags": ["洗牙"], "excerpt": "建議每半年一次。", "body": "",
     "updatedAt": "2024-03-03T09:00:00Z"}
]"#;

/// Wraps the in-memory source, counting fetches and optionally failing
/// the first few of them.
struct CountingSource {
    inner: MemoryCorpusSource,
    fetches: Arc<AtomicUsize>,
    failures_left: AtomicUsize,
    delay: Duration,
}

impl CountingSource {
    fn new() -> Self {
        Self {
            inner: MemoryCorpusSource::new()
                .with_locale(Locale::En, EN_CORPUS)
                .with_locale(Locale::Zh, ZH_CORPUS),
            fetches: Arc::new(AtomicUsize::new(0)),
            failures_left: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    fn failing_first(mut self, failures: usize) -> Self {
        self.failures_left = AtomicUsize::new(failures);
        self
    }

    fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl CorpusSource for CountingSource {
    async fn fetch(&self, locale: Locale) -> dentfaq_search::Result<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let should_fail = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(SearchError::Load("simulated outage".into()));
        }
        self.inner.fetch(locale).await
    }

    fn describe(&self, locale: Locale) -> String {
        format!("counting:{locale}")
    }
}

fn knowledge_base() -> KnowledgeBase<MemoryCorpusSource> {
    let source = MemoryCorpusSource::new()
        .with_locale(Locale::En, EN_CORPUS)
        .with_locale(Locale::Zh, ZH_CORPUS);
    KnowledgeBase::new(source, SearchConfig::default()).expect("valid config")
}

async fn search(kb: &KnowledgeBase<MemoryCorpusSource>, locale: Locale, text: &str) -> SearchResult {
    kb.search(locale, text, &SearchOptions::default())
        .await
        .expect("search should succeed")
}

fn ids(result: &SearchResult) -> Vec<&str> {
    result.hits.iter().map(|hit| hit.entry.id.as_str()).collect()
}

fn assert_well_formed(result: &SearchResult, requested_limit: usize) {
    let unique: HashSet<&str> = ids(result).into_iter().collect();
    assert_eq!(unique.len(), result.hits.len(), "duplicate ids: {:?}", ids(result));
    assert!(result.hits.len() <= requested_limit.min(3));
    for pair in result.hits.windows(2) {
        assert!(pair[0].score >= pair[1].score, "hits not sorted");
    }
    for hit in &result.hits {
        assert!(hit.score > 0.0 && hit.score <= 1.0, "score out of range: {}", hit.score);
    }
}

// ── Scenarios ─────────────────────────────────────────────────────────

#[tokio::test]
async fn exact_tag_match_ranks_first() {
    let kb = knowledge_base();
    let result = search(&kb, Locale::En, "root canal").await;

    assert_eq!(result.locales_tried, vec![Locale::En]);
    let top = &result.hits[0];
    assert_eq!(top.entry.id, "en-rc");
    assert!((top.score - 1.0).abs() < f64::EPSILON);
    assert!(top.reasons.contains(&Reason::TagExact));
    assert!(top.reasons.contains(&Reason::DentalTerm));
    assert!((result.max_score - 1.0).abs() < f64::EPSILON);
    assert_well_formed(&result, 3);
}

#[tokio::test]
async fn stopword_only_query_returns_nothing() {
    let kb = knowledge_base();
    let result = search(&kb, Locale::En, "What is the").await;

    assert!(result.hits.is_empty());
    assert_eq!(result.max_score, 0.0);
    assert_eq!(result.locales_tried, vec![Locale::En, Locale::Zh]);
}

#[tokio::test]
async fn other_locale_match_is_penalised() {
    let kb = knowledge_base();
    let config = SearchConfig::default();

    let fallback = search(&kb, Locale::En, "third molar").await;
    assert_eq!(fallback.locales_tried, vec![Locale::En, Locale::Zh]);
    assert_eq!(ids(&fallback), vec!["zh-wisdom"]);
    let hit = &fallback.hits[0];
    assert_eq!(hit.entry.locale, Locale::Zh);
    assert!(hit.reasons.contains(&Reason::CrossLocalePenalty));

    let native = search(&kb, Locale::Zh, "third molar").await;
    assert_eq!(native.locales_tried, vec![Locale::Zh]);
    let native_score = native.hits[0].score;
    assert!((hit.score - native_score * config.cross_locale_penalty).abs() < 1e-12);
    assert!(hit.score < native_score);
}

#[tokio::test]
async fn tag_match_outranks_title_only_match() {
    let kb = knowledge_base();
    let result = search(&kb, Locale::En, "new crown").await;

    let crown = result.hits.iter().position(|h| h.entry.id == "en-crown").expect("tag hit");
    let care = result
        .hits
        .iter()
        .position(|h| h.entry.id == "en-crown-care")
        .expect("title hit");
    assert!(crown < care);
    assert!(result.hits[crown].score > result.hits[care].score);
    assert!(result.hits[care].reasons.contains(&Reason::TitleOverlap));
}

#[tokio::test]
async fn limit_is_capped_at_three() {
    let kb = knowledge_base();
    let options = SearchOptions::with_limit(10);
    let result = kb
        .search(Locale::En, "root canal cost crown implant whitening", &options)
        .await
        .expect("search");

    assert_eq!(result.hits.len(), 3);
    assert_well_formed(&result, 10);
}

#[tokio::test]
async fn smaller_limit_is_honoured() {
    let kb = knowledge_base();
    let options = SearchOptions::with_limit(1);
    let result = kb
        .search(Locale::En, "root canal", &options)
        .await
        .expect("search");
    assert_eq!(ids(&result), vec!["en-rc"]);
}

// ── Properties ────────────────────────────────────────────────────────

#[tokio::test]
async fn primary_hits_clear_threshold_and_keep_locale() {
    let kb = knowledge_base();
    let config = SearchConfig::default();
    for text in ["root canal", "new crown", "dental implant", "opening hours", "whitening"] {
        let result = search(&kb, Locale::En, text).await;
        assert_eq!(result.locales_tried, vec![Locale::En], "query {text:?}");
        for hit in &result.hits {
            assert!(hit.score >= config.min_accept_score, "query {text:?}");
            assert_eq!(hit.entry.locale, Locale::En);
        }
        assert_well_formed(&result, 3);
    }
}

#[tokio::test]
async fn identical_calls_are_deterministic() {
    let first_kb = knowledge_base();
    let second_kb = knowledge_base();
    for text in ["root canal cost crown implant whitening", "new crown", "third molar"] {
        let a = search(&first_kb, Locale::En, text).await;
        let b = search(&first_kb, Locale::En, text).await;
        let c = search(&second_kb, Locale::En, text).await;
        assert_eq!(a, b);
        assert_eq!(a, c);
    }
}

#[tokio::test]
async fn chinese_query_matches_by_partial_tag() {
    let kb = knowledge_base();
    let result = search(&kb, Locale::Zh, "請問根管治療會痛嗎？").await;
    assert_eq!(result.locales_tried, vec![Locale::Zh]);
    assert_eq!(result.hits[0].entry.id, "zh-rc");
    assert!(result.hits[0].reasons.contains(&Reason::TagPartial));
}

#[tokio::test]
async fn foreign_and_malformed_entries_are_not_served() {
    let kb = knowledge_base();
    let corpus = kb.load_corpus(Locale::En).await.expect("load");
    let loaded: HashSet<&str> = corpus.iter_entries().map(|e| e.id.as_str()).collect();
    assert!(!loaded.contains("en-stray"));
    assert!(!loaded.contains("en-broken"));
    assert_eq!(loaded.len(), 7);
}

#[tokio::test]
async fn tag_filter_restricts_candidates() {
    let kb = knowledge_base();
    let options = SearchOptions {
        tags: HashSet::from(["Cost".to_string()]),
        limit: None,
    };
    let result = kb.search(Locale::En, "root canal", &options).await.expect("search");
    assert_eq!(ids(&result), vec!["en-rc-cost"]);
    assert!((result.hits[0].score - 0.9).abs() < f64::EPSILON);
}

#[tokio::test]
async fn punctuation_only_tag_filter_is_rejected() {
    let kb = knowledge_base();
    for tags in [vec!["?"], vec!["-", "  "]] {
        let options = SearchOptions {
            tags: tags.into_iter().map(str::to_string).collect(),
            limit: None,
        };
        let err = kb
            .search(Locale::En, "root canal", &options)
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Config(_)), "got {err:?}");
    }
    assert!(!kb.is_loaded(Locale::En));
}

#[tokio::test]
async fn tag_filter_keeps_usable_tags_alongside_punctuation() {
    let kb = knowledge_base();
    let options = SearchOptions {
        tags: HashSet::from(["?".to_string(), "cost".to_string()]),
        limit: None,
    };
    let result = kb.search(Locale::En, "root canal", &options).await.expect("search");
    assert_eq!(ids(&result), vec!["en-rc-cost"]);
}

#[tokio::test]
async fn primary_hits_under_threshold_are_not_returned() {
    let source = MemoryCorpusSource::new()
        .with_locale(Locale::En, EN_CORPUS)
        .with_locale(Locale::Zh, ZH_CORPUS);
    let config = SearchConfig {
        title_overlap_score: 0.5,
        ..Default::default()
    };
    let kb = KnowledgeBase::new(source, config).expect("valid config");

    // Tag match clears the bar; title-only matches at 0.5 do not.
    let mixed = search(&kb, Locale::En, "new crown").await;
    assert_eq!(mixed.locales_tried, vec![Locale::En]);
    assert_eq!(ids(&mixed), vec!["en-crown"]);

    // Only title-only matches in the primary locale: fall back.
    let below = search(&kb, Locale::En, "opening hours").await;
    assert_eq!(below.locales_tried, vec![Locale::En, Locale::Zh]);
    assert!(below.hits.is_empty());
}

#[tokio::test]
async fn empty_query_skips_loading() {
    let source = CountingSource::new();
    let fetches = Arc::clone(&source.fetches);
    let kb = KnowledgeBase::new(source, SearchConfig::default()).expect("valid config");

    let result = kb
        .search(Locale::Zh, "？？？", &SearchOptions::default())
        .await
        .expect("search");
    assert!(result.hits.is_empty());
    assert_eq!(result.locales_tried, vec![Locale::Zh]);
    assert_eq!(fetches.load(Ordering::SeqCst), 0);
}

// ── Reason ledger ─────────────────────────────────────────────────────

#[tokio::test]
async fn ledger_tracks_last_call() {
    let kb = knowledge_base();

    let result = search(&kb, Locale::En, "root canal").await;
    for hit in &result.hits {
        assert_eq!(kb.reasons().reasons_for(&hit.entry.id).as_ref(), Some(&hit.reasons));
    }
    assert_eq!(kb.reasons().len(), result.hits.len());

    search(&kb, Locale::En, "parking validation").await;
    assert!(kb.reasons().is_empty());
}

#[tokio::test]
async fn candidate_observer_sees_evaluations() {
    let traces: Arc<Mutex<Vec<String>>> = Arc::default();
    let sink = Arc::clone(&traces);
    let source = MemoryCorpusSource::new()
        .with_locale(Locale::En, EN_CORPUS)
        .with_locale(Locale::Zh, ZH_CORPUS);
    let kb = KnowledgeBase::new(source, SearchConfig::default())
        .expect("valid config")
        .with_candidate_observer(move |trace| {
            sink.lock().expect("lock").push(trace.entry_id.clone());
        });

    kb.search(Locale::En, "root canal", &SearchOptions::default())
        .await
        .expect("search");

    let traces = traces.lock().expect("lock");
    assert_eq!(traces.len(), 7);
    assert!(traces.contains(&"en-hours".to_string()));
}

// ── Corpus loading ────────────────────────────────────────────────────

#[tokio::test]
async fn corpus_is_fetched_once_per_locale() {
    let source = CountingSource::new();
    let fetches = Arc::clone(&source.fetches);
    let kb = KnowledgeBase::new(source, SearchConfig::default()).expect("valid config");

    for _ in 0..3 {
        kb.search(Locale::En, "third molar", &SearchOptions::default())
            .await
            .expect("search");
    }
    // One fetch for each locale, no matter how many searches.
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_searches_share_one_load() {
    let source = CountingSource::new().slow(Duration::from_millis(50));
    let fetches = Arc::clone(&source.fetches);
    let kb = Arc::new(KnowledgeBase::new(source, SearchConfig::default()).expect("valid config"));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let kb = Arc::clone(&kb);
            tokio::spawn(async move {
                kb.search(Locale::En, "root canal", &SearchOptions::default())
                    .await
            })
        })
        .collect();

    for outcome in futures::future::join_all(tasks).await {
        let result = outcome.expect("task").expect("search");
        assert_eq!(result.hits[0].entry.id, "en-rc");
    }
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_load_is_retried_on_next_call() {
    let source = CountingSource::new().failing_first(1);
    let fetches = Arc::clone(&source.fetches);
    let kb = KnowledgeBase::new(source, SearchConfig::default()).expect("valid config");

    let err = kb
        .search(Locale::En, "root canal", &SearchOptions::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("simulated outage"));
    assert!(!kb.is_loaded(Locale::En));

    let result = kb
        .search(Locale::En, "root canal", &SearchOptions::default())
        .await
        .expect("second attempt");
    assert_eq!(result.hits[0].entry.id, "en-rc");
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn warm_up_then_search_uses_cache() {
    let source = CountingSource::new();
    let fetches = Arc::clone(&source.fetches);
    let kb = KnowledgeBase::new(source, SearchConfig::default()).expect("valid config");

    for locale in Locale::all() {
        kb.load_corpus(*locale).await.expect("warm up");
    }
    assert_eq!(fetches.load(Ordering::SeqCst), 2);

    kb.search(Locale::Zh, "wisdom teeth", &SearchOptions::default())
        .await
        .expect("search");
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
}
