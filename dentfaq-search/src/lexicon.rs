//! Stopwords, synonym groups and query expansion.
//!
//! A [`Lexicon`] is an immutable table: the scorer only ever asks it to
//! tokenize text and to expand a query. The built-in table covers English
//! and Chinese (traditional and simplified) dental vocabulary; a deployment
//! can replace it with [`Lexicon::from_json`] without touching the ranking
//! code.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, SearchError};
use crate::text::{normalize, tokenize};

const BUILTIN_STOPWORDS: &[&str] = &[
    // English
    "a", "about", "after", "all", "also", "am", "an", "and", "any", "are", "as", "at", "be",
    "been", "before", "but", "by", "can", "could", "did", "do", "does", "doing", "for", "from",
    "get", "got", "had", "has", "have", "he", "hello", "her", "here", "hers", "hi", "him",
    "his", "how", "i", "if", "in", "into", "is", "it", "its", "just", "know", "like", "many",
    "may", "me", "might", "mine", "more", "most", "much", "must", "my", "need", "no", "nor",
    "not", "of", "off", "on", "onto", "or", "our", "ours", "out", "over", "please", "shall",
    "she", "should", "so", "some", "tell", "than", "thank", "thanks", "that", "the", "their",
    "them", "then", "there", "these", "they", "this", "those", "to", "too", "under", "up",
    "very", "want", "was", "we", "were", "what", "when", "where", "which", "who", "whom",
    "whose", "why", "will", "with", "without", "would", "yet", "you", "your", "yours",
    // Chinese
    "的", "了", "是", "嗎", "吗", "呢", "吧", "啊", "我", "你", "您", "他", "她", "我們",
    "我们", "你們", "你们", "在", "有", "和", "與", "与", "及", "或", "也", "都", "就", "要",
    "會", "会", "可以", "怎麼", "怎么", "什麼", "什么", "如何", "為什麼", "为什么", "請問",
    "请问", "一下", "這", "这", "那", "哪", "個", "个",
];

const BUILTIN_SYNONYM_GROUPS: &[&[&str]] = &[
    &[
        "root canal", "root canals", "root canal treatment", "endodontic", "endodontics",
        "rct", "根管治療", "根管治疗", "抽神經", "抽神经",
    ],
    &[
        "implant", "implants", "dental implant", "dental implants", "植牙", "人工植牙",
        "種植牙", "种植牙",
    ],
    &["crown", "crowns", "dental crown", "dental crowns", "牙冠", "假牙冠"],
    &["extraction", "extractions", "tooth extraction", "pull a tooth", "拔牙"],
    &["wisdom tooth", "wisdom teeth", "third molar", "third molars", "智齒", "智齿"],
    &[
        "cleaning", "teeth cleaning", "scaling", "scale and polish", "洗牙", "潔牙", "洁牙",
    ],
    &[
        "whitening", "teeth whitening", "bleaching", "美白", "牙齒美白", "牙齿美白",
    ],
    &[
        "braces", "orthodontic", "orthodontics", "invisalign", "clear aligners", "矯正",
        "矫正", "牙齒矯正", "牙齿矫正",
    ],
    &["cavity", "cavities", "tooth decay", "caries", "蛀牙", "齲齒", "龋齿"],
    &["filling", "fillings", "補牙", "补牙"],
    &[
        "gum disease", "periodontitis", "periodontal", "gingivitis", "牙周病", "牙齦炎",
        "牙龈炎",
    ],
    &["denture", "dentures", "false teeth", "假牙", "活動假牙", "活动假牙"],
    &[
        "sensitivity", "sensitive teeth", "tooth sensitivity", "牙齒敏感", "牙齿敏感",
    ],
    &["toothache", "tooth pain", "牙痛", "牙疼"],
    &["x ray", "x rays", "xray", "radiograph", "x光"],
    &[
        "anesthesia", "anaesthesia", "anesthetic", "numbing", "麻醉",
    ],
    &["checkup", "check up", "dental exam", "檢查", "检查"],
];

/// Query tokens after synonym expansion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandedQuery {
    /// Query tokens plus every member of each synonym group they touched.
    pub tokens: HashSet<String>,
    /// `tokens` with multi-word tokens split into their words. Used only for
    /// title comparison.
    pub words: HashSet<String>,
    /// Whether any expanded token belongs to a synonym group.
    pub has_domain_term: bool,
}

impl ExpandedQuery {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// On-disk shape of a lexicon override file.
#[derive(Debug, Deserialize)]
struct LexiconFile {
    #[serde(default)]
    stopwords: Vec<String>,
    #[serde(default)]
    synonym_groups: Vec<Vec<String>>,
}

/// Immutable stopword and synonym table.
#[derive(Debug, Clone)]
pub struct Lexicon {
    stopwords: HashSet<String>,
    groups: Vec<Vec<String>>,
    /// Normalized term → index into `groups`.
    term_group: HashMap<String, usize>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Lexicon {
    /// The compiled-in English/Chinese dental lexicon.
    pub fn builtin() -> Self {
        let (lexicon, _duplicates) = Self::build(
            BUILTIN_STOPWORDS.iter().copied(),
            BUILTIN_SYNONYM_GROUPS.iter().map(|group| group.iter().copied()),
        );
        lexicon
    }

    /// Build a lexicon from stopwords and synonym groups.
    ///
    /// Every term is normalized. A term may belong to one group only.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Lexicon`] when a term appears in more than one
    /// group.
    pub fn new<S, G, T>(stopwords: S, groups: G) -> Result<Self>
    where
        S: IntoIterator,
        S::Item: AsRef<str>,
        G: IntoIterator,
        G::Item: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let (lexicon, duplicates) = Self::build(stopwords, groups);
        if duplicates.is_empty() {
            Ok(lexicon)
        } else {
            Err(SearchError::Lexicon(format!(
                "terms belong to more than one synonym group: {}",
                duplicates.join(", ")
            )))
        }
    }

    /// Parse a lexicon from JSON of the form
    /// `{"stopwords": [...], "synonym_groups": [[...], ...]}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: LexiconFile =
            serde_json::from_str(json).map_err(|e| SearchError::Lexicon(e.to_string()))?;
        Self::new(file.stopwords, file.synonym_groups)
    }

    /// Read a lexicon override file; see [`Lexicon::from_json`].
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Build the table, returning the terms that appeared in more than one
    /// group. The first group wins for such terms.
    fn build<S, G, T>(stopwords: S, groups: G) -> (Self, Vec<String>)
    where
        S: IntoIterator,
        S::Item: AsRef<str>,
        G: IntoIterator,
        G::Item: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let stopwords: HashSet<String> = stopwords
            .into_iter()
            .map(|word| normalize(word.as_ref()))
            .filter(|word| !word.is_empty())
            .collect();

        let mut built: Vec<Vec<String>> = Vec::new();
        let mut term_group: HashMap<String, usize> = HashMap::new();
        let mut duplicates = Vec::new();

        for group in groups {
            let index = built.len();
            let mut members: Vec<String> = Vec::new();
            for term in group {
                let term = normalize(term.as_ref());
                if term.is_empty() || members.contains(&term) {
                    continue;
                }
                match term_group.get(&term) {
                    Some(_) => duplicates.push(term),
                    None => {
                        term_group.insert(term.clone(), index);
                        members.push(term);
                    }
                }
            }
            if !members.is_empty() {
                built.push(members);
            }
        }

        let lexicon = Self {
            stopwords,
            groups: built,
            term_group,
        };
        (lexicon, duplicates)
    }

    pub fn stopwords(&self) -> &HashSet<String> {
        &self.stopwords
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    /// Number of synonym groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Members of the group `term` belongs to, if any. `term` must already
    /// be normalized.
    pub fn synonyms_of(&self, term: &str) -> Option<&[String]> {
        self.term_group
            .get(term)
            .map(|&index| self.groups[index].as_slice())
    }

    /// Whether `term` (normalized) belongs to any synonym group.
    pub fn is_domain_term(&self, term: &str) -> bool {
        self.term_group.contains_key(term)
    }

    /// Tokenize `text` with this lexicon's stopwords.
    pub fn tokenize(&self, text: &str) -> HashSet<String> {
        tokenize(text, &self.stopwords)
    }

    /// Expand a token set with every member of each synonym group it
    /// touches. Single pass: members added here do not trigger further
    /// groups.
    pub fn expand(&self, tokens: HashSet<String>) -> ExpandedQuery {
        let touched: HashSet<usize> = tokens
            .iter()
            .filter_map(|token| self.term_group.get(token).copied())
            .collect();

        let mut expanded = tokens;
        for &index in &touched {
            expanded.extend(self.groups[index].iter().cloned());
        }

        let words: HashSet<String> = expanded
            .iter()
            .flat_map(|token| token.split(' '))
            .filter(|word| !word.is_empty())
            .map(str::to_string)
            .collect();

        let has_domain_term = expanded.iter().any(|token| self.is_domain_term(token));

        ExpandedQuery {
            tokens: expanded,
            words,
            has_domain_term,
        }
    }

    /// Tokenize and expand raw query text.
    pub fn analyze_query(&self, text: &str) -> ExpandedQuery {
        self.expand(self.tokenize(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_no_cross_group_terms() {
        let (_, duplicates) = Lexicon::build(
            BUILTIN_STOPWORDS.iter().copied(),
            BUILTIN_SYNONYM_GROUPS.iter().map(|group| group.iter().copied()),
        );
        assert!(duplicates.is_empty(), "duplicated terms: {duplicates:?}");
    }

    #[test]
    fn builtin_has_every_group() {
        assert_eq!(Lexicon::builtin().group_count(), BUILTIN_SYNONYM_GROUPS.len());
    }

    #[test]
    fn builtin_terms_are_not_stopwords() {
        let lexicon = Lexicon::builtin();
        for group in BUILTIN_SYNONYM_GROUPS {
            for term in *group {
                assert!(!lexicon.is_stopword(&normalize(term)), "{term} is a stopword");
            }
        }
    }

    #[test]
    fn builtin_terms_are_normalized() {
        let lexicon = Lexicon::builtin();
        assert!(lexicon.is_domain_term("x ray"));
        assert!(lexicon.is_domain_term("根管治療"));
    }

    #[test]
    fn expand_adds_whole_group() {
        let lexicon = Lexicon::builtin();
        let query = lexicon.analyze_query("endodontic");
        assert!(query.tokens.contains("root canal"));
        assert!(query.tokens.contains("根管治療"));
        assert!(query.has_domain_term);
    }

    #[test]
    fn expand_splits_phrases_into_words() {
        let lexicon = Lexicon::builtin();
        let query = lexicon.analyze_query("endodontic");
        assert!(query.words.contains("root"));
        assert!(query.words.contains("canal"));
        assert!(query.words.contains("endodontic"));
    }

    #[test]
    fn expand_does_not_chain() {
        let lexicon = Lexicon::new(
            Vec::<String>::new(),
            vec![vec!["alpha", "beta"], vec!["gamma", "delta"]],
        )
        .expect("valid lexicon");
        let query = lexicon.expand(HashSet::from(["alpha".to_string()]));
        assert!(query.tokens.contains("beta"));
        assert!(!query.tokens.contains("gamma"));
    }

    #[test]
    fn plain_query_has_no_domain_term() {
        let lexicon = Lexicon::builtin();
        let query = lexicon.analyze_query("opening hours saturday");
        assert!(!query.has_domain_term);
        assert!(query.tokens.contains("opening"));
    }

    #[test]
    fn stopword_only_query_keeps_compound() {
        let lexicon = Lexicon::builtin();
        let query = lexicon.analyze_query("what is the");
        assert_eq!(query.tokens, HashSet::from(["what is the".to_string()]));
        assert!(!query.has_domain_term);
    }

    #[test]
    fn new_rejects_term_in_two_groups() {
        let err = Lexicon::new(
            Vec::<String>::new(),
            vec![vec!["crown"], vec!["Crown!"]],
        )
        .unwrap_err();
        assert!(err.to_string().contains("crown"));
    }

    #[test]
    fn from_json_parses_override() {
        let lexicon = Lexicon::from_json(
            r#"{"stopwords": ["The"], "synonym_groups": [["veneer", "瓷牙貼片"]]}"#,
        )
        .expect("parse");
        assert!(lexicon.is_stopword("the"));
        assert_eq!(lexicon.group_count(), 1);
        assert_eq!(
            lexicon.synonyms_of("veneer"),
            Some(["veneer".to_string(), "瓷牙貼片".to_string()].as_slice())
        );
    }

    #[test]
    fn from_json_rejects_garbage() {
        let err = Lexicon::from_json("not json").unwrap_err();
        assert!(matches!(err, SearchError::Lexicon(_)));
    }

    #[test]
    fn from_file_reads_override() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("lexicon.json");
        std::fs::write(&path, r#"{"synonym_groups": [["bridge", "牙橋"]]}"#).expect("write");
        let lexicon = Lexicon::from_file(&path).expect("load");
        assert!(lexicon.is_domain_term("牙橋"));
        assert!(lexicon.stopwords().is_empty());
    }

    #[test]
    fn from_file_missing_is_io_error() {
        let err = Lexicon::from_file(Path::new("/nonexistent/lexicon.json")).unwrap_err();
        assert!(matches!(err, SearchError::Io(_)));
    }
}
