//! Text normalization and tokenization.
//!
//! Both the corpus side (titles, excerpt + body) and the query side go
//! through the same two functions, so a tag like `"root-canal"` and a query
//! like `"Root canal?"` meet in the same normalized form `"root canal"`.

use std::collections::HashSet;

/// Minimum length, in characters, of a token without ideographs.
const MIN_TOKEN_CHARS: usize = 3;

/// Minimum length, in characters, of a token containing an ideograph.
const MIN_IDEOGRAPHIC_TOKEN_CHARS: usize = 1;

/// Lowercase `text`, turn every character that is not a letter, digit or
/// whitespace into a space, collapse runs of whitespace and trim.
///
/// CJK ideographs are letters, so mixed-script text keeps its Chinese part.
pub fn normalize(text: &str) -> String {
    let replaced: String = text
        .to_lowercase()
        .chars()
        .map(|ch| {
            if ch.is_alphanumeric() || ch.is_whitespace() {
                ch
            } else {
                ' '
            }
        })
        .collect();

    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether `ch` is a CJK ideograph.
pub fn is_ideographic(ch: char) -> bool {
    matches!(
        ch as u32,
        0x3400..=0x4DBF       // Extension A
            | 0x4E00..=0x9FFF // Unified Ideographs
            | 0xF900..=0xFAFF // Compatibility Ideographs
            | 0x20000..=0x2FA1F // Extensions B-F and supplement
            | 0x30000..=0x323AF // Extensions G and H
    )
}

fn min_token_chars(token: &str) -> usize {
    if token.chars().any(is_ideographic) {
        MIN_IDEOGRAPHIC_TOKEN_CHARS
    } else {
        MIN_TOKEN_CHARS
    }
}

/// Split `text` into a set of normalized tokens.
///
/// Raw tokens are dropped when they are stopwords or shorter than the
/// minimum length (1 character with an ideograph, 3 otherwise). When the
/// normalized text has more than one raw token, the whole normalized string
/// is added as one extra compound token so exact phrases can match.
pub fn tokenize(text: &str, stopwords: &HashSet<String>) -> HashSet<String> {
    let normalized = normalize(text);
    let raw: Vec<&str> = normalized.split_whitespace().collect();

    let mut tokens: HashSet<String> = raw
        .iter()
        .filter(|token| !stopwords.contains(**token))
        .filter(|token| token.chars().count() >= min_token_chars(token))
        .map(|token| (*token).to_string())
        .collect();

    if raw.len() > 1 {
        tokens.insert(normalized);
    }

    tokens
}
