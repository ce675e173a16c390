//! Keyword extraction — turns raw post text into a normalized keyword bag.
//!
//! Total over any string input: empty, punctuation-only, or otherwise
//! degenerate text yields an empty `ExtractedPost`, never an error.

pub mod phrases;
pub mod stopwords;

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use promokit_core::ExtractedPost;
use stopwords::is_stop_word;

/// Tokens longer than this count as technical terms regardless of shape.
const TECHNICAL_LEN: usize = 6;
/// Minimum length for the capitalized-word pass.
const CAPITALIZED_LEN: usize = 3;
/// Minimum length for the general keyword pass.
const GENERAL_LEN: usize = 4;
/// Cap on keywords taken by the general pass.
const GENERAL_CAP: usize = 10;

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").unwrap());
static MENTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@\w+").unwrap());
static HASHTAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#(\w+)").unwrap());

/// Extract keywords, phrases, cleaned text, and the pre-filter word count
/// from raw post text.
pub fn extract(text: &str) -> ExtractedPost {
    let clean_text = normalize(text);
    if clean_text.is_empty() {
        return ExtractedPost::default();
    }

    // Word count reflects the raw tokenization, before any stop-word or
    // length filtering. The length penalty downstream must see verbose
    // posts at full size even though matching samples the filtered list.
    let raw_tokens: Vec<&str> = clean_text.split_whitespace().collect();
    let word_count = raw_tokens.len();

    // Punctuation-trimmed word list, original case preserved for the
    // capitalized-word pass.
    let words: Vec<String> = raw_tokens
        .iter()
        .map(|t| {
            t.trim_matches(|c: char| !c.is_alphanumeric())
                .to_string()
        })
        .filter(|t| !t.is_empty())
        .collect();
    let lower: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();

    // Survivors: lowercase tokens that pass length, stop-word, and shape
    // filters. Keyword passes sample these.
    let survivors: Vec<&str> = lower
        .iter()
        .map(String::as_str)
        .filter(|w| w.len() > 2 && !is_stop_word(w) && is_wordlike(w))
        .collect();

    let mut keywords: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    // Pass 1: technical terms — digits, hyphens, or long tokens.
    for &w in &survivors {
        if w.chars().any(|c| c.is_ascii_digit()) || w.contains('-') || w.len() >= TECHNICAL_LEN {
            push_unique(w, &mut keywords, &mut seen);
        }
    }

    // Pass 2: capitalized words from the original-case list (proper nouns,
    // brand names). Emitted lowercase; stop-word sentence starters skipped.
    for w in &words {
        if w.len() >= CAPITALIZED_LEN && is_capitalized(w) {
            let lw = w.to_lowercase();
            if !is_stop_word(&lw) {
                push_unique(&lw, &mut keywords, &mut seen);
            }
        }
    }

    // Pass 3: general keywords, first 10 found.
    let mut taken = 0;
    for &w in &survivors {
        if taken >= GENERAL_CAP {
            break;
        }
        if w.len() >= GENERAL_LEN {
            push_unique(w, &mut keywords, &mut seen);
            taken += 1;
        }
    }

    // Phrases come from the unfiltered lowercase word list so that
    // adjacency is preserved.
    for phrase in phrases::extract_phrases(&lower) {
        push_unique(&phrase, &mut keywords, &mut seen);
    }

    ExtractedPost {
        keywords,
        clean_text,
        word_count,
    }
}

/// Strip URLs and @mentions, unwrap #hashtags, drop characters outside
/// word characters and basic punctuation, and collapse whitespace.
fn normalize(text: &str) -> String {
    let text = URL_RE.replace_all(text, " ");
    let text = MENTION_RE.replace_all(&text, " ");
    let text = HASHTAG_RE.replace_all(&text, "$1");

    let filtered: String = text
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() || ".,!?'-".contains(c) {
                c
            } else {
                ' '
            }
        })
        .collect();

    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn push_unique(kw: &str, out: &mut Vec<String>, seen: &mut HashSet<String>) {
    if seen.insert(kw.to_string()) {
        out.push(kw.to_string());
    }
}

/// Alphanumeric token, hyphens allowed.
fn is_wordlike(token: &str) -> bool {
    !token.is_empty()
        && token.chars().any(|c| c.is_alphanumeric())
        && token.chars().all(|c| c.is_alphanumeric() || c == '-')
}

/// Capitalized-word shape: leading uppercase, alphabetic lowercase tail.
fn is_capitalized(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_uppercase() => chars.all(|c| c.is_lowercase() && c.is_alphabetic()),
        _ => false,
    }
}
