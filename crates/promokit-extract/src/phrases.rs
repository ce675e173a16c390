//! Contiguous 2- and 3-word phrase extraction.

use crate::stopwords::is_stop_word;

/// A phrase survives only when none of its words is a stop word and the
/// joined text is longer than this (2-word form).
const MIN_BIGRAM_LEN: usize = 6;
/// Joined-length minimum for the 3-word form.
const MIN_TRIGRAM_LEN: usize = 10;
/// Cap across both phrase lengths.
const MAX_PHRASES: usize = 5;

/// Extract multi-word phrases from the cleaned lowercase word list.
///
/// The input is the full tokenization (not the stop-word-filtered one) so
/// that word adjacency in the original text is preserved.
pub fn extract_phrases(words: &[String]) -> Vec<String> {
    let mut phrases: Vec<String> = Vec::new();

    for window in words.windows(2) {
        if phrases.len() >= MAX_PHRASES {
            return phrases;
        }
        if window.iter().all(|w| !is_stop_word(w)) {
            let phrase = window.join(" ");
            if phrase.len() > MIN_BIGRAM_LEN && !phrases.contains(&phrase) {
                phrases.push(phrase);
            }
        }
    }

    for window in words.windows(3) {
        if phrases.len() >= MAX_PHRASES {
            break;
        }
        if window.iter().all(|w| !is_stop_word(w)) {
            let phrase = window.join(" ");
            if phrase.len() > MIN_TRIGRAM_LEN && !phrases.contains(&phrase) {
                phrases.push(phrase);
            }
        }
    }

    phrases
}
