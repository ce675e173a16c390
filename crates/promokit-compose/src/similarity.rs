//! Pairwise template similarity for diversity filtering.

use std::collections::HashSet;

use promokit_core::{ComposeConfig, Template};

/// Pre-computed comparison sets for one template.
#[derive(Debug, Clone)]
pub struct Features {
    keywords: HashSet<String>,
    verticals: HashSet<String>,
    body_words: HashSet<String>,
}

impl Features {
    pub fn of(template: &Template) -> Self {
        Self {
            keywords: template.positive_keywords().collect(),
            verticals: template
                .verticals
                .iter()
                .map(|v| v.to_lowercase())
                .collect(),
            body_words: body_words(&template.body),
        }
    }
}

/// Weighted blend of keyword, vertical, and body-text Jaccard similarity.
pub fn similarity(a: &Features, b: &Features, cfg: &ComposeConfig) -> f64 {
    cfg.keyword_weight * jaccard(&a.keywords, &b.keywords)
        + cfg.vertical_weight * jaccard(&a.verticals, &b.verticals)
        + cfg.body_weight * jaccard(&a.body_words, &b.body_words)
}

/// Jaccard index of two sets. Two empty sets are identical (1.0), so
/// templates that both lack verticals compare as same-vertical rather
/// than unrelated.
fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        1.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Lowercase alphanumeric word set of a template body. Placeholder tokens
/// contribute their bare names, which is fine for comparing bodies to
/// each other.
fn body_words(body: &str) -> HashSet<String> {
    body.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_string())
        .collect()
}
