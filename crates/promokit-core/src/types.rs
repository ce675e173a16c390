//! Data types for templates, extracted posts, usage history, and suggestions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marker prefix for negative (exclusionary) keywords.
pub const NEGATIVE_PREFIX: char = '-';

/// Category assigned when a template carries none.
pub const DEFAULT_CATEGORY: &str = "custom";

/// A reusable comment template.
///
/// Never mutated by the matching engine; `usage_count` is bumped only by
/// the store when the caller confirms a use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Matching keywords; entries starting with `-` are exclusionary.
    pub keywords: Vec<String>,
    /// Broader topic tags used for the secondary relevance bonus.
    #[serde(default)]
    pub verticals: Vec<String>,
    /// Comment body with embedded placeholder tokens (e.g. `{url}`).
    pub body: String,
    #[serde(default)]
    pub usage_count: u64,
}

impl Template {
    /// Effective category, defaulting when unset.
    pub fn category_or_default(&self) -> &str {
        self.category.as_deref().unwrap_or(DEFAULT_CATEGORY)
    }

    /// Non-negative keywords, lowercased for matching.
    pub fn positive_keywords(&self) -> impl Iterator<Item = String> + '_ {
        self.keywords
            .iter()
            .filter(|k| !k.starts_with(NEGATIVE_PREFIX))
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
    }

    /// Negative keywords with the `-` marker stripped, lowercased.
    pub fn negative_keywords(&self) -> impl Iterator<Item = String> + '_ {
        self.keywords
            .iter()
            .filter_map(|k| k.strip_prefix(NEGATIVE_PREFIX))
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
    }
}

/// Keywords and normalized text derived from one post. Built fresh for
/// every match request, never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedPost {
    pub keywords: Vec<String>,
    pub clean_text: String,
    /// Token count of `clean_text` before stop-word filtering; feeds the
    /// scorer's length penalty.
    pub word_count: usize,
}

/// One confirmed use of a template against a target. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    pub template_id: String,
    pub target_id: String,
    pub used_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

/// Coarse single-slot history view for the legacy rotation form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastUsage {
    pub template_id: String,
    pub verticals: Vec<String>,
    pub used_at: DateTime<Utc>,
}

/// A template paired with its relevance score for one post.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub template: Template,
    pub score: f64,
    pub matched_keywords: Vec<String>,
}

/// Confidence tier for a ranked suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
    VeryLow,
}

impl Confidence {
    /// Bucket a rank-discounted score into a tier.
    pub fn from_effective_score(score: f64) -> Self {
        if score >= 0.8 {
            Confidence::High
        } else if score >= 0.6 {
            Confidence::Medium
        } else if score >= 0.4 {
            Confidence::Low
        } else {
            Confidence::VeryLow
        }
    }
}

/// The engine's output unit: a ready-to-send comment suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub template_id: String,
    /// Body text with placeholders resolved.
    pub text: String,
    pub score: f64,
    pub matched_keywords: Vec<String>,
    /// 1-based position in the returned list.
    pub rank: usize,
    pub confidence: Confidence,
    pub is_preferred_category: bool,
    /// True when drawn from a non-preferred category to fill a shortfall.
    pub used_fallback: bool,
}

/// A match request against one target.
#[derive(Debug, Clone, Deserialize)]
pub struct SuggestRequest {
    pub post_text: String,
    pub target_id: String,
    #[serde(default)]
    pub preferred_category: Option<String>,
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
}

fn default_max_suggestions() -> usize {
    3
}

impl SuggestRequest {
    pub fn new(post_text: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self {
            post_text: post_text.into(),
            target_id: target_id.into(),
            preferred_category: None,
            max_suggestions: default_max_suggestions(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(keywords: &[&str]) -> Template {
        Template {
            id: "t1".into(),
            label: "Test".into(),
            category: None,
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            verticals: vec![],
            body: "Hello".into(),
            usage_count: 0,
        }
    }

    #[test]
    fn test_keyword_split() {
        let t = template(&["Car", "-Cheap", "repair shop", "-", "  "]);
        let pos: Vec<String> = t.positive_keywords().collect();
        assert_eq!(pos, vec!["car", "repair shop"]);
        let neg: Vec<String> = t.negative_keywords().collect();
        assert_eq!(neg, vec!["cheap"]);
    }

    #[test]
    fn test_default_category() {
        let t = template(&[]);
        assert_eq!(t.category_or_default(), "custom");
    }

    #[test]
    fn test_confidence_buckets() {
        assert_eq!(Confidence::from_effective_score(0.85), Confidence::High);
        assert_eq!(Confidence::from_effective_score(0.8), Confidence::High);
        assert_eq!(Confidence::from_effective_score(0.7), Confidence::Medium);
        assert_eq!(Confidence::from_effective_score(0.5), Confidence::Low);
        assert_eq!(Confidence::from_effective_score(0.1), Confidence::VeryLow);
    }
}
