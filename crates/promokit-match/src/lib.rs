//! Template relevance scoring.
//!
//! Pure functions over a template and an extracted post; scores are always
//! in `[0, 1]`. Negative keywords are an absolute veto: one hit zeroes the
//! template regardless of positive signal.

pub mod verticals;

use promokit_core::{ExtractedPost, ScoredCandidate, ScoringConfig, Template};
use verticals::indicators_for;

/// Score a template against an extracted post.
pub fn score(template: &Template, post: &ExtractedPost, cfg: &ScoringConfig) -> f64 {
    score_candidate_ref(template, post, cfg).0
}

/// Score a template and keep the matched keywords alongside.
pub fn score_candidate(
    template: Template,
    post: &ExtractedPost,
    cfg: &ScoringConfig,
) -> ScoredCandidate {
    let (score, matched_keywords) = score_candidate_ref(&template, post, cfg);
    ScoredCandidate {
        template,
        score,
        matched_keywords,
    }
}

fn score_candidate_ref(
    template: &Template,
    post: &ExtractedPost,
    cfg: &ScoringConfig,
) -> (f64, Vec<String>) {
    if template.keywords.is_empty() {
        return (cfg.min_score.clamp(0.0, 1.0), Vec::new());
    }

    // Negative keywords veto first; positives never rescue a vetoed
    // template.
    for neg in template.negative_keywords() {
        if post
            .keywords
            .iter()
            .any(|pk| pk == &neg || pk.contains(&neg) || neg.contains(pk.as_str()))
        {
            return (0.0, Vec::new());
        }
    }

    let positives: Vec<String> = template.positive_keywords().collect();
    if positives.is_empty() {
        // Only negative keywords, none of which fired: the template still
        // participates, weakly.
        return (cfg.min_score.clamp(0.0, 1.0), Vec::new());
    }

    let total_keywords = template.keywords.len() as f64;
    let mut raw = 0.0;
    let mut matched: Vec<String> = Vec::new();

    for kw in &positives {
        if post.keywords.iter().any(|pk| pk == kw) {
            raw += cfg.match_weight + cfg.exact_bonus;
            matched.push(kw.clone());
        } else if post
            .keywords
            .iter()
            .any(|pk| pk.contains(kw.as_str()) || kw.contains(pk.as_str()))
        {
            raw += cfg.match_weight * cfg.partial_weight;
            matched.push(kw.clone());
        }
    }

    raw += vertical_bonus(template, post, cfg);

    let mut score = raw / total_keywords;

    // Length penalty: verbose posts dilute relevance. Uses the pre-filter
    // word count on purpose.
    if post.word_count > cfg.length_threshold {
        score -= (post.word_count - cfg.length_threshold) as f64 * cfg.length_penalty;
        score = score.max(0.0);
    }

    // Ratio boost: templates where most keywords hit get amplified.
    let ratio = matched.len() as f64 / total_keywords;
    if ratio > cfg.ratio_boost_threshold {
        score *= 1.0 + ratio * cfg.ratio_boost_factor;
    }

    (score.clamp(0.0, 1.0), matched)
}

/// Vertical indicator bonus, saturating at one `vertical_weight` no matter
/// how many verticals match.
fn vertical_bonus(template: &Template, post: &ExtractedPost, cfg: &ScoringConfig) -> f64 {
    let clean_lower = post.clean_text.to_lowercase();
    for vertical in &template.verticals {
        let Some(indicators) = indicators_for(vertical) else {
            continue;
        };
        let hit = indicators.iter().any(|ind| {
            post.keywords.iter().any(|pk| pk.contains(ind)) || clean_lower.contains(ind)
        });
        if hit {
            return cfg.vertical_weight;
        }
    }
    0.0
}
