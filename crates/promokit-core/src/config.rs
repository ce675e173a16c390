//! Engine tuning configuration.
//!
//! Every constant the pipeline uses lives here so callers can override any
//! of them per engine instance; no stage reads hidden global state.

use serde::{Deserialize, Serialize};

/// Scorer weights and thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Baseline score for templates with no positive keywords.
    pub min_score: f64,
    /// Weight added for any keyword match.
    pub match_weight: f64,
    /// Extra weight on top of `match_weight` for an exact match.
    pub exact_bonus: f64,
    /// Fraction of `match_weight` awarded to a partial (substring) match.
    pub partial_weight: f64,
    /// Bonus for a vertical indicator hit; saturates at one unit
    /// regardless of how many verticals match.
    pub vertical_weight: f64,
    /// Word count above which the length penalty starts.
    pub length_threshold: usize,
    /// Penalty per word beyond `length_threshold`.
    pub length_penalty: f64,
    /// Matched-keyword ratio above which the boost applies.
    pub ratio_boost_threshold: f64,
    /// Boost factor: `score *= 1 + ratio * ratio_boost_factor`.
    pub ratio_boost_factor: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_score: 0.1,
            match_weight: 1.0,
            exact_bonus: 0.5,
            partial_weight: 0.5,
            vertical_weight: 0.3,
            length_threshold: 50,
            length_penalty: 0.005,
            ratio_boost_threshold: 0.5,
            ratio_boost_factor: 0.5,
        }
    }
}

/// Rotation windows, in hours.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationConfig {
    /// Window for the primary hard-exclusion form.
    pub window_hours: i64,
    /// Legacy form: last-used template is fully excluded below this.
    pub reuse_cooldown_hours: i64,
    /// Legacy form: vertical-mates of the last-used template are excluded
    /// below this.
    pub vertical_cooldown_hours: i64,
    /// Legacy form: up to this bound the last-used template must beat
    /// `score_gate_factor` times the candidate-set mean to reappear.
    pub score_gate_hours: i64,
    pub score_gate_factor: f64,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            window_hours: 24,
            reuse_cooldown_hours: 2,
            vertical_cooldown_hours: 6,
            score_gate_hours: 24,
            score_gate_factor: 1.5,
        }
    }
}

/// Composer thresholds and diversity weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposeConfig {
    /// Candidates scoring below this never surface.
    pub relevance_floor: f64,
    /// Pairwise similarity above this rejects a candidate.
    pub similarity_threshold: f64,
    /// Pool headroom multiplier over `max_suggestions` kept ahead of the
    /// diversity filter.
    pub headroom_factor: usize,
    /// Diversity blend weight for keyword-set Jaccard.
    pub keyword_weight: f64,
    /// Diversity blend weight for vertical-set Jaccard.
    pub vertical_weight: f64,
    /// Diversity blend weight for body word-overlap Jaccard.
    pub body_weight: f64,
    /// Per-rank confidence discount: `score * (1 - (rank-1) * rank_decay)`.
    pub rank_decay: f64,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            relevance_floor: 0.2,
            similarity_threshold: 0.7,
            headroom_factor: 2,
            keyword_weight: 0.4,
            vertical_weight: 0.3,
            body_weight: 0.3,
            rank_decay: 0.1,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub rotation: RotationConfig,
    #[serde(default)]
    pub compose: ComposeConfig,
}
