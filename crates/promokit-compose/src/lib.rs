//! Suggestion composition — turns rotated, scored candidates into a
//! ranked, diversity-filtered, placeholder-resolved suggestion list.

pub mod placeholder;
pub mod similarity;

use tracing::debug;

use promokit_core::{ComposeConfig, Confidence, ScoredCandidate, Suggestion};

pub use placeholder::{resolve, ResolveContext};
use similarity::Features;

struct PoolEntry {
    candidate: ScoredCandidate,
    is_preferred: bool,
    used_fallback: bool,
}

/// Compose the final suggestion list.
///
/// Candidates below the relevance floor never surface. When a preferred
/// category is set, its templates are pooled first; non-preferred
/// templates backfill a shortfall and carry `used_fallback`. The pool is
/// kept at `headroom_factor * max_suggestions` entries so the diversity
/// filter has room to reject near-duplicates before the final truncation.
pub fn compose(
    candidates: Vec<ScoredCandidate>,
    preferred_category: Option<&str>,
    max_suggestions: usize,
    cfg: &ComposeConfig,
    ctx: &ResolveContext,
) -> Vec<Suggestion> {
    if max_suggestions == 0 {
        return Vec::new();
    }

    let floored: Vec<ScoredCandidate> = candidates
        .into_iter()
        .filter(|c| c.score >= cfg.relevance_floor)
        .collect();

    let headroom = cfg.headroom_factor.max(1) * max_suggestions;
    let mut pool = build_pool(floored, preferred_category, headroom);

    // Stable sort: preferred-category entries first, then descending
    // score. Ties keep their pool order.
    pool.sort_by(|a, b| {
        b.is_preferred
            .cmp(&a.is_preferred)
            .then_with(|| b.candidate.score.total_cmp(&a.candidate.score))
    });

    let accepted = diversity_filter(pool, headroom, cfg);
    debug!("Composer accepted {} candidates after diversity", accepted.len());

    emit(accepted, max_suggestions, cfg, ctx)
}

fn build_pool(
    floored: Vec<ScoredCandidate>,
    preferred_category: Option<&str>,
    headroom: usize,
) -> Vec<PoolEntry> {
    let Some(preferred) = preferred_category else {
        // No preference: a single pool, nothing is a fallback.
        return floored
            .into_iter()
            .map(|candidate| PoolEntry {
                candidate,
                is_preferred: false,
                used_fallback: false,
            })
            .collect();
    };

    let (matches, mut others): (Vec<_>, Vec<_>) = floored
        .into_iter()
        .partition(|c| c.template.category_or_default().eq_ignore_ascii_case(preferred));

    let mut pool: Vec<PoolEntry> = matches
        .into_iter()
        .map(|candidate| PoolEntry {
            candidate,
            is_preferred: true,
            used_fallback: false,
        })
        .collect();

    if pool.len() < headroom {
        // Shortfall: backfill with the strongest cross-category
        // candidates, flagged as fallbacks.
        others.sort_by(|a, b| b.score.total_cmp(&a.score));
        let need = headroom - pool.len();
        pool.extend(others.into_iter().take(need).map(|candidate| PoolEntry {
            candidate,
            is_preferred: false,
            used_fallback: true,
        }));
    }

    pool
}

/// Keep the top candidate unconditionally; every later candidate must stay
/// under the similarity threshold against all already-accepted ones.
fn diversity_filter(pool: Vec<PoolEntry>, headroom: usize, cfg: &ComposeConfig) -> Vec<PoolEntry> {
    let mut accepted: Vec<(PoolEntry, Features)> = Vec::new();

    for entry in pool {
        if accepted.len() >= headroom {
            break;
        }
        let features = Features::of(&entry.candidate.template);
        let too_similar = accepted
            .iter()
            .any(|(_, f)| similarity::similarity(&features, f, cfg) > cfg.similarity_threshold);
        if accepted.is_empty() || !too_similar {
            accepted.push((entry, features));
        }
    }

    accepted.into_iter().map(|(entry, _)| entry).collect()
}

/// Resolve placeholders and emit ranked suggestions. Each candidate is
/// resolved independently so a degenerate entry can be dropped without
/// touching the rest of the batch.
fn emit(
    accepted: Vec<PoolEntry>,
    max_suggestions: usize,
    cfg: &ComposeConfig,
    ctx: &ResolveContext,
) -> Vec<Suggestion> {
    let mut suggestions = Vec::with_capacity(max_suggestions);

    for entry in accepted.into_iter().take(max_suggestions) {
        let text = placeholder::resolve(&entry.candidate.template.body, ctx);
        if text.trim().is_empty() {
            // A template whose body resolves to nothing is unusable; skip
            // it rather than aborting the batch.
            continue;
        }
        let rank = suggestions.len() + 1;
        let effective = entry.candidate.score * (1.0 - (rank - 1) as f64 * cfg.rank_decay);
        suggestions.push(Suggestion {
            template_id: entry.candidate.template.id.clone(),
            text,
            score: entry.candidate.score,
            matched_keywords: entry.candidate.matched_keywords.clone(),
            rank,
            confidence: Confidence::from_effective_score(effective.max(0.0)),
            is_preferred_category: entry.is_preferred,
            used_fallback: entry.used_fallback,
        });
    }

    suggestions
}
