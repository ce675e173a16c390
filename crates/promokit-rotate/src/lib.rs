//! Anti-repetition rotation filtering.
//!
//! Removes templates recently used against the same target. Both forms
//! fail open: if the history backend is unavailable the unfiltered
//! candidates come back rather than blocking suggestion output entirely.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use promokit_core::{LastUsage, RotationConfig, ScoredCandidate, UsageHistory};

/// Primary form: hard-exclude every template used against `target_id`
/// within the configured window.
pub fn filter_recent(
    candidates: Vec<ScoredCandidate>,
    target_id: &str,
    history: &dyn UsageHistory,
    cfg: &RotationConfig,
) -> Vec<ScoredCandidate> {
    let used = match history.recently_used(target_id, cfg.window_hours) {
        Ok(set) => set,
        Err(e) => {
            warn!(
                "Usage history unavailable for target {}, skipping rotation: {}",
                target_id, e
            );
            return candidates;
        }
    };

    if used.is_empty() {
        return candidates;
    }

    let before = candidates.len();
    let filtered: Vec<ScoredCandidate> = candidates
        .into_iter()
        .filter(|c| !used.contains(&c.template.id))
        .collect();
    debug!(
        "Rotation for target {}: {} of {} candidates excluded",
        target_id,
        before - filtered.len(),
        before
    );
    filtered
}

/// Legacy coarse form for backends that only keep a single last-used slot
/// per target.
///
/// Tiered on hours since the last use:
/// - under `reuse_cooldown_hours`: the last-used template is excluded;
/// - up to `vertical_cooldown_hours`: any candidate sharing a vertical tag
///   with the last-used template is excluded;
/// - up to `score_gate_hours`: the last-used template passes only when its
///   score exceeds `score_gate_factor` times the candidate-set mean;
/// - beyond that: no restriction.
pub fn filter_coarse(
    candidates: Vec<ScoredCandidate>,
    last: Option<&LastUsage>,
    now: DateTime<Utc>,
    cfg: &RotationConfig,
) -> Vec<ScoredCandidate> {
    let Some(last) = last else {
        return candidates;
    };

    let elapsed_hours = (now - last.used_at).num_minutes() as f64 / 60.0;
    if elapsed_hours < 0.0 {
        // Clock skew in the history record: fail open.
        warn!(
            "Last-usage timestamp for template {} is in the future, skipping rotation",
            last.template_id
        );
        return candidates;
    }

    if elapsed_hours < cfg.reuse_cooldown_hours as f64 {
        return candidates
            .into_iter()
            .filter(|c| c.template.id != last.template_id)
            .collect();
    }

    if elapsed_hours < cfg.vertical_cooldown_hours as f64 {
        return candidates
            .into_iter()
            .filter(|c| !shares_vertical(c, last))
            .collect();
    }

    if elapsed_hours < cfg.score_gate_hours as f64 {
        let mean = mean_score(&candidates);
        let gate = cfg.score_gate_factor * mean;
        return candidates
            .into_iter()
            .filter(|c| c.template.id != last.template_id || c.score > gate)
            .collect();
    }

    candidates
}

fn shares_vertical(candidate: &ScoredCandidate, last: &LastUsage) -> bool {
    candidate.template.verticals.iter().any(|v| {
        last.verticals
            .iter()
            .any(|lv| lv.eq_ignore_ascii_case(v))
    })
}

fn mean_score(candidates: &[ScoredCandidate]) -> f64 {
    if candidates.is_empty() {
        return 0.0;
    }
    candidates.iter().map(|c| c.score).sum::<f64>() / candidates.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use promokit_core::{Error, Result, Template, UsageRecord};
    use std::collections::HashSet;

    struct StubHistory {
        used: HashSet<String>,
        fail: bool,
    }

    impl UsageHistory for StubHistory {
        fn recently_used(&self, _target_id: &str, _window_hours: i64) -> Result<HashSet<String>> {
            if self.fail {
                Err(Error::History("backend down".into()))
            } else {
                Ok(self.used.clone())
            }
        }

        fn last_used(&self, _target_id: &str) -> Result<Option<LastUsage>> {
            Ok(None)
        }

        fn record_usage(&self, _record: &UsageRecord) -> Result<()> {
            Ok(())
        }
    }

    fn candidate(id: &str, score: f64, verticals: &[&str]) -> ScoredCandidate {
        ScoredCandidate {
            template: Template {
                id: id.into(),
                label: id.into(),
                category: None,
                keywords: vec!["kw".into()],
                verticals: verticals.iter().map(|s| s.to_string()).collect(),
                body: "body".into(),
                usage_count: 0,
            },
            score,
            matched_keywords: vec![],
        }
    }

    fn last(id: &str, hours_ago: i64, verticals: &[&str]) -> LastUsage {
        LastUsage {
            template_id: id.into(),
            verticals: verticals.iter().map(|s| s.to_string()).collect(),
            used_at: Utc::now() - Duration::hours(hours_ago),
        }
    }

    #[test]
    fn test_recent_exclusion() {
        let history = StubHistory {
            used: ["t1".to_string()].into_iter().collect(),
            fail: false,
        };
        let out = filter_recent(
            vec![candidate("t1", 0.9, &[]), candidate("t2", 0.5, &[])],
            "g1",
            &history,
            &RotationConfig::default(),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].template.id, "t2");
    }

    #[test]
    fn test_fail_open() {
        let history = StubHistory {
            used: ["t1".to_string()].into_iter().collect(),
            fail: true,
        };
        let out = filter_recent(
            vec![candidate("t1", 0.9, &[]), candidate("t2", 0.5, &[])],
            "g1",
            &history,
            &RotationConfig::default(),
        );
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_coarse_fresh_use_blocks_template() {
        let cands = vec![candidate("t1", 0.9, &[]), candidate("t2", 0.5, &[])];
        let out = filter_coarse(
            cands,
            Some(&last("t1", 1, &[])),
            Utc::now(),
            &RotationConfig::default(),
        );
        assert!(out.iter().all(|c| c.template.id != "t1"));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_coarse_vertical_cooldown() {
        let cands = vec![
            candidate("t1", 0.9, &["automotive"]),
            candidate("t2", 0.5, &["automotive"]),
            candidate("t3", 0.4, &["food"]),
        ];
        let out = filter_coarse(
            cands,
            Some(&last("t1", 4, &["automotive"])),
            Utc::now(),
            &RotationConfig::default(),
        );
        let ids: Vec<&str> = out.iter().map(|c| c.template.id.as_str()).collect();
        assert_eq!(ids, vec!["t3"]);
    }

    #[test]
    fn test_coarse_score_gate() {
        // Mean score 0.5; gate 0.75. The last-used template only returns
        // when it clears the gate.
        let strong = vec![candidate("t1", 0.9, &[]), candidate("t2", 0.1, &[])];
        let out = filter_coarse(
            strong,
            Some(&last("t1", 12, &[])),
            Utc::now(),
            &RotationConfig::default(),
        );
        assert!(out.iter().any(|c| c.template.id == "t1"));

        let weak = vec![candidate("t1", 0.6, &[]), candidate("t2", 0.6, &[])];
        let out = filter_coarse(
            weak,
            Some(&last("t1", 12, &[])),
            Utc::now(),
            &RotationConfig::default(),
        );
        assert!(out.iter().all(|c| c.template.id != "t1"));
        assert!(out.iter().any(|c| c.template.id == "t2"));
    }

    #[test]
    fn test_coarse_old_use_unrestricted() {
        let cands = vec![candidate("t1", 0.9, &[])];
        let out = filter_coarse(
            cands,
            Some(&last("t1", 30, &[])),
            Utc::now(),
            &RotationConfig::default(),
        );
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_coarse_no_history() {
        let cands = vec![candidate("t1", 0.9, &[])];
        let out = filter_coarse(cands, None, Utc::now(), &RotationConfig::default());
        assert_eq!(out.len(), 1);
    }
}
