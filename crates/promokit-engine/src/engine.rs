//! Suggestion engine — coordinates extract → score → rotate → compose.

use chrono::Utc;
use tracing::{debug, info, warn};

use promokit_compose::ResolveContext;
use promokit_core::{
    EngineConfig, Result, SuggestRequest, Suggestion, TemplateCatalog, UsageHistory, UsageRecord,
};

/// Optional post-processing stage over the composed suggestions, e.g. an
/// AI-based re-ranker. Injected by the caller; the pipeline itself stays
/// a single code path.
pub trait SuggestionReranker: Send + Sync {
    /// Reorder (or prune) suggestions. Ranks are renumbered afterwards.
    fn rerank(&self, suggestions: Vec<Suggestion>) -> Vec<Suggestion>;
}

/// Top-level engine running the whole match pipeline.
///
/// Holds no cross-call state; concurrent requests need no coordination.
pub struct SuggestionEngine {
    config: EngineConfig,
    reranker: Option<Box<dyn SuggestionReranker>>,
}

impl SuggestionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            reranker: None,
        }
    }

    /// Attach a post-processing reranker.
    pub fn with_reranker(mut self, reranker: Box<dyn SuggestionReranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Produce ranked suggestions for one post against one target.
    ///
    /// Never fails: an unavailable catalog or an empty pipeline stage
    /// degrades to an empty list.
    pub fn suggest(
        &self,
        catalog: &dyn TemplateCatalog,
        history: &dyn UsageHistory,
        request: &SuggestRequest,
        ctx: &ResolveContext,
    ) -> Vec<Suggestion> {
        let templates = match catalog.all() {
            Ok(t) => t,
            Err(e) => {
                warn!("Template catalog unavailable, returning no suggestions: {}", e);
                return Vec::new();
            }
        };
        if templates.is_empty() {
            return Vec::new();
        }

        let post = promokit_extract::extract(&request.post_text);
        debug!(
            "Extracted {} keywords from {} words",
            post.keywords.len(),
            post.word_count
        );

        let scored: Vec<_> = templates
            .into_iter()
            .map(|t| promokit_match::score_candidate(t, &post, &self.config.scoring))
            .collect();

        let rotated = promokit_rotate::filter_recent(
            scored,
            &request.target_id,
            history,
            &self.config.rotation,
        );

        let mut suggestions = promokit_compose::compose(
            rotated,
            request.preferred_category.as_deref(),
            request.max_suggestions,
            &self.config.compose,
            ctx,
        );

        if let Some(reranker) = &self.reranker {
            suggestions = reranker.rerank(suggestions);
            for (i, s) in suggestions.iter_mut().enumerate() {
                s.rank = i + 1;
            }
        }

        info!(
            "Suggest for target {}: {} suggestions",
            request.target_id,
            suggestions.len()
        );
        suggestions
    }

    /// Record a confirmed use of a suggestion. Called by the caller after
    /// the user acts; the match path itself never writes history.
    pub fn record_confirmed(
        &self,
        history: &dyn UsageHistory,
        template_id: &str,
        target_id: &str,
        snippet: Option<String>,
    ) -> Result<()> {
        history.record_usage(&UsageRecord {
            template_id: template_id.to_string(),
            target_id: target_id.to_string(),
            used_at: Utc::now(),
            snippet,
        })
    }
}

impl Default for SuggestionEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promokit_core::{Error, LastUsage, Template};
    use std::collections::HashSet;

    struct StubCatalog {
        templates: Vec<Template>,
        fail: bool,
    }

    impl TemplateCatalog for StubCatalog {
        fn all(&self) -> Result<Vec<Template>> {
            if self.fail {
                Err(Error::Catalog("offline".into()))
            } else {
                Ok(self.templates.clone())
            }
        }

        fn get(&self, id: &str) -> Result<Option<Template>> {
            Ok(self.templates.iter().find(|t| t.id == id).cloned())
        }
    }

    struct EmptyHistory;

    impl UsageHistory for EmptyHistory {
        fn recently_used(&self, _: &str, _: i64) -> Result<HashSet<String>> {
            Ok(HashSet::new())
        }

        fn last_used(&self, _: &str) -> Result<Option<LastUsage>> {
            Ok(None)
        }

        fn record_usage(&self, _: &UsageRecord) -> Result<()> {
            Ok(())
        }
    }

    fn template(id: &str, keywords: &[&str], body: &str) -> Template {
        Template {
            id: id.into(),
            label: id.into(),
            category: None,
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            verticals: vec![],
            body: body.into(),
            usage_count: 0,
        }
    }

    #[test]
    fn test_catalog_failure_yields_empty() {
        let engine = SuggestionEngine::default();
        let catalog = StubCatalog {
            templates: vec![],
            fail: true,
        };
        let out = engine.suggest(
            &catalog,
            &EmptyHistory,
            &SuggestRequest::new("car repairs needed", "g1"),
            &ResolveContext::default(),
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_empty_catalog_yields_empty() {
        let engine = SuggestionEngine::default();
        let catalog = StubCatalog {
            templates: vec![],
            fail: false,
        };
        let out = engine.suggest(
            &catalog,
            &EmptyHistory,
            &SuggestRequest::new("car repairs needed", "g1"),
            &ResolveContext::default(),
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_basic_suggestion_flow() {
        let engine = SuggestionEngine::default();
        let catalog = StubCatalog {
            templates: vec![
                template("t1", &["plumber", "pipes"], "We do plumbing, visit {url}"),
                template("t2", &["yacht"], "Yacht charters available"),
            ],
            fail: false,
        };
        let out = engine.suggest(
            &catalog,
            &EmptyHistory,
            &SuggestRequest::new("need a plumber for broken pipes", "g1"),
            &ResolveContext::default(),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].template_id, "t1");
        assert_eq!(out[0].rank, 1);
        assert!(!out[0].text.contains("{url}"));
    }

    struct ReverseReranker;

    impl SuggestionReranker for ReverseReranker {
        fn rerank(&self, mut suggestions: Vec<Suggestion>) -> Vec<Suggestion> {
            suggestions.reverse();
            suggestions
        }
    }

    #[test]
    fn test_reranker_renumbers() {
        let engine = SuggestionEngine::default().with_reranker(Box::new(ReverseReranker));
        let catalog = StubCatalog {
            templates: vec![
                template("t1", &["plumber"], "First plumbing offer body"),
                template("t2", &["plumber", "pipes"], "Completely different pipe service text"),
            ],
            fail: false,
        };
        let out = engine.suggest(
            &catalog,
            &EmptyHistory,
            &SuggestRequest::new("need a plumber for broken pipes", "g1"),
            &ResolveContext::default(),
        );
        assert_eq!(out.len(), 2);
        // Reversed order, ranks renumbered from 1.
        assert_eq!(out[0].rank, 1);
        assert_eq!(out[1].rank, 2);
        assert_eq!(out[0].template_id, "t2");
    }
}
