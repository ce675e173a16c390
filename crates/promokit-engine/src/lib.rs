//! Promokit Engine — the full match pipeline behind one entry point.

pub mod engine;

pub use engine::{SuggestionEngine, SuggestionReranker};
pub use promokit_compose::ResolveContext;
pub use promokit_core::{EngineConfig, SuggestRequest, Suggestion};
