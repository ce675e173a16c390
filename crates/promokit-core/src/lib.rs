//! Promokit Core — shared types, configuration, errors, collaborator traits.

pub mod config;
pub mod error;
pub mod store;
pub mod types;

pub use config::{ComposeConfig, EngineConfig, RotationConfig, ScoringConfig};
pub use error::{Error, Result};
pub use store::{TemplateCatalog, UsageHistory};
pub use types::{
    Confidence, ExtractedPost, LastUsage, ScoredCandidate, SuggestRequest, Suggestion, Template,
    UsageRecord,
};
