//! Collaborator interfaces for template and usage-history persistence.
//!
//! The pipeline stages only ever see these traits; the concrete SQLite
//! implementation lives in `promokit-store`. Callers may substitute any
//! backend (or a test stub) without touching the engine.

use std::collections::HashSet;

use crate::error::Result;
use crate::types::{LastUsage, Template, UsageRecord};

/// Read access to the template catalog.
pub trait TemplateCatalog {
    /// Full catalog.
    fn all(&self) -> Result<Vec<Template>>;

    /// Single template lookup.
    fn get(&self, id: &str) -> Result<Option<Template>>;
}

/// Read/append access to the usage history.
///
/// Reads back rotation decisions; the write is invoked by the caller after
/// the user confirms a suggestion, never by the engine's match path.
pub trait UsageHistory {
    /// Template IDs used against `target_id` within the last
    /// `window_hours` hours.
    fn recently_used(&self, target_id: &str, window_hours: i64) -> Result<HashSet<String>>;

    /// Coarse single-slot view: the most recent use against `target_id`.
    fn last_used(&self, target_id: &str) -> Result<Option<LastUsage>>;

    /// Append one confirmed use. Records are append-only.
    fn record_usage(&self, record: &UsageRecord) -> Result<()>;
}
