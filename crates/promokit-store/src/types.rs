//! Store-level data types.

use serde::{Deserialize, Serialize};

/// Store-level statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_templates: i64,
    pub total_usage_records: i64,
    pub distinct_targets: i64,
    pub db_path: String,
}
