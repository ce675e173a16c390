//! Database schema SQL.

/// Template catalog and append-only usage log.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS templates (
    id TEXT PRIMARY KEY,
    label TEXT NOT NULL,
    category TEXT,
    keywords_json TEXT NOT NULL,
    verticals_json TEXT NOT NULL,
    body TEXT NOT NULL,
    usage_count INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    updated_at INTEGER
);

CREATE INDEX IF NOT EXISTS idx_templates_category ON templates(category);

CREATE TABLE IF NOT EXISTS usage_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    template_id TEXT NOT NULL REFERENCES templates(id) ON DELETE CASCADE,
    target_id TEXT NOT NULL,
    used_at INTEGER NOT NULL,
    snippet TEXT
);

CREATE INDEX IF NOT EXISTS idx_usage_target ON usage_log(target_id, used_at);
CREATE INDEX IF NOT EXISTS idx_usage_template ON usage_log(template_id);
"#;
