//! SQLite-backed template catalog and usage history.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use promokit_core::{
    Error, LastUsage, Result, Template, TemplateCatalog, UsageHistory, UsageRecord,
};

use crate::schema::SCHEMA_SQL;
use crate::types::StoreStats;

/// SQLite store holding the template catalog and the append-only usage
/// log. Timestamps are epoch milliseconds.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SqliteStore {
    /// Open or create the store.
    ///
    /// `db_dir` is the data directory; the file will be `db_dir/promokit.db`.
    pub fn open(db_dir: impl AsRef<Path>) -> Result<Self> {
        let db_dir = db_dir.as_ref();
        std::fs::create_dir_all(db_dir).map_err(|e| Error::Storage(e.to_string()))?;
        let db_path = db_dir.join("promokit.db");

        let conn = Self::create_connection(&db_path)?;
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::Database(format!("Schema init failed: {}", e)))?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path,
        };

        let template_count = store.count_templates()?;
        info!(
            "SqliteStore initialized: {} templates, path={}",
            template_count,
            store.db_path.display()
        );

        Ok(store)
    }

    fn create_connection(db_path: &Path) -> Result<Connection> {
        let conn = Connection::open(db_path).map_err(|e| Error::Database(e.to_string()))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(conn)
    }

    // ---------------------------------------------------------------
    // Template CRUD (authoring flow)
    // ---------------------------------------------------------------

    /// Insert or replace a template. `usage_count` is preserved on
    /// replace.
    pub fn upsert_template(&self, template: &Template) -> Result<()> {
        let keywords_json = serde_json::to_string(&template.keywords)?;
        let verticals_json = serde_json::to_string(&template.verticals)?;
        let now = Utc::now().timestamp_millis();

        let conn = self.conn.lock();
        conn.prepare_cached(
            "INSERT INTO templates (id, label, category, keywords_json, verticals_json, body, usage_count, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                 label = excluded.label,
                 category = excluded.category,
                 keywords_json = excluded.keywords_json,
                 verticals_json = excluded.verticals_json,
                 body = excluded.body,
                 updated_at = excluded.created_at",
        )
        .map_err(|e| Error::Database(e.to_string()))?
        .execute(params![
            template.id,
            template.label,
            template.category,
            keywords_json,
            verticals_json,
            template.body,
            template.usage_count as i64,
            now,
        ])
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    /// Fetch one template.
    pub fn get_template(&self, id: &str) -> Result<Option<Template>> {
        let conn = self.conn.lock();
        let result = conn
            .prepare_cached(
                "SELECT id, label, category, keywords_json, verticals_json, body, usage_count
                 FROM templates WHERE id = ?1",
            )
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![id], Self::row_to_template)
            .optional()
            .map_err(|e| Error::Database(e.to_string()));
        result
    }

    /// All templates, insertion order.
    pub fn list_templates(&self) -> Result<Vec<Template>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT id, label, category, keywords_json, verticals_json, body, usage_count
                 FROM templates ORDER BY created_at, id",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map([], Self::row_to_template)
            .map_err(|e| Error::Database(e.to_string()))?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::Database(e.to_string()))
    }

    /// Templates in one category.
    pub fn list_by_category(&self, category: &str) -> Result<Vec<Template>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT id, label, category, keywords_json, verticals_json, body, usage_count
                 FROM templates WHERE category = ?1 ORDER BY created_at, id",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![category], Self::row_to_template)
            .map_err(|e| Error::Database(e.to_string()))?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::Database(e.to_string()))
    }

    /// Delete a template and its usage rows (cascade).
    pub fn delete_template(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let count = conn
            .execute("DELETE FROM templates WHERE id = ?1", params![id])
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Count templates.
    pub fn count_templates(&self) -> Result<i64> {
        let conn = self.conn.lock();
        conn.query_row("SELECT COUNT(*) FROM templates", [], |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()))
    }

    /// Store-level statistics.
    pub fn stats(&self) -> Result<StoreStats> {
        let conn = self.conn.lock();
        let total_templates: i64 = conn
            .query_row("SELECT COUNT(*) FROM templates", [], |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()))?;
        let total_usage_records: i64 = conn
            .query_row("SELECT COUNT(*) FROM usage_log", [], |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()))?;
        let distinct_targets: i64 = conn
            .query_row(
                "SELECT COUNT(DISTINCT target_id) FROM usage_log",
                [],
                |row| row.get(0),
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(StoreStats {
            total_templates,
            total_usage_records,
            distinct_targets,
            db_path: self.db_path.display().to_string(),
        })
    }

    fn row_to_template(row: &Row<'_>) -> rusqlite::Result<Template> {
        let keywords_json: String = row.get(3)?;
        let verticals_json: String = row.get(4)?;
        Ok(Template {
            id: row.get(0)?,
            label: row.get(1)?,
            category: row.get(2)?,
            keywords: serde_json::from_str(&keywords_json).unwrap_or_default(),
            verticals: serde_json::from_str(&verticals_json).unwrap_or_default(),
            body: row.get(5)?,
            usage_count: row.get::<_, i64>(6)?.max(0) as u64,
        })
    }

    fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

impl TemplateCatalog for SqliteStore {
    fn all(&self) -> Result<Vec<Template>> {
        self.list_templates()
    }

    fn get(&self, id: &str) -> Result<Option<Template>> {
        self.get_template(id)
    }
}

impl UsageHistory for SqliteStore {
    fn recently_used(&self, target_id: &str, window_hours: i64) -> Result<HashSet<String>> {
        let cutoff = Utc::now().timestamp_millis() - window_hours * 3_600_000;
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT DISTINCT template_id FROM usage_log
                 WHERE target_id = ?1 AND used_at >= ?2",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![target_id, cutoff], |row| row.get::<_, String>(0))
            .map_err(|e| Error::Database(e.to_string()))?;
        rows.collect::<std::result::Result<HashSet<_>, _>>()
            .map_err(|e| Error::Database(e.to_string()))
    }

    fn last_used(&self, target_id: &str) -> Result<Option<LastUsage>> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached(
                "SELECT u.template_id, u.used_at, t.verticals_json
                 FROM usage_log u JOIN templates t ON t.id = u.template_id
                 WHERE u.target_id = ?1
                 ORDER BY u.used_at DESC LIMIT 1",
            )
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![target_id], |row| {
                let template_id: String = row.get(0)?;
                let used_at: i64 = row.get(1)?;
                let verticals_json: String = row.get(2)?;
                Ok((template_id, used_at, verticals_json))
            })
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(row.map(|(template_id, used_at, verticals_json)| LastUsage {
            template_id,
            verticals: serde_json::from_str(&verticals_json).unwrap_or_default(),
            used_at: Self::millis_to_datetime(used_at),
        }))
    }

    /// Append one confirmed use and bump the template's usage count, in a
    /// single transaction.
    fn record_usage(&self, record: &UsageRecord) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| Error::Database(e.to_string()))?;
        tx.execute(
            "INSERT INTO usage_log (template_id, target_id, used_at, snippet)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.template_id,
                record.target_id,
                record.used_at.timestamp_millis(),
                record.snippet,
            ],
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        let updated = tx
            .execute(
                "UPDATE templates SET usage_count = usage_count + 1 WHERE id = ?1",
                params![record.template_id],
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        if updated == 0 {
            return Err(Error::NotFound(format!(
                "template {} for usage record",
                record.template_id
            )));
        }
        tx.commit().map_err(|e| Error::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn test_store() -> (SqliteStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn template(id: &str, category: Option<&str>) -> Template {
        Template {
            id: id.into(),
            label: format!("Template {}", id),
            category: category.map(|c| c.to_string()),
            keywords: vec!["car".into(), "-cheap".into()],
            verticals: vec!["automotive".into()],
            body: "Visit {url}".into(),
            usage_count: 0,
        }
    }

    #[test]
    fn test_upsert_and_get() {
        let (store, _dir) = test_store();
        store.upsert_template(&template("t1", Some("automotive"))).unwrap();

        let got = store.get_template("t1").unwrap().unwrap();
        assert_eq!(got.label, "Template t1");
        assert_eq!(got.keywords, vec!["car", "-cheap"]);
        assert_eq!(got.verticals, vec!["automotive"]);
        assert_eq!(got.usage_count, 0);

        assert!(store.get_template("missing").unwrap().is_none());
    }

    #[test]
    fn test_upsert_replaces() {
        let (store, _dir) = test_store();
        store.upsert_template(&template("t1", None)).unwrap();
        let mut edited = template("t1", Some("food"));
        edited.body = "New body".into();
        store.upsert_template(&edited).unwrap();

        let got = store.get_template("t1").unwrap().unwrap();
        assert_eq!(got.body, "New body");
        assert_eq!(got.category.as_deref(), Some("food"));
        assert_eq!(store.count_templates().unwrap(), 1);
    }

    #[test]
    fn test_list_by_category() {
        let (store, _dir) = test_store();
        store.upsert_template(&template("a", Some("automotive"))).unwrap();
        store.upsert_template(&template("b", Some("food"))).unwrap();
        store.upsert_template(&template("c", Some("automotive"))).unwrap();

        let autos = store.list_by_category("automotive").unwrap();
        assert_eq!(autos.len(), 2);
        assert_eq!(store.list_templates().unwrap().len(), 3);
    }

    #[test]
    fn test_record_usage_increments_count() {
        let (store, _dir) = test_store();
        store.upsert_template(&template("t1", None)).unwrap();

        store
            .record_usage(&UsageRecord {
                template_id: "t1".into(),
                target_id: "g1".into(),
                used_at: Utc::now(),
                snippet: Some("post text".into()),
            })
            .unwrap();

        assert_eq!(store.get_template("t1").unwrap().unwrap().usage_count, 1);
        let stats = store.stats().unwrap();
        assert_eq!(stats.total_usage_records, 1);
        assert_eq!(stats.distinct_targets, 1);
    }

    #[test]
    fn test_record_usage_unknown_template() {
        let (store, _dir) = test_store();
        let err = store.record_usage(&UsageRecord {
            template_id: "ghost".into(),
            target_id: "g1".into(),
            used_at: Utc::now(),
            snippet: None,
        });
        assert!(err.is_err());
    }

    #[test]
    fn test_recently_used_window() {
        let (store, _dir) = test_store();
        store.upsert_template(&template("fresh", None)).unwrap();
        store.upsert_template(&template("stale", None)).unwrap();

        store
            .record_usage(&UsageRecord {
                template_id: "fresh".into(),
                target_id: "g1".into(),
                used_at: Utc::now() - Duration::hours(1),
                snippet: None,
            })
            .unwrap();
        store
            .record_usage(&UsageRecord {
                template_id: "stale".into(),
                target_id: "g1".into(),
                used_at: Utc::now() - Duration::hours(48),
                snippet: None,
            })
            .unwrap();

        let used = store.recently_used("g1", 24).unwrap();
        assert!(used.contains("fresh"));
        assert!(!used.contains("stale"));

        // Other targets have independent history.
        assert!(store.recently_used("g2", 24).unwrap().is_empty());
    }

    #[test]
    fn test_last_used() {
        let (store, _dir) = test_store();
        store.upsert_template(&template("t1", None)).unwrap();
        store.upsert_template(&template("t2", None)).unwrap();

        store
            .record_usage(&UsageRecord {
                template_id: "t1".into(),
                target_id: "g1".into(),
                used_at: Utc::now() - Duration::hours(5),
                snippet: None,
            })
            .unwrap();
        store
            .record_usage(&UsageRecord {
                template_id: "t2".into(),
                target_id: "g1".into(),
                used_at: Utc::now() - Duration::hours(1),
                snippet: None,
            })
            .unwrap();

        let last = store.last_used("g1").unwrap().unwrap();
        assert_eq!(last.template_id, "t2");
        assert_eq!(last.verticals, vec!["automotive"]);

        assert!(store.last_used("g2").unwrap().is_none());
    }

    #[test]
    fn test_delete_cascades_usage() {
        let (store, _dir) = test_store();
        store.upsert_template(&template("t1", None)).unwrap();
        store
            .record_usage(&UsageRecord {
                template_id: "t1".into(),
                target_id: "g1".into(),
                used_at: Utc::now(),
                snippet: None,
            })
            .unwrap();

        assert!(store.delete_template("t1").unwrap());
        assert!(store.recently_used("g1", 24).unwrap().is_empty());
        assert!(!store.delete_template("t1").unwrap());
    }
}
