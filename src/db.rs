//! `SQLite` offline cache for fetched activity records
//!
//! Lets the client render the last-seen feed without a network. The cache is
//! write-through only; a live feed session never reads from it, so the
//! session's dedup and ordering invariants are unaffected.

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, params};
use std::path::PathBuf;

use crate::models::{ActivityKind, ActivityRecord};
use crate::paths;

/// Cache connection wrapper
pub struct ActivityCache {
    conn: Connection,
}

impl ActivityCache {
    /// Open or create the cache at the default location
    pub fn open() -> Result<Self> {
        let path = Self::default_path()?;
        Self::open_path(&path)
    }

    /// Open or create the cache at a specific path
    pub fn open_path(path: &PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create data directory")?;
        }

        let conn = Connection::open(path).context("Failed to open cache database")?;

        let cache = Self { conn };
        cache.init()?;

        Ok(cache)
    }

    /// Get the default cache database path
    pub fn default_path() -> Result<PathBuf> {
        paths::cache_db_path()
    }

    /// Initialize the schema
    fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS activity_cache (
                id INTEGER PRIMARY KEY,
                user_id INTEGER,
                kind TEXT NOT NULL,
                item_id INTEGER,
                secondary_item_id INTEGER,
                content TEXT,
                favorited INTEGER,
                recorded_at TEXT,
                cached_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_activity_cache_recorded_at ON activity_cache(recorded_at);
            CREATE INDEX IF NOT EXISTS idx_activity_cache_cached_at ON activity_cache(cached_at);
            ",
        )?;

        Ok(())
    }

    /// Cache one activity record (children are not persisted; the forest is
    /// always rebuilt from flat records)
    pub fn cache_activity(&self, record: &ActivityRecord) -> Result<()> {
        self.conn.execute(
            r"INSERT OR REPLACE INTO activity_cache
               (id, user_id, kind, item_id, secondary_item_id, content, favorited, recorded_at, cached_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.id,
                record.user_id,
                record.kind.as_tag(),
                record.item_id,
                record.secondary_item_id,
                record.content,
                record.favorited.map(i32::from),
                record.recorded_at,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Cache a whole page of records
    pub fn cache_page(&self, records: &[ActivityRecord]) -> Result<()> {
        for record in records {
            self.cache_activity(record)?;
        }
        Ok(())
    }

    /// Get cached records, most recently recorded first
    pub fn get_cached_activities(&self, limit: usize) -> Result<Vec<ActivityRecord>> {
        let sql = format!(
            "SELECT id, user_id, kind, item_id, secondary_item_id, content, favorited, recorded_at
             FROM activity_cache ORDER BY recorded_at DESC LIMIT {limit}"
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let records = stmt.query_map([], |row| {
            let kind_tag: String = row.get(2)?;

            Ok(ActivityRecord {
                id: row.get(0)?,
                user_id: row.get(1)?,
                kind: ActivityKind::from_tag(&kind_tag),
                item_id: row.get(3)?,
                secondary_item_id: row.get(4)?,
                content: row.get(5)?,
                favorited: row.get::<_, Option<i32>>(6)?.map(|v| v != 0),
                recorded_at: row.get(7)?,
                children: Vec::new(),
            })
        })?;

        records.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Clear cache entries older than the given age
    pub fn clear_old_cache(&self, max_age_hours: u64) -> Result<usize> {
        let cutoff = Utc::now() - chrono::Duration::hours(max_age_hours as i64);
        let count = self.conn.execute(
            "DELETE FROM activity_cache WHERE cached_at < ?1",
            params![cutoff.to_rfc3339()],
        )?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(id: i64, recorded_at: &str) -> ActivityRecord {
        let mut record = ActivityRecord::new(id, ActivityKind::Update);
        record.user_id = Some(10);
        record.content = Some("Started reading The Left Hand of Darkness".to_string());
        record.favorited = Some(true);
        record.recorded_at = Some(recorded_at.to_string());
        record
    }

    #[test]
    fn test_cache_init() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.sqlite");
        let _cache = ActivityCache::open_path(&path).unwrap();
        // Should create without error
    }

    #[test]
    fn test_cache_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.sqlite");
        let cache = ActivityCache::open_path(&path).unwrap();

        cache
            .cache_page(&[record(1, "2024-01-01 09:00:00"), record(2, "2024-01-02 09:00:00")])
            .unwrap();

        let cached = cache.get_cached_activities(10).unwrap();
        assert_eq!(cached.len(), 2);
        // Most recently recorded first
        assert_eq!(cached[0].id, 2);
        assert_eq!(cached[1].id, 1);
        assert_eq!(cached[1].favorited, Some(true));
        assert_eq!(cached[1].kind, ActivityKind::Update);
        assert!(cached[1].children.is_empty());
    }

    #[test]
    fn test_cache_replace_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.sqlite");
        let cache = ActivityCache::open_path(&path).unwrap();

        cache.cache_activity(&record(1, "2024-01-01 09:00:00")).unwrap();
        cache.cache_activity(&record(1, "2024-01-01 09:00:00")).unwrap();

        assert_eq!(cache.get_cached_activities(10).unwrap().len(), 1);
    }

    #[test]
    fn test_clear_old_cache_keeps_fresh_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.sqlite");
        let cache = ActivityCache::open_path(&path).unwrap();

        cache.cache_activity(&record(1, "2024-01-01 09:00:00")).unwrap();
        let removed = cache.clear_old_cache(72).unwrap();
        assert_eq!(removed, 0);
        assert_eq!(cache.get_cached_activities(10).unwrap().len(), 1);
    }
}
