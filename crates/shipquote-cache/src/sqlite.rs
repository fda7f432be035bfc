use chrono::{Duration, Utc};
use rusqlite::Connection;
use shipquote_models::cache_schema::{CacheRow, CACHE_TABLE_DDL};

use crate::error::CacheError;

/// Persistent SQLite response store.
///
/// Lets a later process reuse responses fetched by an earlier one. Opened
/// read-write in WAL mode so several quoting processes can share the file.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the cache database and ensure the schema exists.
    pub fn open(path: &str) -> Result<Self, CacheError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(CACHE_TABLE_DDL)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database. Useful for testing.
    pub fn open_in_memory() -> Result<Self, CacheError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(CACHE_TABLE_DDL)?;
        Ok(Self { conn })
    }

    /// Get a single cache entry by key. Returns None if not found or expired.
    pub fn get(&self, key: &str) -> Result<Option<CacheRow>, CacheError> {
        let now = Utc::now().to_rfc3339();
        let mut stmt = self.conn.prepare_cached(
            "SELECT key, response_body, created_at, expires_at, updated_at \
             FROM quote_responses WHERE key = ?1 AND expires_at > ?2",
        )?;

        let result = stmt.query_row(rusqlite::params![key, now], |row| {
            Ok(CacheRow {
                key: row.get(0)?,
                response_body: row.get(1)?,
                created_at: row.get(2)?,
                expires_at: row.get(3)?,
                updated_at: row.get(4)?,
            })
        });

        match result {
            Ok(row) => Ok(Some(row)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(CacheError::Sqlite(e)),
        }
    }

    /// Upsert a response with the given time-to-live. `created_at` survives rewrites.
    pub fn set(&self, key: &str, body: &str, ttl: Duration) -> Result<(), CacheError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or(CacheError::TtlOutOfRange(ttl))?;
        self.upsert(&CacheRow {
            key: key.to_string(),
            response_body: body.to_string(),
            created_at: now.to_rfc3339(),
            expires_at: expires_at.to_rfc3339(),
            updated_at: now.to_rfc3339(),
        })
    }

    /// Upsert a raw row. Rewriting a live row with an identical body keeps
    /// its `expires_at`; a new body or an expired row takes the new one.
    pub fn upsert(&self, row: &CacheRow) -> Result<(), CacheError> {
        self.conn.execute(
            "INSERT INTO quote_responses (key, response_body, created_at, expires_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             ON CONFLICT(key) DO UPDATE SET \
                expires_at = CASE \
                    WHEN quote_responses.response_body = excluded.response_body \
                     AND quote_responses.expires_at > excluded.updated_at \
                    THEN quote_responses.expires_at \
                    ELSE excluded.expires_at END, \
                response_body = excluded.response_body, \
                updated_at = excluded.updated_at",
            rusqlite::params![
                row.key,
                row.response_body,
                row.created_at,
                row.expires_at,
                row.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Delete all expired entries. Returns the number of rows deleted.
    pub fn purge_expired(&self) -> Result<usize, CacheError> {
        let now = Utc::now().to_rfc3339();
        let deleted = self.conn.execute(
            "DELETE FROM quote_responses WHERE expires_at <= ?1",
            rusqlite::params![now],
        )?;
        Ok(deleted)
    }

    /// Count all entries, expired or not.
    pub fn count(&self) -> Result<usize, CacheError> {
        let count: usize =
            self.conn
                .query_row("SELECT COUNT(*) FROM quote_responses", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_row(key: &str, ttl_seconds: i64) -> CacheRow {
        let now = Utc::now();
        CacheRow {
            key: key.to_string(),
            response_body: "<res:DCTResponse/>".to_string(),
            created_at: now.to_rfc3339(),
            expires_at: (now + Duration::seconds(ttl_seconds)).to_rfc3339(),
            updated_at: now.to_rfc3339(),
        }
    }

    #[test]
    fn get_existing_key() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.upsert(&make_row("<req date=1/>", 300)).unwrap();

        let result = store.get("<req date=1/>").unwrap();
        assert_eq!(result.unwrap().response_body, "<res:DCTResponse/>");
    }

    #[test]
    fn get_missing_key() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.get("nonexistent").unwrap().is_none());
    }

    #[test]
    fn get_expired_key() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.upsert(&make_row("<req/>", -10)).unwrap();

        assert!(store.get("<req/>").unwrap().is_none());
    }

    #[test]
    fn set_replaces_body_and_keeps_created_at() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut original = make_row("<req/>", 300);
        original.created_at = "2020-01-01T00:00:00+00:00".to_string();
        store.upsert(&original).unwrap();

        store.set("<req/>", "<fresh/>", Duration::seconds(60)).unwrap();

        let row = store.get("<req/>").unwrap().unwrap();
        assert_eq!(row.response_body, "<fresh/>");
        assert_eq!(row.created_at, "2020-01-01T00:00:00+00:00");
        assert_eq!(store.count().unwrap(), 1);
    }

    fn expires_at(store: &SqliteStore, key: &str) -> String {
        store
            .conn
            .query_row(
                "SELECT expires_at FROM quote_responses WHERE key = ?1",
                rusqlite::params![key],
                |row| row.get(0),
            )
            .unwrap()
    }

    #[test]
    fn same_body_rewrite_keeps_expiry() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set("<req/>", "<res/>", Duration::seconds(60)).unwrap();
        let first = expires_at(&store, "<req/>");

        store.set("<req/>", "<res/>", Duration::seconds(3600)).unwrap();
        assert_eq!(expires_at(&store, "<req/>"), first);

        store.set("<req/>", "<changed/>", Duration::seconds(3600)).unwrap();
        assert_ne!(expires_at(&store, "<req/>"), first);
    }

    #[test]
    fn same_body_revives_expired_row() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.upsert(&make_row("<req/>", -10)).unwrap();
        assert!(store.get("<req/>").unwrap().is_none());

        store
            .set("<req/>", "<res:DCTResponse/>", Duration::seconds(300))
            .unwrap();
        assert!(store.get("<req/>").unwrap().is_some());
    }

    #[test]
    fn unrepresentable_expiry_is_an_error() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = store
            .set("<req/>", "<res/>", Duration::seconds(10_000_000_000_000))
            .unwrap_err();
        assert!(matches!(err, CacheError::TtlOutOfRange(_)));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn purge_expired() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.upsert(&make_row("fresh", 300)).unwrap();
        store.upsert(&make_row("stale-1", -10)).unwrap();
        store.upsert(&make_row("stale-2", -10)).unwrap();

        assert_eq!(store.purge_expired().unwrap(), 2);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn file_store_persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quotes.db");
        let path = path.to_str().unwrap();

        {
            let store = SqliteStore::open(path).unwrap();
            store.set("<req/>", "<res/>", Duration::seconds(300)).unwrap();
        }

        let reopened = SqliteStore::open(path).unwrap();
        let row = reopened.get("<req/>").unwrap().unwrap();
        assert_eq!(row.response_body, "<res/>");
    }
}
