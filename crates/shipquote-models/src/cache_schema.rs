/// Table backing the persistent response cache.
///
/// ```sql
/// CREATE TABLE IF NOT EXISTS quote_responses (
///     key            TEXT PRIMARY KEY,
///     response_body  TEXT NOT NULL,
///     created_at     TEXT NOT NULL,
///     expires_at     TEXT NOT NULL,
///     updated_at     TEXT NOT NULL
/// );
/// ```
///
/// `key` is the exact serialized rate request; `response_body` is the raw
/// carrier response for it.
pub const CACHE_TABLE_DDL: &str = "\
CREATE TABLE IF NOT EXISTS quote_responses (
    key            TEXT PRIMARY KEY,
    response_body  TEXT NOT NULL,
    created_at     TEXT NOT NULL,
    expires_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_quote_responses_expires ON quote_responses(expires_at);
";

/// A raw cache row as stored in SQLite. Timestamps are RFC 3339.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRow {
    pub key: String,
    pub response_body: String,
    pub created_at: String,
    pub expires_at: String,
    pub updated_at: String,
}
