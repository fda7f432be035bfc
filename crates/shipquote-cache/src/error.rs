use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Expiry out of range for TTL {0}")]
    TtlOutOfRange(chrono::Duration),

    #[error("Cache not available: {0}")]
    Unavailable(String),
}
