pub mod error;
pub mod memory;
pub mod sqlite;
pub mod store;
pub mod tiered;

pub use error::CacheError;
pub use memory::MemoryCache;
pub use sqlite::SqliteStore;
pub use store::{ResponseCache, MAX_TTL};
pub use tiered::TieredCache;
