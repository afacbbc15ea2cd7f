pub mod history;
pub mod postgres;
pub mod redis;

pub use history::{HistoryStore, PgHistoryStore};
pub use postgres::create_pool;
pub use self::redis::create_redis_client;
pub use self::redis::Cache;
pub use self::redis::CacheKey;
pub use self::redis::CacheWriterHandle;
