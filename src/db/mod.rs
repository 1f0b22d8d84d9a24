pub mod memory;
pub mod postgres;
pub mod redis;

pub use memory::InMemoryLibrary;
pub use postgres::{create_pool, PgLibrary};
pub use self::redis::create_redis_client;
pub use self::redis::Cache;
pub use self::redis::CacheKey;
pub use self::redis::CachedPeopleIndex;
