pub mod memory;
pub mod noop;
pub mod redis;

pub use memory::MemoryCache;
pub use noop::NoOpCache;
pub use self::redis::RedisCache;
