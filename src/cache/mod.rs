//! Record cache.
//!
//! ```text
//! CacheLayer                 <- typed get_or_set / set / delete / contains
//!   └── dyn CacheBackend     <- selected from [cache] config at startup
//!         ├── RedisCache     (shared between instances)
//!         ├── MemoryCache    (moka, in-process)
//!         └── NoOpCache      (cache switched off or backend unreachable)
//! ```

pub mod errors;
pub mod layer;
pub mod providers;
pub mod traits;

pub use errors::{CacheError, CacheResult};
pub use layer::CacheLayer;
pub use providers::{MemoryCache, NoOpCache, RedisCache};
pub use traits::CacheBackend;
