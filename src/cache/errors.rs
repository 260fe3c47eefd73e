use thiserror::Error;

/// Errors raised by a cache backend.
///
/// These never escape [`super::CacheLayer`]; the layer logs them and falls
/// back to the database.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    Connection(String),

    #[error("Cache backend error: {0}")]
    Backend(String),
}

pub type CacheResult<T> = Result<T, CacheError>;
