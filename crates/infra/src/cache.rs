//! Auxiliary cache probe for the health endpoint.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cache unreachable: {0}")]
pub struct CacheError(pub String);

/// Liveness probe against the auxiliary cache.
pub trait CacheProbe: Send + Sync {
    fn ping(&self) -> Result<(), CacheError>;
}

/// Probe used when no cache is wired up (memory backend, or Redis not
/// configured): always reports up.
#[derive(Debug, Default)]
pub struct NoopCacheProbe;

impl CacheProbe for NoopCacheProbe {
    fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

#[cfg(feature = "redis")]
pub use self::redis_probe::RedisCacheProbe;

#[cfg(feature = "redis")]
mod redis_probe {
    use super::{CacheError, CacheProbe};

    /// Redis-backed cache probe.
    pub struct RedisCacheProbe {
        client: redis::Client,
    }

    impl RedisCacheProbe {
        pub fn new(redis_url: &str) -> Result<Self, CacheError> {
            let client = redis::Client::open(redis_url).map_err(|e| CacheError(e.to_string()))?;
            Ok(Self { client })
        }
    }

    impl CacheProbe for RedisCacheProbe {
        fn ping(&self) -> Result<(), CacheError> {
            let mut conn = self
                .client
                .get_connection()
                .map_err(|e| CacheError(e.to_string()))?;
            redis::cmd("PING")
                .query::<String>(&mut conn)
                .map_err(|e| CacheError(e.to_string()))?;
            Ok(())
        }
    }
}
