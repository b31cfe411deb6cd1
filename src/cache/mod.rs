use crate::config::{CacheConfig, CacheKind};
use crate::errors::CacheError;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::collections::HashMap;
use std::sync::Arc;

/// A small field map, the unit the cache trades in. Every manager stores its
/// entities as a flat `field -> value` map under a single key, mirroring how
/// a hash-backed cache is used in practice (spec.md §4.3).
pub type CacheFields = HashMap<String, String>;

#[async_trait]
pub trait Cache: Send + Sync {
    async fn exists(&self, key: &str) -> Result<bool, CacheError>;
    async fn get(&self, key: &str) -> Result<Option<CacheFields>, CacheError>;
    async fn set(&self, key: &str, fields: CacheFields, ttl_seconds: u64) -> Result<(), CacheError>;
    async fn update_field(&self, key: &str, field: &str, value: &str) -> Result<(), CacheError>;
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
    async fn count_keys(&self, prefix: &str) -> Result<u64, CacheError>;
}

/// Backed by Redis hashes; one hash per key, `prefix:*` scanned for counts.
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(config: &CacheConfig) -> Result<Self, CacheError> {
        let client = redis::Client::open(config.redis_url())
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        conn.exists(key).await.map_err(|e| CacheError::Backend(e.to_string()))
    }

    async fn get(&self, key: &str) -> Result<Option<CacheFields>, CacheError> {
        let mut conn = self.conn.clone();
        let fields: HashMap<String, String> =
            conn.hgetall(key).await.map_err(|e| CacheError::Backend(e.to_string()))?;
        if fields.is_empty() {
            Ok(None)
        } else {
            Ok(Some(fields))
        }
    }

    async fn set(&self, key: &str, fields: CacheFields, ttl_seconds: u64) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let pairs: Vec<(String, String)> = fields.into_iter().collect();
        conn.hset_multiple(key, &pairs)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        if ttl_seconds > 0 {
            conn.expire(key, ttl_seconds as i64)
                .await
                .map_err(|e| CacheError::Backend(e.to_string()))?;
        }
        Ok(())
    }

    async fn update_field(&self, key: &str, field: &str, value: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.hset(key, field, value).await.map_err(|e| CacheError::Backend(e.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.del(key).await.map_err(|e| CacheError::Backend(e.to_string()))
    }

    async fn count_keys(&self, prefix: &str) -> Result<u64, CacheError> {
        let mut conn = self.conn.clone();
        let pattern = format!("{prefix}:*");
        let keys: Vec<String> =
            conn.keys(&pattern).await.map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(keys.len() as u64)
    }
}

/// Used when `cache.enabled=false`; every read misses, every write is a no-op.
pub struct NoopCache;

#[async_trait]
impl Cache for NoopCache {
    async fn exists(&self, _key: &str) -> Result<bool, CacheError> {
        Ok(false)
    }

    async fn get(&self, _key: &str) -> Result<Option<CacheFields>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _fields: CacheFields, _ttl_seconds: u64) -> Result<(), CacheError> {
        Ok(())
    }

    async fn update_field(&self, _key: &str, _field: &str, _value: &str) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }

    async fn count_keys(&self, _prefix: &str) -> Result<u64, CacheError> {
        Ok(0)
    }
}

/// Wraps a `Cache` with the per-kind policy from config: count-limit checks
/// before writes, and `throw_on_errors` deciding whether a backend failure
/// propagates or degrades to a miss (spec.md §4.3).
pub struct CacheHandle {
    backend: Arc<dyn Cache>,
    config: CacheConfig,
}

impl CacheHandle {
    pub fn new(backend: Arc<dyn Cache>, config: CacheConfig) -> Self {
        Self { backend, config }
    }

    fn kind_config(&self, kind: CacheKind) -> crate::config::CacheKindConfig {
        self.config.per_kind.get(&kind).copied().unwrap_or_default()
    }

    fn guard<T>(&self, result: Result<T, CacheError>, default: T) -> Result<T, CacheError> {
        match result {
            Ok(v) => Ok(v),
            Err(e) => {
                log::warn!("cache operation failed: {e}");
                if self.config.throw_on_errors {
                    Err(e)
                } else {
                    Ok(default)
                }
            }
        }
    }

    pub async fn get(&self, kind: CacheKind, key: &str) -> Result<Option<CacheFields>, CacheError> {
        if !self.config.enabled || !self.kind_config(kind).enabled {
            return Ok(None);
        }
        let key = format!("{}:{}", kind.key_prefix(), key);
        self.guard(self.backend.get(&key).await, None)
    }

    /// Skips the write (not an eviction) when the per-kind count limit would
    /// be exceeded, per spec.md §4.3.
    pub async fn set(&self, kind: CacheKind, key: &str, fields: CacheFields) -> Result<(), CacheError> {
        if !self.config.enabled || !self.kind_config(kind).enabled {
            return Ok(());
        }
        let kind_cfg = self.kind_config(kind);
        let prefixed = format!("{}:{}", kind.key_prefix(), key);

        let already_exists = self.guard(self.backend.exists(&prefixed).await, false)?;
        if !already_exists {
            let count = self.guard(self.backend.count_keys(kind.key_prefix()).await, 0)?;
            if count >= kind_cfg.limit as u64 {
                return Ok(());
            }
        }

        self.guard(self.backend.set(&prefixed, fields, kind_cfg.ttl_seconds).await, ())
    }

    pub async fn update_field(&self, kind: CacheKind, key: &str, field: &str, value: &str) -> Result<(), CacheError> {
        if !self.config.enabled || !self.kind_config(kind).enabled {
            return Ok(());
        }
        let prefixed = format!("{}:{}", kind.key_prefix(), key);
        self.guard(self.backend.update_field(&prefixed, field, value).await, ())
    }

    pub async fn invalidate(&self, kind: CacheKind, key: &str) -> Result<(), CacheError> {
        if !self.config.enabled {
            return Ok(());
        }
        let prefixed = format!("{}:{}", kind.key_prefix(), key);
        self.guard(self.backend.delete(&prefixed).await, ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_cache_always_misses() {
        let cache = NoopCache;
        assert_eq!(cache.get("anything").await.unwrap(), None);
        assert!(!cache.exists("anything").await.unwrap());
    }

    #[tokio::test]
    async fn disabled_handle_skips_backend_entirely() {
        let mut config = CacheConfig::default();
        config.enabled = false;
        let handle = CacheHandle::new(Arc::new(NoopCache), config);
        let result = handle.get(CacheKind::Operators, "k").await.unwrap();
        assert_eq!(result, None);
    }
}
