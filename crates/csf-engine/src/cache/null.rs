//! Null cache provider for tests and cache-disabled deployments

use async_trait::async_trait;
use csf_domain::error::Result;
use csf_domain::ports::{CacheProvider, CacheStats};
use std::time::Duration;

/// A provider that stores nothing: every get is a miss
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCacheProvider;

#[async_trait]
impl CacheProvider for NullCacheProvider {
    async fn get_json(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn set_json(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<bool> {
        Ok(false)
    }

    async fn clear(&self) -> Result<()> {
        Ok(())
    }

    async fn stats(&self) -> Result<CacheStats> {
        Ok(CacheStats::default())
    }

    fn provider_name(&self) -> &str {
        "null"
    }
}
