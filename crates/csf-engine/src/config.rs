//! Engine configuration
//!
//! Serde + validator structs for the tunable parts of the engines, with
//! defaults seeded from `csf_domain::constants` and environment-variable
//! overrides for deployment tuning.

use csf_domain::constants::{
    CACHE_DEFAULT_CAPACITY, DEFAULT_CALL_TIMEOUT_MS, FEEDBACK_BATCH_SIZE, MODEL_HISTORY_LIMIT,
    PERFORMANCE_HISTORY_LIMIT, QUERY_CACHE_TTL_SECS,
};
use csf_domain::value_objects::FusionWeights;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Fusion engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FusionConfig {
    /// Base weights before intent rebalancing. Threshold and limit come
    /// from each query's options, not from here.
    pub base_weights: FusionWeights,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            base_weights: FusionWeights::default(),
        }
    }
}

/// Reranking engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RerankConfig {
    /// Weight of the semantic term
    #[validate(range(min = 0.0, max = 1.0))]
    pub semantic_weight: f64,
    /// Weight of the graph term
    #[validate(range(min = 0.0, max = 1.0))]
    pub graph_weight: f64,
    /// Weight of the contextual term
    #[validate(range(min = 0.0, max = 1.0))]
    pub contextual_weight: f64,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            semantic_weight: csf_domain::constants::RERANK_SEMANTIC_WEIGHT,
            graph_weight: csf_domain::constants::RERANK_GRAPH_WEIGHT,
            contextual_weight: csf_domain::constants::RERANK_CONTEXTUAL_WEIGHT,
        }
    }
}

/// Adaptive weight store configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AdaptiveConfig {
    /// Buffered feedback items that trigger batch processing
    #[validate(range(min = 1))]
    pub batch_size: usize,
    /// Maximum retained performance-history samples
    #[validate(range(min = 1))]
    pub history_limit: usize,
    /// Maximum retained model snapshots
    #[validate(range(min = 1))]
    pub snapshot_limit: usize,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            batch_size: FEEDBACK_BATCH_SIZE,
            history_limit: PERFORMANCE_HISTORY_LIMIT,
            snapshot_limit: MODEL_HISTORY_LIMIT,
        }
    }
}

impl AdaptiveConfig {
    /// Override from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            batch_size: env_parse("CSF_FEEDBACK_BATCH_SIZE", defaults.batch_size),
            history_limit: env_parse("CSF_HISTORY_LIMIT", defaults.history_limit),
            snapshot_limit: env_parse("CSF_SNAPSHOT_LIMIT", defaults.snapshot_limit),
        }
    }
}

/// Cache configuration shared by the coordinator and hybrid paths
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CacheConfig {
    /// Whether caching is enabled
    pub enabled: bool,
    /// TTL for cached query responses, in seconds
    #[validate(range(min = 1))]
    pub ttl_secs: u64,
    /// Maximum number of cached entries
    #[validate(range(min = 1))]
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: QUERY_CACHE_TTL_SECS,
            capacity: CACHE_DEFAULT_CAPACITY,
        }
    }
}

impl CacheConfig {
    /// Override from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_parse("CSF_CACHE_ENABLED", defaults.enabled),
            ttl_secs: env_parse("CSF_CACHE_TTL_SECS", defaults.ttl_secs),
            capacity: env_parse("CSF_CACHE_CAPACITY", defaults.capacity),
        }
    }

    /// The TTL as a `Duration`
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Per-collaborator call timeouts for the fan-out paths
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Timeout applied to every suspension point, in milliseconds
    pub per_call_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            per_call_ms: DEFAULT_CALL_TIMEOUT_MS,
        }
    }
}

impl TimeoutConfig {
    /// The per-call timeout as a `Duration`
    pub fn per_call(&self) -> Duration {
        Duration::from_millis(self.per_call_ms)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, fallback: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn defaults_validate() {
        assert!(FusionConfig::default().validate().is_ok());
        assert!(RerankConfig::default().validate().is_ok());
        assert!(AdaptiveConfig::default().validate().is_ok());
        assert!(CacheConfig::default().validate().is_ok());
    }

    #[test]
    fn adaptive_defaults_match_documented_bounds() {
        let cfg = AdaptiveConfig::default();
        assert_eq!(cfg.batch_size, 10);
        assert_eq!(cfg.history_limit, 100);
        assert_eq!(cfg.snapshot_limit, 10);
    }
}
