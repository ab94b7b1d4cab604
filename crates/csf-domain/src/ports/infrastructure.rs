//! Infrastructure Ports
//!
//! Contracts for the non-retrieval collaborators: query optimization,
//! performance monitoring, presentation formatting, and model
//! persistence.

use crate::error::Result;
use crate::value_objects::{FusedResult, ModelSnapshot, OptimizedQuery, Query, QueryMetrics};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Query optimization collaborator
///
/// Failure here is NOT recovered: it propagates as a hard
/// `Error::Optimization` with component/operation context attached.
#[async_trait]
pub trait QueryOptimizer: Send + Sync {
    /// Derive a rewritten query text, a strategy hint, and filters
    async fn optimize(&self, query: &Query) -> Result<OptimizedQuery>;
}

/// Aggregate statistics over a time range of recorded queries
///
/// Top-query keys are truncated to a fixed length for aggregation, so
/// distinct long queries can collide. Known approximation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitorStats {
    /// Number of queries recorded in the range
    pub query_count: u64,
    /// Mean execution time
    pub average_execution_time: Duration,
    /// Cache hit rate in [0, 1]
    pub cache_hit_rate: f64,
    /// Most frequent (truncated) query keys with their counts
    pub top_queries: Vec<(String, u64)>,
}

/// Performance monitoring collaborator
#[async_trait]
pub trait PerformanceMonitor: Send + Sync {
    /// Record one query's metrics
    async fn record_query(&self, query_text: &str, metrics: &QueryMetrics) -> Result<()>;

    /// Aggregate statistics over the most recent `range`
    async fn stats(&self, range: Duration) -> Result<MonitorStats>;
}

/// Presentation formatting collaborator
///
/// The payload schema is owned externally; this core only hands over the
/// ranked results.
#[async_trait]
pub trait ResultFormatter: Send + Sync {
    /// Produce a presentation-ready payload for an LLM consumer
    async fn format_for_llm(&self, results: &[FusedResult]) -> Result<String>;
}

/// Model persistence collaborator for the ML scorer and weight store
#[async_trait]
pub trait ModelStore: Send + Sync {
    /// Persist one versioned snapshot
    async fn save(&self, snapshot: &ModelSnapshot) -> Result<()>;

    /// Load a snapshot by version
    async fn load(&self, version: u64) -> Result<Option<ModelSnapshot>>;
}
