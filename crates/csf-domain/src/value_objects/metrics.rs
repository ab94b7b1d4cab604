//! Query timing metrics
//!
//! Per-query timing breakdown recorded through the `PerformanceMonitor`
//! port, plus the aggregate shape produced by batched execution.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-query timing breakdown
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryMetrics {
    /// Wall-clock time spent in the vector branch
    pub vector_search_time: Duration,
    /// Wall-clock time spent in the graph branch
    pub graph_search_time: Duration,
    /// Time spent in fusion
    pub fusion_time: Duration,
    /// Total wall-clock time for the query
    pub execution_time: Duration,
    /// Whether the response was served from cache
    pub cache_hit: bool,
    /// Number of results returned
    pub total_results: usize,
}

impl QueryMetrics {
    /// Metrics for a cache hit: only the lookup time is meaningful
    pub fn cache_hit(lookup_time: Duration, total_results: usize) -> Self {
        Self {
            execution_time: lookup_time,
            cache_hit: true,
            total_results,
            ..Self::default()
        }
    }
}

/// Aggregate metrics over a batch of concurrently executed queries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchQueryMetrics {
    /// Number of queries in the batch
    pub total_queries: usize,
    /// Wall-clock time for the whole batch
    pub total_execution_time: Duration,
    /// Mean per-query execution time
    pub average_execution_time: Duration,
    /// Total results per elapsed second
    pub throughput: f64,
    /// Fraction of queries that returned at least one result
    pub success_rate: f64,
}
