//! Query Coordinator
//!
//! Top-level entry point for single and batched queries: cache lookup,
//! query optimization, concurrent vector + graph dispatch, five-signal
//! fusion, an optional reranking pass, response caching, and metrics
//! recording.
//!
//! ## Degradation contract
//!
//! Each retrieval branch catches its own failure or timeout and degrades
//! to an empty candidate list with its elapsed time, so one backend
//! outage reduces quality instead of failing the query. Cache and
//! monitor failures are likewise logged and bypassed. Optimizer failure
//! is the one fatal path: it propagates with component/operation context.

use csf_domain::constants::QUERY_STAT_KEY_LEN;
use csf_domain::entities::ScoredCandidate;
use csf_domain::error::{Error, Result};
use csf_domain::ports::{
    CacheProvider, EmbeddingProvider, GraphSearchProvider, PerformanceMonitor, QueryOptimizer,
    ResultFormatter, SearchOpts, VectorSearchProvider,
};
use csf_domain::value_objects::{BatchQueryMetrics, FusedResult, Query, QueryMetrics};
use csf_engine::cache::CacheKeyParts;
use csf_engine::config::{CacheConfig, TimeoutConfig};
use csf_engine::fusion::FusionEngine;
use csf_engine::rerank::{RankedInput, RerankEngine, RerankOptions};
use futures::future::join_all;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, warn};

/// One executed query: ranked results, timing metrics, and the optional
/// presentation payload
#[derive(Debug, Clone)]
pub struct QueryResponse {
    /// Fused results, ranked descending by final score
    pub results: Vec<FusedResult>,
    /// Per-query timing breakdown
    pub metrics: QueryMetrics,
    /// Formatter output, when a formatter is attached and succeeded
    pub formatted: Option<String>,
}

/// One executed batch: per-query outcomes plus aggregate metrics
#[derive(Debug)]
pub struct BatchResponse {
    /// Per-query outcomes, in input order
    pub responses: Vec<Result<QueryResponse>>,
    /// Aggregate batch metrics
    pub metrics: BatchQueryMetrics,
}

/// Orchestrates one query end to end through injected collaborators
pub struct QueryCoordinator {
    vector: Arc<dyn VectorSearchProvider>,
    graph: Arc<dyn GraphSearchProvider>,
    embedder: Arc<dyn EmbeddingProvider>,
    optimizer: Arc<dyn QueryOptimizer>,
    cache: Arc<dyn CacheProvider>,
    monitor: Arc<dyn PerformanceMonitor>,
    formatter: Option<Arc<dyn ResultFormatter>>,
    fusion: FusionEngine,
    reranker: Option<(Arc<RerankEngine>, RerankOptions)>,
    cache_config: CacheConfig,
    timeouts: TimeoutConfig,
}

impl QueryCoordinator {
    /// Create a coordinator over the required collaborators, with default
    /// fusion, cache, and timeout configuration
    pub fn new(
        vector: Arc<dyn VectorSearchProvider>,
        graph: Arc<dyn GraphSearchProvider>,
        embedder: Arc<dyn EmbeddingProvider>,
        optimizer: Arc<dyn QueryOptimizer>,
        cache: Arc<dyn CacheProvider>,
        monitor: Arc<dyn PerformanceMonitor>,
    ) -> Self {
        Self {
            vector,
            graph,
            embedder,
            optimizer,
            cache,
            monitor,
            formatter: None,
            fusion: FusionEngine::default(),
            reranker: None,
            cache_config: CacheConfig::default(),
            timeouts: TimeoutConfig::default(),
        }
    }

    /// Attach a presentation formatter
    pub fn with_formatter(mut self, formatter: Arc<dyn ResultFormatter>) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// Replace the fusion engine
    pub fn with_fusion(mut self, fusion: FusionEngine) -> Self {
        self.fusion = fusion;
        self
    }

    /// Attach a second-pass reranker, applied after fusion and before
    /// the response is cached. The configured limit is ignored in favor
    /// of each query's own.
    pub fn with_reranker(mut self, reranker: Arc<RerankEngine>, options: RerankOptions) -> Self {
        self.reranker = Some((reranker, options));
        self
    }

    /// Replace the cache configuration
    pub fn with_cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    /// Replace the per-call timeout configuration
    pub fn with_timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Execute one query.
    ///
    /// A cache hit returns immediately with `cache_hit = true` and only
    /// the lookup wall-clock in `execution_time`. A query with no healthy
    /// branch and no cache hit returns empty results, not an error.
    pub async fn execute(&self, query: &Query) -> Result<QueryResponse> {
        let started = Instant::now();
        let per_call = self.timeouts.per_call();
        let key = CacheKeyParts::for_query(query)
            .fusion_weights(self.fusion.base_weights())
            .build();

        if self.cache_config.enabled {
            if let Some(results) = self.cache_lookup(&key, per_call).await {
                debug!(
                    query = query.text.as_str(),
                    results = results.len(),
                    "serving query from cache"
                );
                let metrics = QueryMetrics::cache_hit(started.elapsed(), results.len());
                self.record(query, &metrics, per_call).await;
                let formatted = self.format(&results, per_call).await;
                return Ok(QueryResponse {
                    results,
                    metrics,
                    formatted,
                });
            }
        }

        let optimized = match timeout(per_call, self.optimizer.optimize(query)).await {
            Ok(Ok(optimized)) => optimized,
            Ok(Err(err)) => {
                return Err(Error::optimization(
                    "query_coordinator",
                    "optimize",
                    err.to_string(),
                ))
            }
            Err(_) => {
                return Err(Error::optimization(
                    "query_coordinator",
                    "optimize",
                    format!("timed out after {per_call:?}"),
                ))
            }
        };

        let opts = SearchOpts {
            limit: query.options.limit,
            filters: optimized.filters.clone(),
            project_id: query.project_id.clone(),
        };

        let vector_branch = guarded("vector", per_call, async {
            let embedding = self.embedder.embed(&optimized.query_text).await?;
            self.vector.search(&embedding, &opts).await
        });
        let graph_branch = async {
            if query.options.include_graph {
                guarded(
                    "graph",
                    per_call,
                    self.graph.search(&optimized.query_text, &opts),
                )
                .await
            } else {
                (Vec::new(), Duration::ZERO)
            }
        };
        let ((vector_hits, vector_time), (graph_hits, graph_time)) =
            tokio::join!(vector_branch, graph_branch);

        let fusion_started = Instant::now();
        let mut results = self.fusion.fuse(vector_hits, graph_hits, query)?;
        results = self.apply_rerank(results, query)?;
        let fusion_time = fusion_started.elapsed();

        if self.cache_config.enabled {
            self.cache_store(&key, &results, per_call).await;
        }

        let metrics = QueryMetrics {
            vector_search_time: vector_time,
            graph_search_time: graph_time,
            fusion_time,
            execution_time: started.elapsed(),
            cache_hit: false,
            total_results: results.len(),
        };
        self.record(query, &metrics, per_call).await;
        let formatted = self.format(&results, per_call).await;
        Ok(QueryResponse {
            results,
            metrics,
            formatted,
        })
    }

    /// Execute a batch of queries concurrently and aggregate metrics.
    ///
    /// Per-query failures stay in `responses`; they count against the
    /// success rate but never abort the batch.
    pub async fn execute_batch(&self, queries: &[Query]) -> BatchResponse {
        let started = Instant::now();
        let responses: Vec<Result<QueryResponse>> =
            join_all(queries.iter().map(|q| self.execute(q))).await;
        let total_execution_time = started.elapsed();

        let total_queries = queries.len();
        let mut total_results = 0usize;
        let mut successes = 0usize;
        let mut summed_query_time = Duration::ZERO;
        for response in responses.iter().flatten() {
            total_results += response.results.len();
            summed_query_time += response.metrics.execution_time;
            if !response.results.is_empty() {
                successes += 1;
            }
        }

        let elapsed_secs = total_execution_time.as_secs_f64();
        let metrics = BatchQueryMetrics {
            total_queries,
            total_execution_time,
            average_execution_time: if total_queries > 0 {
                summed_query_time / total_queries as u32
            } else {
                Duration::ZERO
            },
            throughput: if elapsed_secs > 0.0 {
                total_results as f64 / elapsed_secs
            } else {
                0.0
            },
            success_rate: if total_queries > 0 {
                successes as f64 / total_queries as f64
            } else {
                0.0
            },
        };

        BatchResponse { responses, metrics }
    }

    /// Run the optional second-pass reranker over the fused list.
    ///
    /// The reranked score and confidence replace the fused ones; the
    /// per-signal scores stay as fusion computed them. The query's own
    /// limit overrides the configured one so the pass reorders and
    /// filters but never truncates below what the caller asked for.
    fn apply_rerank(&self, results: Vec<FusedResult>, query: &Query) -> Result<Vec<FusedResult>> {
        let Some((engine, options)) = &self.reranker else {
            return Ok(results);
        };

        let mut by_id: HashMap<String, FusedResult> = results
            .into_iter()
            .map(|r| (r.candidate.id.clone(), r))
            .collect();
        let items: Vec<RankedInput> = by_id
            .values()
            .map(|r| RankedInput {
                candidate: r.candidate.clone(),
                score: r.final_score,
            })
            .collect();

        let mut options = options.clone();
        options.limit = query.options.limit;
        let reranked = engine.rerank(items, &query.text, &options)?;

        Ok(reranked
            .into_iter()
            .filter_map(|r| {
                by_id.remove(&r.candidate.id).map(|mut fused| {
                    fused.final_score = r.final_score;
                    fused.confidence = r.confidence;
                    fused
                })
            })
            .collect())
    }

    async fn cache_lookup(&self, key: &str, deadline: Duration) -> Option<Vec<FusedResult>> {
        match timeout(deadline, self.cache.get_json(key)).await {
            Ok(Ok(Some(json))) => match serde_json::from_str(&json) {
                Ok(results) => Some(results),
                Err(err) => {
                    warn!(%err, "cached entry failed to deserialize, bypassing cache");
                    None
                }
            },
            Ok(Ok(None)) => None,
            Ok(Err(err)) => {
                warn!(%err, "cache lookup failed, bypassing cache");
                None
            }
            Err(_) => {
                warn!("cache lookup timed out, bypassing cache");
                None
            }
        }
    }

    async fn cache_store(&self, key: &str, results: &[FusedResult], deadline: Duration) {
        let json = match serde_json::to_string(results) {
            Ok(json) => json,
            Err(err) => {
                warn!(%err, "failed to serialize results for caching");
                return;
            }
        };
        match timeout(
            deadline,
            self.cache.set_json(key, &json, self.cache_config.ttl()),
        )
        .await
        {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(%err, "cache store failed, continuing uncached"),
            Err(_) => warn!("cache store timed out, continuing uncached"),
        }
    }

    async fn record(&self, query: &Query, metrics: &QueryMetrics, deadline: Duration) {
        // Long queries aggregate under a truncated stat key.
        let stat_key: String = query.text.chars().take(QUERY_STAT_KEY_LEN).collect();
        match timeout(deadline, self.monitor.record_query(&stat_key, metrics)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(%err, "failed to record query metrics"),
            Err(_) => warn!("metrics recording timed out"),
        }
    }

    async fn format(&self, results: &[FusedResult], deadline: Duration) -> Option<String> {
        let formatter = self.formatter.as_ref()?;
        match timeout(deadline, formatter.format_for_llm(results)).await {
            Ok(Ok(payload)) => Some(payload),
            Ok(Err(err)) => {
                warn!(%err, "result formatting failed, returning unformatted results");
                None
            }
            Err(_) => {
                warn!("result formatting timed out, returning unformatted results");
                None
            }
        }
    }
}

/// Run one retrieval branch under a deadline, degrading any failure or
/// timeout to an empty candidate list with the elapsed time
async fn guarded<F>(branch: &str, deadline: Duration, search: F) -> (Vec<ScoredCandidate>, Duration)
where
    F: Future<Output = Result<Vec<ScoredCandidate>>>,
{
    let started = Instant::now();
    let hits = match timeout(deadline, search).await {
        Ok(Ok(hits)) => hits,
        Ok(Err(err)) => {
            warn!(branch, %err, "search branch failed, degrading to empty");
            Vec::new()
        }
        Err(_) => {
            warn!(branch, ?deadline, "search branch timed out, degrading to empty");
            Vec::new()
        }
    };
    (hits, started.elapsed())
}
