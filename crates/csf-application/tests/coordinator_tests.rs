//! Integration tests for the query coordinator: degradation, caching,
//! batching, and metrics recording against mock collaborators

mod support;

use csf_application::QueryCoordinator;
use csf_domain::entities::GraphContext;
use csf_domain::error::Error;
use csf_domain::ports::{GraphSearchProvider, VectorSearchProvider};
use csf_domain::value_objects::{FusionWeights, Query, QueryOptions, SourceKind};
use csf_engine::cache::{MokaCacheProvider, NullCacheProvider};
use csf_engine::config::{FusionConfig, RerankConfig, TimeoutConfig};
use csf_engine::fusion::FusionEngine;
use csf_engine::ml::MlScorer;
use csf_engine::rerank::{RerankEngine, RerankOptions, RerankStrategy};
use std::sync::Arc;
use std::time::Duration;
use support::{
    scored, CountingFormatter, FailingGraph, FailingOptimizer, FailingVector, PassthroughOptimizer,
    RecordingMonitor, SlowGraph, StaticEmbedder, StaticGraph, StaticVector,
};

fn coordinator(
    vector: Arc<dyn VectorSearchProvider>,
    graph: Arc<dyn GraphSearchProvider>,
    monitor: Arc<RecordingMonitor>,
) -> QueryCoordinator {
    QueryCoordinator::new(
        vector,
        graph,
        Arc::new(StaticEmbedder),
        Arc::new(PassthroughOptimizer),
        Arc::new(NullCacheProvider),
        monitor,
    )
}

/// Threshold zeroed so every fused candidate survives filtering.
fn open_query(text: &str) -> Query {
    Query::new(text, "p1").with_options(QueryOptions {
        threshold: 0.0,
        ..QueryOptions::default()
    })
}

#[tokio::test]
async fn vector_outage_degrades_to_graph_results() -> anyhow::Result<()> {
    let graph_hits = vec![scored("a", "fn handle_auth", 0.8, SourceKind::Graph)];
    let coordinator = coordinator(
        Arc::new(FailingVector),
        Arc::new(StaticGraph::new(graph_hits)),
        Arc::new(RecordingMonitor::default()),
    );

    let response = coordinator.execute(&open_query("auth")).await?;
    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].candidate.id, "a");
    assert!(!response.metrics.cache_hit);
    Ok(())
}

#[tokio::test]
async fn no_healthy_branch_yields_empty_not_error() -> anyhow::Result<()> {
    let coordinator = coordinator(
        Arc::new(FailingVector),
        Arc::new(FailingGraph),
        Arc::new(RecordingMonitor::default()),
    );

    let response = coordinator.execute(&open_query("auth")).await?;
    assert!(response.results.is_empty());
    assert_eq!(response.metrics.total_results, 0);
    Ok(())
}

#[tokio::test]
async fn optimizer_failure_is_fatal() {
    let coordinator = QueryCoordinator::new(
        Arc::new(StaticVector::new(Vec::new())),
        Arc::new(StaticGraph::new(Vec::new())),
        Arc::new(StaticEmbedder),
        Arc::new(FailingOptimizer),
        Arc::new(NullCacheProvider),
        Arc::new(RecordingMonitor::default()),
    );

    let err = coordinator.execute(&open_query("auth")).await.unwrap_err();
    match err {
        Error::Optimization {
            component,
            operation,
            ..
        } => {
            assert_eq!(component, "query_coordinator");
            assert_eq!(operation, "optimize");
        }
        other => panic!("expected optimization error, got {other}"),
    }
}

#[tokio::test]
async fn graph_branch_skipped_when_not_requested() -> anyhow::Result<()> {
    let vector = Arc::new(StaticVector::new(vec![scored(
        "a",
        "fn handle_auth",
        0.9,
        SourceKind::Semantic,
    )]));
    let graph = Arc::new(StaticGraph::new(vec![scored(
        "b",
        "fn other",
        0.9,
        SourceKind::Graph,
    )]));
    let coordinator = coordinator(
        vector.clone(),
        graph.clone(),
        Arc::new(RecordingMonitor::default()),
    );

    let query = Query::new("auth", "p1").with_options(QueryOptions {
        threshold: 0.0,
        include_graph: false,
        ..QueryOptions::default()
    });
    let response = coordinator.execute(&query).await?;

    assert_eq!(graph.call_count(), 0);
    assert_eq!(vector.call_count(), 1);
    assert_eq!(response.metrics.graph_search_time, Duration::ZERO);
    assert_eq!(response.results.len(), 1);
    Ok(())
}

#[tokio::test]
async fn cache_hit_skips_the_backends() -> anyhow::Result<()> {
    let vector = Arc::new(StaticVector::new(vec![scored(
        "a",
        "fn handle_auth",
        0.9,
        SourceKind::Semantic,
    )]));
    let coordinator = QueryCoordinator::new(
        vector.clone(),
        Arc::new(StaticGraph::new(Vec::new())),
        Arc::new(StaticEmbedder),
        Arc::new(PassthroughOptimizer),
        Arc::new(MokaCacheProvider::with_capacity(16)),
        Arc::new(RecordingMonitor::default()),
    );

    let query = open_query("auth");
    let first = coordinator.execute(&query).await?;
    assert!(!first.metrics.cache_hit);

    let second = coordinator.execute(&query).await?;
    assert!(second.metrics.cache_hit);
    assert_eq!(second.metrics.vector_search_time, Duration::ZERO);
    assert_eq!(second.results, first.results);
    assert_eq!(vector.call_count(), 1);
    Ok(())
}

#[tokio::test]
async fn slow_graph_branch_times_out_and_degrades() -> anyhow::Result<()> {
    let coordinator = coordinator(
        Arc::new(StaticVector::new(vec![scored(
            "a",
            "fn handle_auth",
            0.9,
            SourceKind::Semantic,
        )])),
        Arc::new(SlowGraph {
            hits: vec![scored("b", "fn other", 0.9, SourceKind::Graph)],
            delay: Duration::from_millis(300),
        }),
        Arc::new(RecordingMonitor::default()),
    )
    .with_timeouts(TimeoutConfig { per_call_ms: 30 });

    let response = coordinator.execute(&open_query("auth")).await?;
    let ids: Vec<&str> = response
        .results
        .iter()
        .map(|r| r.candidate.id.as_str())
        .collect();
    assert_eq!(ids, vec!["a"]);
    Ok(())
}

#[tokio::test]
async fn formatter_output_is_attached_when_wired() -> anyhow::Result<()> {
    let coordinator = coordinator(
        Arc::new(StaticVector::new(vec![scored(
            "a",
            "fn handle_auth",
            0.9,
            SourceKind::Semantic,
        )])),
        Arc::new(StaticGraph::new(Vec::new())),
        Arc::new(RecordingMonitor::default()),
    )
    .with_formatter(Arc::new(CountingFormatter));

    let response = coordinator.execute(&open_query("auth")).await?;
    assert_eq!(response.formatted.as_deref(), Some("1 results"));
    Ok(())
}

#[tokio::test]
async fn metrics_are_recorded_per_query() -> anyhow::Result<()> {
    let monitor = Arc::new(RecordingMonitor::default());
    let coordinator = coordinator(
        Arc::new(StaticVector::new(vec![scored(
            "a",
            "fn handle_auth",
            0.9,
            SourceKind::Semantic,
        )])),
        Arc::new(StaticGraph::new(Vec::new())),
        monitor.clone(),
    );

    coordinator.execute(&open_query("auth flow")).await?;
    let recorded = monitor.recorded();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].0, "auth flow");
    assert_eq!(recorded[0].1.total_results, 1);
    Ok(())
}

#[tokio::test]
async fn batch_aggregates_success_rate_and_throughput() {
    // Vector is down; only queries that dispatch the graph branch return
    // anything.
    let coordinator = coordinator(
        Arc::new(FailingVector),
        Arc::new(StaticGraph::new(vec![scored(
            "a",
            "fn handle_auth",
            0.8,
            SourceKind::Graph,
        )])),
        Arc::new(RecordingMonitor::default()),
    );

    let with_graph = open_query("auth");
    let without_graph = Query::new("auth", "p1").with_options(QueryOptions {
        threshold: 0.0,
        include_graph: false,
        ..QueryOptions::default()
    });

    let batch = coordinator
        .execute_batch(&[with_graph, without_graph])
        .await;
    assert_eq!(batch.responses.len(), 2);
    assert_eq!(batch.metrics.total_queries, 2);
    assert!((batch.metrics.success_rate - 0.5).abs() < 1e-12);
    assert!(batch.metrics.throughput > 0.0);
    assert!(batch.metrics.average_execution_time <= batch.metrics.total_execution_time);
}

#[tokio::test]
async fn reranker_pass_reorders_fused_results_before_caching() -> anyhow::Result<()> {
    // "leaf" wins fusion (higher raw graph score), but "hub" carries the
    // dense graph neighborhood a graph-strategy rerank rewards.
    let mut hub = scored("hub", "fn alpha", 0.4, SourceKind::Graph);
    hub.candidate.graph_context = Some(GraphContext {
        related_symbols: vec!["caller".to_string()],
        relationship_count: 10,
        depth: 1,
    });
    let leaf = scored("leaf", "fn beta", 0.6, SourceKind::Graph);

    let reranker = Arc::new(RerankEngine::new(Arc::new(MlScorer::default())));
    let options = RerankOptions {
        strategy: RerankStrategy::Graph,
        weights: RerankConfig {
            semantic_weight: 0.3,
            graph_weight: 0.5,
            contextual_weight: 0.1,
        },
        ..RerankOptions::default()
    };
    let coordinator = QueryCoordinator::new(
        Arc::new(StaticVector::new(Vec::new())),
        Arc::new(StaticGraph::new(vec![hub, leaf])),
        Arc::new(StaticEmbedder),
        Arc::new(PassthroughOptimizer),
        Arc::new(MokaCacheProvider::with_capacity(16)),
        Arc::new(RecordingMonitor::default()),
    )
    .with_reranker(reranker, options);

    let response = coordinator.execute(&open_query("payments")).await?;
    let ids: Vec<&str> = response
        .results
        .iter()
        .map(|r| r.candidate.id.as_str())
        .collect();
    assert_eq!(ids, ["hub", "leaf"]);
    // hub: saturated density 1.0 plus the 0.2 context bonus, weighted 0.5.
    assert!((response.results[0].final_score - 0.6).abs() < 1e-9);
    // leaf: no graph context, so half its fused score of ~0.3 remains.
    assert!((response.results[1].final_score - 0.15).abs() < 1e-6);

    // The cached entry holds the reranked ordering.
    let cached = coordinator.execute(&open_query("payments")).await?;
    assert!(cached.metrics.cache_hit);
    assert_eq!(cached.results[0].candidate.id, "hub");
    Ok(())
}

#[tokio::test]
async fn differently_weighted_fusion_engines_do_not_share_cache_entries() -> anyhow::Result<()> {
    let cache = Arc::new(MokaCacheProvider::with_capacity(16));
    let hits = vec![scored("a", "fn handle_auth", 0.8, SourceKind::Semantic)];
    let vector_b = Arc::new(StaticVector::new(hits.clone()));

    let defaults = QueryCoordinator::new(
        Arc::new(StaticVector::new(hits)),
        Arc::new(StaticGraph::new(Vec::new())),
        Arc::new(StaticEmbedder),
        Arc::new(PassthroughOptimizer),
        cache.clone(),
        Arc::new(RecordingMonitor::default()),
    );
    let vector_only = QueryCoordinator::new(
        vector_b.clone(),
        Arc::new(StaticGraph::new(Vec::new())),
        Arc::new(StaticEmbedder),
        Arc::new(PassthroughOptimizer),
        cache,
        Arc::new(RecordingMonitor::default()),
    )
    .with_fusion(FusionEngine::new(FusionConfig {
        base_weights: FusionWeights {
            vector: 1.0,
            graph: 0.0,
            contextual: 0.0,
            recency: 0.0,
            popularity: 0.0,
        },
    }));

    let first = defaults.execute(&open_query("auth")).await?;
    assert!(!first.metrics.cache_hit);

    // Same query against the reweighted engine keys a different entry.
    let second = vector_only.execute(&open_query("auth")).await?;
    assert!(!second.metrics.cache_hit);
    assert_eq!(vector_b.call_count(), 1);
    Ok(())
}

#[tokio::test]
async fn long_query_text_records_under_a_truncated_stat_key() -> anyhow::Result<()> {
    let monitor = Arc::new(RecordingMonitor::default());
    let coordinator = coordinator(
        Arc::new(StaticVector::new(Vec::new())),
        Arc::new(StaticGraph::new(Vec::new())),
        monitor.clone(),
    );

    let long = "auth ".repeat(20);
    coordinator.execute(&open_query(&long)).await?;

    let recorded = monitor.recorded();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].0.chars().count(), 50);
    assert!(long.starts_with(&recorded[0].0));
    Ok(())
}
