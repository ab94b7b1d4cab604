//! Integration tests for the hybrid multi-strategy search service

mod support;

use csf_application::{HybridParams, HybridSearchService};
use csf_domain::ports::SearchStrategy;
use csf_domain::value_objects::{HighlightKind, SourceKind};
use csf_engine::cache::{MokaCacheProvider, NullCacheProvider};
use csf_engine::strategies::KeywordStrategy;
use std::sync::Arc;
use support::{candidate, scored, FailingSemantic, FixedCorpus, StaticSemantic};

fn keyword_over_corpus() -> Arc<dyn SearchStrategy> {
    Arc::new(KeywordStrategy::new(Arc::new(FixedCorpus(vec![
        candidate("c1", "fn authenticate user token"),
        candidate("c2", "fn token refresh"),
    ]))))
}

fn service(semantic_hits: Vec<csf_domain::entities::ScoredCandidate>) -> HybridSearchService {
    HybridSearchService::new(
        Arc::new(StaticSemantic::new(semantic_hits)),
        vec![keyword_over_corpus()],
        Arc::new(NullCacheProvider),
    )
}

fn params(query: &str) -> HybridParams {
    let mut p = HybridParams::new(query, "p1");
    p.threshold = 0.0;
    p.strategies = vec![SourceKind::Semantic, SourceKind::Keyword];
    p
}

#[tokio::test]
async fn strategies_are_fused_without_renormalization() -> anyhow::Result<()> {
    let service = service(vec![scored(
        "c1",
        "fn authenticate user token",
        0.9,
        SourceKind::Semantic,
    )]);

    let response = service.search(&params("token")).await?;
    assert_eq!(response.results.len(), 2);

    let c1 = &response.results[0];
    assert_eq!(c1.candidate.id, "c1");
    assert_eq!(c1.strategy_score(SourceKind::Semantic), 0.9);
    assert_eq!(c1.strategy_score(SourceKind::Keyword), 1.0);
    // 0.9 * 0.4 semantic + 1.0 * 0.3 keyword
    assert!((c1.combined_score - 0.66).abs() < 1e-12);

    // c2 was returned by keyword only; the absent semantic strategy
    // contributes zero and the keyword weight is not scaled up.
    let c2 = &response.results[1];
    assert_eq!(c2.candidate.id, "c2");
    assert!(c2.strategy_scores.get(&SourceKind::Semantic).is_none());
    assert!((c2.combined_score - 0.3).abs() < 1e-12);
    Ok(())
}

#[tokio::test]
async fn highlights_mark_keyword_and_strong_semantic_matches() -> anyhow::Result<()> {
    let service = service(vec![scored(
        "c1",
        "fn authenticate user token",
        0.9,
        SourceKind::Semantic,
    )]);

    let response = service.search(&params("token")).await?;
    let c1 = response
        .results
        .iter()
        .find(|r| r.candidate.id == "c1")
        .unwrap();
    assert!(c1
        .match_highlights
        .iter()
        .any(|h| h.kind == HighlightKind::Keyword && h.term == "token"));
    assert!(c1
        .match_highlights
        .iter()
        .any(|h| h.kind == HighlightKind::Semantic));

    let c2 = response
        .results
        .iter()
        .find(|r| r.candidate.id == "c2")
        .unwrap();
    assert!(c2
        .match_highlights
        .iter()
        .all(|h| h.kind != HighlightKind::Semantic));
    Ok(())
}

#[tokio::test]
async fn semantic_outage_degrades_to_the_other_strategies() -> anyhow::Result<()> {
    let service = HybridSearchService::new(
        Arc::new(FailingSemantic),
        vec![keyword_over_corpus()],
        Arc::new(NullCacheProvider),
    );

    let response = service.search(&params("token")).await?;
    assert_eq!(response.results.len(), 2);
    assert!(response
        .results
        .iter()
        .all(|r| r.strategy_scores.contains_key(&SourceKind::Keyword)));
    Ok(())
}

#[tokio::test]
async fn unrequested_strategies_are_not_dispatched() -> anyhow::Result<()> {
    let semantic = Arc::new(StaticSemantic::new(Vec::new()));
    let service = HybridSearchService::new(
        semantic.clone(),
        vec![keyword_over_corpus()],
        Arc::new(NullCacheProvider),
    );

    let mut p = params("token");
    p.strategies = vec![SourceKind::Keyword];
    let response = service.search(&p).await?;

    assert_eq!(semantic.call_count(), 0);
    assert_eq!(response.results.len(), 2);
    Ok(())
}

#[tokio::test]
async fn repeated_searches_are_served_from_cache() -> anyhow::Result<()> {
    let semantic = Arc::new(StaticSemantic::new(vec![scored(
        "c1",
        "fn authenticate user token",
        0.9,
        SourceKind::Semantic,
    )]));
    let service = HybridSearchService::new(
        semantic.clone(),
        vec![keyword_over_corpus()],
        Arc::new(MokaCacheProvider::with_capacity(16)),
    );

    let p = params("token");
    let first = service.search(&p).await?;
    assert!(!first.metrics.cache_hit);

    let second = service.search(&p).await?;
    assert!(second.metrics.cache_hit);
    assert_eq!(second.results, first.results);
    assert_eq!(semantic.call_count(), 1);

    // Different weights form a different cache key.
    let mut reweighted = p.clone();
    reweighted.weights.semantic = 0.6;
    let third = service.search(&reweighted).await?;
    assert!(!third.metrics.cache_hit);
    assert_eq!(semantic.call_count(), 2);
    Ok(())
}

#[tokio::test]
async fn feedback_bumps_the_semantic_weight_for_that_call() -> anyhow::Result<()> {
    let service = service(vec![scored(
        "c1",
        "fn authenticate user token",
        0.9,
        SourceKind::Semantic,
    )]);
    let p = params("token");

    let plain = service.search(&p).await?;
    let with_feedback = service
        .search_with_feedback(&p, &["c1".to_string()], &[])
        .await?;

    let plain_score = plain.results[0].combined_score;
    let boosted_score = with_feedback.results[0].combined_score;
    // 0.9 * (0.4 + 0.1) + 1.0 * 0.3
    assert!(boosted_score > plain_score);
    assert!((boosted_score - 0.75).abs() < 1e-12);

    // The delta is memoized per (query, project): contradictory feedback
    // for the same query reuses the first delta.
    let repeated = service
        .search_with_feedback(&p, &[], &["c1".to_string()])
        .await?;
    assert!((repeated.results[0].combined_score - boosted_score).abs() < 1e-12);
    Ok(())
}

#[tokio::test]
async fn explanations_break_down_the_combined_score() -> anyhow::Result<()> {
    let service = service(vec![scored(
        "c1",
        "fn authenticate user token",
        0.9,
        SourceKind::Semantic,
    )]);

    let response = service.search(&params("token")).await?;
    let c1 = response
        .results
        .iter()
        .find(|r| r.candidate.id == "c1")
        .unwrap();

    let explanation = service.explain(c1, "token");
    assert_eq!(explanation.strategy_breakdown.len(), 2);
    let pct_sum: f64 = explanation
        .strategy_breakdown
        .iter()
        .map(|c| c.contribution_pct)
        .sum();
    assert!((pct_sum - 100.0).abs() < 1e-9);
    assert!(explanation
        .factors
        .iter()
        .any(|f| f == "All keywords matched"));
    assert!(explanation
        .factors
        .iter()
        .any(|f| f == "High semantic similarity"));
    assert!(explanation.matched_terms.iter().any(|t| t.contains("token")));
    assert!(explanation.recommendations.is_empty());

    // Memoized: a second call returns the same explanation.
    assert_eq!(service.explain(c1, "token"), explanation);
    Ok(())
}

#[tokio::test]
async fn explanations_recommend_fixes_for_weak_strategies() -> anyhow::Result<()> {
    // Semantic-only hit whose content shares no terms with the query.
    let service = service(vec![scored(
        "c3",
        "fn unrelated helper",
        0.9,
        SourceKind::Semantic,
    )]);

    let mut p = params("nomatch");
    p.strategies = vec![SourceKind::Semantic];
    let response = service.search(&p).await?;
    let c3 = &response.results[0];

    let explanation = service.explain(c3, "nomatch");
    assert!(explanation
        .recommendations
        .iter()
        .any(|r| r.contains("Low keyword score")));
    Ok(())
}

#[tokio::test]
async fn explanations_follow_the_result_in_hand_after_reweighting() -> anyhow::Result<()> {
    let service = service(vec![scored(
        "c1",
        "fn authenticate user token",
        0.9,
        SourceKind::Semantic,
    )]);
    let p = params("token");

    let plain = service.search(&p).await?;
    let boosted = service
        .search_with_feedback(&p, &["c1".to_string()], &[])
        .await?;
    assert_eq!(plain.results[0].candidate.id, "c1");
    assert_eq!(boosted.results[0].candidate.id, "c1");
    assert!(boosted.results[0].combined_score > plain.results[0].combined_score);

    // Same candidate, same query, different combined score: the boosted
    // result must not be served the earlier memo entry.
    let before = service.explain(&plain.results[0], "token");
    let after = service.explain(&boosted.results[0], "token");
    assert_ne!(before, after);

    let pct_sum: f64 = before
        .strategy_breakdown
        .iter()
        .map(|c| c.contribution_pct)
        .sum();
    assert!((pct_sum - 100.0).abs() < 1e-9);
    Ok(())
}
