//! Second-pass reranking over a prior ranked list

use crate::config::RerankConfig;
use crate::ml::MlScorer;
use crate::similarity::jaccard_similarity;
use chrono::Utc;
use csf_domain::constants::{
    RERANK_CHUNK_TYPE_BOOST, RERANK_EXPORTED_BOOST, RERANK_GRAPH_CONTEXT_BONUS,
    RERANK_GRAPH_SATURATION, RERANK_RECENCY_FACTOR, RECENCY_DECAY_DAYS,
};
use csf_domain::entities::Candidate;
use csf_domain::error::Result;
use csf_domain::value_objects::RerankedResult;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Which rerank pass to apply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RerankStrategy {
    /// Term-overlap Jaccard against the query
    Semantic,
    /// Graph relationship density
    Graph,
    /// Pluggable scoring model as the semantic term
    Ml,
    /// Semantic + graph + contextual combined (default)
    #[default]
    Hybrid,
}

impl RerankStrategy {
    fn as_str(self) -> &'static str {
        match self {
            Self::Semantic => "semantic",
            Self::Graph => "graph",
            Self::Ml => "ml",
            Self::Hybrid => "hybrid",
        }
    }
}

/// A candidate entering the rerank with its prior score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedInput {
    /// The candidate
    pub candidate: Candidate,
    /// Score from the first-pass ranking
    pub score: f64,
}

/// Per-call rerank options
#[derive(Debug, Clone)]
pub struct RerankOptions {
    /// Strategy to apply
    pub strategy: RerankStrategy,
    /// Term weights; the remainder after the used terms goes to the
    /// original score
    pub weights: RerankConfig,
    /// Maximum results returned
    pub limit: usize,
    /// Minimum final score retained
    pub threshold: f64,
}

impl Default for RerankOptions {
    fn default() -> Self {
        Self {
            strategy: RerankStrategy::default(),
            weights: RerankConfig::default(),
            limit: csf_domain::constants::DEFAULT_RESULT_LIMIT,
            threshold: 0.0,
        }
    }
}

/// Strategy-selectable reranker with invocation counters
pub struct RerankEngine {
    ml: Arc<MlScorer>,
    counters: DashMap<&'static str, u64>,
}

impl RerankEngine {
    /// Create a reranker delegating ml-strategy scoring to `ml`
    pub fn new(ml: Arc<MlScorer>) -> Self {
        Self {
            ml,
            counters: DashMap::new(),
        }
    }

    /// Rerank a prior ranked list.
    ///
    /// Results are sorted descending by final score (stable), filtered by
    /// `threshold`, and truncated to `limit`.
    pub fn rerank(
        &self,
        items: Vec<RankedInput>,
        query: &str,
        options: &RerankOptions,
    ) -> Result<Vec<RerankedResult>> {
        *self.counters.entry("total").or_insert(0) += 1;
        *self.counters.entry(options.strategy.as_str()).or_insert(0) += 1;
        debug!(
            strategy = options.strategy.as_str(),
            items = items.len(),
            "reranking"
        );

        let query_tokens: HashSet<String> =
            query.split_whitespace().map(str::to_lowercase).collect();
        let now = Utc::now();

        let mut results: Vec<RerankedResult> = items
            .into_iter()
            .map(|item| self.score_item(item, &query_tokens, now, options))
            .collect();

        results.sort_by(|a, b| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.retain(|r| r.final_score >= options.threshold);
        results.truncate(options.limit);
        Ok(results)
    }

    /// Running counters: total rerankings and per-strategy invocations
    pub fn stats(&self) -> HashMap<String, u64> {
        self.counters
            .iter()
            .map(|e| ((*e.key()).to_string(), *e.value()))
            .collect()
    }

    fn score_item(
        &self,
        item: RankedInput,
        query_tokens: &HashSet<String>,
        now: chrono::DateTime<Utc>,
        options: &RerankOptions,
    ) -> RerankedResult {
        let w = &options.weights;
        let candidate = item.candidate;
        let original = item.score;

        let semantic = semantic_overlap(&candidate, query_tokens);
        let graph = graph_density(&candidate);
        let contextual = contextual_boost(&candidate, now);

        let (semantic_score, graph_score, contextual_score, final_score) = match options.strategy {
            RerankStrategy::Semantic => {
                let final_score = semantic * w.semantic_weight
                    + original * (1.0 - w.semantic_weight);
                (semantic, 0.0, 0.0, final_score)
            }
            RerankStrategy::Graph => {
                let final_score =
                    graph * w.graph_weight + original * (1.0 - w.graph_weight);
                (0.0, graph, 0.0, final_score)
            }
            RerankStrategy::Hybrid => {
                let used = w.semantic_weight + w.graph_weight + w.contextual_weight;
                let final_score = semantic * w.semantic_weight
                    + graph * w.graph_weight
                    + contextual * w.contextual_weight
                    + original * (1.0 - used);
                (semantic, graph, contextual, final_score)
            }
            RerankStrategy::Ml => {
                // The model prediction stands in for the semantic term.
                let predicted = self.ml.predict_or_fallback(&ml_features(
                    semantic, graph, contextual, &candidate, now, original,
                ));
                let final_score = predicted * w.semantic_weight
                    + original * (1.0 - w.semantic_weight);
                (predicted, graph, contextual, final_score)
            }
        };

        let final_score = final_score.clamp(0.0, 1.0);
        let confidence = final_score * (0.5 + candidate.metadata.completeness() * 0.5);

        RerankedResult {
            candidate,
            original_score: original,
            semantic_score,
            graph_score,
            contextual_score,
            final_score,
            confidence,
        }
    }
}

/// Token-set Jaccard between content and query
fn semantic_overlap(candidate: &Candidate, query_tokens: &HashSet<String>) -> f64 {
    let content_tokens: HashSet<String> = candidate
        .content
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();
    jaccard_similarity(query_tokens, &content_tokens)
}

/// Relationship density plus a flat bonus for having graph context
fn graph_density(candidate: &Candidate) -> f64 {
    let count = candidate
        .graph_context
        .as_ref()
        .map_or(0.0, |g| f64::from(g.relationship_count));
    let mut score = (count / RERANK_GRAPH_SATURATION).min(1.0);
    if candidate.graph_context.is_some() {
        score += RERANK_GRAPH_CONTEXT_BONUS;
    }
    score
}

/// Chunk-type, export, and recency boosts folded into one contextual term
fn contextual_boost(candidate: &Candidate, now: chrono::DateTime<Utc>) -> f64 {
    let mut boost = 0.0;
    if candidate.chunk_type.is_definition() {
        boost += RERANK_CHUNK_TYPE_BOOST;
    }
    if candidate.metadata.exported {
        boost += RERANK_EXPORTED_BOOST;
    }
    if let Some(modified) = candidate.metadata.last_modified {
        let age_days = (now - modified).num_seconds().max(0) as f64 / 86_400.0;
        boost += (-age_days / RECENCY_DECAY_DAYS).exp() * RERANK_RECENCY_FACTOR;
    }
    boost
}

fn ml_features(
    semantic: f64,
    graph: f64,
    contextual: f64,
    candidate: &Candidate,
    now: chrono::DateTime<Utc>,
    original: f64,
) -> HashMap<String, f64> {
    let recency = candidate.metadata.last_modified.map_or(0.0, |modified| {
        let age_days = (now - modified).num_seconds().max(0) as f64 / 86_400.0;
        (-age_days / RECENCY_DECAY_DAYS).exp()
    });
    let popularity = ((candidate.metadata.usage_count + candidate.metadata.reference_count)
        as f64
        / csf_domain::constants::POPULARITY_SATURATION)
        .min(1.0);

    HashMap::from([
        ("semantic_score".to_string(), semantic),
        ("graph_score".to_string(), graph),
        ("contextual_score".to_string(), contextual),
        ("recency_score".to_string(), recency),
        ("popularity_score".to_string(), popularity),
        ("original_score".to_string(), original),
    ])
}
