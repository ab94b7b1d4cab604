//! The five-signal fusion algorithm
//!
//! Candidates from the vector and graph branches are merged by id; a
//! candidate present in both keeps both normalized scores, one present in
//! a single source gets 0 for the missing score. Final ordering is a
//! stable descending sort on the weighted final score.

use crate::config::FusionConfig;
use crate::fusion::intent::{classify_intent, QueryIntent};
use chrono::Utc;
use csf_domain::constants::{
    CONFIDENCE_DISAGREEMENT_PENALTY, CONFIDENCE_GRAPH_CONTEXT_BONUS,
    INTENT_SEMANTIC_GRAPH_PENALTY, INTENT_SEMANTIC_VECTOR_BOOST, INTENT_STRUCTURAL_GRAPH_BOOST,
    INTENT_STRUCTURAL_VECTOR_PENALTY, POPULARITY_SATURATION, RECENCY_DECAY_DAYS,
    SEARCH_TYPE_GRAPH_BOOST, SEARCH_TYPE_GRAPH_VECTOR_PENALTY,
};
use csf_domain::entities::{Candidate, CandidateMetadata, ScoredCandidate};
use csf_domain::error::{Error, Result};
use csf_domain::value_objects::{FusedResult, FusionWeights, Query, SearchType};
use std::collections::HashMap;
use tracing::debug;

/// Merges and scores candidates from the vector and graph branches
#[derive(Debug, Clone, Default)]
pub struct FusionEngine {
    config: FusionConfig,
}

struct Merged {
    candidate: Candidate,
    vector_score: f64,
    graph_score: f64,
}

impl FusionEngine {
    /// Create an engine with the given configuration
    pub fn new(config: FusionConfig) -> Self {
        Self { config }
    }

    /// The configured base weights, before intent rebalancing.
    ///
    /// Callers caching fused responses fold these into the cache key so
    /// differently-weighted engines never share entries.
    pub fn base_weights(&self) -> &FusionWeights {
        &self.config.base_weights
    }

    /// Fuse vector and graph candidates into one ranked list.
    ///
    /// Empty inputs produce an empty output. Candidates missing an id are
    /// a collaborator contract violation and abort the fusion.
    pub fn fuse(
        &self,
        vector: Vec<ScoredCandidate>,
        graph: Vec<ScoredCandidate>,
        query: &Query,
    ) -> Result<Vec<FusedResult>> {
        if vector.is_empty() && graph.is_empty() {
            return Ok(Vec::new());
        }
        validate_candidates(&vector)?;
        validate_candidates(&graph)?;

        let intent = classify_intent(&query.text);
        let weights = self.effective_weights(intent, query.options.search_type);
        debug!(
            structural = intent.structural,
            semantic = intent.semantic,
            vector_weight = weights.vector,
            graph_weight = weights.graph,
            "fusion weights rebalanced"
        );

        let vector_norm = normalize_batch(&vector);
        let graph_norm = normalize_batch(&graph);

        let merged = merge_by_id(vector, vector_norm, graph, graph_norm);
        let query_terms = query.terms();
        let now = Utc::now();

        let mut results: Vec<FusedResult> = merged
            .into_iter()
            .map(|m| {
                let contextual_score = term_overlap(&query_terms, &m.candidate.content);
                let recency_score = recency(&m.candidate.metadata, now);
                let popularity_score = popularity(&m.candidate.metadata);

                let final_score = (m.vector_score * weights.vector
                    + m.graph_score * weights.graph
                    + contextual_score * weights.contextual
                    + recency_score * weights.recency
                    + popularity_score * weights.popularity)
                    .clamp(0.0, 1.0);

                let confidence =
                    confidence(final_score, m.vector_score, m.graph_score, &m.candidate);

                FusedResult {
                    candidate: m.candidate,
                    vector_score: m.vector_score,
                    graph_score: m.graph_score,
                    contextual_score,
                    recency_score,
                    popularity_score,
                    final_score,
                    confidence,
                }
            })
            .collect();

        // Stable sort: ties keep merge order.
        results.sort_by(|a, b| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let threshold = query.options.threshold;
        let limit = query.options.limit;
        results.retain(|r| r.final_score >= threshold);
        results.truncate(limit);
        Ok(results)
    }

    /// Base weights rebalanced by intent and search type, renormalized to
    /// sum to exactly 1
    pub(crate) fn effective_weights(
        &self,
        intent: QueryIntent,
        search_type: SearchType,
    ) -> FusionWeights {
        let mut w = self.config.base_weights;
        if intent.structural {
            w.graph += INTENT_STRUCTURAL_GRAPH_BOOST;
            w.vector -= INTENT_STRUCTURAL_VECTOR_PENALTY;
        }
        if intent.semantic {
            w.vector += INTENT_SEMANTIC_VECTOR_BOOST;
            w.graph -= INTENT_SEMANTIC_GRAPH_PENALTY;
        }
        if search_type == SearchType::Graph {
            w.graph += SEARCH_TYPE_GRAPH_BOOST;
            w.vector -= SEARCH_TYPE_GRAPH_VECTOR_PENALTY;
        }
        w.vector = w.vector.max(0.0);
        w.graph = w.graph.max(0.0);
        w.normalize()
    }
}

fn validate_candidates(batch: &[ScoredCandidate]) -> Result<()> {
    for hit in batch {
        if hit.candidate.id.is_empty() {
            return Err(Error::fusion(format!(
                "candidate from {} source has an empty id",
                hit.source
            )));
        }
    }
    Ok(())
}

/// Min-max normalize one source's scores.
///
/// A degenerate batch (all scores equal) maps to 1 when the shared score
/// is positive, so a lone hit is not zeroed out; an all-zero batch stays
/// at 0.
fn normalize_batch(batch: &[ScoredCandidate]) -> Vec<f64> {
    if batch.is_empty() {
        return Vec::new();
    }
    let min = batch.iter().map(|c| c.score).fold(f64::INFINITY, f64::min);
    let max = batch
        .iter()
        .map(|c| c.score)
        .fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    batch
        .iter()
        .map(|c| {
            if range > 0.0 {
                (c.score - min) / range
            } else if max > 0.0 {
                1.0
            } else {
                0.0
            }
        })
        .collect()
}

/// Merge by candidate id, preserving arrival order (vector branch first).
///
/// When a candidate appears in both branches the vector copy is kept and
/// the graph copy contributes its score and graph context.
fn merge_by_id(
    vector: Vec<ScoredCandidate>,
    vector_norm: Vec<f64>,
    graph: Vec<ScoredCandidate>,
    graph_norm: Vec<f64>,
) -> Vec<Merged> {
    let mut order: Vec<Merged> = Vec::with_capacity(vector.len() + graph.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for (hit, norm) in vector.into_iter().zip(vector_norm) {
        let id = hit.candidate.id.clone();
        match index.get(&id) {
            Some(&i) => order[i].vector_score = order[i].vector_score.max(norm),
            None => {
                index.insert(id, order.len());
                order.push(Merged {
                    candidate: hit.candidate,
                    vector_score: norm,
                    graph_score: 0.0,
                });
            }
        }
    }

    for (hit, norm) in graph.into_iter().zip(graph_norm) {
        let id = hit.candidate.id.clone();
        match index.get(&id) {
            Some(&i) => {
                let merged = &mut order[i];
                merged.graph_score = merged.graph_score.max(norm);
                if merged.candidate.graph_context.is_none() {
                    merged.candidate.graph_context = hit.candidate.graph_context;
                }
            }
            None => {
                index.insert(id, order.len());
                order.push(Merged {
                    candidate: hit.candidate,
                    vector_score: 0.0,
                    graph_score: norm,
                });
            }
        }
    }

    order
}

/// Fraction of query terms present in the content, case-insensitive
fn term_overlap(query_terms: &[String], content: &str) -> f64 {
    if query_terms.is_empty() {
        return 0.0;
    }
    let content = content.to_lowercase();
    let present = query_terms.iter().filter(|t| content.contains(*t)).count();
    present as f64 / query_terms.len() as f64
}

/// Exponential-decay recency from `last_modified`; missing metadata
/// scores 0 (nothing is known about the file's age)
fn recency(metadata: &CandidateMetadata, now: chrono::DateTime<Utc>) -> f64 {
    match metadata.last_modified {
        Some(modified) => {
            let age_days = (now - modified).num_seconds().max(0) as f64 / 86_400.0;
            (-age_days / RECENCY_DECAY_DAYS).exp()
        }
        None => 0.0,
    }
}

/// Usage/reference popularity, saturating at the configured count
fn popularity(metadata: &CandidateMetadata) -> f64 {
    let total = (metadata.usage_count + metadata.reference_count) as f64;
    (total / POPULARITY_SATURATION).min(1.0)
}

/// Confidence: final score penalized by vector/graph disagreement,
/// boosted by graph context, then scaled by metadata completeness
fn confidence(final_score: f64, vector_score: f64, graph_score: f64, candidate: &Candidate) -> f64 {
    let mut c = final_score - (vector_score - graph_score).abs() * CONFIDENCE_DISAGREEMENT_PENALTY;
    if candidate.graph_context.is_some() {
        c += CONFIDENCE_GRAPH_CONTEXT_BONUS;
    }
    c *= 0.5 + candidate.metadata.completeness() * 0.5;
    c.clamp(0.0, 1.0)
}
