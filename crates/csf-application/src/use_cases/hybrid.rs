//! Hybrid Multi-Strategy Search
//!
//! Alternate entry point that fans out to up to four retrieval
//! strategies (semantic via an external collaborator, keyword/fuzzy/
//! structural via injected `SearchStrategy` implementations) and fuses
//! them with its own weighting rule: a candidate's combined score sums
//! `strategy_score x weight` over only the strategies that returned it,
//! with no per-candidate renormalization.
//!
//! Per-strategy failures degrade to empty like the coordinator branches.
//! Explanations are a pure function of a result's stored scores and
//! content, memoized per (result, query, scores) in a bounded cache.

use csf_domain::constants::{
    DEFAULT_RESULT_LIMIT, DEFAULT_SCORE_THRESHOLD, FEEDBACK_SEMANTIC_BONUS,
    SEMANTIC_HIGHLIGHT_THRESHOLD,
};
use csf_domain::entities::ScoredCandidate;
use csf_domain::error::Result;
use csf_domain::ports::{CacheProvider, SearchOpts, SearchStrategy, SemanticSearchProvider};
use csf_domain::value_objects::{
    HighlightKind, HybridResult, MatchHighlight, QueryFilters, QueryMetrics, SearchExplanation,
    SourceKind, StrategyContribution, StrategyWeights,
};
use csf_engine::cache::CacheKeyParts;
use csf_engine::config::{CacheConfig, TimeoutConfig};
use dashmap::DashMap;
use futures::future::join_all;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, warn};

/// Entry cap on the explanation and feedback-delta memos
const MEMO_CAP: usize = 4096;

/// Parameters for one hybrid search call
#[derive(Debug, Clone)]
pub struct HybridParams {
    /// Query text
    pub query: String,
    /// Project scope
    pub project_id: String,
    /// Maximum results
    pub limit: usize,
    /// Minimum combined score retained
    pub threshold: f64,
    /// Structured backend filters
    pub filters: QueryFilters,
    /// Per-strategy weights
    pub weights: StrategyWeights,
    /// Which strategies to dispatch
    pub strategies: Vec<SourceKind>,
}

impl HybridParams {
    /// Parameters with documented defaults and all four strategies
    pub fn new(query: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            project_id: project_id.into(),
            limit: DEFAULT_RESULT_LIMIT,
            threshold: DEFAULT_SCORE_THRESHOLD,
            filters: QueryFilters::default(),
            weights: StrategyWeights::default(),
            strategies: vec![
                SourceKind::Semantic,
                SourceKind::Keyword,
                SourceKind::Fuzzy,
                SourceKind::Structural,
            ],
        }
    }
}

/// One hybrid search: ranked results plus timing metrics
#[derive(Debug, Clone)]
pub struct HybridResponse {
    /// Hybrid results, ranked descending by combined score
    pub results: Vec<HybridResult>,
    /// Timing metrics; branch timings stay zero on this path
    pub metrics: QueryMetrics,
}

/// Fans out to the requested strategies and fuses their results
pub struct HybridSearchService {
    semantic: Arc<dyn SemanticSearchProvider>,
    strategies: Vec<Arc<dyn SearchStrategy>>,
    cache: Arc<dyn CacheProvider>,
    weights: StrategyWeights,
    cache_config: CacheConfig,
    timeouts: TimeoutConfig,
    explanations: BoundedMemo<SearchExplanation>,
    feedback_deltas: BoundedMemo<f64>,
}

impl HybridSearchService {
    /// Create a service over the semantic collaborator and the pluggable
    /// strategy implementations
    pub fn new(
        semantic: Arc<dyn SemanticSearchProvider>,
        strategies: Vec<Arc<dyn SearchStrategy>>,
        cache: Arc<dyn CacheProvider>,
    ) -> Self {
        Self {
            semantic,
            strategies,
            cache,
            weights: StrategyWeights::default(),
            cache_config: CacheConfig::default(),
            timeouts: TimeoutConfig::default(),
            explanations: BoundedMemo::new(MEMO_CAP),
            feedback_deltas: BoundedMemo::new(MEMO_CAP),
        }
    }

    /// Replace the weights explanations are computed against
    pub fn with_weights(mut self, weights: StrategyWeights) -> Self {
        self.weights = weights;
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

    /// Run the requested strategy subset concurrently and fuse.
    ///
    /// A cache hit returns the stored results with only `execution_time`
    /// recomputed.
    pub async fn search(&self, params: &HybridParams) -> Result<HybridResponse> {
        let started = Instant::now();
        let per_call = self.timeouts.per_call();
        let key = cache_key(params);

        if self.cache_config.enabled {
            if let Some(results) = self.cache_lookup(&key, per_call).await {
                debug!(
                    query = params.query.as_str(),
                    results = results.len(),
                    "serving hybrid search from cache"
                );
                let metrics = QueryMetrics::cache_hit(started.elapsed(), results.len());
                return Ok(HybridResponse { results, metrics });
            }
        }

        let opts = SearchOpts {
            limit: params.limit,
            filters: params.filters.clone(),
            project_id: params.project_id.clone(),
        };

        let dispatches = params.strategies.iter().map(|&kind| {
            let opts = &opts;
            let query = params.query.as_str();
            async move {
                let hits = match kind {
                    SourceKind::Semantic => {
                        run_guarded(kind, per_call, self.semantic.search(query, opts)).await
                    }
                    _ => match self.strategy(kind) {
                        Some(strategy) => {
                            run_guarded(kind, per_call, strategy.run(query, opts)).await
                        }
                        None => {
                            warn!(
                                strategy = kind.as_str(),
                                "requested strategy has no implementation wired, skipping"
                            );
                            Vec::new()
                        }
                    },
                };
                (kind, hits)
            }
        });
        let branches: Vec<(SourceKind, Vec<ScoredCandidate>)> = join_all(dispatches).await;

        let mut results = fuse(branches, params);

        results.sort_by(|a, b| {
            b.combined_score
                .partial_cmp(&a.combined_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.retain(|r| r.combined_score >= params.threshold);
        results.truncate(params.limit);

        if self.cache_config.enabled {
            self.cache_store(&key, &results, per_call).await;
        }

        let metrics = QueryMetrics {
            execution_time: started.elapsed(),
            cache_hit: false,
            total_results: results.len(),
            ..QueryMetrics::default()
        };
        Ok(HybridResponse { results, metrics })
    }

    /// Re-run a search with weights adjusted from explicit relevance
    /// feedback.
    ///
    /// The delta is a documented heuristic: more relevant than irrelevant
    /// ids bumps the semantic weight. It is memoized per (query, project)
    /// and applied to this call only; the default weights never mutate.
    pub async fn search_with_feedback(
        &self,
        params: &HybridParams,
        relevant_ids: &[String],
        irrelevant_ids: &[String],
    ) -> Result<HybridResponse> {
        let delta_key = format!("{}\u{1f}{}", params.query, params.project_id);
        let delta = match self.feedback_deltas.get(&delta_key) {
            Some(delta) => delta,
            None => {
                let delta = if relevant_ids.len() > irrelevant_ids.len() {
                    FEEDBACK_SEMANTIC_BONUS
                } else {
                    0.0
                };
                self.feedback_deltas.insert(delta_key, delta);
                delta
            }
        };

        let mut adjusted = params.clone();
        adjusted.weights.semantic += delta;
        debug!(
            query = params.query.as_str(),
            delta, "searching with feedback-adjusted weights"
        );
        self.search(&adjusted).await
    }

    /// Explain why a result ranked where it did.
    ///
    /// Pure function of the result's stored per-strategy scores and
    /// content, computed against the service's configured weights. The
    /// memo key covers the exact scores, so the same candidate from a
    /// reweighted search gets a fresh explanation.
    pub fn explain(&self, result: &HybridResult, query: &str) -> SearchExplanation {
        let memo_key = explanation_key(result, query);
        if let Some(cached) = self.explanations.get(&memo_key) {
            return cached;
        }
        let explanation = build_explanation(result, query, &self.weights);
        self.explanations.insert(memo_key, explanation.clone());
        explanation
    }

    fn strategy(&self, kind: SourceKind) -> Option<&Arc<dyn SearchStrategy>> {
        self.strategies.iter().find(|s| s.source_kind() == kind)
    }

    async fn cache_lookup(&self, key: &str, deadline: Duration) -> Option<Vec<HybridResult>> {
        match timeout(deadline, self.cache.get_json(key)).await {
            Ok(Ok(Some(json))) => match serde_json::from_str(&json) {
                Ok(results) => Some(results),
                Err(err) => {
                    warn!(%err, "cached hybrid entry failed to deserialize, bypassing cache");
                    None
                }
            },
            Ok(Ok(None)) => None,
            Ok(Err(err)) => {
                warn!(%err, "hybrid cache lookup failed, bypassing cache");
                None
            }
            Err(_) => {
                warn!("hybrid cache lookup timed out, bypassing cache");
                None
            }
        }
    }

    async fn cache_store(&self, key: &str, results: &[HybridResult], deadline: Duration) {
        let json = match serde_json::to_string(results) {
            Ok(json) => json,
            Err(err) => {
                warn!(%err, "failed to serialize hybrid results for caching");
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
            Ok(Err(err)) => warn!(%err, "hybrid cache store failed, continuing uncached"),
            Err(_) => warn!("hybrid cache store timed out, continuing uncached"),
        }
    }
}

/// A string-keyed memo that wipes itself at a cap instead of growing
/// without bound. Entries are cheap to recompute, so wholesale clearing
/// keeps lookups lock-free.
struct BoundedMemo<V> {
    entries: DashMap<String, V>,
    cap: usize,
}

impl<V: Clone> BoundedMemo<V> {
    fn new(cap: usize) -> Self {
        Self {
            entries: DashMap::new(),
            cap,
        }
    }

    fn get(&self, key: &str) -> Option<V> {
        self.entries.get(key).map(|entry| entry.clone())
    }

    fn insert(&self, key: String, value: V) {
        if self.entries.len() >= self.cap {
            debug!(cap = self.cap, "memo cap reached, clearing");
            self.entries.clear();
        }
        self.entries.insert(key, value);
    }
}

/// Memo key covering everything an explanation is derived from: the
/// candidate, the query, and the exact scores. The combined score is
/// keyed separately because a reweighted search changes it without
/// touching the per-strategy scores.
fn explanation_key(result: &HybridResult, query: &str) -> String {
    use std::fmt::Write;
    let mut key = format!(
        "{}\u{1f}{query}\u{1f}{:016x}",
        result.candidate.id,
        result.combined_score.to_bits()
    );
    for (source, score) in &result.strategy_scores {
        let _ = write!(key, "\u{1f}{}={:016x}", source.as_str(), score.to_bits());
    }
    key
}

/// Composite key over everything that affects the response
fn cache_key(params: &HybridParams) -> String {
    CacheKeyParts::new("hybrid")
        .field("text", &params.query)
        .field("project", &params.project_id)
        .field("limit", params.limit)
        .field("threshold", params.threshold)
        .filters(&params.filters)
        .strategy_weights(&params.weights)
        .strategies(&params.strategies)
        .build()
}

/// Run one strategy branch under a deadline, degrading failure or
/// timeout to empty
async fn run_guarded<F>(kind: SourceKind, deadline: Duration, search: F) -> Vec<ScoredCandidate>
where
    F: Future<Output = Result<Vec<ScoredCandidate>>>,
{
    match timeout(deadline, search).await {
        Ok(Ok(hits)) => hits,
        Ok(Err(err)) => {
            warn!(strategy = kind.as_str(), %err, "strategy failed, degrading to empty");
            Vec::new()
        }
        Err(_) => {
            warn!(
                strategy = kind.as_str(),
                ?deadline,
                "strategy timed out, degrading to empty"
            );
            Vec::new()
        }
    }
}

/// Merge per-strategy hits by candidate id and score the merged set.
///
/// Weights are applied only over the strategies that returned each
/// candidate; absent strategies contribute zero.
fn fuse(branches: Vec<(SourceKind, Vec<ScoredCandidate>)>, params: &HybridParams) -> Vec<HybridResult> {
    let mut merged: Vec<HybridResult> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (kind, hits) in branches {
        for hit in hits {
            let idx = match index.get(&hit.candidate.id) {
                Some(&idx) => idx,
                None => {
                    index.insert(hit.candidate.id.clone(), merged.len());
                    merged.push(HybridResult {
                        candidate: hit.candidate,
                        strategy_scores: BTreeMap::new(),
                        combined_score: 0.0,
                        match_highlights: Vec::new(),
                    });
                    merged.len() - 1
                }
            };
            // Same strategy reporting the same id twice keeps the best score.
            let entry = merged[idx].strategy_scores.entry(kind).or_insert(0.0);
            *entry = entry.max(hit.score);
        }
    }

    let terms: Vec<String> = params
        .query
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();
    for result in &mut merged {
        result.combined_score = result
            .strategy_scores
            .iter()
            .map(|(kind, score)| score * params.weights.for_source(*kind))
            .sum();
        result.match_highlights = highlights(&terms, &params.query, result);
    }
    merged
}

/// One keyword highlight per query term found verbatim, plus a semantic
/// highlight when the semantic score clears the threshold
fn highlights(terms: &[String], query: &str, result: &HybridResult) -> Vec<MatchHighlight> {
    let lower = result.candidate.content.to_lowercase();
    let mut highlights: Vec<MatchHighlight> = terms
        .iter()
        .filter_map(|term| {
            lower.find(term.as_str()).map(|at| MatchHighlight {
                kind: HighlightKind::Keyword,
                term: term.clone(),
                context: Some(snippet(&lower, at, term.len())),
            })
        })
        .collect();

    if result.strategy_score(SourceKind::Semantic) > SEMANTIC_HIGHLIGHT_THRESHOLD {
        highlights.push(MatchHighlight {
            kind: HighlightKind::Semantic,
            term: query.to_string(),
            context: None,
        });
    }
    highlights
}

/// Content window around one match, snapped to char boundaries
fn snippet(content: &str, at: usize, term_len: usize) -> String {
    const WINDOW: usize = 30;
    let mut start = at.saturating_sub(WINDOW);
    let mut end = (at + term_len + WINDOW).min(content.len());
    while start > 0 && !content.is_char_boundary(start) {
        start -= 1;
    }
    while end < content.len() && !content.is_char_boundary(end) {
        end += 1;
    }
    content[start..end].to_string()
}

fn build_explanation(
    result: &HybridResult,
    query: &str,
    weights: &StrategyWeights,
) -> SearchExplanation {
    let strategy_breakdown: Vec<StrategyContribution> = result
        .strategy_scores
        .iter()
        .map(|(&source, &score)| StrategyContribution {
            source,
            score,
            contribution_pct: if result.combined_score > 0.0 {
                score * weights.for_source(source) / result.combined_score * 100.0
            } else {
                0.0
            },
        })
        .collect();

    let keyword = result.strategy_score(SourceKind::Keyword);
    let semantic = result.strategy_score(SourceKind::Semantic);
    let fuzzy = result.strategy_score(SourceKind::Fuzzy);
    let structural = result.strategy_score(SourceKind::Structural);

    let mut factors = Vec::new();
    if keyword >= 1.0 {
        factors.push("All keywords matched".to_string());
    } else if keyword > 0.0 {
        factors.push("Partial keyword match".to_string());
    }
    if semantic > 0.7 {
        factors.push("High semantic similarity".to_string());
    }
    if structural > 0.0 {
        factors.push("Matched symbol names or construct kind".to_string());
    }
    if fuzzy > 0.0 && keyword == 0.0 {
        factors.push("Matched only through fuzzy similarity".to_string());
    }

    let lower = result.candidate.content.to_lowercase();
    let matched_terms: Vec<String> = query
        .split_whitespace()
        .map(str::to_lowercase)
        .filter_map(|term| {
            lower
                .find(term.as_str())
                .map(|at| format!("{term}: ...{}...", snippet(&lower, at, term.len())))
        })
        .collect();

    let mut recommendations = Vec::new();
    if keyword < 0.3 {
        recommendations.push("Low keyword score - use exact terms from the code".to_string());
    }
    if semantic < 0.3 {
        recommendations
            .push("Low semantic score - describe the behavior instead of symbols".to_string());
    }
    if result.strategy_scores.is_empty() {
        recommendations.push("No strategy matched this result".to_string());
    }

    SearchExplanation {
        strategy_breakdown,
        factors,
        matched_terms,
        recommendations,
    }
}
