//! Shared constants for fusion, reranking, and adaptive learning
//!
//! All default weights, thresholds, and bounds live here so the engine
//! configuration structs can seed their `Default` impls from one place.

/// Default maximum number of results returned by a query
pub const DEFAULT_RESULT_LIMIT: usize = 10;

/// Default minimum final score for a fused result to be returned
pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.3;

/// Default per-collaborator call timeout in milliseconds
pub const DEFAULT_CALL_TIMEOUT_MS: u64 = 5_000;

// === Fusion weights (five-signal path) ===

/// Base weight for the vector/semantic source score
pub const FUSION_VECTOR_WEIGHT: f64 = 0.4;
/// Base weight for the graph source score
pub const FUSION_GRAPH_WEIGHT: f64 = 0.3;
/// Base weight for the contextual (query-term overlap) score
pub const FUSION_CONTEXTUAL_WEIGHT: f64 = 0.2;
/// Base weight for the recency score
pub const FUSION_RECENCY_WEIGHT: f64 = 0.05;
/// Base weight for the popularity score
pub const FUSION_POPULARITY_WEIGHT: f64 = 0.05;

/// Graph weight boost applied for structural-intent queries
pub const INTENT_STRUCTURAL_GRAPH_BOOST: f64 = 0.2;
/// Vector weight reduction applied for structural-intent queries
pub const INTENT_STRUCTURAL_VECTOR_PENALTY: f64 = 0.1;
/// Vector weight boost applied for semantic-intent queries
pub const INTENT_SEMANTIC_VECTOR_BOOST: f64 = 0.2;
/// Graph weight reduction applied for semantic-intent queries
pub const INTENT_SEMANTIC_GRAPH_PENALTY: f64 = 0.1;
/// Graph weight boost applied for explicit graph-type searches
pub const SEARCH_TYPE_GRAPH_BOOST: f64 = 0.3;
/// Vector weight reduction applied for explicit graph-type searches
pub const SEARCH_TYPE_GRAPH_VECTOR_PENALTY: f64 = 0.2;

/// Days over which the recency score decays by a factor of `e`
pub const RECENCY_DECAY_DAYS: f64 = 365.0;
/// Usage + reference count at which the popularity score saturates
pub const POPULARITY_SATURATION: f64 = 100.0;
/// Confidence penalty factor for vector/graph score disagreement
pub const CONFIDENCE_DISAGREEMENT_PENALTY: f64 = 0.2;
/// Confidence bonus when a candidate carries graph context
pub const CONFIDENCE_GRAPH_CONTEXT_BONUS: f64 = 0.1;

// === Strategy weights (four-strategy hybrid path) ===

/// Default hybrid weight for the semantic strategy
pub const STRATEGY_SEMANTIC_WEIGHT: f64 = 0.4;
/// Default hybrid weight for the keyword strategy
pub const STRATEGY_KEYWORD_WEIGHT: f64 = 0.3;
/// Default hybrid weight for the fuzzy strategy
pub const STRATEGY_FUZZY_WEIGHT: f64 = 0.2;
/// Default hybrid weight for the structural strategy
pub const STRATEGY_STRUCTURAL_WEIGHT: f64 = 0.1;

/// Semantic score above which a semantic match highlight is emitted
pub const SEMANTIC_HIGHLIGHT_THRESHOLD: f64 = 0.5;
/// Semantic weight bonus applied when positive feedback outweighs negative
pub const FEEDBACK_SEMANTIC_BONUS: f64 = 0.1;

// === Rerank weights ===

/// Default rerank weight for the semantic term
pub const RERANK_SEMANTIC_WEIGHT: f64 = 0.3;
/// Default rerank weight for the graph term
pub const RERANK_GRAPH_WEIGHT: f64 = 0.2;
/// Default rerank weight for the contextual term
pub const RERANK_CONTEXTUAL_WEIGHT: f64 = 0.1;
/// Relationship count at which the graph rerank score saturates
pub const RERANK_GRAPH_SATURATION: f64 = 10.0;
/// Flat graph rerank bonus for carrying graph context
pub const RERANK_GRAPH_CONTEXT_BONUS: f64 = 0.2;
/// Contextual boost for function/class chunks
pub const RERANK_CHUNK_TYPE_BOOST: f64 = 0.2;
/// Contextual boost for exported symbols
pub const RERANK_EXPORTED_BOOST: f64 = 0.1;
/// Fraction of the recency score folded into the contextual term
pub const RERANK_RECENCY_FACTOR: f64 = 0.1;

// === Adaptive learning ===

/// Number of buffered feedback items that triggers batch processing
pub const FEEDBACK_BATCH_SIZE: usize = 10;
/// Mean relevance at or above which a feedback group reinforces weights
pub const FEEDBACK_POSITIVE_THRESHOLD: f64 = 0.7;
/// Mean relevance at or below which a feedback group penalizes weights
pub const FEEDBACK_NEGATIVE_THRESHOLD: f64 = 0.3;
/// Relative reinforcement applied to each weight on positive feedback
pub const WEIGHT_REINFORCEMENT_RATE: f64 = 0.05;
/// Relative penalty applied to each weight on negative feedback
pub const WEIGHT_PENALTY_RATE: f64 = 0.10;
/// Confidence gain per unit of absolute weight adjustment
pub const CONFIDENCE_GAIN_FACTOR: f64 = 0.1;
/// Exponential smoothing factor kept from the previous model accuracy
pub const ACCURACY_SMOOTHING: f64 = 0.7;
/// Maximum retained performance-history samples
pub const PERFORMANCE_HISTORY_LIMIT: usize = 100;
/// Maximum retained model snapshots for rollback
pub const MODEL_HISTORY_LIMIT: usize = 10;

// === A/B evaluation ===

/// Impressions both variants must exceed before a winner is declared
pub const AB_MIN_IMPRESSIONS: u64 = 100;

// === Caching ===

/// Default TTL for cached query responses, in seconds
pub const QUERY_CACHE_TTL_SECS: u64 = 300;
/// Default maximum number of cached entries
pub const CACHE_DEFAULT_CAPACITY: usize = 10_000;

/// Query keys are truncated to this length for top-query aggregation.
/// Known approximation: distinct queries longer than this can collide.
pub const QUERY_STAT_KEY_LEN: usize = 50;

/// Markers that classify a query as structural intent
pub const STRUCTURAL_MARKERS: &[&str] = &[
    "dependency",
    "dependencies",
    "import",
    "imports",
    "class",
    "function",
    "interface",
    "extends",
    "implements",
    "calls",
    "uses",
    "references",
    "inherits",
    "overrides",
];

/// Markers that classify a query as semantic intent
pub const SEMANTIC_MARKERS: &[&str] = &[
    "what", "how", "why", "describe", "explain", "purpose", "meaning", "does",
];
