//! Query value objects
//!
//! A `Query` is immutable for the duration of a request. Options carry
//! the caller's limit/threshold/filter choices; the optimizer may rewrite
//! the query text and strategy but never mutates the original.

use crate::constants::{DEFAULT_RESULT_LIMIT, DEFAULT_SCORE_THRESHOLD};
use serde::{Deserialize, Serialize};

/// Which retrieval path the caller wants emphasized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    /// Vector-similarity driven (default)
    #[default]
    Semantic,
    /// Graph-relationship driven
    Graph,
    /// Multi-strategy hybrid
    Hybrid,
    /// Exact keyword matching
    Exact,
}

/// Structured filters applied by the retrieval backends
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilters {
    /// Restrict to these languages (empty = all)
    #[serde(default)]
    pub languages: Vec<String>,
    /// Restrict to files under this path prefix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_prefix: Option<String>,
    /// Restrict to these chunk type names (empty = all)
    #[serde(default)]
    pub chunk_types: Vec<String>,
}

impl QueryFilters {
    /// True when no filter is active
    pub fn is_empty(&self) -> bool {
        self.languages.is_empty() && self.path_prefix.is_none() && self.chunk_types.is_empty()
    }
}

/// Per-request options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Maximum number of results to return
    pub limit: usize,
    /// Minimum final score for a result to be returned
    pub threshold: f64,
    /// Whether to dispatch the graph branch alongside vector search
    pub include_graph: bool,
    /// Structured backend filters
    #[serde(default)]
    pub filters: QueryFilters,
    /// Requested retrieval emphasis
    #[serde(default)]
    pub search_type: SearchType,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_RESULT_LIMIT,
            threshold: DEFAULT_SCORE_THRESHOLD,
            include_graph: true,
            filters: QueryFilters::default(),
            search_type: SearchType::default(),
        }
    }
}

/// Value Object: one immutable search request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Natural-language or structural query text
    pub text: String,
    /// Project the search is scoped to
    pub project_id: String,
    /// Per-request options
    #[serde(default)]
    pub options: QueryOptions,
}

impl Query {
    /// Create a query with default options
    pub fn new(text: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            project_id: project_id.into(),
            options: QueryOptions::default(),
        }
    }

    /// Replace the options, consuming self
    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    /// Lowercased whitespace-split terms of the query text
    pub fn terms(&self) -> Vec<String> {
        self.text
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect()
    }
}

/// What the query optimizer returns: a rewritten query text, a strategy
/// hint, and backend filters. Produced by the `QueryOptimizer` port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizedQuery {
    /// Rewritten query text the backends should search with
    pub query_text: String,
    /// Strategy the optimizer recommends
    pub strategy: SearchType,
    /// Filters the optimizer derived from the query
    #[serde(default)]
    pub filters: QueryFilters,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms_are_lowercased_and_split() {
        let q = Query::new("How Does Auth WORK", "proj");
        assert_eq!(q.terms(), vec!["how", "does", "auth", "work"]);
    }

    #[test]
    fn default_options_match_documented_defaults() {
        let opts = QueryOptions::default();
        assert_eq!(opts.limit, 10);
        assert!((opts.threshold - 0.3).abs() < f64::EPSILON);
        assert_eq!(opts.search_type, SearchType::Semantic);
    }
}
