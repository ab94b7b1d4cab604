//! Canonical cache keys
//!
//! A key is the SHA-256 of a deterministic serialization of every field
//! that affects the response: query, project, options, weights, and the
//! dispatched strategy set. Collections are sorted before hashing so the
//! key is independent of the order the caller supplied them in.

use csf_domain::value_objects::{FusionWeights, Query, SourceKind, StrategyWeights};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Builder for one canonical cache key
#[derive(Debug, Clone)]
pub struct CacheKeyParts {
    namespace: &'static str,
    fields: BTreeMap<&'static str, String>,
}

impl CacheKeyParts {
    /// Start a key in a namespace ("query", "hybrid", ...)
    pub fn new(namespace: &'static str) -> Self {
        Self {
            namespace,
            fields: BTreeMap::new(),
        }
    }

    /// Key for a coordinator query, covering text, project, and options
    pub fn for_query(query: &Query) -> Self {
        let opts = &query.options;
        let mut parts = Self::new("query")
            .field("text", &query.text)
            .field("project", &query.project_id)
            .field("limit", opts.limit)
            .field("threshold", opts.threshold)
            .field("include_graph", opts.include_graph)
            .field("search_type", format!("{:?}", opts.search_type));
        parts.add_filters(&opts.filters);
        parts
    }

    /// Add an arbitrary field
    pub fn field(mut self, name: &'static str, value: impl ToString) -> Self {
        self.fields.insert(name, value.to_string());
        self
    }

    /// Add the five fusion weights
    pub fn fusion_weights(self, weights: &FusionWeights) -> Self {
        self.field(
            "fusion_weights",
            format!(
                "{:.6},{:.6},{:.6},{:.6},{:.6}",
                weights.vector, weights.graph, weights.contextual, weights.recency,
                weights.popularity
            ),
        )
    }

    /// Add the four strategy weights
    pub fn strategy_weights(self, weights: &StrategyWeights) -> Self {
        self.field(
            "strategy_weights",
            format!(
                "{:.6},{:.6},{:.6},{:.6}",
                weights.semantic, weights.keyword, weights.fuzzy, weights.structural
            ),
        )
    }

    /// Add the dispatched strategy set, order-independently
    pub fn strategies(self, strategies: &[SourceKind]) -> Self {
        let mut names: Vec<&str> = strategies.iter().map(SourceKind::as_str).collect();
        names.sort_unstable();
        names.dedup();
        self.field("strategies", names.join(","))
    }

    /// Add structured filters, order-independently
    pub fn filters(mut self, filters: &csf_domain::value_objects::QueryFilters) -> Self {
        self.add_filters(filters);
        self
    }

    fn add_filters(&mut self, filters: &csf_domain::value_objects::QueryFilters) {
        let mut languages = filters.languages.clone();
        languages.sort_unstable();
        let mut chunk_types = filters.chunk_types.clone();
        chunk_types.sort_unstable();
        self.fields.insert("filter_languages", languages.join(","));
        self.fields
            .insert("filter_chunk_types", chunk_types.join(","));
        self.fields.insert(
            "filter_path_prefix",
            filters.path_prefix.clone().unwrap_or_default(),
        );
    }

    /// Finish: `namespace:` followed by the hex SHA-256 of the canonical
    /// field serialization
    pub fn build(&self) -> String {
        let mut hasher = Sha256::new();
        for (name, value) in &self.fields {
            hasher.update(name.as_bytes());
            hasher.update([0x1f]);
            hasher.update(value.as_bytes());
            hasher.update([0x1e]);
        }
        format!("{}:{}", self.namespace, hex::encode(hasher.finalize()))
    }
}
