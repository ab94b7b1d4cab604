//! The canonical search-result unit
//!
//! Every retrieval source (vector, graph, keyword, fuzzy, structural)
//! produces dynamically-shaped hits at its own boundary; all of them are
//! ingested into `Candidate` before they cross into fusion. `id` is the
//! dedup key: two candidates with the same id from different sources are
//! merged, never duplicated.

use crate::value_objects::SourceKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inclusive line range of a candidate within its source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    /// First line of the chunk (1-based)
    pub start: u32,
    /// Last line of the chunk (1-based, inclusive)
    pub end: u32,
}

/// Kind of code construct a candidate represents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkType {
    Function,
    Class,
    Method,
    Module,
    Block,
    /// Any construct the chunker recognizes but this core does not model
    Other(String),
}

impl ChunkType {
    /// True for the chunk kinds that receive a contextual rerank boost
    pub fn is_definition(&self) -> bool {
        matches!(self, Self::Function | Self::Class | Self::Method)
    }
}

/// Candidate metadata used by contextual, recency, and popularity scoring
///
/// All fields are optional or defaulted: candidates arrive from
/// heterogeneous backends and completeness varies. The fraction of
/// `{language, chunk_type, function_name, class_name}` that is present
/// feeds confidence estimation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateMetadata {
    /// Programming language, if the backend reported one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Chunk type name, if the backend reported one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_type: Option<String>,
    /// Enclosing or defined function name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    /// Enclosing or defined class name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// Last modification time of the source file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    /// How many times the symbol is used elsewhere in the project
    #[serde(default)]
    pub usage_count: u64,
    /// How many times the symbol is referenced by other symbols
    #[serde(default)]
    pub reference_count: u64,
    /// Whether the symbol is exported from its module
    #[serde(default)]
    pub exported: bool,
    /// Backend-specific metadata passed through untouched
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub extra: serde_json::Value,
}

impl CandidateMetadata {
    /// Fraction of the four identity fields that are present, in [0, 1]
    pub fn completeness(&self) -> f64 {
        let present = [
            self.language.is_some(),
            self.chunk_type.is_some(),
            self.function_name.is_some(),
            self.class_name.is_some(),
        ]
        .iter()
        .filter(|p| **p)
        .count();
        present as f64 / 4.0
    }
}

/// Graph neighborhood attached to a candidate by the graph backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphContext {
    /// Symbols related to this candidate in the code graph
    #[serde(default)]
    pub related_symbols: Vec<String>,
    /// Number of graph relationships touching this candidate
    #[serde(default)]
    pub relationship_count: u32,
    /// Traversal depth at which the candidate was found
    #[serde(default)]
    pub depth: u32,
}

/// Entity: one search result unit, mergeable across sources by `id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Unique identifier; the dedup key across all retrieval sources
    pub id: String,
    /// Path to the source file
    pub file_path: String,
    /// Line range within the file
    pub line_range: LineRange,
    /// Programming language of the chunk
    pub language: String,
    /// Kind of code construct
    pub chunk_type: ChunkType,
    /// The matched code content
    pub content: String,
    /// Scoring metadata
    #[serde(default)]
    pub metadata: CandidateMetadata,
    /// Graph neighborhood, present only for graph-sourced candidates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_context: Option<GraphContext>,
}

/// A candidate tagged with the raw score and source that produced it
///
/// This is the shape every retrieval port returns. Scores are raw
/// backend scores; per-batch normalization happens inside fusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    /// The candidate itself
    pub candidate: Candidate,
    /// Raw score reported by the backend
    pub score: f64,
    /// Which retrieval source produced this hit
    pub source: SourceKind,
}
