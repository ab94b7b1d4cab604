//! Domain entities
//!
//! The canonical `Candidate` shape every retrieval source is ingested
//! into, plus its metadata and graph-context companions.

mod candidate;

pub use candidate::{
    Candidate, CandidateMetadata, ChunkType, GraphContext, LineRange, ScoredCandidate,
};
