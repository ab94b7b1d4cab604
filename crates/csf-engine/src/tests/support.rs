//! Shared test fixtures

use csf_domain::entities::{
    Candidate, CandidateMetadata, ChunkType, GraphContext, LineRange, ScoredCandidate,
};
use csf_domain::value_objects::SourceKind;

pub fn candidate(id: &str, content: &str) -> Candidate {
    Candidate {
        id: id.to_string(),
        file_path: format!("src/{id}.rs"),
        line_range: LineRange { start: 1, end: 20 },
        language: "rust".to_string(),
        chunk_type: ChunkType::Function,
        content: content.to_string(),
        metadata: CandidateMetadata::default(),
        graph_context: None,
    }
}

pub fn complete_candidate(id: &str, content: &str) -> Candidate {
    let mut c = candidate(id, content);
    c.metadata.language = Some("rust".to_string());
    c.metadata.chunk_type = Some("function".to_string());
    c.metadata.function_name = Some(id.to_string());
    c.metadata.class_name = Some("Engine".to_string());
    c
}

pub fn with_graph_context(mut c: Candidate, relationship_count: u32) -> Candidate {
    c.graph_context = Some(GraphContext {
        related_symbols: vec!["caller_a".to_string(), "caller_b".to_string()],
        relationship_count,
        depth: 1,
    });
    c
}

pub fn scored(candidate: Candidate, score: f64, source: SourceKind) -> ScoredCandidate {
    ScoredCandidate {
        candidate,
        score,
        source,
    }
}
