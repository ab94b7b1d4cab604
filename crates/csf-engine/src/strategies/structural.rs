//! Structural strategy: symbol-name and construct-kind matching

use async_trait::async_trait;
use csf_domain::entities::{Candidate, ScoredCandidate};
use csf_domain::error::Result;
use csf_domain::ports::{CandidateSource, SearchOpts, SearchStrategy};
use csf_domain::value_objects::SourceKind;
use std::sync::Arc;

/// Scores candidates by how well the query matches their structural
/// identity: declared function/class names, chunk kind, and graph
/// relationships. Content text is deliberately ignored; that is the
/// keyword strategy's job.
pub struct StructuralStrategy {
    source: Arc<dyn CandidateSource>,
}

impl StructuralStrategy {
    /// Create a structural strategy over a candidate corpus
    pub fn new(source: Arc<dyn CandidateSource>) -> Self {
        Self { source }
    }
}

fn structural_score(candidate: &Candidate, terms: &[String]) -> f64 {
    let mut score: f64 = 0.0;

    let names = [
        candidate.metadata.function_name.as_deref(),
        candidate.metadata.class_name.as_deref(),
    ];
    for name in names.into_iter().flatten() {
        let name = name.to_lowercase();
        if terms.iter().any(|t| name == *t) {
            score += 0.5;
        } else if terms.iter().any(|t| name.contains(t.as_str())) {
            score += 0.25;
        }
    }

    let kind = format!("{:?}", candidate.chunk_type).to_lowercase();
    if terms.iter().any(|t| kind == *t) {
        score += 0.2;
    }

    if let Some(graph) = &candidate.graph_context {
        let related: Vec<String> = graph
            .related_symbols
            .iter()
            .map(|s| s.to_lowercase())
            .collect();
        if terms.iter().any(|t| related.iter().any(|r| r.contains(t.as_str()))) {
            score += 0.3;
        }
    }

    score.min(1.0)
}

#[async_trait]
impl SearchStrategy for StructuralStrategy {
    fn source_kind(&self) -> SourceKind {
        SourceKind::Structural
    }

    async fn run(&self, query: &str, opts: &SearchOpts) -> Result<Vec<ScoredCandidate>> {
        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits: Vec<ScoredCandidate> = self
            .source
            .candidates(&opts.project_id)
            .await?
            .into_iter()
            .filter_map(|candidate| {
                let score = structural_score(&candidate, &terms);
                if score <= 0.0 {
                    return None;
                }
                Some(ScoredCandidate {
                    candidate,
                    score,
                    source: SourceKind::Structural,
                })
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(opts.limit);
        Ok(hits)
    }
}
