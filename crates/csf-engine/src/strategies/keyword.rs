//! Keyword strategy: verbatim term matching

use async_trait::async_trait;
use csf_domain::entities::ScoredCandidate;
use csf_domain::error::Result;
use csf_domain::ports::{CandidateSource, SearchOpts, SearchStrategy};
use csf_domain::value_objects::SourceKind;
use std::sync::Arc;

/// Scores candidates by the fraction of query terms found verbatim in
/// their content. Candidates matching no term are not returned.
pub struct KeywordStrategy {
    source: Arc<dyn CandidateSource>,
}

impl KeywordStrategy {
    /// Create a keyword strategy over a candidate corpus
    pub fn new(source: Arc<dyn CandidateSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl SearchStrategy for KeywordStrategy {
    fn source_kind(&self) -> SourceKind {
        SourceKind::Keyword
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
                let content = candidate.content.to_lowercase();
                let matched = terms.iter().filter(|t| content.contains(*t)).count();
                if matched == 0 {
                    return None;
                }
                Some(ScoredCandidate {
                    candidate,
                    score: matched as f64 / terms.len() as f64,
                    source: SourceKind::Keyword,
                })
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(opts.limit);
        Ok(hits)
    }
}
