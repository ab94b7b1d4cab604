//! Shared mock collaborators for the use-case integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use csf_domain::entities::{Candidate, CandidateMetadata, ChunkType, LineRange, ScoredCandidate};
use csf_domain::error::{Error, Result};
use csf_domain::ports::{
    CandidateSource, EmbeddingProvider, GraphSearchProvider, MonitorStats, PerformanceMonitor,
    QueryOptimizer, ResultFormatter, SearchOpts, SemanticSearchProvider, VectorSearchProvider,
};
use csf_domain::value_objects::{FusedResult, OptimizedQuery, Query, QueryMetrics, SourceKind};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

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
    c.metadata.class_name = Some("Service".to_string());
    c.metadata.last_modified = Some(chrono::Utc::now());
    c
}

pub fn scored(id: &str, content: &str, score: f64, source: SourceKind) -> ScoredCandidate {
    ScoredCandidate {
        candidate: candidate(id, content),
        score,
        source,
    }
}

// === Vector search mocks ===

pub struct StaticVector {
    pub hits: Vec<ScoredCandidate>,
    pub calls: AtomicUsize,
}

impl StaticVector {
    pub fn new(hits: Vec<ScoredCandidate>) -> Self {
        Self {
            hits,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VectorSearchProvider for StaticVector {
    async fn search(&self, _embedding: &[f32], _opts: &SearchOpts) -> Result<Vec<ScoredCandidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.hits.clone())
    }
}

pub struct FailingVector;

#[async_trait]
impl VectorSearchProvider for FailingVector {
    async fn search(&self, _embedding: &[f32], _opts: &SearchOpts) -> Result<Vec<ScoredCandidate>> {
        Err(Error::upstream("vector", "backend unavailable"))
    }
}

// === Graph search mocks ===

pub struct StaticGraph {
    pub hits: Vec<ScoredCandidate>,
    pub calls: AtomicUsize,
}

impl StaticGraph {
    pub fn new(hits: Vec<ScoredCandidate>) -> Self {
        Self {
            hits,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GraphSearchProvider for StaticGraph {
    async fn search(&self, _query: &str, _opts: &SearchOpts) -> Result<Vec<ScoredCandidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.hits.clone())
    }
}

pub struct FailingGraph;

#[async_trait]
impl GraphSearchProvider for FailingGraph {
    async fn search(&self, _query: &str, _opts: &SearchOpts) -> Result<Vec<ScoredCandidate>> {
        Err(Error::upstream("graph", "backend unavailable"))
    }
}

pub struct SlowGraph {
    pub hits: Vec<ScoredCandidate>,
    pub delay: Duration,
}

#[async_trait]
impl GraphSearchProvider for SlowGraph {
    async fn search(&self, _query: &str, _opts: &SearchOpts) -> Result<Vec<ScoredCandidate>> {
        tokio::time::sleep(self.delay).await;
        Ok(self.hits.clone())
    }
}

// === Other collaborators ===

pub struct StaticEmbedder;

#[async_trait]
impl EmbeddingProvider for StaticEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![0.1, 0.2, 0.3])
    }
}

pub struct PassthroughOptimizer;

#[async_trait]
impl QueryOptimizer for PassthroughOptimizer {
    async fn optimize(&self, query: &Query) -> Result<OptimizedQuery> {
        Ok(OptimizedQuery {
            query_text: query.text.clone(),
            strategy: query.options.search_type,
            filters: query.options.filters.clone(),
        })
    }
}

pub struct FailingOptimizer;

#[async_trait]
impl QueryOptimizer for FailingOptimizer {
    async fn optimize(&self, _query: &Query) -> Result<OptimizedQuery> {
        Err(Error::Internal {
            message: "optimizer offline".to_string(),
        })
    }
}

#[derive(Default)]
pub struct RecordingMonitor {
    pub records: Mutex<Vec<(String, QueryMetrics)>>,
}

impl RecordingMonitor {
    pub fn recorded(&self) -> Vec<(String, QueryMetrics)> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl PerformanceMonitor for RecordingMonitor {
    async fn record_query(&self, query_text: &str, metrics: &QueryMetrics) -> Result<()> {
        self.records
            .lock()
            .unwrap()
            .push((query_text.to_string(), metrics.clone()));
        Ok(())
    }

    async fn stats(&self, _range: Duration) -> Result<MonitorStats> {
        Ok(MonitorStats::default())
    }
}

pub struct CountingFormatter;

#[async_trait]
impl ResultFormatter for CountingFormatter {
    async fn format_for_llm(&self, results: &[FusedResult]) -> Result<String> {
        Ok(format!("{} results", results.len()))
    }
}

// === Hybrid collaborators ===

pub struct StaticSemantic {
    pub hits: Vec<ScoredCandidate>,
    pub calls: AtomicUsize,
}

impl StaticSemantic {
    pub fn new(hits: Vec<ScoredCandidate>) -> Self {
        Self {
            hits,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SemanticSearchProvider for StaticSemantic {
    async fn search(&self, _query: &str, _opts: &SearchOpts) -> Result<Vec<ScoredCandidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.hits.clone())
    }
}

pub struct FailingSemantic;

#[async_trait]
impl SemanticSearchProvider for FailingSemantic {
    async fn search(&self, _query: &str, _opts: &SearchOpts) -> Result<Vec<ScoredCandidate>> {
        Err(Error::upstream("semantic", "backend unavailable"))
    }
}

pub struct FixedCorpus(pub Vec<Candidate>);

#[async_trait]
impl CandidateSource for FixedCorpus {
    async fn candidates(&self, _project_id: &str) -> Result<Vec<Candidate>> {
        Ok(self.0.clone())
    }
}
