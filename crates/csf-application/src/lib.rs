//! Orchestration Use Cases - code-search-fusion
//!
//! The two entry points of the search core: the Query Coordinator
//! (cache, optimizer, concurrent vector + graph dispatch, five-signal
//! fusion, metrics) and the Hybrid Multi-Strategy Search service
//! (four-strategy fan-out with its own fusion, explanations, and
//! feedback-adjusted weights).
//!
//! All collaborators are consumed through the ports in `csf-domain` via
//! `Arc<dyn Trait>` constructor injection; composition happens at the
//! caller's root, never through a global container.

pub mod use_cases;

pub use use_cases::coordinator::{BatchResponse, QueryCoordinator, QueryResponse};
pub use use_cases::hybrid::{HybridParams, HybridResponse, HybridSearchService};
