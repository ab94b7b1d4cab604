//! Reranking Engine
//!
//! Strategy-selectable second pass over any ranked result list. The
//! semantic, graph, and hybrid strategies are closed-form; the ml
//! strategy delegates to the pluggable scoring model.

mod engine;

pub use engine::{RankedInput, RerankEngine, RerankOptions, RerankStrategy};
