//! Adaptive Weight Store
//!
//! A versioned, feedback-driven weight registry. All mutable state lives
//! inside a single-writer actor; the public handle is cheap to clone and
//! safe to share across concurrent query paths and the independent
//! feedback-ingestion path. This replaces unsynchronized shared-map
//! mutation with message passing.

mod actor;
mod store;

pub use store::AdaptiveWeightStore;
