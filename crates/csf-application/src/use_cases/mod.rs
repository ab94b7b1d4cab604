//! Use cases
//!
//! One module per entry point. Each use case owns its orchestration flow
//! and nothing else; all retrieval, scoring, and persistence goes
//! through injected ports.

pub mod coordinator;
pub mod hybrid;
