//! Domain Layer - code-search-fusion
//!
//! This crate contains the domain layer of the code-search fusion core:
//! the canonical result types, the query model, the error taxonomy, and
//! the port traits through which the orchestration layer talks to its
//! external collaborators (vector store, graph store, cache, and so on).
//!
//! ## Architecture
//!
//! The domain layer:
//! - Owns the canonical `Candidate` shape that every retrieval source is
//!   ingested into at its boundary
//! - Defines ports (interfaces) for external dependencies
//! - Carries no orchestration or scoring logic of its own
//!
//! ## Dependencies
//!
//! Pure library crates only: serde for value objects, thiserror for the
//! error taxonomy, async-trait for port definitions, chrono for time.

pub mod constants;
pub mod entities;
pub mod error;
pub mod ports;
pub mod value_objects;

pub use entities::*;
pub use error::{Error, Result};
