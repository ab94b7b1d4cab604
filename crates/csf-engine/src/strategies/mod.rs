//! Built-in search strategies
//!
//! Reference implementations of the pluggable `SearchStrategy` port for
//! the hybrid multi-strategy path. Each scores candidates supplied by an
//! injected `CandidateSource` rather than owning an index; callers with
//! real keyword/fuzzy/structural backends substitute their own
//! implementations at the composition root.

mod fuzzy;
mod keyword;
mod structural;

pub use fuzzy::FuzzyStrategy;
pub use keyword::KeywordStrategy;
pub use structural::StructuralStrategy;
