//! Cache providers and canonical cache keys
//!
//! The moka-backed provider serves production use; the null provider
//! serves tests and cache-disabled deployments. Cache keys are canonical
//! structured hashes, not ad hoc string concatenation: field order never
//! changes the key, and distinct requests cannot collide short of a
//! SHA-256 collision.

mod key;
mod moka;
mod null;

pub use key::CacheKeyParts;
pub use moka::MokaCacheProvider;
pub use null::NullCacheProvider;
