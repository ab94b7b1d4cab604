//! Internal tests for the scoring engines (can access crate internals)

mod cache_tests;
mod ml_tests;
mod support;
