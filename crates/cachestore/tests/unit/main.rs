//! # Unit Tests
//!
//! Black-box tests for each component of the cache store, organised to mirror
//! the crate's module tree.

/// Cache store, policy and event tests.
mod cache;
