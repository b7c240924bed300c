//! # Cache Store Tests
//!
//! This module contains unit tests for the cache store's operations, its
//! replacement policies, and the events it reports.

/// Tests for event reporting and observers.
pub mod events;



use std::rc::Rc;

use cachestore::{CacheConfig, CacheStore, ManualClock, PolicyKind};

/// Store over a fresh clock, returned together with the clock handle.
pub fn create_store(
    set_bits: u32,
    ways: usize,
    block_bits: u32,
    policy: PolicyKind,
) -> (Rc<ManualClock>, CacheStore<Rc<ManualClock>>) {
    let clock = Rc::new(ManualClock::new());
    let config = CacheConfig::new(set_bits, ways, block_bits).with_policy(policy);
    let store = CacheStore::new(config, Rc::clone(&clock)).unwrap();
    (clock, store)
}

/// A block of `len` bytes all set to `fill`.
pub fn block(len: usize, fill: u8) -> Vec<u8> {
    vec![fill; len]
}
