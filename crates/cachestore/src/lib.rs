//! Set-associative cache store.
//!
//! This crate models the storage side of a set-associative cache: a fixed
//! table of `2^s` sets with `E` lines each, every line holding a `2^b` byte
//! block. It answers lookups, reports set fullness, inserts blocks into
//! vacant lines, recommends eviction victims (LRU or FIFO), and removes
//! resident blocks. It never fetches data on its own; payloads are always
//! supplied by the caller.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use cachestore::{CacheConfig, CacheStore, ManualClock};
//!
//! let clock = Rc::new(ManualClock::new());
//! let mut store = CacheStore::new(CacheConfig::new(1, 2, 2), Rc::clone(&clock)).unwrap();
//!
//! store.set(0x00, &[1, 2, 3, 4]).unwrap();
//! assert_eq!(store.find(0x00).unwrap().1, Some(&[1, 2, 3, 4][..]));
//! assert_eq!(store.find(0x10).unwrap().1, None);
//! ```

/// Error types and shared address/clock primitives.
pub mod common;
/// Cache geometry and policy configuration.
pub mod config;
/// Cache storage, replacement policies and event reporting.
pub mod core;
/// Trace parsing and the miss/evict/fill replay driver.
pub mod sim;
/// Counting observer for hit/miss statistics.
pub mod stats;

pub use crate::common::addr::{AddressCodec, DecodedAddr};
pub use crate::common::clock::{Clock, FnClock, ManualClock, Tick};
pub use crate::common::error::{CacheError, ErrorKind};
pub use crate::config::{CacheConfig, ConfigError};
pub use crate::core::cache::events::{CacheEvent, CacheObserver, Fanout, LogObserver};
pub use crate::core::cache::line::{CacheLine, LineTable};
pub use crate::core::cache::policies::{FifoPolicy, LruPolicy, PolicyKind, ReplacementPolicy};
pub use crate::core::cache::{CacheStore, Victim};
pub use crate::stats::CacheStats;
