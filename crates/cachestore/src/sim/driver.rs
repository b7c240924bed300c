//! Trace replay driver.
//!
//! [`Driver`] plays the role of the cache controller sitting in front of a
//! [`CacheStore`]: it owns the logical clock, decides when to evict, and
//! moves data between the store and a [`Backing`] memory.

use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;

use super::trace::{Access, AccessKind};
use crate::common::clock::{ManualClock, Tick};
use crate::common::error::CacheError;
use crate::config::CacheConfig;
use crate::core::cache::CacheStore;
use crate::core::cache::events::CacheObserver;

/// Memory behind the cache.
pub trait Backing {
    /// Fills `block` with the contents of the block at `address`.
    fn fetch(&mut self, address: u64, block: &mut [u8]);
    /// Accepts an evicted block.
    fn write_back(&mut self, address: u64, block: &[u8]);
}

/// Memory that reads as zero and drops write-backs.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZeroBacking;

impl Backing for ZeroBacking {
    fn fetch(&mut self, _address: u64, block: &mut [u8]) {
        block.fill(0);
    }

    fn write_back(&mut self, _address: u64, _block: &[u8]) {}
}

/// Sparse memory that keeps every block written back to it.
#[derive(Clone, Debug, Default)]
pub struct MemoryBacking {
    blocks: HashMap<u64, Vec<u8>>,
    fetches: u64,
    write_backs: u64,
}

impl MemoryBacking {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored copy of the block at `address`, if it was ever written back.
    pub fn block(&self, address: u64) -> Option<&[u8]> {
        self.blocks.get(&address).map(Vec::as_slice)
    }

    pub fn fetches(&self) -> u64 {
        self.fetches
    }

    pub fn write_backs(&self) -> u64 {
        self.write_backs
    }
}

impl Backing for MemoryBacking {
    fn fetch(&mut self, address: u64, block: &mut [u8]) {
        self.fetches += 1;
        match self.blocks.get(&address) {
            Some(data) => block.copy_from_slice(data),
            None => block.fill(0),
        }
    }

    fn write_back(&mut self, address: u64, block: &[u8]) {
        self.write_backs += 1;
        self.blocks.insert(address, block.to_vec());
    }
}

/// How an access was served.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AccessOutcome {
    Hit,
    /// Filled into a vacant line.
    Miss,
    /// Filled after evicting the block at `victim`.
    MissEvicted { victim: u64 },
}

/// Result of one replayed access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AccessRecord {
    pub tick: Tick,
    pub address: u64,
    #[serde(flatten)]
    pub outcome: AccessOutcome,
    /// Byte at `address` once the access completed.
    pub value: u8,
}

/// Cache controller replaying accesses against a store.
pub struct Driver<B: Backing = MemoryBacking> {
    store: CacheStore<Rc<ManualClock>>,
    clock: Rc<ManualClock>,
    backing: B,
    scratch: Vec<u8>,
}

impl Driver<MemoryBacking> {
    pub fn new(config: CacheConfig) -> Result<Self, CacheError> {
        let clock = Rc::new(ManualClock::new());
        let store = CacheStore::new(config, Rc::clone(&clock))?;
        Ok(Self::from_parts(store, clock, MemoryBacking::new()))
    }
}

impl<B: Backing> Driver<B> {
    /// Builds a driver whose store reports to `observer`.
    pub fn with_observer(
        config: CacheConfig,
        backing: B,
        observer: impl CacheObserver + 'static,
    ) -> Result<Self, CacheError> {
        let clock = Rc::new(ManualClock::new());
        let store = CacheStore::with_observer(config, Rc::clone(&clock), observer)?;
        Ok(Self::from_parts(store, clock, backing))
    }

    /// Wraps an existing store. `clock` must be the handle the store reads.
    pub fn from_parts(store: CacheStore<Rc<ManualClock>>, clock: Rc<ManualClock>, backing: B) -> Self {
        let scratch = vec![0; store.config().block_bytes()];
        Self {
            store,
            clock,
            backing,
            scratch,
        }
    }

    /// Serves one access, evicting and filling as needed.
    pub fn access(&mut self, access: &Access) -> Result<AccessRecord, CacheError> {
        let tick = self.clock.advance(1);
        let codec = self.store.codec();
        let block_addr = codec.align(access.address);
        let offset = (access.address - block_addr) as usize;

        if let Some(block) = self.store.find_mut(block_addr)? {
            if access.kind == AccessKind::Write {
                block[offset] = access.value;
            }
            return Ok(AccessRecord {
                tick,
                address: access.address,
                outcome: AccessOutcome::Hit,
                value: block[offset],
            });
        }

        let outcome = if self.store.is_full(block_addr)? {
            let victim = self.store.pick_line(block_addr)?;
            let victim_addr = victim.address;
            self.backing.write_back(victim_addr, victim.block);
            self.store.erase(victim_addr)?;
            AccessOutcome::MissEvicted {
                victim: victim_addr,
            }
        } else {
            AccessOutcome::Miss
        };

        self.backing.fetch(block_addr, &mut self.scratch);
        if access.kind == AccessKind::Write {
            self.scratch[offset] = access.value;
        }
        self.store.set(block_addr, &self.scratch)?;

        Ok(AccessRecord {
            tick,
            address: access.address,
            outcome,
            value: self.scratch[offset],
        })
    }

    /// Replays `accesses` in order, stopping at the first error.
    pub fn run(&mut self, accesses: &[Access]) -> Result<Vec<AccessRecord>, CacheError> {
        accesses.iter().map(|a| self.access(a)).collect()
    }

    pub fn store(&self) -> &CacheStore<Rc<ManualClock>> {
        &self.store
    }

    pub fn backing(&self) -> &B {
        &self.backing
    }

    pub fn now(&self) -> Tick {
        self.clock.now()
    }
}
