//! Set-Associative Cache Store.
//!
//! [`CacheStore`] manages presence and placement of blocks in a fixed table
//! of `2^s` sets by `E` ways. It does not fetch or write back data. On a miss
//! the caller drives the eviction protocol itself:
//!
//! 1. `find` the block; on a hit, done.
//! 2. If `is_full`, ask `pick_line` for a victim, write it back if needed,
//!    and `erase` it.
//! 3. `set` the new block into the vacant line.
//!
//! Each line moves only between two states: `set` takes an invalid line to
//! valid, `erase` takes a valid line back to invalid. Calls that would break
//! this return a [`CacheError`] and leave the table untouched.
//!
//! # Performance
//!
//! Every operation scans a single set: O(E) time, no allocation after
//! construction.

/// Structured events and observers.
pub mod events;
/// Cache line and line table.
pub mod line;
/// Replacement policy implementations (LRU, FIFO).
pub mod policies;

use std::cell::RefCell;

use self::events::{CacheEvent, CacheObserver, LogObserver};
use self::line::{CacheLine, LineTable};
use self::policies::{PolicyKind, ReplacementPolicy};
use crate::common::addr::{AddressCodec, DecodedAddr};
use crate::common::clock::Clock;
use crate::common::error::CacheError;
use crate::config::CacheConfig;

/// Eviction recommendation returned by [`CacheStore::pick_line`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Victim<'a> {
    /// Block-aligned address of the block currently in the chosen line.
    pub address: u64,
    /// Set the line belongs to.
    pub set: usize,
    /// Way chosen by the policy.
    pub way: usize,
    /// Whether the line currently holds a block.
    pub valid: bool,
    /// The line's payload, for write-back.
    pub block: &'a [u8],
}

/// Fixed-capacity set-associative storage.
///
/// Not thread-safe: a store is driven by one sequential caller. Share it
/// between threads only behind a lock, or give each worker its own store.
pub struct CacheStore<C: Clock> {
    config: CacheConfig,
    codec: AddressCodec,
    table: LineTable,
    policy: PolicyKind,
    clock: C,
    observer: RefCell<Option<Box<dyn CacheObserver>>>,
}

impl<C: Clock> CacheStore<C> {
    /// Creates a store with every line invalid.
    ///
    /// With the `always-trace` feature, events are logged through
    /// [`LogObserver`].
    ///
    /// # Errors
    ///
    /// Returns the error from [`CacheConfig::validate`] if the configuration
    /// is unusable, or [`CacheError::CapacityOverflow`] if the line table
    /// cannot be allocated.
    pub fn new(config: CacheConfig, clock: C) -> Result<Self, CacheError> {
        let observer: Option<Box<dyn CacheObserver>> = if cfg!(feature = "always-trace") {
            Some(Box::new(LogObserver))
        } else {
            None
        };
        Self::build(config, clock, observer)
    }

    /// Creates a store reporting its events to `observer`.
    pub fn with_observer(
        config: CacheConfig,
        clock: C,
        observer: impl CacheObserver + 'static,
    ) -> Result<Self, CacheError> {
        Self::build(config, clock, Some(Box::new(observer)))
    }

    fn build(
        config: CacheConfig,
        clock: C,
        observer: Option<Box<dyn CacheObserver>>,
    ) -> Result<Self, CacheError> {
        config.validate()?;

        let table = LineTable::new(config.num_sets(), config.ways, config.block_bytes()).map_err(|_| {
            CacheError::CapacityOverflow {
                set_bits: config.set_bits,
                ways: config.ways,
                block_bits: config.block_bits,
            }
        })?;
        let store = Self {
            codec: config.codec(),
            table,
            policy: config.policy,
            config,
            clock,
            observer: RefCell::new(observer),
        };
        store.emit(|| CacheEvent::Constructed {
            sets: store.table.num_sets(),
            ways: store.table.ways(),
            block_bytes: store.config.block_bytes(),
            policy: store.policy,
        });
        Ok(store)
    }

    /// Looks up a block and refreshes its last-access time on a hit.
    ///
    /// Returns the queried address with the block contents, or `None` on a
    /// miss. A miss changes nothing.
    ///
    /// # Errors
    ///
    /// [`CacheError::Misaligned`] if `address` is not block-aligned.
    pub fn find(&mut self, address: u64) -> Result<(u64, Option<&[u8]>), CacheError> {
        let d = self.codec.decompose_aligned(address)?;
        match self.lookup(address, d) {
            Some(way) => Ok((address, Some(self.table.set(d.set)[way].block()))),
            None => Ok((address, None)),
        }
    }

    /// Like [`find`](Self::find), but hands out the block for writing.
    pub fn find_mut(&mut self, address: u64) -> Result<Option<&mut [u8]>, CacheError> {
        let d = self.codec.decompose_aligned(address)?;
        match self.lookup(address, d) {
            Some(way) => Ok(Some(self.table.set_mut(d.set)[way].block_mut())),
            None => Ok(None),
        }
    }

    /// Shared hit/miss path of `find` and `find_mut`.
    fn lookup(&mut self, address: u64, d: DecodedAddr) -> Option<usize> {
        match self.table.find_way(d.set, d.tag) {
            Some(way) => {
                let now = self.clock.now();
                self.table.set_mut(d.set)[way].touch(now);
                self.emit(|| CacheEvent::Hit {
                    address,
                    set: d.set,
                    way,
                });
                Some(way)
            }
            None => {
                self.emit(|| CacheEvent::Miss {
                    address,
                    set: d.set,
                });
                None
            }
        }
    }

    /// Presence test with no recency update and no event.
    pub fn contains(&self, address: u64) -> Result<bool, CacheError> {
        let d = self.codec.decompose_aligned(address)?;
        Ok(self.table.find_way(d.set, d.tag).is_some())
    }

    /// True if every line of the set `address` maps to is valid.
    pub fn is_full(&self, address: u64) -> Result<bool, CacheError> {
        let d = self.codec.decompose_aligned(address)?;
        let full = self.table.is_full(d.set);
        self.emit(|| CacheEvent::FullCheck {
            address,
            set: d.set,
            full,
        });
        Ok(full)
    }

    /// Places `data` in the lowest-indexed vacant line of the target set.
    ///
    /// `data` is copied into the line's own buffer. Both timestamps of the
    /// line are set to the current time.
    ///
    /// # Errors
    ///
    /// - [`CacheError::Misaligned`] if `address` is not block-aligned
    /// - [`CacheError::BlockSizeMismatch`] if `data` is not one block long
    /// - [`CacheError::AlreadyResident`] if the block already hits
    /// - [`CacheError::NoVacantLine`] if the set is full
    pub fn set(&mut self, address: u64, data: &[u8]) -> Result<(), CacheError> {
        let d = self.codec.decompose_aligned(address)?;
        let expected = self.config.block_bytes();
        if data.len() != expected {
            return Err(CacheError::BlockSizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        if self.table.find_way(d.set, d.tag).is_some() {
            return Err(CacheError::AlreadyResident { address, set: d.set });
        }
        let way = self
            .table
            .first_vacant(d.set)
            .ok_or(CacheError::NoVacantLine { address, set: d.set })?;

        let now = self.clock.now();
        self.table.set_mut(d.set)[way].fill(d.tag, data, now);
        self.emit(|| CacheEvent::Inserted {
            address,
            set: d.set,
            way,
        });
        Ok(())
    }

    /// Invalidates the resident block at `address`, keeping its buffer.
    ///
    /// # Errors
    ///
    /// - [`CacheError::Misaligned`] if `address` is not block-aligned
    /// - [`CacheError::NotResident`] if no valid line holds the block
    pub fn erase(&mut self, address: u64) -> Result<(), CacheError> {
        let d = self.codec.decompose_aligned(address)?;
        let way = self
            .table
            .find_way(d.set, d.tag)
            .ok_or(CacheError::NotResident { address, set: d.set })?;

        self.table.set_mut(d.set)[way].invalidate();
        self.emit(|| CacheEvent::Erased {
            address,
            set: d.set,
            way,
        });
        Ok(())
    }

    /// Recommends the line to evict so that `address` can be inserted.
    ///
    /// Only the set index of `address` is used. The victim's own address is
    /// rebuilt from its tag. Nothing is modified; the caller erases the victim.
    /// The answer is only meaningful when [`is_full`](Self::is_full) holds.
    ///
    /// # Errors
    ///
    /// [`CacheError::Misaligned`] if `address` is not block-aligned.
    pub fn pick_line(&self, address: u64) -> Result<Victim<'_>, CacheError> {
        let d = self.codec.decompose_aligned(address)?;
        let lines = self.table.set(d.set);
        let way = self.policy.get_victim(lines);
        let line = &lines[way];

        let victim = Victim {
            address: self.codec.block_address(line.tag(), d.set),
            set: d.set,
            way,
            valid: line.is_valid(),
            block: line.block(),
        };
        self.emit(|| CacheEvent::VictimChosen {
            address,
            set: d.set,
            way,
            victim: victim.address,
            valid: victim.valid,
        });
        Ok(victim)
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn codec(&self) -> AddressCodec {
        self.codec
    }

    pub fn policy(&self) -> PolicyKind {
        self.policy
    }

    /// Switches the replacement policy. Line timestamps are kept, so the new
    /// policy sees the full history.
    pub fn set_policy(&mut self, policy: PolicyKind) {
        self.policy = policy;
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The line at `(set, way)`.
    pub fn line(&self, set: usize, way: usize) -> Option<&CacheLine> {
        self.table.line(set, way)
    }

    /// All lines of `set`, or `None` if out of range.
    pub fn set_lines(&self, set: usize) -> Option<&[CacheLine]> {
        (set < self.table.num_sets()).then(|| self.table.set(set))
    }

    /// Number of valid lines.
    pub fn occupancy(&self) -> usize {
        self.table.occupancy()
    }

    fn emit<F>(&self, event: F)
    where
        F: FnOnce() -> CacheEvent,
    {
        if let Some(observer) = self.observer.borrow_mut().as_mut() {
            observer.notify(&event());
        }
    }
}

impl<C: Clock> Drop for CacheStore<C> {
    fn drop(&mut self) {
        let occupancy = self.table.occupancy();
        self.emit(|| CacheEvent::Destroyed { occupancy });
    }
}
