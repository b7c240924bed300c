//! Cache lines and the fixed line table.

use std::collections::TryReserveError;

use crate::common::clock::Tick;

/// A single storage slot.
///
/// The block buffer is allocated when the table is built and keeps its size
/// for the life of the line; insertions overwrite its contents in place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheLine {
    valid: bool,
    tag: u64,
    block: Box<[u8]>,
    last_access: Tick,
    inserted: Tick,
}

impl CacheLine {
    /// Creates an invalid line with a zeroed `block_bytes` buffer.
    ///
    /// Fails instead of aborting if the buffer cannot be allocated.
    pub fn new(block_bytes: usize) -> Result<Self, TryReserveError> {
        let mut block = Vec::new();
        block.try_reserve_exact(block_bytes)?;
        block.resize(block_bytes, 0);
        Ok(Self {
            valid: false,
            tag: 0,
            block: block.into_boxed_slice(),
            last_access: 0,
            inserted: 0,
        })
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn tag(&self) -> u64 {
        self.tag
    }

    pub fn block(&self) -> &[u8] {
        &self.block
    }

    pub fn block_mut(&mut self) -> &mut [u8] {
        &mut self.block
    }

    /// Time of the most recent insertion or hit.
    pub fn last_access(&self) -> Tick {
        self.last_access
    }

    /// Time the resident block was inserted.
    pub fn inserted(&self) -> Tick {
        self.inserted
    }

    /// True if the line is valid and holds `tag`.
    #[inline]
    pub fn holds(&self, tag: u64) -> bool {
        self.valid && self.tag == tag
    }

    /// INVALID -> VALID: stores `tag` and `data`, stamping both timestamps.
    ///
    /// The caller has checked that the line is invalid and that `data` has
    /// the block length.
    pub(crate) fn fill(&mut self, tag: u64, data: &[u8], now: Tick) {
        debug_assert!(!self.valid);
        debug_assert_eq!(data.len(), self.block.len());
        self.valid = true;
        self.tag = tag;
        self.block.copy_from_slice(data);
        self.inserted = now;
        self.last_access = now;
    }

    /// Records a hit at `now`.
    pub(crate) fn touch(&mut self, now: Tick) {
        self.last_access = now;
    }

    /// VALID -> INVALID. The buffer is kept for the next fill.
    pub(crate) fn invalidate(&mut self) {
        self.valid = false;
    }
}

/// Flat `sets x ways` table of lines, row-major by set.
#[derive(Clone, Debug)]
pub struct LineTable {
    lines: Vec<CacheLine>,
    num_sets: usize,
    ways: usize,
}

impl LineTable {
    /// Allocates every line and every block buffer up front.
    ///
    /// The caller guarantees `num_sets * ways` does not overflow; running out
    /// of memory is reported as an error.
    pub fn new(num_sets: usize, ways: usize, block_bytes: usize) -> Result<Self, TryReserveError> {
        let count = num_sets * ways;
        let mut lines = Vec::new();
        lines.try_reserve_exact(count)?;
        for _ in 0..count {
            lines.push(CacheLine::new(block_bytes)?);
        }
        Ok(Self {
            lines,
            num_sets,
            ways,
        })
    }

    pub fn num_sets(&self) -> usize {
        self.num_sets
    }

    pub fn ways(&self) -> usize {
        self.ways
    }

    /// The lines of `set`, indexed by way.
    ///
    /// # Panics
    ///
    /// Panics if `set >= num_sets`. Set indices produced by the address codec
    /// of the same configuration are always in range.
    pub fn set(&self, set: usize) -> &[CacheLine] {
        let base = set * self.ways;
        &self.lines[base..base + self.ways]
    }

    /// Mutable view of the lines of `set`.
    pub fn set_mut(&mut self, set: usize) -> &mut [CacheLine] {
        let base = set * self.ways;
        &mut self.lines[base..base + self.ways]
    }

    /// The line at `(set, way)`, if both are in range.
    pub fn line(&self, set: usize, way: usize) -> Option<&CacheLine> {
        if set >= self.num_sets || way >= self.ways {
            return None;
        }
        self.lines.get(set * self.ways + way)
    }

    /// Way holding `tag` in `set`, scanning from way 0.
    pub fn find_way(&self, set: usize, tag: u64) -> Option<usize> {
        self.set(set).iter().position(|l| l.holds(tag))
    }

    /// Lowest-indexed invalid way in `set`.
    pub fn first_vacant(&self, set: usize) -> Option<usize> {
        self.set(set).iter().position(|l| !l.is_valid())
    }

    /// True if every line of `set` is valid.
    pub fn is_full(&self, set: usize) -> bool {
        self.set(set).iter().all(CacheLine::is_valid)
    }

    /// Number of valid lines across the table.
    pub fn occupancy(&self) -> usize {
        self.lines.iter().filter(|l| l.is_valid()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CacheLine> {
        self.lines.iter()
    }
}
