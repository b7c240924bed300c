//! Contract-violation errors.
//!
//! The store performs no I/O, so nothing here is transient. Every variant is a
//! broken precondition on the caller's side, reported instead of corrupting
//! the line table. [`CacheError::kind`] groups the variants into the three
//! broad classes callers usually branch on.

use thiserror::Error;

/// Broad classification of a [`CacheError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The address has non-zero block-offset bits.
    Alignment,
    /// An insertion found no room, or found the tag already resident.
    Capacity,
    /// A removal targeted a non-resident block, or the configuration is unusable.
    Invariant,
}

/// Errors returned by cache store operations and configuration validation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CacheError {
    /// Address is not aligned to the block size.
    #[error("address {address:#x} is not aligned to a {block_bytes}-byte block")]
    Misaligned { address: u64, block_bytes: u64 },

    /// `set` was called for a tag that already hits in its set.
    #[error("block {address:#x} is already resident in set {set}")]
    AlreadyResident { address: u64, set: usize },

    /// `set` was called on a set with every line valid.
    #[error("set {set} has no vacant line for block {address:#x}")]
    NoVacantLine { address: u64, set: usize },

    /// `erase` was called for a block that is not resident.
    #[error("block {address:#x} is not resident in set {set}")]
    NotResident { address: u64, set: usize },

    /// Payload length differs from the configured block size.
    #[error("payload is {actual} bytes, block size is {expected} bytes")]
    BlockSizeMismatch { expected: usize, actual: usize },

    /// Associativity of zero.
    #[error("associativity must be at least 1")]
    ZeroWays,

    /// Address width outside `1..=64`.
    #[error("address width {addr_bits} is outside 1..=64")]
    AddressWidth { addr_bits: u32 },

    /// Set-index and block-offset bits do not fit in the address.
    #[error("set bits ({set_bits}) + block bits ({block_bits}) exceed the {addr_bits}-bit address")]
    AddressOverflow {
        set_bits: u32,
        block_bits: u32,
        addr_bits: u32,
    },

    /// Line table or payload storage would not fit in memory.
    #[error("cache of 2^{set_bits} sets x {ways} ways x 2^{block_bits} bytes is too large")]
    CapacityOverflow {
        set_bits: u32,
        ways: usize,
        block_bits: u32,
    },

    /// Geometry triple that cannot be expressed as power-of-two bit widths.
    #[error("invalid geometry: {0}")]
    Geometry(String),
}

impl CacheError {
    /// Returns the broad class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CacheError::Misaligned { .. } => ErrorKind::Alignment,
            CacheError::AlreadyResident { .. }
            | CacheError::NoVacantLine { .. }
            | CacheError::BlockSizeMismatch { .. } => ErrorKind::Capacity,
            CacheError::NotResident { .. }
            | CacheError::ZeroWays
            | CacheError::AddressWidth { .. }
            | CacheError::AddressOverflow { .. }
            | CacheError::CapacityOverflow { .. }
            | CacheError::Geometry(_) => ErrorKind::Invariant,
        }
    }
}
