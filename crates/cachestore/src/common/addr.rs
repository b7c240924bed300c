//! Address decomposition.
//!
//! An address is split, from least to most significant bits, into:
//! - a block offset of `b` bits (the byte within a block)
//! - a set index of `s` bits
//! - a tag holding every remaining high-order bit
//!
//! Shifts are computed with `checked_shl`/`checked_shr` so a configuration
//! with `s + b == 64` (tag always zero) is handled without overflow.

use super::error::CacheError;

/// The three fields of a decoded address.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DecodedAddr {
    /// Byte offset within the block.
    pub offset: u64,
    /// Index of the set the block maps to.
    pub set: usize,
    /// High-order bits identifying the block within its set.
    pub tag: u64,
}

/// Stateless address codec for a fixed `(s, b)` pair of bit widths.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressCodec {
    set_bits: u32,
    block_bits: u32,
}

/// Returns a mask of the low `bits` bits.
#[inline]
fn low_mask(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

impl AddressCodec {
    /// Creates a codec. Widths past 64 bits are accepted; fields that fall
    /// off the top of the address decode as zero.
    /// [`CacheConfig::validate`](crate::CacheConfig::validate) rejects such
    /// geometries for a store.
    pub const fn new(set_bits: u32, block_bits: u32) -> Self {
        Self {
            set_bits,
            block_bits,
        }
    }

    /// Width of the set-index field.
    pub fn set_bits(&self) -> u32 {
        self.set_bits
    }

    /// Width of the block-offset field.
    pub fn block_bits(&self) -> u32 {
        self.block_bits
    }

    /// Size of a block in bytes.
    pub fn block_bytes(&self) -> u64 {
        1u64.checked_shl(self.block_bits).unwrap_or(0)
    }

    /// Splits `address` into offset, set index and tag.
    pub fn decompose(&self, address: u64) -> DecodedAddr {
        let offset = address & low_mask(self.block_bits);
        let set = address.checked_shr(self.block_bits).unwrap_or(0) & low_mask(self.set_bits);
        let tag = address
            .checked_shr(self.set_bits.saturating_add(self.block_bits))
            .unwrap_or(0);
        DecodedAddr {
            offset,
            set: set as usize,
            tag,
        }
    }

    /// Rebuilds an address from its fields.
    pub fn compose(&self, tag: u64, set: usize, offset: u64) -> u64 {
        let tag_part = tag
            .checked_shl(self.set_bits.saturating_add(self.block_bits))
            .unwrap_or(0);
        let set_part = ((set as u64) & low_mask(self.set_bits))
            .checked_shl(self.block_bits)
            .unwrap_or(0);
        tag_part | set_part | (offset & low_mask(self.block_bits))
    }

    /// Rebuilds the block-aligned address of `tag` in `set`.
    pub fn block_address(&self, tag: u64, set: usize) -> u64 {
        self.compose(tag, set, 0)
    }

    /// Returns true if the block-offset bits of `address` are zero.
    pub fn is_aligned(&self, address: u64) -> bool {
        address & low_mask(self.block_bits) == 0
    }

    /// Clears the block-offset bits of `address`.
    pub fn align(&self, address: u64) -> u64 {
        address & !low_mask(self.block_bits)
    }

    /// Decomposes a block-aligned address, rejecting one with offset bits set.
    pub fn decompose_aligned(&self, address: u64) -> Result<DecodedAddr, CacheError> {
        let decoded = self.decompose(address);
        if decoded.offset != 0 {
            return Err(CacheError::Misaligned {
                address,
                block_bytes: self.block_bytes(),
            });
        }
        Ok(decoded)
    }
}
