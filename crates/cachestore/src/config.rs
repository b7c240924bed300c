//! Cache configuration.
//!
//! A cache is described by three bit widths: `set_bits` (`s`, giving `2^s`
//! sets), `ways` (`E`, lines per set) and `block_bits` (`b`, giving `2^b`
//! byte blocks). The configuration deserializes from JSON, for example:
//!
//! ```json
//! { "set_bits": 6, "ways": 8, "block_bits": 6, "policy": "FIFO" }
//! ```
//!
//! Omitted fields take the values of [`CacheConfig::default`].

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::addr::AddressCodec;
use crate::common::error::CacheError;
use crate::core::cache::policies::PolicyKind;

/// Errors raised while loading a configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(#[from] CacheError),
}

/// Geometry and replacement policy of a cache store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Set-index width; the store has `2^set_bits` sets.
    pub set_bits: u32,
    /// Associativity: lines per set.
    pub ways: usize,
    /// Block-offset width; each block holds `2^block_bits` bytes.
    pub block_bits: u32,
    /// Width of the addresses handed to the store.
    pub addr_bits: u32,
    /// Victim selection policy.
    pub policy: PolicyKind,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            set_bits: 2,
            ways: 4,
            block_bits: 6,
            addr_bits: 64,
            policy: PolicyKind::Lru,
        }
    }
}

impl CacheConfig {
    /// LRU configuration over 64-bit addresses.
    pub fn new(set_bits: u32, ways: usize, block_bits: u32) -> Self {
        Self {
            set_bits,
            ways,
            block_bits,
            ..Self::default()
        }
    }

    pub fn with_policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_addr_bits(mut self, addr_bits: u32) -> Self {
        self.addr_bits = addr_bits;
        self
    }

    /// Derives the bit widths from a total capacity, associativity and block size.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Geometry`] unless `block_bytes` is a power of two,
    /// `size_bytes` divides evenly into `assoc` ways of `block_bytes`, and the
    /// resulting number of sets is a power of two. Returns
    /// [`CacheError::ZeroWays`] when `assoc` is zero.
    pub fn from_geometry(size_bytes: u64, assoc: usize, block_bytes: u64) -> Result<Self, CacheError> {
        if assoc == 0 {
            return Err(CacheError::ZeroWays);
        }
        if !block_bytes.is_power_of_two() {
            return Err(CacheError::Geometry(format!(
                "block size {block_bytes} is not a power of two"
            )));
        }
        let set_bytes = (assoc as u64).checked_mul(block_bytes).ok_or_else(|| {
            CacheError::Geometry(format!("{assoc} ways of {block_bytes} bytes overflow"))
        })?;
        if size_bytes == 0 || size_bytes % set_bytes != 0 {
            return Err(CacheError::Geometry(format!(
                "capacity {size_bytes} is not a multiple of {assoc} x {block_bytes} bytes"
            )));
        }
        let sets = size_bytes / set_bytes;
        if !sets.is_power_of_two() {
            return Err(CacheError::Geometry(format!(
                "{sets} sets is not a power of two"
            )));
        }

        let config = Self::new(sets.trailing_zeros(), assoc, block_bytes.trailing_zeros());
        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration describes a cache that can be built.
    ///
    /// # Errors
    ///
    /// - [`CacheError::ZeroWays`] if `ways == 0`
    /// - [`CacheError::AddressWidth`] if `addr_bits` is not in `1..=64`
    /// - [`CacheError::AddressOverflow`] if `set_bits + block_bits > addr_bits`
    /// - [`CacheError::CapacityOverflow`] if the line table or payload size
    ///   is not representable in `usize`
    pub fn validate(&self) -> Result<(), CacheError> {
        if self.ways == 0 {
            return Err(CacheError::ZeroWays);
        }
        if self.addr_bits == 0 || self.addr_bits > 64 {
            return Err(CacheError::AddressWidth {
                addr_bits: self.addr_bits,
            });
        }
        let used = self.set_bits as u64 + self.block_bits as u64;
        if used > self.addr_bits as u64 {
            return Err(CacheError::AddressOverflow {
                set_bits: self.set_bits,
                block_bits: self.block_bits,
                addr_bits: self.addr_bits,
            });
        }
        self.total_bytes().map(|_| ())
    }

    /// Number of sets (`2^set_bits`).
    pub fn num_sets(&self) -> usize {
        1usize.checked_shl(self.set_bits).unwrap_or(0)
    }

    /// Block size in bytes (`2^block_bits`).
    pub fn block_bytes(&self) -> usize {
        1usize.checked_shl(self.block_bits).unwrap_or(0)
    }

    /// Total payload capacity in bytes, or `None` if it overflows `usize`.
    pub fn capacity_bytes(&self) -> Option<usize> {
        self.total_bytes().ok()
    }

    /// Address codec for this geometry.
    pub fn codec(&self) -> AddressCodec {
        AddressCodec::new(self.set_bits, self.block_bits)
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: CacheConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    fn total_bytes(&self) -> Result<usize, CacheError> {
        let overflow = || CacheError::CapacityOverflow {
            set_bits: self.set_bits,
            ways: self.ways,
            block_bits: self.block_bits,
        };
        let sets = 1usize.checked_shl(self.set_bits).ok_or_else(overflow)?;
        let block = 1usize.checked_shl(self.block_bits).ok_or_else(overflow)?;
        sets.checked_mul(self.ways)
            .and_then(|lines| lines.checked_mul(block))
            .ok_or_else(overflow)
    }
}
