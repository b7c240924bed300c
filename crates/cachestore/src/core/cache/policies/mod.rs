//! Victim selection.
//!
//! Policies are pure functions of one set's lines: they read the timestamps
//! the store keeps on every line and return the way to evict. They hold no
//! per-set state of their own, so each can be tested against a hand-built
//! slice of lines.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::line::CacheLine;

/// Chooses the way to evict from a set.
pub trait ReplacementPolicy {
    /// Returns the index of the victim within `lines`.
    ///
    /// Ties go to the lowest index. Invalid lines are not skipped; the result
    /// is only meaningful once every line in the set is valid.
    fn get_victim(&self, lines: &[CacheLine]) -> usize;
}

pub use self::fifo::FifoPolicy;
pub use self::lru::LruPolicy;

mod fifo;
mod lru;

/// Returns the index of the smallest key, keeping the first on ties.
fn argmin_by_key<F>(lines: &[CacheLine], key: F) -> usize
where
    F: Fn(&CacheLine) -> u64,
{
    let mut victim = 0;
    let mut oldest = u64::MAX;
    for (i, line) in lines.iter().enumerate() {
        let k = key(line);
        if i == 0 || k < oldest {
            oldest = k;
            victim = i;
        }
    }
    victim
}

/// Replacement policy selected by configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyKind {
    /// Evict the least recently accessed line.
    #[default]
    #[serde(rename = "LRU", alias = "lru", alias = "Lru")]
    Lru,
    /// Evict the line inserted earliest.
    #[serde(rename = "FIFO", alias = "fifo", alias = "Fifo")]
    Fifo,
}

impl ReplacementPolicy for PolicyKind {
    fn get_victim(&self, lines: &[CacheLine]) -> usize {
        match self {
            PolicyKind::Lru => LruPolicy.get_victim(lines),
            PolicyKind::Fifo => FifoPolicy.get_victim(lines),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::Lru => write!(f, "LRU"),
            PolicyKind::Fifo => write!(f, "FIFO"),
        }
    }
}

impl std::str::FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LRU" => Ok(PolicyKind::Lru),
            "FIFO" => Ok(PolicyKind::Fifo),
            other => Err(format!("unknown replacement policy `{other}`")),
        }
    }
}

#[cfg(test)]
pub(crate) fn line_with(inserted: u64, last_access: u64) -> CacheLine {
    let mut line = CacheLine::new(1).unwrap();
    line.fill(inserted, &[0], inserted);
    line.touch(last_access);
    line
}
