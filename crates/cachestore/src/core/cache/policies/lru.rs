use super::{ReplacementPolicy, argmin_by_key};
use crate::core::cache::line::CacheLine;

/// Least recently used: the smallest last-access time loses.
#[derive(Clone, Copy, Debug, Default)]
pub struct LruPolicy;

impl ReplacementPolicy for LruPolicy {
    fn get_victim(&self, lines: &[CacheLine]) -> usize {
        argmin_by_key(lines, CacheLine::last_access)
    }
}
