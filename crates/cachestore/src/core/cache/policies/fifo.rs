use super::{ReplacementPolicy, argmin_by_key};
use crate::core::cache::line::CacheLine;

/// First in, first out: the earliest insertion loses, whatever the hits since.
#[derive(Clone, Copy, Debug, Default)]
pub struct FifoPolicy;

impl ReplacementPolicy for FifoPolicy {
    fn get_victim(&self, lines: &[CacheLine]) -> usize {
        argmin_by_key(lines, CacheLine::inserted)
    }
}
