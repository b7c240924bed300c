/// Address decomposition into block offset, set index and tag.
pub mod addr;
/// Logical clock capability read by the store.
pub mod clock;
/// Contract-violation errors reported by the store.
pub mod error;
