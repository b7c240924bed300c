/// Set-associative cache store.
pub mod cache;
