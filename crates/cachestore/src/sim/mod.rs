/// Cache controller replaying traces against a store.
pub mod driver;
/// Text trace format.
pub mod trace;

pub use self::driver::{AccessOutcome, AccessRecord, Backing, Driver, MemoryBacking, ZeroBacking};
pub use self::trace::{Access, AccessKind, TraceError, load_trace, parse_line, parse_trace};
