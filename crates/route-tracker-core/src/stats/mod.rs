//! Progress counters read from game memory.
//!
//! - **Catalog**: per-build address recipes for every tracked counter
//! - **Snapshot**: one immutable set of counters per poll tick
//! - **Reader**: resolves the whole catalog into a snapshot

mod catalog;
mod reader;
mod snapshot;

pub use catalog::*;
pub use reader::*;
pub use snapshot::*;
