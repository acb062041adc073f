//! Snapshot export and overlay output.
//!
//! - **Format**: TSV and JSON renderings of a polled snapshot. Columns follow
//!   the published counter order.
//! - **Session log**: one TSV file per tracking session under a dated folder.
//! - **Stream output**: small text files for OBS text sources (completion
//!   percentage, route progress, next route entry).

mod format;
mod session;
mod stream;

pub use format::*;
pub use session::*;
pub use stream::*;
