//! Route checklists and their live completion state.
//!
//! A route is a user-authored TSV file of entries, each naming a collectible
//! type and the count at which it is done. [`CompletionEngine`] reconciles a
//! loaded [`Checklist`] with every polled snapshot and keeps it ordered
//! completed-first.

mod completion;
mod entry;
mod loader;
mod locator;

pub use completion::*;
pub use entry::*;
pub use loader::*;
pub use locator::*;
