//! # route-tracker-core
//!
//! Core library for the Black Flag route tracker.
//!
//! This crate provides:
//! - Process memory reading and pointer-chain resolution (32-bit and 64-bit)
//! - The stats catalog and snapshot reader
//! - Activity inference from completion-percentage jumps
//! - A fixed-interval poller publishing snapshots over channels
//! - Route checklists, their loader and the completion engine
//! - Session logs and stream overlay output

pub mod activity;
pub mod config;
pub mod error;
pub mod export;
pub mod memory;
pub mod poller;
pub mod route;
pub mod shutdown;
pub mod stats;

pub use activity::{Activity, ActivityBands, ActivityCounts, ActivityDetector, DeltaBand};
pub use config::{TrackerConfig, TrackerConfigBuilder};
pub use error::{Error, Result};
pub use export::{
    SessionLog, StreamOutput, format_snapshot_json, format_snapshot_tsv_header,
    format_snapshot_tsv_row,
};
pub use memory::{AddressResolver, OffsetChain, PointerWidth, ProcessHandle, ReadMemory};
pub use poller::{PolledSnapshot, Poller};
pub use route::{
    Checklist, ChecklistEntry, CompletionEngine, EntryKind, RouteLocator, load_route_file,
    parse_route, reorder,
};
pub use shutdown::ShutdownSignal;
pub use stats::{Stat, StatsCatalog, StatsReader, StatsSnapshot, StatsSource};
