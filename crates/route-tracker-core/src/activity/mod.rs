//! Inference of one-off events that have no counter in memory.
//!
//! Legendary ships, Templar hunts and story missions only show up as a jump
//! in the fractional completion percentage. The detector diffs successive
//! readings and classifies each positive jump against configured bands.

mod bands;
mod detector;

pub use bands::*;
pub use detector::*;
