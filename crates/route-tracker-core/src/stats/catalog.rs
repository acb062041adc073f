//! Memory recipes for one known game build.
//!
//! Most collectibles share one 4-level chain from a common root; only the
//! third offset differs per category:
//!
//! ```text
//! collectibles root -> +FIRST -> +SECOND -> +third(category) -> +LAST -> i32
//! ```
//!
//! Taverns and chests are banks of per-location flags laid out at a constant
//! stride, so their third offset is stepped across an inclusive range and the
//! flags are summed. Percent, float percent and forts have their own chains.

use crate::memory::OffsetChain;
use crate::stats::Stat;

/// Recipe constants for Assassin's Creed IV: Black Flag (AC4BFSP.exe)
pub mod black_flag {
    use super::{FlagRange, OffsetChain};

    pub const PERCENT: OffsetChain = OffsetChain::new(0x049D_9774, &[0x284]);
    pub const PERCENT_FLOAT: OffsetChain = OffsetChain::new(0x049F_1EE8, &[0x74]);
    pub const FORTS: OffsetChain = OffsetChain::new(0x026C_0A28, &[0x7F0, 0xD68, 0xD70, 0x30]);

    /// Shared root for the collectible counters
    pub const COLLECTIBLES_ROOT: u64 = 0x026B_EAC0;
    pub const FIRST_OFFSET: i32 = 0x2D0;
    pub const SECOND_OFFSET: i32 = 0x8BC;
    pub const LAST_OFFSET: i32 = 0x18;

    pub const VIEWPOINTS: i32 = -0x1B30;
    pub const MAYAN_STONES: i32 = -0x1B1C;
    pub const TREASURE: i32 = -0xBB8;
    pub const FRAGMENTS: i32 = -0x1B58;
    pub const ASSASSIN_CONTRACTS: i32 = -0xDD4;
    pub const NAVAL_CONTRACTS: i32 = -0x19F0;
    pub const LETTERS: i32 = -0x04EC;
    pub const MANUSCRIPTS: i32 = -0x334;
    pub const MUSIC: i32 = 0x424;

    /// Distance between consecutive location flags
    pub const FLAG_STRIDE: i32 = 0x14;
    pub const TAVERNS: FlagRange = FlagRange::new(0x319C, 0x3228);
    pub const CHESTS: FlagRange = FlagRange::new(0x67C, 0xA8C);
}

/// Inclusive range of third offsets covering a bank of flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagRange {
    pub start: i32,
    pub end: i32,
}

impl FlagRange {
    pub const fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// Third offsets visited with the given stride.
    ///
    /// Empty when `start > end` or the stride is not positive.
    pub fn offsets(&self, stride: i32) -> impl Iterator<Item = i32> {
        let (range, step) = match usize::try_from(stride) {
            Ok(step) if step > 0 => (self.start..=self.end, step),
            _ => (1..=0, 1),
        };
        range.step_by(step)
    }
}

/// The shared collectible chain and its per-category third offsets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectibleLayout {
    /// Root relative to the module base
    pub root: u64,
    pub first: i32,
    pub second: i32,
    pub last: i32,
    /// Third offset of each single-counter category
    pub counters: Vec<(Stat, i32)>,
    pub stride: i32,
    pub taverns: FlagRange,
    pub chests: FlagRange,
}

impl CollectibleLayout {
    /// Full offset chain for one third offset
    pub fn chain(&self, third: i32) -> [i32; 4] {
        [self.first, self.second, third, self.last]
    }

    pub fn third_offset(&self, stat: Stat) -> Option<i32> {
        self.counters
            .iter()
            .find(|(s, _)| *s == stat)
            .map(|(_, offset)| *offset)
    }
}

/// Every recipe needed to build a [`StatsSnapshot`](crate::stats::StatsSnapshot)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsCatalog {
    pub percent: OffsetChain,
    pub percent_float: OffsetChain,
    pub forts: OffsetChain,
    pub collectibles: CollectibleLayout,
}

impl StatsCatalog {
    pub fn black_flag() -> Self {
        use black_flag::*;

        Self {
            percent: PERCENT,
            percent_float: PERCENT_FLOAT,
            forts: FORTS,
            collectibles: CollectibleLayout {
                root: COLLECTIBLES_ROOT,
                first: FIRST_OFFSET,
                second: SECOND_OFFSET,
                last: LAST_OFFSET,
                counters: vec![
                    (Stat::Viewpoints, VIEWPOINTS),
                    (Stat::MayanStones, MAYAN_STONES),
                    (Stat::Treasure, TREASURE),
                    (Stat::Fragments, FRAGMENTS),
                    (Stat::AssassinContracts, ASSASSIN_CONTRACTS),
                    (Stat::NavalContracts, NAVAL_CONTRACTS),
                    (Stat::Letters, LETTERS),
                    (Stat::Manuscripts, MANUSCRIPTS),
                    (Stat::Music, MUSIC),
                ],
                stride: FLAG_STRIDE,
                taverns: TAVERNS,
                chests: CHESTS,
            },
        }
    }
}

impl Default for StatsCatalog {
    fn default() -> Self {
        Self::black_flag()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_range_offsets() {
        let range = FlagRange::new(0x100, 0x128);
        let offsets: Vec<i32> = range.offsets(0x14).collect();
        assert_eq!(offsets, vec![0x100, 0x114, 0x128]);
    }

    #[test]
    fn test_flag_range_stops_before_end() {
        let range = FlagRange::new(0, 10);
        let offsets: Vec<i32> = range.offsets(4).collect();
        assert_eq!(offsets, vec![0, 4, 8]);
    }

    #[test]
    fn test_flag_range_degenerate() {
        assert_eq!(FlagRange::new(0x20, 0x10).offsets(4).count(), 0);
        assert_eq!(FlagRange::new(0, 0x10).offsets(0).count(), 0);
        assert_eq!(FlagRange::new(0, 0x10).offsets(-4).count(), 0);
        assert_eq!(FlagRange::new(0x10, 0x10).offsets(4).count(), 1);
    }

    #[test]
    fn test_black_flag_location_counts() {
        let catalog = StatsCatalog::black_flag();
        let layout = &catalog.collectibles;
        assert_eq!(layout.taverns.offsets(layout.stride).count(), 8);
        assert_eq!(layout.chests.offsets(layout.stride).count(), 53);
    }

    #[test]
    fn test_collectible_chain() {
        let catalog = StatsCatalog::black_flag();
        let layout = &catalog.collectibles;
        let third = layout.third_offset(Stat::Viewpoints).unwrap();
        assert_eq!(layout.chain(third), [0x2D0, 0x8BC, -0x1B30, 0x18]);
        assert_eq!(layout.third_offset(Stat::Forts), None);
    }
}
