//! Live counter reads.
//!
//! Each tick resolves every pointer chain of the [`StatsCatalog`] from the
//! module base. Most counters are one scalar at the end of a chain; flag
//! counters add up the values found across a range of collectible slots.
//! Fields that fail to resolve read as zero and are listed in
//! [`StatsSnapshot::unreadable`].

use tracing::debug;

use crate::memory::{AddressResolver, OffsetChain, PointerWidth, ReadMemory, Scalar};
use crate::stats::{FlagRange, Stat, StatsCatalog, StatsSnapshot};

/// Anything that can produce one snapshot per poll tick
pub trait StatsSource {
    fn read_stats(&mut self) -> StatsSnapshot;
}

/// Resolves a [`StatsCatalog`] against a live address space.
///
/// Every category is resolved on its own: a broken chain zeroes that one
/// counter for that one tick and never affects the others.
pub struct StatsReader<R> {
    reader: R,
    base_address: u64,
    width: PointerWidth,
    catalog: StatsCatalog,
    collectibles_root: u64,
}

impl<R: ReadMemory> StatsReader<R> {
    pub fn new(reader: R, base_address: u64, width: PointerWidth) -> Self {
        Self::with_catalog(reader, base_address, width, StatsCatalog::black_flag())
    }

    pub fn with_catalog(
        reader: R,
        base_address: u64,
        width: PointerWidth,
        catalog: StatsCatalog,
    ) -> Self {
        let collectibles_root = base_address.wrapping_add(catalog.collectibles.root);
        debug!(
            "Stats reader for {} process (base: {:#x}, collectibles: {:#x})",
            width, base_address, collectibles_root
        );
        Self {
            reader,
            base_address,
            width,
            catalog,
            collectibles_root,
        }
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn pointer_width(&self) -> PointerWidth {
        self.width
    }

    pub fn catalog(&self) -> &StatsCatalog {
        &self.catalog
    }

    /// Read every tracked counter once
    pub fn get_stats(&self) -> StatsSnapshot {
        let resolver = AddressResolver::new(&self.reader, self.width);
        let mut fields = Fields::default();

        let percent = self.read_chain::<i32>(&resolver, &self.catalog.percent);
        let percent_float = self.read_chain::<f32>(&resolver, &self.catalog.percent_float);
        let forts = self.read_chain::<i32>(&resolver, &self.catalog.forts);
        let collectible = |stat| self.read_collectible(&resolver, stat);
        let flags = |range| self.count_flags(&resolver, range);
        let layout = &self.catalog.collectibles;

        let snapshot = StatsSnapshot {
            percent: fields.take(Stat::Percent, percent),
            percent_float: fields.take(Stat::PercentFloat, percent_float),
            viewpoints: fields.take(Stat::Viewpoints, collectible(Stat::Viewpoints)),
            mayan_stones: fields.take(Stat::MayanStones, collectible(Stat::MayanStones)),
            treasure: fields.take(Stat::Treasure, collectible(Stat::Treasure)),
            fragments: fields.take(Stat::Fragments, collectible(Stat::Fragments)),
            assassin_contracts: fields.take(
                Stat::AssassinContracts,
                collectible(Stat::AssassinContracts),
            ),
            naval_contracts: fields.take(Stat::NavalContracts, collectible(Stat::NavalContracts)),
            letters: fields.take(Stat::Letters, collectible(Stat::Letters)),
            manuscripts: fields.take(Stat::Manuscripts, collectible(Stat::Manuscripts)),
            music: fields.take(Stat::Music, collectible(Stat::Music)),
            forts: fields.take(Stat::Forts, forts),
            taverns: fields.take(Stat::Taverns, flags(layout.taverns)),
            chests: fields.take(Stat::Chests, flags(layout.chests)),
            unreadable: Vec::new(),
        };

        if !fields.unreadable.is_empty() {
            debug!("Unreadable counters this tick: {:?}", fields.unreadable);
        }

        StatsSnapshot {
            unreadable: fields.unreadable,
            ..snapshot
        }
    }

    fn read_chain<T: Scalar>(
        &self,
        resolver: &AddressResolver<'_, R>,
        chain: &OffsetChain,
    ) -> Option<T> {
        resolver.read(chain.root_address(self.base_address), chain.offsets)
    }

    /// One counter on the shared collectible chain
    fn read_collectible(&self, resolver: &AddressResolver<'_, R>, stat: Stat) -> Option<i32> {
        let third = self.catalog.collectibles.third_offset(stat)?;
        self.read_third_offset(resolver, third)
    }

    fn read_third_offset(&self, resolver: &AddressResolver<'_, R>, third: i32) -> Option<i32> {
        let chain = self.catalog.collectibles.chain(third);
        resolver.read(self.collectibles_root, &chain)
    }

    /// Sum the flags of a location bank.
    ///
    /// Unreadable flags count as zero; the category is unreadable only when
    /// no flag in the range could be read.
    fn count_flags(&self, resolver: &AddressResolver<'_, R>, range: FlagRange) -> Option<i32> {
        let mut total: Option<i32> = None;
        for third in range.offsets(self.catalog.collectibles.stride) {
            if let Some(flag) = self.read_third_offset(resolver, third) {
                total = Some(total.unwrap_or(0).saturating_add(flag));
            }
        }
        total
    }
}

impl<R: ReadMemory> StatsSource for StatsReader<R> {
    fn read_stats(&mut self) -> StatsSnapshot {
        self.get_stats()
    }
}

/// Collects the names of fields whose read failed, in field order
#[derive(Default)]
struct Fields {
    unreadable: Vec<Stat>,
}

impl Fields {
    fn take<T: Default>(&mut self, stat: Stat, value: Option<T>) -> T {
        match value {
            Some(value) => value,
            None => {
                self.unreadable.push(stat);
                T::default()
            }
        }
    }
}
