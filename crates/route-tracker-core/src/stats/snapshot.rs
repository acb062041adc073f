use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Tolerance used when comparing the float completion percentage to 100
pub const COMPLETE_EPSILON: f32 = 0.01;

/// Every counter in a snapshot, in publication order
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Stat {
    Percent,
    PercentFloat,
    Viewpoints,
    MayanStones,
    Treasure,
    Fragments,
    AssassinContracts,
    NavalContracts,
    Letters,
    Manuscripts,
    Music,
    Forts,
    Taverns,
    Chests,
}

impl Stat {
    /// Human-readable label for console output
    pub fn label(self) -> &'static str {
        match self {
            Stat::Percent => "Completion",
            Stat::PercentFloat => "Completion (exact)",
            Stat::Viewpoints => "Viewpoints",
            Stat::MayanStones => "Mayan Stones",
            Stat::Treasure => "Buried Treasure",
            Stat::Fragments => "Animus Fragments",
            Stat::AssassinContracts => "Assassin Contracts",
            Stat::NavalContracts => "Naval Contracts",
            Stat::Letters => "Letters in a Bottle",
            Stat::Manuscripts => "Manuscripts",
            Stat::Music => "Music Sheets",
            Stat::Forts => "Forts",
            Stat::Taverns => "Taverns",
            Stat::Chests => "Chests",
        }
    }
}

/// All tracked counters for one poll tick.
///
/// A counter whose chain could not be resolved is zero and listed in
/// `unreadable`; every field is always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub percent: i32,
    pub percent_float: f32,
    pub viewpoints: i32,
    pub mayan_stones: i32,
    pub treasure: i32,
    pub fragments: i32,
    pub assassin_contracts: i32,
    pub naval_contracts: i32,
    pub letters: i32,
    pub manuscripts: i32,
    pub music: i32,
    pub forts: i32,
    pub taverns: i32,
    pub chests: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unreadable: Vec<Stat>,
}

impl StatsSnapshot {
    /// Integer value of a counter (the float percentage is truncated)
    pub fn count(&self, stat: Stat) -> i32 {
        match stat {
            Stat::Percent => self.percent,
            Stat::PercentFloat => self.percent_float as i32,
            Stat::Viewpoints => self.viewpoints,
            Stat::MayanStones => self.mayan_stones,
            Stat::Treasure => self.treasure,
            Stat::Fragments => self.fragments,
            Stat::AssassinContracts => self.assassin_contracts,
            Stat::NavalContracts => self.naval_contracts,
            Stat::Letters => self.letters,
            Stat::Manuscripts => self.manuscripts,
            Stat::Music => self.music,
            Stat::Forts => self.forts,
            Stat::Taverns => self.taverns,
            Stat::Chests => self.chests,
        }
    }

    /// Value of a counter for display
    pub fn value(&self, stat: Stat) -> f64 {
        match stat {
            Stat::PercentFloat => f64::from(self.percent_float),
            other => f64::from(self.count(other)),
        }
    }

    /// Game reports 100% completion by either percentage reading
    pub fn is_complete(&self) -> bool {
        self.percent == 100 || (self.percent_float - 100.0).abs() < COMPLETE_EPSILON
    }

    pub fn is_readable(&self, stat: Stat) -> bool {
        !self.unreadable.contains(&stat)
    }

    /// Counters equal, ignoring which reads failed
    pub fn same_counters(&self, other: &Self) -> bool {
        Self {
            unreadable: Vec::new(),
            ..self.clone()
        } == Self {
            unreadable: Vec::new(),
            ..other.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_stat_order_matches_publication_order() {
        let names: Vec<String> = Stat::iter().map(|s| s.to_string()).collect();
        assert_eq!(
            names,
            [
                "percent",
                "percent_float",
                "viewpoints",
                "mayan_stones",
                "treasure",
                "fragments",
                "assassin_contracts",
                "naval_contracts",
                "letters",
                "manuscripts",
                "music",
                "forts",
                "taverns",
                "chests",
            ]
        );
    }

    #[test]
    fn test_count_by_name() {
        let snapshot = StatsSnapshot {
            percent: 41,
            percent_float: 41.73,
            viewpoints: 12,
            chests: 30,
            ..Default::default()
        };
        assert_eq!(snapshot.count(Stat::Viewpoints), 12);
        assert_eq!(snapshot.count(Stat::Chests), 30);
        assert_eq!(snapshot.count(Stat::PercentFloat), 41);
        assert_eq!(snapshot.count(Stat::Forts), 0);
        assert!((snapshot.value(Stat::PercentFloat) - 41.73).abs() < 1e-4);
    }

    #[test]
    fn test_is_complete() {
        let by_int = StatsSnapshot {
            percent: 100,
            percent_float: 99.0,
            ..Default::default()
        };
        assert!(by_int.is_complete());

        let by_float = StatsSnapshot {
            percent: 99,
            percent_float: 99.995,
            ..Default::default()
        };
        assert!(by_float.is_complete());

        let not_yet = StatsSnapshot {
            percent: 99,
            percent_float: 99.98,
            ..Default::default()
        };
        assert!(!not_yet.is_complete());
    }

    #[test]
    fn test_same_counters_ignores_unreadable() {
        let a = StatsSnapshot {
            forts: 3,
            ..Default::default()
        };
        let b = StatsSnapshot {
            forts: 3,
            unreadable: vec![Stat::Music],
            ..Default::default()
        };
        assert!(a.same_counters(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_stat_from_str() {
        assert_eq!("naval_contracts".parse::<Stat>().unwrap(), Stat::NavalContracts);
        assert!("navalcontracts".parse::<Stat>().is_err());
    }
}
