//! Route rows and their completion test.
//!
//! The free-text type tag of a row is classified once into an
//! [`EntryKind`]. Counter and activity kinds compare their threshold against
//! the tick's readings; manual and unknown entries are only completed by
//! reaching 100%.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::activity::{Activity, ActivityCounts};
use crate::stats::{Stat, StatsSnapshot};

/// What an entry's threshold is compared against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "source")]
pub enum EntryKind {
    /// A counter read from memory
    Counter(Stat),
    /// An activity inferred from percentage jumps
    Special(Activity),
    /// Ticked only by reaching 100%
    Manual,
    Unknown,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Counter(stat) => f.write_str(stat.label()),
            EntryKind::Special(activity) => f.write_str(activity.label()),
            EntryKind::Manual => f.write_str("Manual"),
            EntryKind::Unknown => f.write_str("Unknown"),
        }
    }
}

impl EntryKind {
    /// Classify a free-text type tag.
    ///
    /// Matching is case-insensitive and ignores spaces. Special activities
    /// match by substring so tags like "Main Story 3" still resolve.
    pub fn from_tag(tag: &str) -> Self {
        let tag = normalize_tag(tag);
        if tag.is_empty() {
            return EntryKind::Unknown;
        }

        if tag.contains("story") {
            return EntryKind::Special(Activity::StoryMission);
        }
        if tag.contains("templar") {
            return EntryKind::Special(Activity::TemplarHunt);
        }
        if tag.contains("legendary") {
            return EntryKind::Special(Activity::LegendaryShip);
        }

        let stat = match tag.as_str() {
            "viewpoint" | "viewpoints" => Stat::Viewpoints,
            "mayan" | "myan" | "mayanstones" | "myanstones" => Stat::MayanStones,
            "treasure" | "treasures" | "buriedtreasure" | "buriredtreasure" => Stat::Treasure,
            "fragment" | "fragments" | "animusfragment" | "animusfragments" => Stat::Fragments,
            "assassin" | "assassincontract" | "assassincontracts" => Stat::AssassinContracts,
            "naval" | "navalcontract" | "navalcontracts" => Stat::NavalContracts,
            "letter" | "letters" | "letterbottle" | "letterbottles" => Stat::Letters,
            "manuscript" | "manuscripts" => Stat::Manuscripts,
            "music" | "musicsheet" | "musicsheets" | "shanty" | "shanties" => Stat::Music,
            "fort" | "forts" => Stat::Forts,
            "tavern" | "taverns" => Stat::Taverns,
            "chest" | "chests" => Stat::Chests,
            "upgrades" => return EntryKind::Manual,
            _ => return EntryKind::Unknown,
        };
        EntryKind::Counter(stat)
    }

    /// Whether `threshold` has been reached (ignores the 100% override)
    pub fn is_reached(
        self,
        threshold: i32,
        stats: &StatsSnapshot,
        activity: &ActivityCounts,
    ) -> bool {
        match self {
            EntryKind::Counter(stat) => stats.count(stat) >= threshold,
            EntryKind::Special(kind) => activity.get(kind) >= threshold,
            EntryKind::Manual | EntryKind::Unknown => false,
        }
    }
}

/// Lower-case a type tag and strip its spaces
pub fn normalize_tag(tag: &str) -> String {
    tag.chars()
        .filter(|c| *c != ' ')
        .flat_map(char::to_lowercase)
        .collect()
}

/// One row of a route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<String>,
    /// Type tag as written in the route file
    pub type_tag: String,
    pub kind: EntryKind,
    pub threshold: i32,
    #[serde(default)]
    pub completed: bool,
}

impl ChecklistEntry {
    pub fn new(name: impl Into<String>, type_tag: impl Into<String>, threshold: i32) -> Self {
        let type_tag = type_tag.into();
        Self {
            name: name.into(),
            coordinates: None,
            kind: EntryKind::from_tag(&type_tag),
            type_tag,
            threshold,
            completed: false,
        }
    }

    pub fn with_coordinates(mut self, coordinates: impl Into<String>) -> Self {
        self.coordinates = Some(coordinates.into());
        self
    }

    /// Name followed by the coordinates, if any
    pub fn display_text(&self) -> String {
        match &self.coordinates {
            Some(coords) => format!("{} [{}]", self.name, coords),
            None => self.name.clone(),
        }
    }

    pub fn is_reached(&self, stats: &StatsSnapshot, activity: &ActivityCounts) -> bool {
        self.kind.is_reached(self.threshold, stats, activity)
    }
}
