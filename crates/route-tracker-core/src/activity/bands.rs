use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Completion-percentage jump worth one legendary ship
pub const LEGENDARY_SHIP_PERCENT: f32 = 0.18750;
pub const LEGENDARY_SHIP_TOLERANCE: f32 = 0.00001;
pub const TEMPLAR_HUNT_MIN: f32 = 0.38579;
pub const TEMPLAR_HUNT_MAX: f32 = 0.38582;
/// Story missions reward varying amounts, hence the wide band
pub const STORY_MISSION_MIN: f32 = 0.66666;
pub const STORY_MISSION_MAX: f32 = 1.66668;
/// Jumps above this that match no band are reported as unrecognized
pub const UNRECOGNIZED_THRESHOLD: f32 = 0.1;

/// An event inferred from a percentage jump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    #[strum(serialize = "Legendary ship defeated")]
    LegendaryShip,
    #[strum(serialize = "Templar hunt completed")]
    TemplarHunt,
    #[strum(serialize = "Story mission completed")]
    StoryMission,
}

impl Activity {
    /// Name of the running total
    pub fn label(self) -> &'static str {
        match self {
            Activity::LegendaryShip => "Legendary ships",
            Activity::TemplarHunt => "Templar hunts",
            Activity::StoryMission => "Story missions",
        }
    }
}

/// A range of deltas that identifies one activity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeltaBand {
    /// `|delta - target| < tolerance`
    Around { target: f32, tolerance: f32 },
    /// `min <= delta <= max`
    Within { min: f32, max: f32 },
}

impl DeltaBand {
    pub fn contains(&self, delta: f32) -> bool {
        match *self {
            DeltaBand::Around { target, tolerance } => (delta - target).abs() < tolerance,
            DeltaBand::Within { min, max } => (min..=max).contains(&delta),
        }
    }
}

/// Detection bands for one game build
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityBands {
    pub legendary_ship: DeltaBand,
    pub templar_hunt: DeltaBand,
    pub story_mission: DeltaBand,
    pub unrecognized_threshold: f32,
}

impl Default for ActivityBands {
    fn default() -> Self {
        Self {
            legendary_ship: DeltaBand::Around {
                target: LEGENDARY_SHIP_PERCENT,
                tolerance: LEGENDARY_SHIP_TOLERANCE,
            },
            templar_hunt: DeltaBand::Within {
                min: TEMPLAR_HUNT_MIN,
                max: TEMPLAR_HUNT_MAX,
            },
            story_mission: DeltaBand::Within {
                min: STORY_MISSION_MIN,
                max: STORY_MISSION_MAX,
            },
            unrecognized_threshold: UNRECOGNIZED_THRESHOLD,
        }
    }
}

/// Outcome of classifying one positive delta
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaClass {
    Detected(Activity),
    /// Large enough to be interesting, but matches no band
    Unrecognized,
    /// Too small to mean anything
    Noise,
}

impl ActivityBands {
    /// Classify a delta; bands are checked in a fixed priority order
    pub fn classify(&self, delta: f32) -> DeltaClass {
        let ordered = [
            (Activity::LegendaryShip, &self.legendary_ship),
            (Activity::TemplarHunt, &self.templar_hunt),
            (Activity::StoryMission, &self.story_mission),
        ];

        if let Some((activity, _)) = ordered.iter().find(|(_, band)| band.contains(delta)) {
            return DeltaClass::Detected(*activity);
        }

        if delta > self.unrecognized_threshold {
            DeltaClass::Unrecognized
        } else {
            DeltaClass::Noise
        }
    }
}
