use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::activity::{Activity, ActivityBands, DeltaClass};

/// Running totals of inferred activities
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityCounts {
    pub story_missions: i32,
    pub templar_hunts: i32,
    pub legendary_ships: i32,
}

impl ActivityCounts {
    pub fn get(&self, activity: Activity) -> i32 {
        match activity {
            Activity::StoryMission => self.story_missions,
            Activity::TemplarHunt => self.templar_hunts,
            Activity::LegendaryShip => self.legendary_ships,
        }
    }

    fn increment(&mut self, activity: Activity) -> i32 {
        let slot = match activity {
            Activity::StoryMission => &mut self.story_missions,
            Activity::TemplarHunt => &mut self.templar_hunts,
            Activity::LegendaryShip => &mut self.legendary_ships,
        };
        *slot += 1;
        *slot
    }
}

/// Classifies completion-percentage jumps between consecutive ticks.
///
/// The first reading after construction or [`reset`](Self::reset) only seeds
/// the previous value. Zero and negative deltas are ignored.
#[derive(Debug, Clone, Default)]
pub struct ActivityDetector {
    bands: ActivityBands,
    last_percent: Option<f32>,
    counts: ActivityCounts,
}

impl ActivityDetector {
    pub fn new(bands: ActivityBands) -> Self {
        Self {
            bands,
            last_percent: None,
            counts: ActivityCounts::default(),
        }
    }

    /// Feed the latest float percentage; returns the activity it revealed
    pub fn update(&mut self, current: f32) -> Option<Activity> {
        let Some(last) = self.last_percent.replace(current) else {
            debug!("Seeding activity detector at {:.5}%", current);
            return None;
        };

        let delta = current - last;
        if delta <= 0.0 {
            return None;
        }

        debug!("Percentage delta: {:.10}", delta);

        match self.bands.classify(delta) {
            DeltaClass::Detected(activity) => {
                let total = self.counts.increment(activity);
                info!("{}! Total: {}", activity, total);
                Some(activity)
            }
            DeltaClass::Unrecognized => {
                debug!("Unrecognized percentage change: {:.10}", delta);
                None
            }
            DeltaClass::Noise => None,
        }
    }

    pub fn counts(&self) -> ActivityCounts {
        self.counts
    }

    pub fn last_percent(&self) -> Option<f32> {
        self.last_percent
    }

    pub fn bands(&self) -> &ActivityBands {
        &self.bands
    }

    /// Forget totals and the seed (connection torn down)
    pub fn reset(&mut self) {
        self.last_percent = None;
        self.counts = ActivityCounts::default();
    }
}
