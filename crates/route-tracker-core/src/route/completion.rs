//! Completion tracking for a loaded route.
//!
//! Entries only ever move from not done to done, with one exception: the
//! first tick that reads below 100% after a tick at 100% clears every entry.
//! `reset_since_peak` stops that reset from repeating until 100% is seen
//! again. A tick whose percentage could not be read is not a drop; it leaves
//! the 100% baseline untouched.

use tracing::{debug, info};

use crate::activity::ActivityCounts;
use crate::route::ChecklistEntry;
use crate::stats::{COMPLETE_EPSILON, Stat, StatsSnapshot};

/// Entries of one route plus the state used to spot a drop from 100%
#[derive(Debug, Clone)]
pub struct Checklist {
    entries: Vec<ChecklistEntry>,
    last_percent: f32,
    first_update: bool,
    reset_since_peak: bool,
}

impl Checklist {
    pub fn new(entries: Vec<ChecklistEntry>) -> Self {
        Self {
            entries,
            last_percent: 0.0,
            first_update: true,
            reset_since_peak: false,
        }
    }

    pub fn entries(&self) -> &[ChecklistEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(completed, total)`
    pub fn progress(&self) -> (usize, usize) {
        let done = self.entries.iter().filter(|entry| entry.completed).count();
        (done, self.entries.len())
    }

    /// First entry still to do
    pub fn next_incomplete(&self) -> Option<&ChecklistEntry> {
        self.entries.iter().find(|entry| !entry.completed)
    }
}

impl Default for Checklist {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Order entries completed-first, keeping the file order within each group.
///
/// Returns the index of the first incomplete entry, or `None` when the list
/// is empty or fully complete.
pub fn reorder(entries: &mut [ChecklistEntry]) -> Option<usize> {
    entries.sort_by_key(|entry| !entry.completed);
    entries.iter().position(|entry| !entry.completed)
}

/// Keeps a checklist in step with the polled game state
#[derive(Debug, Clone, Default)]
pub struct CompletionEngine {
    checklist: Checklist,
    scroll_target: Option<usize>,
}

impl CompletionEngine {
    pub fn new(checklist: Checklist) -> Self {
        let mut engine = Self::default();
        engine.load(checklist);
        engine
    }

    /// Replace the checklist, discarding all reset tracking
    pub fn load(&mut self, checklist: Checklist) {
        self.checklist = checklist;
        self.scroll_target = reorder(&mut self.checklist.entries);
    }

    pub fn checklist(&self) -> &Checklist {
        &self.checklist
    }

    pub fn entries(&self) -> &[ChecklistEntry] {
        self.checklist.entries()
    }

    /// Index of the first incomplete entry after the last reorder
    pub fn scroll_target(&self) -> Option<usize> {
        self.scroll_target
    }

    pub fn progress(&self) -> (usize, usize) {
        self.checklist.progress()
    }

    /// Recompute every entry against one tick's counters.
    ///
    /// At 100% every entry is complete. Otherwise entries are only marked
    /// done; a lower or unreadable counter never undoes one. Returns whether
    /// any entry changed; the checklist is reordered when one did.
    pub fn update_completion_status(
        &mut self,
        stats: &StatsSnapshot,
        activity: &ActivityCounts,
    ) -> bool {
        let checklist = &mut self.checklist;
        let percent = read_percent(stats);
        let is_100 = percent.is_some() && stats.is_complete();
        let was_100 =
            !checklist.first_update && (checklist.last_percent - 100.0).abs() < COMPLETE_EPSILON;
        let mut changed = false;

        if percent.is_some() && was_100 && !is_100 && !checklist.reset_since_peak {
            info!(
                "Completion dropped from 100% to {:.2}%, resetting route",
                stats.percent_float
            );
            for entry in checklist.entries.iter_mut().filter(|entry| entry.completed) {
                entry.completed = false;
                changed = true;
            }
            checklist.reset_since_peak = true;
        }

        if is_100 {
            checklist.reset_since_peak = false;
        }

        for entry in &mut checklist.entries {
            if !entry.completed && (is_100 || entry.is_reached(stats, activity)) {
                debug!("{} -> done", entry.display_text());
                entry.completed = true;
                changed = true;
            }
        }

        if let Some(percent) = percent {
            checklist.last_percent = percent;
            checklist.first_update = false;
        }

        if changed {
            self.scroll_target = reorder(&mut checklist.entries);
        }
        changed
    }
}

/// Completion percentage of a tick, preferring the exact reading
fn read_percent(stats: &StatsSnapshot) -> Option<f32> {
    if stats.is_readable(Stat::PercentFloat) {
        Some(stats.percent_float)
    } else if stats.is_readable(Stat::Percent) {
        Some(stats.percent as f32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(entries: &[ChecklistEntry]) -> Vec<&str> {
        entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    fn at_percent(percent_float: f32) -> StatsSnapshot {
        StatsSnapshot {
            percent: percent_float as i32,
            percent_float,
            ..Default::default()
        }
    }

    fn sample_engine() -> CompletionEngine {
        CompletionEngine::new(Checklist::new(vec![
            ChecklistEntry::new("Viewpoint 1", "viewpoint", 1),
            ChecklistEntry::new("Viewpoint 2", "viewpoint", 2),
            ChecklistEntry::new("Ship upgrade", "upgrades", 0),
            ChecklistEntry::new("First story", "story", 1),
        ]))
    }

    #[test]
    fn test_reorder_is_stable() {
        let mut entries = vec![
            ChecklistEntry::new("A", "fort", 1),
            ChecklistEntry::new("B", "fort", 1),
            ChecklistEntry::new("C", "fort", 1),
            ChecklistEntry::new("D", "fort", 1),
        ];
        entries[0].completed = true;
        entries[2].completed = true;

        let target = reorder(&mut entries);
        assert_eq!(names(&entries), ["A", "C", "B", "D"]);
        assert_eq!(target, Some(2));
        assert_eq!(entries[2].name, "B");
    }

    #[test]
    fn test_reorder_empty_or_complete() {
        let mut entries: Vec<ChecklistEntry> = Vec::new();
        assert_eq!(reorder(&mut entries), None);

        let mut entries = vec![ChecklistEntry::new("A", "fort", 0)];
        entries[0].completed = true;
        assert_eq!(reorder(&mut entries), None);
    }

    #[test]
    fn test_new_engine_scrolls_to_top() {
        let engine = sample_engine();
        assert_eq!(engine.scroll_target(), Some(0));
        assert_eq!(engine.progress(), (0, 4));
    }

    #[test]
    fn test_counter_thresholds() {
        let mut engine = sample_engine();
        let stats = StatsSnapshot {
            viewpoints: 1,
            ..at_percent(20.0)
        };

        assert!(engine.update_completion_status(&stats, &ActivityCounts::default()));
        assert_eq!(engine.progress(), (1, 4));
        assert_eq!(engine.entries()[0].name, "Viewpoint 1");
        assert_eq!(engine.scroll_target(), Some(1));
    }

    #[test]
    fn test_special_activity_thresholds() {
        let mut engine = sample_engine();
        let activity = ActivityCounts {
            story_missions: 1,
            ..Default::default()
        };

        assert!(engine.update_completion_status(&at_percent(20.0), &activity));
        assert_eq!(names(engine.entries())[0], "First story");
        assert_eq!(engine.progress(), (1, 4));
    }

    #[test]
    fn test_everything_complete_at_100() {
        let mut engine = sample_engine();
        assert!(engine.update_completion_status(&at_percent(100.0), &ActivityCounts::default()));
        assert_eq!(engine.progress(), (4, 4));
        assert_eq!(engine.scroll_target(), None);

        // Float percentage alone is enough
        let mut engine = sample_engine();
        let stats = StatsSnapshot {
            percent: 99,
            percent_float: 99.995,
            ..Default::default()
        };
        assert!(engine.update_completion_status(&stats, &ActivityCounts::default()));
        assert_eq!(engine.progress(), (4, 4));
    }

    #[test]
    fn test_reset_fires_once_per_drop() {
        let mut engine = sample_engine();
        let none = ActivityCounts::default();
        // Counters that keep one entry complete after the reset
        let dropped = StatsSnapshot {
            viewpoints: 1,
            ..at_percent(80.0)
        };

        assert!(engine.update_completion_status(&at_percent(100.0), &none));
        assert!(!engine.update_completion_status(&at_percent(100.0), &none));

        // First tick below 100: reset, then Viewpoint 1 is re-earned
        assert!(engine.update_completion_status(&dropped, &none));
        assert_eq!(engine.progress(), (1, 4));
        assert!(engine.checklist().reset_since_peak);

        // Second tick below 100: no second reset
        assert!(!engine.update_completion_status(&dropped, &none));
        assert_eq!(engine.progress(), (1, 4));
    }

    #[test]
    fn test_reset_rearms_after_returning_to_100() {
        let mut engine = sample_engine();
        let none = ActivityCounts::default();

        engine.update_completion_status(&at_percent(100.0), &none);
        engine.update_completion_status(&at_percent(80.0), &none);
        assert_eq!(engine.progress(), (0, 4));

        engine.update_completion_status(&at_percent(100.0), &none);
        assert!(!engine.checklist().reset_since_peak);
        assert_eq!(engine.progress(), (4, 4));

        assert!(engine.update_completion_status(&at_percent(90.0), &none));
        assert_eq!(engine.progress(), (0, 4));
    }

    #[test]
    fn test_first_update_never_resets() {
        let mut engine = sample_engine();
        // A fresh checklist has no previous 100% reading
        assert!(!engine.update_completion_status(&at_percent(50.0), &ActivityCounts::default()));
        assert!(!engine.checklist().reset_since_peak);
    }

    #[test]
    fn test_identical_snapshot_is_idempotent() {
        let mut engine = sample_engine();
        let stats = StatsSnapshot {
            viewpoints: 2,
            ..at_percent(30.0)
        };
        let none = ActivityCounts::default();

        assert!(engine.update_completion_status(&stats, &none));
        let order = names(engine.entries())
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();
        assert!(!engine.update_completion_status(&stats, &none));
        assert_eq!(names(engine.entries()), order);
    }

    #[test]
    fn test_load_replaces_state() {
        let mut engine = sample_engine();
        engine.update_completion_status(&at_percent(100.0), &ActivityCounts::default());

        engine.load(Checklist::new(vec![ChecklistEntry::new("Fort", "fort", 1)]));
        assert_eq!(engine.progress(), (0, 1));
        assert!(engine.checklist().first_update);

        // No drop detected: the new checklist never saw 100%
        assert!(!engine.update_completion_status(&at_percent(80.0), &ActivityCounts::default()));
    }

    #[test]
    fn test_failed_counter_read_keeps_entry_done() {
        let mut engine = sample_engine();
        let none = ActivityCounts::default();
        let reached = StatsSnapshot {
            viewpoints: 1,
            ..at_percent(40.0)
        };
        assert!(engine.update_completion_status(&reached, &none));
        assert_eq!(engine.progress(), (1, 4));

        let failed_read = StatsSnapshot {
            unreadable: vec![Stat::Viewpoints],
            ..at_percent(40.0)
        };
        assert!(!engine.update_completion_status(&failed_read, &none));
        assert_eq!(engine.progress(), (1, 4));
        assert_eq!(engine.entries()[0].name, "Viewpoint 1");
        assert!(engine.entries()[0].completed);
    }

    #[test]
    fn test_lower_counter_keeps_entry_done() {
        let mut engine = sample_engine();
        let none = ActivityCounts::default();
        let two = StatsSnapshot {
            viewpoints: 2,
            ..at_percent(40.0)
        };
        let one = StatsSnapshot {
            viewpoints: 1,
            ..at_percent(40.0)
        };

        assert!(engine.update_completion_status(&two, &none));
        assert_eq!(engine.progress(), (2, 4));
        assert!(!engine.update_completion_status(&one, &none));
        assert_eq!(engine.progress(), (2, 4));
    }

    #[test]
    fn test_unreadable_percent_is_not_a_drop() {
        let mut engine = sample_engine();
        let none = ActivityCounts::default();
        assert!(engine.update_completion_status(&at_percent(100.0), &none));
        assert_eq!(engine.progress(), (4, 4));

        let failed_read = StatsSnapshot {
            unreadable: vec![Stat::Percent, Stat::PercentFloat],
            ..Default::default()
        };
        assert!(!engine.update_completion_status(&failed_read, &none));
        assert_eq!(engine.progress(), (4, 4));
        assert!(!engine.checklist().reset_since_peak);

        // The 100% baseline survives, so a real drop still resets
        assert!(engine.update_completion_status(&at_percent(80.0), &none));
        assert_eq!(engine.progress(), (0, 4));
        assert!(engine.checklist().reset_since_peak);
    }

    #[test]
    fn test_integer_percent_used_when_exact_unreadable() {
        let mut engine = sample_engine();
        let none = ActivityCounts::default();
        engine.update_completion_status(&at_percent(100.0), &none);

        let integer_only = StatsSnapshot {
            percent: 70,
            unreadable: vec![Stat::PercentFloat],
            ..Default::default()
        };
        assert!(engine.update_completion_status(&integer_only, &none));
        assert_eq!(engine.progress(), (0, 4));
    }
}
