use strum::IntoEnumIterator;

use crate::activity::Activity;
use crate::error::Result;
use crate::poller::PolledSnapshot;
use crate::stats::{Stat, StatsSnapshot};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Header matching [`format_snapshot_tsv_row`]
pub fn format_snapshot_tsv_header() -> String {
    let mut columns = vec!["timestamp".to_string(), "tick".to_string()];
    columns.extend(Stat::iter().map(|stat| stat.as_ref().to_string()));
    columns.extend(
        [
            Activity::StoryMission,
            Activity::TemplarHunt,
            Activity::LegendaryShip,
        ]
        .iter()
        .map(|activity| activity_column(*activity).to_string()),
    );
    columns.join("\t")
}

pub fn format_snapshot_tsv_row(snapshot: &PolledSnapshot) -> String {
    let mut fields = vec![
        snapshot.taken_at.format(TIMESTAMP_FORMAT).to_string(),
        snapshot.tick.to_string(),
    ];
    fields.extend(stat_fields(&snapshot.stats));
    fields.extend([
        snapshot.activity.story_missions.to_string(),
        snapshot.activity.templar_hunts.to_string(),
        snapshot.activity.legendary_ships.to_string(),
    ]);
    fields.join("\t")
}

/// Counter values in publication order
pub fn stat_fields(stats: &StatsSnapshot) -> Vec<String> {
    Stat::iter()
        .map(|stat| match stat {
            Stat::PercentFloat => format!("{:.5}", stats.percent_float),
            other => stats.count(other).to_string(),
        })
        .collect()
}

pub fn format_snapshot_json(snapshot: &PolledSnapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

fn activity_column(activity: Activity) -> &'static str {
    match activity {
        Activity::StoryMission => "story_missions",
        Activity::TemplarHunt => "templar_hunts",
        Activity::LegendaryShip => "legendary_ships",
    }
}
