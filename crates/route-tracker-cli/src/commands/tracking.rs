//! Main tracking mode command.

use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use anyhow::Result;
use owo_colors::OwoColorize;
use route_tracker_core::{
    ActivityDetector, Checklist, CompletionEngine, Error, PolledSnapshot, Poller, ProcessHandle,
    SessionLog, ShutdownSignal, StatsReader, StreamOutput, TrackerConfig, load_route_file,
};
use tracing::{debug, info, warn};

use super::resolve_route_path;
use crate::input;

/// Delay between attempts to find the game process
const RECONNECT_INTERVAL: Duration = Duration::from_secs(5);

/// How long to wait for a snapshot before checking the process and shutdown
const RECEIVE_TIMEOUT: Duration = Duration::from_millis(250);

/// Outputs fed by every snapshot
struct Outputs {
    engine: CompletionEngine,
    stream: StreamOutput,
    session: Option<SessionLog>,
}

/// Run the main tracking mode
pub fn run(config: &TrackerConfig, route: Option<&Path>) -> Result<()> {
    let shutdown = Arc::new(ShutdownSignal::new());
    let shutdown_ctrlc = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal, stopping...");
        shutdown_ctrlc.trigger();
    })?;

    let _keyboard_handle = input::spawn_keyboard_monitor(Arc::clone(&shutdown));

    info!("route-tracker {}", env!("CARGO_PKG_VERSION"));

    let route_path = resolve_route_path(config, route)?;
    let checklist = load_route_file(&route_path)?;
    info!(
        "Loaded route {} ({} entries)",
        route_path.display(),
        checklist.len()
    );

    let mut outputs = Outputs {
        engine: CompletionEngine::new(checklist),
        stream: StreamOutput::from_dir(config.stream_dir.as_deref()),
        session: config.session_dir.as_ref().map(SessionLog::new),
    };
    print_progress(outputs.engine.checklist());

    println!(
        "Waiting for {}... (Press Esc or q to quit)",
        config.process_name
    );
    while !shutdown.is_shutdown() {
        match ProcessHandle::find_and_open(&config.process_name) {
            Ok(process) => {
                info!(
                    "Found {} (PID: {}, base: {:#x}, {})",
                    config.process_name, process.pid, process.base_address, process.pointer_width
                );
                track_process(process, config, &mut outputs, &shutdown)?;
                if shutdown.is_shutdown() {
                    break;
                }
                info!("Process disconnected, waiting for reconnect...");
            }
            Err(e @ Error::UnsupportedPlatform) => return Err(e.into()),
            Err(e) => debug!("{}", e),
        }

        if shutdown.wait(RECONNECT_INTERVAL) {
            break;
        }
    }

    if let Err(e) = outputs.stream.clear() {
        warn!("Failed to clear stream output: {}", e);
    }
    let (done, total) = outputs.engine.progress();
    println!("Stopped at {}/{} route entries", done, total);
    Ok(())
}

/// Poll one connected process until it exits or shutdown is requested
fn track_process(
    process: ProcessHandle,
    config: &TrackerConfig,
    outputs: &mut Outputs,
    shutdown: &ShutdownSignal,
) -> Result<()> {
    let process = Arc::new(process);
    let width = config.pointer_width.unwrap_or(process.pointer_width);
    let reader = StatsReader::new(Arc::clone(&process), process.base_address, width);

    // Activity totals belong to one connection
    let mut poller = Poller::new(
        reader,
        ActivityDetector::new(config.activity),
        config.poll_interval(),
    );
    let snapshots = poller.subscribe();

    if let Some(session) = outputs.session.as_mut() {
        match session.start_session() {
            Ok(path) => info!("Session log: {}", path.display()),
            Err(e) => warn!("Failed to start session log: {}", e),
        }
    }

    poller.start();
    while !shutdown.is_shutdown() {
        match snapshots.recv_timeout(RECEIVE_TIMEOUT) {
            Ok(snapshot) => outputs.handle(&snapshot),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if !process.is_alive() {
            info!("Process terminated");
            break;
        }
    }

    // Joins the polling thread before the process handle is released
    poller.stop();
    let pending = drain_pending(&snapshots, outputs);
    if pending > 0 {
        debug!("Handled {} snapshot(s) queued before stop", pending);
    }
    Ok(())
}

/// Feed every snapshot still queued on `snapshots` without blocking
fn drain_pending(snapshots: &Receiver<Arc<PolledSnapshot>>, outputs: &mut Outputs) -> usize {
    let mut handled = 0;
    for snapshot in snapshots.try_iter() {
        outputs.handle(&snapshot);
        handled += 1;
    }
    handled
}

impl Outputs {
    fn handle(&mut self, snapshot: &PolledSnapshot) {
        if let Some(activity) = snapshot.detected {
            println!("{} {}", "+".green(), activity.bold());
        }

        if self
            .engine
            .update_completion_status(&snapshot.stats, &snapshot.activity)
        {
            print_progress(self.engine.checklist());
        }

        if let Err(e) = self
            .stream
            .write_percent(snapshot.stats.percent_float)
            .and_then(|()| self.stream.write_progress(self.engine.checklist()))
            .and_then(|()| self.stream.write_activity(snapshot))
        {
            warn!("Failed to write stream output: {}", e);
        }

        if let Some(session) = self.session.as_mut()
            && let Err(e) = session.record(snapshot)
        {
            warn!("Failed to write session log: {}", e);
        }
    }
}

fn print_progress(checklist: &Checklist) {
    let (done, total) = checklist.progress();
    let progress = format!("[{}/{}]", done, total);
    match checklist.next_incomplete() {
        Some(entry) => println!(
            "{} Next: {} {}",
            progress.cyan(),
            entry.display_text().bold(),
            format!("({} >= {})", entry.kind, entry.threshold).dimmed()
        ),
        None => println!("{} {}", progress.cyan(), "Route complete!".green().bold()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use chrono::Local;
    use route_tracker_core::{ActivityCounts, ChecklistEntry, StatsSnapshot};

    use super::*;

    fn outputs() -> Outputs {
        Outputs {
            engine: CompletionEngine::new(Checklist::new(vec![
                ChecklistEntry::new("Viewpoint 1", "viewpoint", 1),
                ChecklistEntry::new("Viewpoint 2", "viewpoint", 2),
            ])),
            stream: StreamOutput::from_dir(None),
            session: None,
        }
    }

    fn polled(tick: u64, viewpoints: i32) -> Arc<PolledSnapshot> {
        Arc::new(PolledSnapshot {
            tick,
            taken_at: Local::now(),
            stats: StatsSnapshot {
                percent: 10,
                percent_float: 10.0,
                viewpoints,
                ..Default::default()
            },
            activity: ActivityCounts::default(),
            detected: None,
        })
    }

    #[test]
    fn test_queued_snapshots_reach_outputs() {
        let (tx, rx) = mpsc::channel();
        tx.send(polled(1, 1)).unwrap();
        tx.send(polled(2, 2)).unwrap();
        drop(tx);

        let mut outputs = outputs();
        assert_eq!(drain_pending(&rx, &mut outputs), 2);
        assert_eq!(outputs.engine.progress(), (2, 2));
    }

    #[test]
    fn test_drain_does_not_block_on_open_channel() {
        let (_tx, rx) = mpsc::channel::<Arc<PolledSnapshot>>();
        let mut outputs = outputs();
        assert_eq!(drain_pending(&rx, &mut outputs), 0);
        assert_eq!(outputs.engine.progress(), (0, 2));
    }
}
