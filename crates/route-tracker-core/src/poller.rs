//! Fixed-interval polling of game stats.
//!
//! One dedicated thread owns the stats source and the activity detector and
//! is the only writer of either. Each tick it reads a snapshot, feeds the
//! float percentage to the detector and sends the combined
//! [`PolledSnapshot`] to every subscriber channel. Subscribers receive the
//! value on their own thread; it is never mutated after publication.
//!
//! A tick that overruns the interval causes the missed ticks to be dropped,
//! never queued. [`Poller::stop`] joins the thread, so no snapshot is
//! delivered after it returns.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{debug, warn};

use crate::activity::{Activity, ActivityCounts, ActivityDetector};
use crate::shutdown::ShutdownSignal;
use crate::stats::{Stat, StatsSnapshot, StatsSource};

/// Default interval between ticks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Shortest accepted interval
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Everything published for one tick
#[derive(Debug, Clone, Serialize)]
pub struct PolledSnapshot {
    /// Tick number, starting at 1 for a new poller
    pub tick: u64,
    pub taken_at: DateTime<Local>,
    pub stats: StatsSnapshot,
    pub activity: ActivityCounts,
    /// Activity inferred on this tick, if any
    pub detected: Option<Activity>,
}

type Subscribers = Arc<Mutex<Vec<Sender<Arc<PolledSnapshot>>>>>;

/// State owned by whichever thread is currently polling
struct PollTask<S> {
    source: S,
    detector: ActivityDetector,
    ticks: u64,
}

impl<S: StatsSource> PollTask<S> {
    fn tick(&mut self) -> PolledSnapshot {
        self.ticks += 1;
        let stats = self.source.read_stats();

        // An unreadable percentage keeps the previous reading as the baseline
        let detected = if stats.is_readable(Stat::PercentFloat) {
            self.detector.update(stats.percent_float)
        } else {
            None
        };

        PolledSnapshot {
            tick: self.ticks,
            taken_at: Local::now(),
            stats,
            activity: self.detector.counts(),
            detected,
        }
    }
}

struct Running<S> {
    shutdown: Arc<ShutdownSignal>,
    handle: JoinHandle<PollTask<S>>,
}

pub struct Poller<S> {
    interval: Duration,
    idle: Option<PollTask<S>>,
    running: Option<Running<S>>,
    subscribers: Subscribers,
}

impl<S: StatsSource + Send + 'static> Poller<S> {
    pub fn new(source: S, detector: ActivityDetector, interval: Duration) -> Self {
        Self {
            interval: interval.max(MIN_POLL_INTERVAL),
            idle: Some(PollTask {
                source,
                detector,
                ticks: 0,
            }),
            running: None,
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Register a new subscriber; may be called while running
    pub fn subscribe(&self) -> Receiver<Arc<PolledSnapshot>> {
        let (tx, rx) = mpsc::channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Start the polling thread; a no-op when already running
    pub fn start(&mut self) {
        if self.running.is_some() {
            debug!("Poller already running");
            return;
        }
        let Some(mut task) = self.idle.take() else {
            warn!("Poller cannot restart after its thread panicked");
            return;
        };

        let shutdown = Arc::new(ShutdownSignal::new());
        let signal = Arc::clone(&shutdown);
        let subscribers = Arc::clone(&self.subscribers);
        let interval = self.interval;

        debug!("Starting poller ({} ms interval)", interval.as_millis());
        let handle = thread::spawn(move || {
            run_loop(&mut task, interval, &signal, &subscribers);
            task
        });

        self.running = Some(Running { shutdown, handle });
    }

    /// Stop and join the polling thread.
    ///
    /// Blocks until any in-flight tick has finished; nothing is published
    /// after this returns.
    pub fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };

        running.shutdown.trigger();
        match running.handle.join() {
            Ok(task) => {
                debug!("Poller stopped after {} ticks", task.ticks);
                self.idle = Some(task);
            }
            Err(_) => warn!("Poller thread panicked"),
        }
    }

    /// Run one tick on the calling thread (only while stopped)
    pub fn poll_once(&mut self) -> Option<Arc<PolledSnapshot>> {
        let task = self.idle.as_mut()?;
        let snapshot = Arc::new(task.tick());
        publish(&self.subscribers, &snapshot);
        Some(snapshot)
    }

    /// Activity totals so far (only while stopped)
    pub fn activity(&self) -> Option<ActivityCounts> {
        self.idle.as_ref().map(|task| task.detector.counts())
    }
}

impl<S> Drop for Poller<S> {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.shutdown.trigger();
            let _ = running.handle.join();
        }
    }
}

fn run_loop<S: StatsSource>(
    task: &mut PollTask<S>,
    interval: Duration,
    shutdown: &ShutdownSignal,
    subscribers: &Subscribers,
) {
    let mut next_tick = Instant::now();

    while !shutdown.is_shutdown() {
        let snapshot = Arc::new(task.tick());
        publish(subscribers, &snapshot);

        next_tick += interval;
        let now = Instant::now();
        if next_tick <= now {
            let mut dropped = 0u64;
            while next_tick <= now {
                next_tick += interval;
                dropped += 1;
            }
            debug!("Slow tick {}: dropped {} tick(s)", snapshot.tick, dropped);
        }

        if shutdown.wait_until(next_tick) {
            break;
        }
    }
}

/// Send to every subscriber, forgetting those whose receiver is gone
fn publish(subscribers: &Subscribers, snapshot: &Arc<PolledSnapshot>) {
    let mut subscribers = subscribers.lock().unwrap_or_else(PoisonError::into_inner);
    subscribers.retain(|tx| tx.send(Arc::clone(snapshot)).is_ok());
}
