//! Flat replay of the CSV event log.
//!
//! Each `start`/`resume` spawns one worker run that walks the point sequence,
//! suspending between points on a cancellable condvar wait. Pause and stop
//! cancel the pending wait promptly and join the worker before returning, so
//! at most one run ever exists and a cancelled iteration produces no side
//! effects. Elapsed wait time is not preserved across pause/resume;
//! suspension only ever happens at point boundaries.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use thiserror::Error;

use crate::config::{ReplayConfig, TimestampMode};
use crate::data::ReplayDataPoint;
use crate::events::{ReplayEvent, SendCallback};
use crate::replay_log::{parse_replay_csv, CsvReport, SkippedLine};

const NANOS_PER_SECOND: f64 = 1e9;

/// Failures surfaced by the replayer itself; per-line log issues are reported
/// through [`LoadSummary`], not here.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("cannot read replay log at {path}")]
    MissingSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of loading a replay log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub loaded: usize,
    pub skipped: Vec<SkippedLine>,
}

#[derive(Debug)]
struct ReplayState {
    points: Arc<Vec<ReplayDataPoint>>,
    index: usize,
    speed: f32,
    mode: TimestampMode,
    looping: bool,
    running: bool,
    current: Option<ReplayDataPoint>,
}

struct Shared {
    state: Mutex<ReplayState>,
    wake: Condvar,
    subscribers: Mutex<Vec<SendCallback>>,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, ReplayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: &ReplayEvent) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for subscriber in subscribers.iter_mut() {
            subscriber(event);
        }
    }
}

/// Playback engine for the flat data-point sequence. No trajectory grouping;
/// points advance strictly in file order.
pub struct PointReplay {
    cfg: ReplayConfig,
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl PointReplay {
    pub fn new(cfg: ReplayConfig) -> Self {
        let state = ReplayState {
            points: Arc::new(Vec::new()),
            index: 0,
            speed: 1.0,
            mode: TimestampMode::default(),
            looping: cfg.loop_playback,
            running: false,
            current: None,
        };
        Self {
            cfg,
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                wake: Condvar::new(),
                subscribers: Mutex::new(Vec::new()),
            }),
            worker: None,
        }
    }

    /// Register an observer. Callbacks run synchronously on the worker thread
    /// (or on the caller for immediate emissions) and must not call back into
    /// this instance.
    pub fn subscribe(&self, callback: impl FnMut(&ReplayEvent) + Send + 'static) {
        self.shared
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(callback));
    }

    /// Parse and install a new point sequence. Any in-progress run is
    /// cancelled first and the cursor restarts at the beginning.
    pub fn load_str(&mut self, text: &str) -> LoadSummary {
        self.cancel_run();
        let CsvReport { points, skipped } = parse_replay_csv(text);
        let mut state = self.shared.state();
        state.points = Arc::new(points);
        state.index = 0;
        state.current = None;
        LoadSummary {
            loaded: state.points.len(),
            skipped,
        }
    }

    /// Read and load a replay log from disk.
    pub fn load_path(&mut self, path: &Path) -> Result<LoadSummary, ReplayError> {
        let text = std::fs::read_to_string(path).map_err(|source| ReplayError::MissingSource {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.load_str(&text))
    }

    /// Begin (or restart) a run from the current index. Idempotent: an
    /// in-progress run is stopped first.
    pub fn start(&mut self) {
        self.cancel_run();
        {
            let mut state = self.shared.state();
            if state.points.is_empty() {
                log::warn!("replay start requested with no points loaded");
                return;
            }
            state.running = true;
        }
        self.shared.emit(&ReplayEvent::ReplayStarted);
        let shared = Arc::clone(&self.shared);
        let cfg = self.cfg;
        self.worker = Some(std::thread::spawn(move || run_loop(&shared, &cfg)));
    }

    /// Continue from the current index; identical to [`Self::start`] when not
    /// already running.
    pub fn resume(&mut self) {
        if !self.is_running() {
            self.start();
        }
    }

    /// Cancel any pending wait and halt at the current index.
    pub fn pause(&mut self) {
        if self.cancel_run() {
            self.shared.emit(&ReplayEvent::ReplayPaused);
        }
    }

    /// Pause and rewind to the first point.
    pub fn stop(&mut self) {
        let interrupted = self.cancel_run();
        {
            let mut state = self.shared.state();
            state.index = 0;
            state.current = None;
        }
        if interrupted {
            self.shared.emit(&ReplayEvent::ReplayPaused);
        }
    }

    /// Jump to `fraction` of the sequence: index `floor(fraction × count)`
    /// clamped to the valid range. Updates the snapshot and emits an update
    /// immediately, whether or not playback is active.
    pub fn seek_normalized(&mut self, fraction: f32) {
        let event = {
            let mut state = self.shared.state();
            if state.points.is_empty() {
                log::warn!("seek requested with no points loaded");
                return;
            }
            let count = state.points.len();
            let fraction = fraction.clamp(0.0, 1.0);
            let index = ((fraction * count as f32).floor() as usize).min(count - 1);
            state.index = index;
            let point = state.points[index].clone();
            state.current = Some(point.clone());
            ReplayEvent::DataPointUpdated { point }
        };
        self.shared.emit(&event);
    }

    /// Set the speed multiplier, clamped to the configured range.
    pub fn set_speed(&mut self, speed: f32) {
        let clamped = speed.clamp(self.cfg.min_speed, self.cfg.max_speed);
        self.shared.state().speed = clamped;
    }

    pub fn speed(&self) -> f32 {
        self.shared.state().speed
    }

    pub fn set_timestamp_mode(&mut self, mode: TimestampMode) {
        self.shared.state().mode = mode;
    }

    pub fn toggle_timestamp_mode(&mut self) {
        let mut state = self.shared.state();
        state.mode = match state.mode {
            TimestampMode::Real => TimestampMode::FixedStep,
            TimestampMode::FixedStep => TimestampMode::Real,
        };
    }

    pub fn timestamp_mode(&self) -> TimestampMode {
        self.shared.state().mode
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.shared.state().looping = looping;
    }

    pub fn is_running(&self) -> bool {
        self.shared.state().running
    }

    /// Snapshot of the point the cursor sits on, if any advance or seek has
    /// happened since load.
    pub fn current(&self) -> Option<ReplayDataPoint> {
        self.shared.state().current.clone()
    }

    pub fn index(&self) -> usize {
        self.shared.state().index
    }

    pub fn len(&self) -> usize {
        self.shared.state().points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.state().points.is_empty()
    }

    /// Returns true when a worker run was actually interrupted.
    fn cancel_run(&mut self) -> bool {
        let was_running = {
            let mut state = self.shared.state();
            let was = state.running;
            state.running = false;
            was
        };
        self.shared.wake.notify_all();
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
        was_running
    }
}

impl Drop for PointReplay {
    fn drop(&mut self) {
        self.cancel_run();
    }
}

impl fmt::Debug for PointReplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state();
        f.debug_struct("PointReplay")
            .field("points", &state.points.len())
            .field("index", &state.index)
            .field("running", &state.running)
            .field("mode", &state.mode)
            .finish()
    }
}

/// Seconds to suspend before advancing from `current` to `next`.
///
/// Real-timestamp mode compares the *unscaled* delta against the gap timeout;
/// an over-threshold gap waits zero seconds regardless of speed.
fn step_wait(
    current: &ReplayDataPoint,
    next: &ReplayDataPoint,
    mode: TimestampMode,
    speed: f32,
    cfg: &ReplayConfig,
) -> f64 {
    let speed = f64::from(speed.max(f32::EPSILON));
    match mode {
        TimestampMode::FixedStep => f64::from(cfg.fixed_time_step) / speed,
        TimestampMode::Real => {
            let gap = (next.timestamp - current.timestamp) as f64 / NANOS_PER_SECOND;
            if gap > f64::from(cfg.gap_timeout) {
                return 0.0;
            }
            (gap / speed).max(0.0)
        }
    }
}

fn run_loop(shared: &Shared, cfg: &ReplayConfig) {
    loop {
        let wait = {
            let mut state = shared.state();
            if !state.running {
                return;
            }
            if state.index + 1 >= state.points.len() {
                // Restarting with a single point would spin; park instead.
                let restart = state.looping && state.points.len() > 1;
                state.running = restart;
                if restart {
                    state.index = 0;
                    state.current = state.points.first().cloned();
                }
                drop(state);
                shared.emit(&ReplayEvent::ReplayCompleted);
                if restart {
                    continue;
                }
                return;
            }
            step_wait(
                &state.points[state.index],
                &state.points[state.index + 1],
                state.mode,
                state.speed,
                cfg,
            )
        };

        if wait > 0.0 {
            let state = shared.state();
            let timeout = Duration::from_secs_f64(wait);
            let (state, _timed_out) = shared
                .wake
                .wait_timeout_while(state, timeout, |state| state.running)
                .unwrap_or_else(PoisonError::into_inner);
            // A cancelled wait must not advance the cursor.
            if !state.running {
                return;
            }
        }

        let event = {
            let mut state = shared.state();
            if !state.running {
                return;
            }
            if state.index + 1 >= state.points.len() {
                // A seek moved the cursor to the end mid-wait; let the next
                // pass handle completion.
                continue;
            }
            state.index += 1;
            let point = state.points[state.index].clone();
            state.current = Some(point.clone());
            ReplayEvent::DataPointUpdated { point }
        };
        shared.emit(&event);
    }
}
