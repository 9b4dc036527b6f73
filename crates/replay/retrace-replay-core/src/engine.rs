//! Tick-driven playback over per-trajectory frame logs.
//!
//! The host owns the clock and calls [`TrajectoryEngine::update`] with its
//! elapsed seconds each tick; the engine advances at most one frame per tick
//! once enough time has accumulated, so long host stalls under-advance rather
//! than burst.

use std::path::Path;

use crate::config::PlaybackConfig;
use crate::data::Frame;
use crate::events::{EventBus, ReplayEvent};
use crate::ids::TrajectoryId;
use crate::store::{StoreError, TrajectoryStore};

/// Playback engine for the per-trajectory JSON logs. One cursor per instance.
#[derive(Debug)]
pub struct TrajectoryEngine {
    store: TrajectoryStore,
    cfg: PlaybackConfig,
    speed: f32,
    playing: bool,
    frame_index: usize,
    elapsed: f32,
    bus: EventBus,
}

impl TrajectoryEngine {
    pub fn new(cfg: PlaybackConfig) -> Self {
        Self {
            store: TrajectoryStore::new(),
            cfg,
            speed: 1.0,
            playing: false,
            frame_index: 0,
            elapsed: 0.0,
            bus: EventBus::new(),
        }
    }

    /// Register an observer; callbacks run synchronously in registration
    /// order.
    pub fn subscribe(&mut self, callback: impl FnMut(&ReplayEvent) + 'static) {
        self.bus.subscribe(callback);
    }

    pub fn store(&self) -> &TrajectoryStore {
        &self.store
    }

    /// Load a trajectory document, replacing all prior state on success. The
    /// first trajectory (sorted order) is selected and announced immediately.
    pub fn load_str(&mut self, text: &str) -> Result<(), StoreError> {
        self.store.load_str(text)?;
        self.announce_selection();
        Ok(())
    }

    /// Reload from a file on disk; same semantics as [`Self::load_str`].
    pub fn set_source_path(&mut self, path: &Path) -> Result<(), StoreError> {
        self.store.load_path(path)?;
        self.announce_selection();
        Ok(())
    }

    /// Switch to trajectory `id`: cursor resets to frame 0 and, play state
    /// notwithstanding, the first frame is announced right away.
    pub fn set_trajectory(&mut self, id: &str) -> Result<(), StoreError> {
        if let Err(err) = self.store.select(id) {
            log::warn!("cannot switch trajectory: {err}");
            return Err(err);
        }
        self.announce_selection();
        Ok(())
    }

    /// Emit the selection side effects for the store's current trajectory.
    fn announce_selection(&mut self) {
        self.frame_index = 0;
        self.elapsed = 0.0;
        let Some(trajectory) = self.store.current() else {
            return;
        };
        let Some(frame) = trajectory.frames.first().cloned() else {
            return;
        };
        let id = trajectory.id.clone();
        self.bus.emit(&ReplayEvent::FrameChanged { frame });
        self.bus.emit(&ReplayEvent::TrajectoryChanged { trajectory: id });
    }

    /// Start advancing frames. A logged no-op when nothing is loaded.
    pub fn play(&mut self) {
        let has_frames = self
            .store
            .current()
            .map(|trajectory| !trajectory.is_empty())
            .unwrap_or(false);
        if !has_frames {
            log::warn!("play requested with no frames loaded");
            return;
        }
        self.playing = true;
        self.elapsed = 0.0;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn toggle(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Set the speed multiplier; clamped to the configured minimum, no upper
    /// bound in this mode.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(self.cfg.min_speed);
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.cfg.loop_trajectories = looping;
    }

    #[inline]
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn current_trajectory_id(&self) -> Option<&TrajectoryId> {
        self.store.current_id()
    }

    pub fn current_frame(&self) -> Option<&Frame> {
        self.store
            .current()
            .and_then(|trajectory| trajectory.frame(self.frame_index))
    }

    /// Advance playback by `dt` seconds of host time. At most one frame is
    /// consumed per call; accumulated surplus is discarded on advance.
    pub fn update(&mut self, dt: f32) {
        if !self.playing {
            return;
        }
        self.elapsed += dt;
        let interval = self.cfg.frame_interval / self.speed;
        if self.elapsed < interval {
            return;
        }
        self.elapsed = 0.0;
        self.advance_frame();
    }

    fn advance_frame(&mut self) {
        let Some(trajectory) = self.store.current() else {
            self.playing = false;
            return;
        };
        let total = trajectory.len();
        if self.frame_index + 1 < total {
            self.frame_index += 1;
            let frame = trajectory.frames[self.frame_index].clone();
            let id = trajectory.id.clone();
            self.bus.emit(&ReplayEvent::FrameChanged { frame });
            self.bus.emit(&ReplayEvent::Progress {
                trajectory: id,
                frame: self.frame_index + 1,
                total,
            });
            return;
        }
        if self.cfg.loop_trajectories {
            let next = self
                .store
                .current_id()
                .and_then(|id| self.store.next_after(id))
                .cloned();
            if let Some(next) = next {
                // The id came from the store, so selection cannot fail.
                let _ = self.store.select(next.as_str());
                self.announce_selection();
            }
            return;
        }
        // End of data: stay clamped on the last frame without re-emitting it.
        self.playing = false;
    }
}

impl Default for TrajectoryEngine {
    fn default() -> Self {
        Self::new(PlaybackConfig::default())
    }
}
