//! Playback configuration for both engine modes.

use serde::{Deserialize, Serialize};

/// Settings for the tick-driven trajectory engine.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Seconds of accumulated tick time per frame advance, before speed
    /// scaling is applied.
    pub frame_interval: f32,
    /// Lower clamp for the speed multiplier; there is no upper clamp in this
    /// mode.
    pub min_speed: f32,
    /// Wrap to the next trajectory (sorted id order) when the current one is
    /// exhausted.
    pub loop_trajectories: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            frame_interval: 0.1,
            min_speed: 0.1,
            loop_trajectories: true,
        }
    }
}

/// Settings for the flat data-point replayer.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Unscaled timestamp gaps longer than this many seconds are treated as
    /// data holes and skipped without waiting.
    pub gap_timeout: f32,
    /// Per-step wait in seconds when running in fixed-step mode.
    pub fixed_time_step: f32,
    /// Speed multiplier clamp range.
    pub min_speed: f32,
    pub max_speed: f32,
    /// Restart from the first point after emitting the completion event.
    pub loop_playback: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            gap_timeout: 5.0,
            fixed_time_step: 0.1,
            min_speed: 0.1,
            max_speed: 10.0,
            loop_playback: false,
        }
    }
}

/// How per-step waits are derived in the flat replayer.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimestampMode {
    /// Waits follow the recorded nanosecond timestamps.
    #[default]
    Real,
    /// Constant wait per step, regardless of recorded timestamps.
    FixedStep,
}
