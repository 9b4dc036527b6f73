//! Retrace Replay Core (renderer-agnostic)
//!
//! Ingests recorded motion logs — a per-trajectory JSON format carrying
//! future-position predictions and a flat CSV event log with real
//! timestamps — normalizes them into seekable time-indexed sequences, and
//! drives playback with speed scaling, looping, seeking and gap handling.
//! Hosts (renderers, UIs) register observers and receive events
//! synchronously; no drawing or coordinate mapping happens here.

pub mod config;
pub mod data;
pub mod engine;
pub mod events;
pub mod ids;
pub mod json;
pub mod replay;
pub mod replay_log;
pub mod store;

// Re-exports for consumers (adapters)
pub use config::{PlaybackConfig, ReplayConfig, TimestampMode};
pub use data::{Frame, ReplayDataPoint, Trajectory, Vec2};
pub use engine::TrajectoryEngine;
pub use events::{EventBus, ReplayEvent};
pub use ids::TrajectoryId;
pub use json::{parse_trajectory_json, ParseError};
pub use replay::{LoadSummary, PointReplay, ReplayError};
pub use replay_log::{parse_replay_csv, CsvReport, SkippedLine, TimestampUnit};
pub use store::{StoreError, TrajectoryStore};
