//! Canonical replay data model: frames, trajectories, and flat data points.
//! All records are immutable once parsed.

use serde::{Deserialize, Serialize};

use crate::ids::TrajectoryId;

/// 2D position in source-log coordinates.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

/// One timestamped record of a per-trajectory log, including the predicted
/// future positions recorded alongside the current one.
///
/// Serde field names match the wire format (`t_id`, `t`, `p_x`, `p_y`).
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Frame {
    #[serde(rename = "t_id")]
    pub trajectory_id: i32,
    /// Nanosecond-scale timestamp from the recording.
    #[serde(rename = "t")]
    pub timestamp: i64,
    pub x: f32,
    pub y: f32,
    #[serde(rename = "p_x", default)]
    pub predicted_x: Vec<f32>,
    #[serde(rename = "p_y", default)]
    pub predicted_y: Vec<f32>,
}

impl Frame {
    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2 {
            x: self.x,
            y: self.y,
        }
    }

    /// Pairwise predicted positions, up to the shorter of the two series.
    pub fn predicted_positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.predicted_x
            .iter()
            .zip(self.predicted_y.iter())
            .map(|(&x, &y)| Vec2 { x, y })
    }
}

/// Ordered frame sequence for one trajectory id. Frame order is insertion
/// order from the source; the store never re-sorts it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Trajectory {
    pub id: TrajectoryId,
    pub frames: Vec<Frame>,
}

impl Trajectory {
    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[inline]
    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }
}

/// One row of the flat replay event log. `start` and `goal` are opaque
/// pass-through values with no semantics in the core.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ReplayDataPoint {
    pub id_prefix: String,
    pub id: String,
    pub position: Vec2,
    pub velocity: f32,
    pub orientation: f32,
    /// Nanosecond timestamp from the recording.
    pub timestamp: i64,
    pub workstation: i32,
    pub trajectory_id: String,
    pub start: f32,
    pub goal: f32,
}
