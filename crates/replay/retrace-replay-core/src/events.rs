//! Event contracts delivered to host renderers.
//!
//! The core holds an ordered list of subscriber callbacks per engine and
//! invokes them synchronously in registration order; there is no broadcast
//! framework and no queueing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::{Frame, ReplayDataPoint};
use crate::ids::TrajectoryId;

/// Discrete signals emitted during playback.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[non_exhaustive]
pub enum ReplayEvent {
    /// The playback cursor entered a new frame.
    FrameChanged { frame: Frame },
    /// The current trajectory switched (explicit select or loop wrap).
    TrajectoryChanged { trajectory: TrajectoryId },
    /// Position within the current trajectory; `frame` is 1-based.
    Progress {
        trajectory: TrajectoryId,
        frame: usize,
        total: usize,
    },
    /// The flat replayer advanced to (or seeked onto) a data point.
    DataPointUpdated { point: ReplayDataPoint },
    ReplayStarted,
    ReplayPaused,
    ReplayCompleted,
}

/// Ordered observer registry for the single-threaded tick engine.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Box<dyn FnMut(&ReplayEvent)>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&ReplayEvent) + 'static) {
        self.subscribers.push(Box::new(callback));
    }

    pub fn emit(&mut self, event: &ReplayEvent) {
        for subscriber in &mut self.subscribers {
            subscriber(event);
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

/// Callback type for the threaded flat replayer; invoked from its worker
/// thread, so it must be `Send`.
pub type SendCallback = Box<dyn FnMut(&ReplayEvent) + Send>;
