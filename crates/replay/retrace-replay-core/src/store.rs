//! Trajectory ownership and lookup.
//!
//! The store is rebuilt wholesale on every load; a failed load leaves the
//! previous state untouched. Iteration order for playback is the
//! numeric-then-lexicographic sort of ids, computed once per load.

use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use thiserror::Error;

use crate::data::Trajectory;
use crate::ids::TrajectoryId;
use crate::json::{parse_trajectory_json, ParseError};

/// Load and lookup failures surfaced by the store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("trajectory {0:?} not found")]
    NotFound(String),
    #[error("cannot read trajectory log at {path}")]
    MissingSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// All trajectories of one loaded document, keyed by id.
#[derive(Debug, Default)]
pub struct TrajectoryStore {
    trajectories: HashMap<TrajectoryId, Trajectory>,
    order: Vec<TrajectoryId>,
    current: Option<TrajectoryId>,
}

impl TrajectoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `text` and replace all held state atomically. On success the
    /// first trajectory in sorted order becomes current.
    pub fn load_str(&mut self, text: &str) -> Result<(), StoreError> {
        let parsed = parse_trajectory_json(text)?;
        let mut trajectories = HashMap::with_capacity(parsed.len());
        let mut order: Vec<TrajectoryId> = Vec::with_capacity(parsed.len());
        for (key, frames) in parsed {
            let id = TrajectoryId::new(key);
            order.push(id.clone());
            trajectories.insert(id.clone(), Trajectory { id, frames });
        }
        order.sort();
        self.current = order.first().cloned();
        self.trajectories = trajectories;
        self.order = order;
        log::debug!("trajectory store loaded {} trajectories", self.order.len());
        Ok(())
    }

    /// Read and load a trajectory document from disk.
    pub fn load_path(&mut self, path: &Path) -> Result<(), StoreError> {
        let text = std::fs::read_to_string(path).map_err(|source| StoreError::MissingSource {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_str(&text)
    }

    /// Ids in playback order.
    pub fn ids(&self) -> &[TrajectoryId] {
        &self.order
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, id: &TrajectoryId) -> Option<&Trajectory> {
        self.trajectories.get(id)
    }

    pub fn current_id(&self) -> Option<&TrajectoryId> {
        self.current.as_ref()
    }

    pub fn current(&self) -> Option<&Trajectory> {
        self.current
            .as_ref()
            .and_then(|id| self.trajectories.get(id))
    }

    /// Make `id` the current trajectory. Unknown ids leave the selection
    /// unchanged.
    pub fn select(&mut self, id: &str) -> Result<&Trajectory, StoreError> {
        let key = TrajectoryId::new(id);
        if !self.trajectories.contains_key(&key) {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.current = Some(key.clone());
        Ok(&self.trajectories[&key])
    }

    /// Successor of `id` in sorted order, wrapping to the first id after the
    /// last.
    pub fn next_after(&self, id: &TrajectoryId) -> Option<&TrajectoryId> {
        let position = self.order.iter().position(|candidate| candidate == id)?;
        self.order.get(position + 1).or_else(|| self.order.first())
    }
}
