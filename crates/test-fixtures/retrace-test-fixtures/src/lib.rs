//! Shared fixture inputs for retrace tests.
//!
//! Fixture files live under the workspace-root `fixtures/` directory and are
//! resolved through `fixtures/manifest.json` so tests refer to them by name
//! rather than by path.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    trajectories: HashMap<String, String>,
    replays: HashMap<String, String>,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = fixtures_root().join(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

/// Load a trajectory JSON fixture by manifest name.
pub fn trajectory_json(name: &str) -> Result<String> {
    let rel = MANIFEST
        .trajectories
        .get(name)
        .ok_or_else(|| anyhow!("unknown trajectory fixture '{name}'"))?;
    read_to_string(rel)
}

/// Load a replay CSV fixture by manifest name.
pub fn replay_csv(name: &str) -> Result<String> {
    let rel = MANIFEST
        .replays
        .get(name)
        .ok_or_else(|| anyhow!("unknown replay fixture '{name}'"))?;
    read_to_string(rel)
}

/// Names of all trajectory fixtures in the manifest.
pub fn trajectory_names() -> Vec<String> {
    let mut names: Vec<String> = MANIFEST.trajectories.keys().cloned().collect();
    names.sort();
    names
}

/// Names of all replay fixtures in the manifest.
pub fn replay_names() -> Vec<String> {
    let mut names: Vec<String> = MANIFEST.replays.keys().cloned().collect();
    names.sort();
    names
}
