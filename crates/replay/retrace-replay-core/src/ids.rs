//! Trajectory identifiers as they appear in the source logs.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// String key of a trajectory in the source log.
///
/// Ordering is numeric when both sides parse as integers and lexicographic
/// otherwise, so `"2"` sorts before `"10"`. Numeric ties fall back to the raw
/// string, keeping the order consistent with equality (`"02"` vs `"2"`).
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrajectoryId(String);

impl TrajectoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrajectoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrajectoryId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TrajectoryId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Ord for TrajectoryId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.parse::<i64>(), other.0.parse::<i64>()) {
            (Ok(a), Ok(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            _ => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for TrajectoryId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_keys_sort_numerically() {
        let mut ids: Vec<TrajectoryId> = ["10", "2", "1"].iter().map(|s| (*s).into()).collect();
        ids.sort();
        let sorted: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
        assert_eq!(sorted, ["1", "2", "10"]);
    }

    #[test]
    fn mixed_keys_fall_back_to_lexicographic() {
        let mut ids: Vec<TrajectoryId> = ["b", "10", "a2"].iter().map(|s| (*s).into()).collect();
        ids.sort();
        let sorted: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
        assert_eq!(sorted, ["10", "a2", "b"]);
    }

    #[test]
    fn numeric_ties_stay_distinct() {
        let a = TrajectoryId::new("02");
        let b = TrajectoryId::new("2");
        assert_ne!(a, b);
        assert_ne!(a.cmp(&b), Ordering::Equal);
    }
}
