use serde::{Deserialize, Serialize};

/// Number of playable lanes.
pub const LANE_COUNT: usize = 4;

/// Represents a lane in the play area, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Lane {
    Lane1,
    Lane2,
    Lane3,
    Lane4,
}

impl Lane {
    pub const ALL: [Lane; LANE_COUNT] = [Lane::Lane1, Lane::Lane2, Lane::Lane3, Lane::Lane4];

    /// Returns all lanes in order.
    pub fn all() -> &'static [Lane; LANE_COUNT] {
        &Self::ALL
    }

    /// Returns the lane index (0-based).
    pub fn index(self) -> usize {
        match self {
            Lane::Lane1 => 0,
            Lane::Lane2 => 1,
            Lane::Lane3 => 2,
            Lane::Lane4 => 3,
        }
    }

    /// Create a lane from a 0-based index.
    pub fn from_index(index: usize) -> Option<Lane> {
        match index {
            0 => Some(Lane::Lane1),
            1 => Some(Lane::Lane2),
            2 => Some(Lane::Lane3),
            3 => Some(Lane::Lane4),
            _ => None,
        }
    }
}

impl std::fmt::Display for Lane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "lane {}", self.index() + 1)
    }
}

/// A validated note of the chart. Times are in milliseconds from song start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteSpec {
    pub target_ms: f64,
    /// End of the hold. `None` for instantaneous notes.
    pub end_ms: Option<f64>,
}

impl NoteSpec {
    pub fn tap(target_ms: f64) -> Self {
        Self {
            target_ms,
            end_ms: None,
        }
    }

    pub fn hold(target_ms: f64, end_ms: f64) -> Self {
        Self {
            target_ms,
            end_ms: Some(end_ms),
        }
    }

    pub fn is_hold(&self) -> bool {
        self.end_ms.is_some()
    }
}
