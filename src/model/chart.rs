use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::error::ChartError;
use super::note::{LANE_COUNT, Lane, NoteSpec};

const MS_PER_SECOND: f64 = 1000.0;

/// Normalized chart as handed over by the chart parser. Times are in seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub lanes: Vec<LaneData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaneData {
    pub notes: Vec<NoteData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteData {
    pub target_time: f64,
    #[serde(default)]
    pub is_hold: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
}

/// Validated, immutable chart. Times are in milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    lanes: [Vec<NoteSpec>; LANE_COUNT],
}

impl Chart {
    /// Validate parser output and convert it to milliseconds.
    pub fn from_data(data: &ChartData) -> Result<Self, ChartError> {
        if data.lanes.len() != LANE_COUNT {
            return Err(ChartError::LaneCount {
                found: data.lanes.len(),
            });
        }

        let mut lanes: [Vec<NoteSpec>; LANE_COUNT] = Default::default();
        for (lane_data, lane) in data.lanes.iter().zip(Lane::all()) {
            let mut previous_ms: Option<f64> = None;
            for (index, note) in lane_data.notes.iter().enumerate() {
                let spec = Self::convert_note(*lane, index, note)?;
                match previous_ms {
                    Some(previous_ms) if spec.target_ms < previous_ms => {
                        return Err(ChartError::NonMonotonic {
                            lane: *lane,
                            index,
                            previous_ms,
                            time_ms: spec.target_ms,
                        });
                    }
                    _ => {}
                }
                previous_ms = Some(spec.target_ms);
                lanes[lane.index()].push(spec);
            }
        }

        Ok(Self { lanes })
    }

    fn convert_note(lane: Lane, index: usize, note: &NoteData) -> Result<NoteSpec, ChartError> {
        // Checked after scaling: huge finite seconds overflow to infinity.
        let target_ms = note.target_time * MS_PER_SECOND;
        if !target_ms.is_finite() {
            return Err(ChartError::NonFiniteTime { lane, index });
        }
        if target_ms < 0.0 {
            return Err(ChartError::NegativeTime {
                lane,
                index,
                time_ms: target_ms,
            });
        }

        if !note.is_hold {
            // End times on instantaneous notes carry no meaning and are dropped.
            return Ok(NoteSpec::tap(target_ms));
        }

        let end_time = note
            .end_time
            .ok_or(ChartError::MissingHoldEnd { lane, index })?;
        let end_ms = end_time * MS_PER_SECOND;
        if !end_ms.is_finite() {
            return Err(ChartError::NonFiniteTime { lane, index });
        }
        if end_ms <= target_ms {
            return Err(ChartError::HoldEndNotAfterStart {
                lane,
                index,
                start_ms: target_ms,
                end_ms,
            });
        }
        Ok(NoteSpec::hold(target_ms, end_ms))
    }

    /// Parse and validate a chart from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, ChartError> {
        let data: ChartData = serde_json::from_str(json)?;
        Self::from_data(&data)
    }

    /// Load and validate a chart JSON file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read chart file: {}", path.display()))?;
        let chart = Self::from_json(&content)
            .with_context(|| format!("Unplayable chart: {}", path.display()))?;
        Ok(chart)
    }

    /// Notes of a lane in ascending target time.
    pub fn lane_notes(&self, lane: Lane) -> &[NoteSpec] {
        &self.lanes[lane.index()]
    }

    /// Count of all notes across the chart. A hold counts once.
    pub fn total_notes(&self) -> usize {
        self.lanes.iter().map(Vec::len).sum()
    }

    /// Time of the last note event (target or hold end) in milliseconds.
    pub fn last_event_ms(&self) -> f64 {
        self.lanes
            .iter()
            .flatten()
            .map(|n| n.end_ms.unwrap_or(n.target_ms))
            .fold(0.0, f64::max)
    }
}
