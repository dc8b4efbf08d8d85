//! Test utilities for building charts and sessions.
//!
//! This module provides helpers for creating test fixtures in a fluent manner.

use crate::model::{Chart, ChartData, LANE_COUNT, Lane, LaneData, NoteData};

/// Builder for creating test charts. Times are given in seconds, as the
/// chart parser would hand them over.
#[derive(Debug, Clone)]
pub struct ChartBuilder {
    data: ChartData,
}

impl ChartBuilder {
    pub fn new() -> Self {
        Self {
            data: ChartData {
                lanes: vec![LaneData::default(); LANE_COUNT],
            },
        }
    }

    /// Add an instantaneous note.
    pub fn tap(mut self, lane: Lane, target_time: f64) -> Self {
        self.data.lanes[lane.index()].notes.push(NoteData {
            target_time,
            is_hold: false,
            end_time: None,
        });
        self
    }

    /// Add a sustained note.
    pub fn hold(mut self, lane: Lane, target_time: f64, end_time: f64) -> Self {
        self.data.lanes[lane.index()].notes.push(NoteData {
            target_time,
            is_hold: true,
            end_time: Some(end_time),
        });
        self
    }

    /// Add evenly spaced taps cycling through all lanes.
    pub fn stream(mut self, start: f64, interval: f64, count: usize) -> Self {
        for i in 0..count {
            let lane = Lane::all()[i % LANE_COUNT];
            self = self.tap(lane, start + interval * i as f64);
        }
        self
    }

    pub fn data(&self) -> &ChartData {
        &self.data
    }

    pub fn build(self) -> Chart {
        Chart::from_data(&self.data).expect("test chart must be valid")
    }
}

impl Default for ChartBuilder {
    fn default() -> Self {
        Self::new()
    }
}
