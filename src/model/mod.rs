pub mod chart;
pub mod error;
pub mod note;
pub mod timeline;

pub use chart::{Chart, ChartData, LaneData, NoteData};
pub use error::ChartError;
pub use note::{LANE_COUNT, Lane, NoteSpec};
pub use timeline::{ScheduledSpawn, SpawnSchedule, Timeline, TimelineEntry};
