pub mod judge;
pub mod play_result;
pub mod score;

pub use judge::{JudgeWindow, JudgeWindowBuilder, Tier, TimingDirection, TimingStats};
pub use play_result::{Grade, PlayResult};
pub use score::SessionStats;
