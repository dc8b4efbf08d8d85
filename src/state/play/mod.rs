mod autoplay;
mod error;
mod lifecycle;
mod play_state;
mod snapshot;
mod timer_manager;

pub use autoplay::AutoplayAgent;
pub use error::SessionError;
pub use lifecycle::{ActiveHold, HitOutcome, NoteField, NoteId, RuntimeNote};
pub use play_state::{PlayEvent, Session, SessionPhase};
pub use snapshot::{LaneView, NoteView, PlaySnapshot};
pub use timer_manager::{LaneFeedback, TimerManager};
