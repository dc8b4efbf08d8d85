pub mod key_config;
pub mod key_state;
pub mod resolver;
pub mod script;

pub use key_config::KeyBindings;
pub use key_state::KeyState;
pub use resolver::{InputResolver, LaneInput};
pub use script::{KeyEvent, KeyScript};
