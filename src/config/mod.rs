pub mod error;
pub mod play_config;

pub use error::ConfigError;
pub use play_config::PlayConfig;
