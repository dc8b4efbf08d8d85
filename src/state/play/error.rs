use thiserror::Error;

use crate::config::ConfigError;
use crate::model::ChartError;

/// Reasons a session refuses to start.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Unplayable chart: {0}")]
    Chart(#[from] ChartError),

    #[error("Invalid play config: {0}")]
    Config(#[from] ConfigError),
}
