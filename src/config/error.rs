use thiserror::Error;

/// Invalid play or key configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Judge windows must satisfy 0 < perfect < good < bad (got {perfect}/{good}/{bad} ms)")]
    WindowOrder { perfect: f64, good: f64, bad: f64 },

    #[error("{field} must be positive")]
    NonPositive { field: &'static str },

    #[error("Key {key:?} is bound to more than one lane")]
    DuplicateKey { key: String },

    #[error("No key bound to lane {lane}")]
    EmptyKey { lane: usize },
}
