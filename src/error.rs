//! Error types
//!
//! Only construction-time and loading failures are errors. Everything that
//! happens inside a simulation step is handled locally (epsilon floors,
//! silent capacity drops, non-collidable guards).

use thiserror::Error;

/// Errors raised while building a [`Timeline`](crate::sim::Timeline)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimelineError {
    /// A timeline needs at least one keyframe
    #[error("timeline requires at least one keyframe")]
    Empty,

    /// Keyframe timestamps must be finite to be ordered
    #[error("keyframe timestamp {0} is not finite")]
    NonFiniteTimestamp(f32),
}

/// Errors raised while loading or validating [`Settings`](crate::Settings)
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Filesystem I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Parsed fine but a value is out of range
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Errors raised while building a [`Scene`](crate::scene::Scene)
#[derive(Error, Debug)]
pub enum SceneError {
    /// Settings failed validation
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A built-in timeline was malformed
    #[error(transparent)]
    Timeline(#[from] TimelineError),
}
