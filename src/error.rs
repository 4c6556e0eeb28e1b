//! Error kinds
//!
//! Only [`ConfigError`] is fatal. Frame and persistence errors are logged by
//! whoever receives them and the game keeps running.

use thiserror::Error;

/// Degenerate construction parameters; the game cannot start
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("game space must be positive, got {width}x{height}")]
    EmptyGameSpace { width: i32, height: i32 },

    #[error("input surface must be positive, got {width}x{height}")]
    EmptySurface { width: f32, height: f32 },

    #[error("ball radius must be positive, got {0}")]
    NonPositiveRadius(i32),

    #[error("ball diameter {diameter} does not fit inside {width}x{height}")]
    BallTooLarge {
        diameter: i32,
        width: i32,
        height: i32,
    },

    #[error("target frame rate must be at least 2, got {0}")]
    FrameRateTooLow(u32),

    #[error("derived {axis} velocity bound is not positive ({value})")]
    DegenerateVelocity { axis: &'static str, value: f64 },
}

/// Failure during a single update/render cycle; the frame is skipped
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("render failed: {0}")]
    Render(String),

    #[error("failed to post canvas: {0}")]
    Post(String),

    #[error("frame panicked: {0}")]
    Panic(String),
}

/// High score store failure; gameplay is unaffected
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}
