//! Inoball - tap the ball, keep it in the air
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ball kinematics, tap hit test, session)
//! - `game_loop`: Fixed-step update/render loop on its own thread
//! - `renderer`: Draw contract and a character-grid renderer
//! - `platform`: Drawing surface and touch abstractions
//! - `persistence`: Named-integer stores for the high score
//! - `score`: Current score and high score

pub mod error;
pub mod game_loop;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod score;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, FrameError, PersistenceError};
pub use game_loop::{GameLoop, InputHandle, LoopState};
pub use score::ScoreTracker;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Frames per second the physics is tuned for
    pub const TARGET_FPS: u32 = 60;

    /// Gravity is multiplied by this every frame (the fall keeps speeding up)
    pub const GRAVITY_GROWTH: f64 = 1.07;
    /// Launch speeds are drawn from [fraction * max, max]
    pub const MIN_VELOCITY_FRACTION: f64 = 0.75;
    /// Seconds-per-FPS factor for reaching the top of the screen
    pub const TOP_TIME_FACTOR: f64 = 1.1;

    /// Store key of the high score
    pub const HIGH_SCORE_KEY: &str = "HIGH_SCORE_KEY";
}
