//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - One fixed step per frame, velocities in pixels per frame
//! - Seeded RNG only, owned by the ball
//! - No rendering or platform dependencies beyond the draw contract

pub mod ball;
pub mod input;
pub mod session;
pub mod space;

pub use ball::{Ball, BallEvent, Motion, ScoreKeeper, VelocityBounds};
pub use input::InputMapper;
pub use session::{GameSession, launch_rng};
pub use space::GameSpace;
