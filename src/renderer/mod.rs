//! Rendering contract
//!
//! The core paints each frame in a fixed order, later calls on top:
//! background, score, ball.

pub mod ascii;

pub use ascii::{AsciiRenderer, AsciiSurface, CharCanvas};

use glam::IVec2;

use crate::error::FrameError;

/// Draws the game onto a host canvas of type `C`
pub trait RenderAdapter<C>: Send {
    fn draw_background(&mut self, canvas: &mut C) -> Result<(), FrameError>;

    fn draw_score(
        &mut self,
        canvas: &mut C,
        score: u32,
        high_score: u32,
        label: &str,
    ) -> Result<(), FrameError>;

    /// `pos` is the top-left of the ball's bounding box in game space
    fn draw_ball(&mut self, canvas: &mut C, pos: IVec2, radius: i32) -> Result<(), FrameError>;
}
