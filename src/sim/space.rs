//! Logical coordinate system of a session

use glam::IVec2;

use crate::error::ConfigError;

/// Fixed-size game space, taken from the screen once when the surface is ready
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSpace {
    width: i32,
    height: i32,
}

impl GameSpace {
    pub fn new(width: i32, height: i32) -> Result<Self, ConfigError> {
        if width <= 0 || height <= 0 {
            return Err(ConfigError::EmptyGameSpace { width, height });
        }
        Ok(Self { width, height })
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn size(&self) -> IVec2 {
        IVec2::new(self.width, self.height)
    }

    /// Radius of the session's ball (a quarter of the width)
    pub fn ball_radius(&self) -> i32 {
        self.width / 4
    }
}
