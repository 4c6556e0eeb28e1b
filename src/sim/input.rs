//! Tap mapping and ball hit test

use glam::{IVec2, Vec2};

use super::ball::Ball;
use super::space::GameSpace;
use crate::error::ConfigError;
use crate::platform::TouchEvent;

/// Converts surface-pixel taps into game space and tests them against the ball
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputMapper {
    surface: Vec2,
    space: GameSpace,
}

impl InputMapper {
    pub fn new(surface_width: f32, surface_height: f32, space: GameSpace) -> Result<Self, ConfigError> {
        if !(surface_width > 0.0 && surface_height > 0.0) {
            return Err(ConfigError::EmptySurface {
                width: surface_width,
                height: surface_height,
            });
        }
        Ok(Self {
            surface: Vec2::new(surface_width, surface_height),
            space,
        })
    }

    /// Mapper for a surface that matches the game space pixel for pixel
    pub fn identity(space: GameSpace) -> Self {
        Self {
            surface: space.size().as_vec2(),
            space,
        }
    }

    /// Scale a surface point into game space (truncated onto the grid)
    pub fn to_game_space(&self, raw: Vec2) -> IVec2 {
        let scale = self.space.size().as_vec2() / self.surface;
        (raw * scale).as_ivec2()
    }

    /// Is the game-space point inside or on the ball's circle?
    pub fn hit_test(point: IVec2, ball: &Ball) -> bool {
        let offset = point.as_dvec2() - ball.center().as_dvec2();
        offset.length() <= f64::from(ball.radius())
    }

    pub fn map_and_hit_test(&self, raw: Vec2, ball: &Ball) -> bool {
        Self::hit_test(self.to_game_space(raw), ball)
    }

    /// Hit test a touch event; anything but the initial press is ignored
    pub fn is_hit(&self, event: &TouchEvent, ball: &Ball) -> bool {
        event.is_press() && self.map_and_hit_test(event.pos, ball)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::TouchPhase;

    fn resting_ball() -> Ball {
        let space = GameSpace::new(400, 800).unwrap();
        let mut ball = Ball::seeded(space, 100, 60, 0).unwrap();
        ball.reset_to_starting_position();
        ball
    }

    #[test]
    fn test_identity_mapping() {
        let space = GameSpace::new(400, 800).unwrap();
        let mapper = InputMapper::identity(space);
        assert_eq!(mapper.to_game_space(Vec2::new(123.9, 456.2)), IVec2::new(123, 456));
    }

    #[test]
    fn test_scales_half_resolution_surface() {
        let space = GameSpace::new(400, 800).unwrap();
        let mapper = InputMapper::new(200.0, 400.0, space).unwrap();
        assert_eq!(mapper.to_game_space(Vec2::new(100.0, 350.0)), IVec2::new(200, 700));
    }

    #[test]
    fn test_rejects_empty_surface() {
        let space = GameSpace::new(400, 800).unwrap();
        assert!(InputMapper::new(0.0, 400.0, space).is_err());
        assert!(InputMapper::new(200.0, f32::NAN, space).is_err());
    }

    #[test]
    fn test_hit_on_edge_and_miss_outside() {
        // Ball centre (200, 700), radius 100
        let ball = resting_ball();
        assert!(InputMapper::hit_test(IVec2::new(200, 700), &ball));
        assert!(InputMapper::hit_test(IVec2::new(300, 700), &ball));
        assert!(InputMapper::hit_test(IVec2::new(200, 600), &ball));
        assert!(!InputMapper::hit_test(IVec2::new(301, 700), &ball));
        assert!(!InputMapper::hit_test(IVec2::new(275, 775), &ball));
    }

    #[test]
    fn test_scaled_tap_hits_ball() {
        let space = GameSpace::new(400, 800).unwrap();
        let mapper = InputMapper::new(200.0, 400.0, space).unwrap();
        let ball = resting_ball();
        assert!(mapper.map_and_hit_test(Vec2::new(100.0, 350.0), &ball));
        assert!(!mapper.map_and_hit_test(Vec2::new(10.0, 10.0), &ball));
    }

    #[test]
    fn test_only_presses_hit() {
        let ball = resting_ball();
        let mapper = InputMapper::identity(GameSpace::new(400, 800).unwrap());
        let drag = TouchEvent {
            pos: Vec2::new(200.0, 700.0),
            phase: TouchPhase::Moved,
        };
        assert!(!mapper.is_hit(&drag, &ball));
        assert!(mapper.is_hit(&TouchEvent::began(200.0, 700.0), &ball));
    }
}
