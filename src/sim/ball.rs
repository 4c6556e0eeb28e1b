//! Ball kinematics
//!
//! Velocities are in game pixels per frame, so one `update` is one frame of
//! direct Euler integration. Positions stay on the integer grid of the
//! [`GameSpace`]; each step truncates toward zero like an integer `+=`.

use glam::{DVec2, IVec2};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::space::GameSpace;
use crate::consts::{GRAVITY_GROWTH, MIN_VELOCITY_FRACTION, TOP_TIME_FACTOR};
use crate::error::ConfigError;

/// Receives the ball's score-relevant events
pub trait ScoreKeeper {
    /// A qualifying tap launched the ball
    fn increase_score(&mut self);
    /// The ball fell off the bottom of the game space
    fn reset_score(&mut self);
}

/// What happened to the ball during a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallEvent {
    Launched,
    GameOver,
}

/// Mutable kinematic state of the ball
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Motion {
    /// Top-left of the bounding box
    pub pos: IVec2,
    pub vel: DVec2,
    pub horizontal_deceleration: f64,
    pub gravity: f64,
}

/// Launch limits, fixed for the lifetime of a ball
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub max_horizontal_deceleration: f64,
}

impl VelocityBounds {
    /// Derive the bounds from the distance the ball may travel in a fixed
    /// number of frames (`v = 2 * d / t` from the area under a linear
    /// velocity/time graph).
    pub fn derive(space: GameSpace, radius: i32, fps: u32) -> Result<Self, ConfigError> {
        if radius <= 0 {
            return Err(ConfigError::NonPositiveRadius(radius));
        }
        let diameter = i64::from(radius) * 2;
        if diameter >= i64::from(space.width()) || diameter >= i64::from(space.height()) {
            return Err(ConfigError::BallTooLarge {
                diameter: radius.saturating_mul(2),
                width: space.width(),
                height: space.height(),
            });
        }
        if fps < 2 {
            return Err(ConfigError::FrameRateTooLow(fps));
        }

        // Half a second to cross to the side wall
        let frames_to_edge = i64::from(fps / 2);
        let max_x = (2 * (i64::from(space.width()) - i64::from(radius)) / frames_to_edge) as f64;
        if max_x <= 0.0 {
            return Err(ConfigError::DegenerateVelocity {
                axis: "horizontal",
                value: max_x,
            });
        }
        let max_horizontal_deceleration = max_x / frames_to_edge as f64;

        let frames_to_top = (TOP_TIME_FACTOR * f64::from(fps)).round() as i64;
        let max_y = (2 * (i64::from(space.height()) - diameter) / frames_to_top) as f64;
        if max_y <= 0.0 {
            return Err(ConfigError::DegenerateVelocity {
                axis: "vertical",
                value: max_y,
            });
        }

        Ok(Self {
            min_x: max_x * MIN_VELOCITY_FRACTION,
            max_x,
            min_y: max_y * MIN_VELOCITY_FRACTION,
            max_y,
            max_horizontal_deceleration,
        })
    }
}

/// The one ball of a session
#[derive(Debug, Clone)]
pub struct Ball {
    space: GameSpace,
    radius: i32,
    fps: u32,
    bounds: VelocityBounds,
    motion: Motion,
    rng: Pcg32,
}

impl Ball {
    /// Create a ball at (0, 0) drawing launches from `rng`
    pub fn new(space: GameSpace, radius: i32, fps: u32, rng: Pcg32) -> Result<Self, ConfigError> {
        let bounds = VelocityBounds::derive(space, radius, fps)?;
        log::debug!(
            "Ball bounds: x {:.2}..{:.2}, y {:.2}..{:.2}, decel <= {:.3}",
            bounds.min_x,
            bounds.max_x,
            bounds.min_y,
            bounds.max_y,
            bounds.max_horizontal_deceleration
        );
        Ok(Self {
            space,
            radius,
            fps,
            bounds,
            motion: Motion::default(),
            rng,
        })
    }

    /// Create a ball with a reproducible launch sequence
    pub fn seeded(space: GameSpace, radius: i32, fps: u32, seed: u64) -> Result<Self, ConfigError> {
        Self::new(space, radius, fps, Pcg32::seed_from_u64(seed))
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    pub fn diameter(&self) -> i32 {
        self.radius * 2
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn bounds(&self) -> &VelocityBounds {
        &self.bounds
    }

    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    pub fn set_motion(&mut self, motion: Motion) {
        self.motion = motion;
    }

    pub fn pos(&self) -> IVec2 {
        self.motion.pos
    }

    pub fn set_pos(&mut self, pos: IVec2) {
        self.motion.pos = pos;
    }

    /// Saturates at the edges of the `i32` grid
    pub fn center(&self) -> IVec2 {
        self.motion.pos.saturating_add(IVec2::splat(self.radius))
    }

    /// The canonical resting state: bottom centre, no motion
    pub fn starting_motion(&self) -> Motion {
        Motion {
            pos: IVec2::new(
                self.space.width() / 2 - self.radius,
                self.space.height() - self.diameter(),
            ),
            ..Motion::default()
        }
    }

    pub fn reset_to_starting_position(&mut self) {
        self.motion = self.starting_motion();
    }

    /// Launch the ball if it is falling or at rest. A tap on a rising ball
    /// does nothing.
    pub fn on_tapped(&mut self, keeper: &mut dyn ScoreKeeper) -> Option<BallEvent> {
        if self.motion.vel.y < 0.0 {
            return None;
        }
        keeper.increase_score();
        self.randomize_velocity();
        Some(BallEvent::Launched)
    }

    /// Draw a new upward launch within the velocity bounds
    pub fn randomize_velocity(&mut self) {
        let b = self.bounds;
        let rng = &mut self.rng;

        let mut vx = rng.random::<f64>() * (b.max_x - b.min_x) + b.min_x;
        // Negative is up
        let vy = -(rng.random::<f64>() * (b.max_y - b.min_y) + b.min_y);
        if rng.random_bool(0.5) {
            vx = -vx;
        }
        let deceleration = rng.random::<f64>() * b.max_horizontal_deceleration;

        // Up to nearly twice the base fall window
        let stretch = rng.random::<f64>() + 1.0;
        let fall_window = (f64::from(self.fps) * 2.0 * stretch).trunc();

        self.motion.vel = DVec2::new(vx, vy);
        self.motion.horizontal_deceleration = deceleration;
        self.motion.gravity = (vy / fall_window).abs();
    }

    /// Advance one frame. Game over only happens when a keeper is supplied;
    /// without one the ball keeps falling (headless physics).
    pub fn update(&mut self, keeper: Option<&mut dyn ScoreKeeper>) -> Option<BallEvent> {
        let diameter = i64::from(self.diameter());
        let width = i64::from(self.space.width());
        let m = &mut self.motion;

        // Float to int casts saturate, so a runaway velocity pins the ball to
        // the edge of the grid instead of wrapping
        m.pos.x = (f64::from(m.pos.x) + m.vel.x) as i32;
        m.pos.y = (f64::from(m.pos.y) + m.vel.y) as i32;

        // Deceleration only shrinks the magnitude, never flips the sign
        if m.vel.x > 0.0 {
            m.vel.x -= m.horizontal_deceleration;
            if m.vel.x < 0.0 {
                m.vel.x = 0.0;
            }
        } else if m.vel.x < 0.0 {
            m.vel.x += m.horizontal_deceleration;
            if m.vel.x > 0.0 {
                m.vel.x = 0.0;
            }
        }

        // Edge checks run in i64; `diameter < width` keeps the clamp in range
        if m.pos.x < 0 {
            m.pos.x = 0;
            m.vel.x = -m.vel.x;
        } else if i64::from(m.pos.x) + diameter > width {
            m.pos.x = (width - diameter) as i32;
            m.vel.x = -m.vel.x;
        }

        // Far above the screen: restart the fall so a zero gravity can't stall it
        if i64::from(m.pos.y) < -diameter * 2 {
            m.vel.y = m.gravity;
        }

        m.vel.y += m.gravity;
        m.gravity *= GRAVITY_GROWTH;

        match keeper {
            Some(keeper) if m.pos.y > self.space.height() => {
                self.reset_to_starting_position();
                keeper.reset_score();
                Some(BallEvent::GameOver)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Default)]
    struct Tally {
        increases: u32,
        resets: u32,
    }

    impl ScoreKeeper for Tally {
        fn increase_score(&mut self) {
            self.increases += 1;
        }

        fn reset_score(&mut self) {
            self.resets += 1;
        }
    }

    fn space() -> GameSpace {
        GameSpace::new(400, 800).unwrap()
    }

    fn ball(seed: u64) -> Ball {
        let mut ball = Ball::seeded(space(), 50, 60, seed).unwrap();
        ball.reset_to_starting_position();
        ball
    }

    #[test]
    fn test_bounds_reference_screen() {
        let b = VelocityBounds::derive(space(), 50, 60).unwrap();
        // 2 * (400 - 50) / 30 on the integer grid
        assert_eq!(b.max_x, 23.0);
        assert!((b.max_horizontal_deceleration - 23.0 / 30.0).abs() < 1e-12);
        // 66 frames to the top: 2 * (800 - 100) / 66
        assert_eq!(b.max_y, 21.0);
        assert_eq!(b.min_x, 17.25);
        assert_eq!(b.min_y, 15.75);
    }

    #[test]
    fn test_bounds_reject_degenerate_inputs() {
        assert_eq!(
            VelocityBounds::derive(space(), 200, 60),
            Err(ConfigError::BallTooLarge {
                diameter: 400,
                width: 400,
                height: 800
            })
        );
        assert_eq!(
            VelocityBounds::derive(space(), 0, 60),
            Err(ConfigError::NonPositiveRadius(0))
        );
        assert_eq!(
            VelocityBounds::derive(space(), 50, 1),
            Err(ConfigError::FrameRateTooLow(1))
        );

        // Fits, but can't cover a pixel per frame sideways
        let narrow = GameSpace::new(10, 100).unwrap();
        assert!(matches!(
            VelocityBounds::derive(narrow, 4, 60),
            Err(ConfigError::DegenerateVelocity {
                axis: "horizontal",
                ..
            })
        ));
    }

    #[test]
    fn test_bounds_positive_for_small_screens() {
        let b = VelocityBounds::derive(GameSpace::new(128, 128).unwrap(), 1, 4).unwrap();
        assert_eq!(b.max_x, 127.0);
        assert_eq!(b.max_y, 63.0);
        assert!(b.min_x > 0.0 && b.min_y > 0.0);
    }

    #[test]
    fn test_reset_is_bottom_centre_at_rest() {
        let mut b = ball(1);
        b.randomize_velocity();
        b.update(None);
        b.reset_to_starting_position();

        let m = b.motion();
        assert_eq!(m.pos, IVec2::new(150, 700));
        assert_eq!(m.vel, DVec2::ZERO);
        assert_eq!(m.horizontal_deceleration, 0.0);
        assert_eq!(m.gravity, 0.0);
        assert_eq!(b.center(), IVec2::new(200, 750));
    }

    #[test]
    fn test_tap_launches_resting_ball() {
        let mut b = ball(7);
        let mut tally = Tally::default();

        assert_eq!(b.on_tapped(&mut tally), Some(BallEvent::Launched));
        assert_eq!(tally.increases, 1);

        let m = *b.motion();
        let bounds = *b.bounds();
        assert!(m.vel.y <= -bounds.min_y && m.vel.y >= -bounds.max_y);
        assert!(m.vel.x.abs() >= bounds.min_x && m.vel.x.abs() <= bounds.max_x);
        assert!(m.horizontal_deceleration >= 0.0);
        assert!(m.horizontal_deceleration <= bounds.max_horizontal_deceleration);
        assert!(m.gravity > 0.0);
    }

    #[test]
    fn test_tap_on_rising_ball_is_ignored() {
        let mut b = ball(7);
        let mut tally = Tally::default();
        b.on_tapped(&mut tally);
        let launched = *b.motion();

        assert_eq!(b.on_tapped(&mut tally), None);
        assert_eq!(tally.increases, 1);
        assert_eq!(*b.motion(), launched);
    }

    #[test]
    fn test_same_seed_same_launch() {
        let mut a = ball(42);
        let mut b = ball(42);
        a.randomize_velocity();
        b.randomize_velocity();
        assert_eq!(a.motion(), b.motion());
    }

    #[test]
    fn test_gravity_window_bounds() {
        let mut b = ball(3);
        for _ in 0..200 {
            b.randomize_velocity();
            let m = b.motion();
            // Fall window lies in [2F, 4F)
            let window = m.vel.y.abs() / m.gravity;
            assert!((120.0..240.0).contains(&window.round()), "window {window}");
        }
    }

    #[test]
    fn test_bounce_off_left_wall() {
        let mut b = ball(0);
        b.set_motion(Motion {
            pos: IVec2::new(5, 300),
            vel: DVec2::new(-20.0, 0.0),
            ..Motion::default()
        });
        b.update(None);
        assert_eq!(b.pos().x, 0);
        assert_eq!(b.motion().vel.x, 20.0);
    }

    #[test]
    fn test_bounce_off_right_wall() {
        let mut b = ball(0);
        b.set_motion(Motion {
            pos: IVec2::new(290, 300),
            vel: DVec2::new(20.0, 0.0),
            horizontal_deceleration: 1.5,
            gravity: 0.0,
        });
        b.update(None);
        assert_eq!(b.pos().x, 300);
        assert_eq!(b.motion().vel.x, -18.5);
    }

    #[test]
    fn test_deceleration_stops_at_zero() {
        let mut b = ball(0);
        b.set_motion(Motion {
            pos: IVec2::new(150, 300),
            vel: DVec2::new(-0.5, 0.0),
            horizontal_deceleration: 2.0,
            gravity: 0.0,
        });
        b.update(None);
        assert_eq!(b.motion().vel.x, 0.0);
        b.update(None);
        assert_eq!(b.motion().vel.x, 0.0);
    }

    #[test]
    fn test_ceiling_guard_restarts_fall() {
        let mut b = ball(0);
        b.set_motion(Motion {
            pos: IVec2::new(150, -250),
            vel: DVec2::new(0.0, -10.0),
            horizontal_deceleration: 0.0,
            gravity: 0.5,
        });
        b.update(None);
        // Set to gravity, then gravity added on top
        assert_eq!(b.motion().vel.y, 1.0);
        assert!((b.motion().gravity - 0.535).abs() < 1e-12);
    }

    #[test]
    fn test_gravity_escalates_each_frame() {
        let mut b = ball(0);
        b.set_motion(Motion {
            pos: IVec2::new(150, 100),
            gravity: 1.0,
            ..Motion::default()
        });
        b.update(None);
        b.update(None);
        let m = b.motion();
        assert!((m.vel.y - 2.07).abs() < 1e-12);
        assert!((m.gravity - 1.07 * 1.07).abs() < 1e-12);
    }

    #[test]
    fn test_game_over_resets_ball_and_score() {
        let mut b = ball(9);
        let mut tally = Tally::default();
        b.set_motion(Motion {
            pos: IVec2::new(40, 795),
            vel: DVec2::new(3.0, 10.0),
            horizontal_deceleration: 0.1,
            gravity: 2.0,
        });

        assert_eq!(b.update(Some(&mut tally)), Some(BallEvent::GameOver));
        assert_eq!(tally.resets, 1);

        let mut fresh = ball(9);
        fresh.reset_to_starting_position();
        assert_eq!(b.motion(), fresh.motion());
    }

    #[test]
    fn test_no_game_over_without_keeper() {
        let mut b = ball(9);
        b.set_motion(Motion {
            pos: IVec2::new(40, 795),
            vel: DVec2::new(0.0, 10.0),
            ..Motion::default()
        });
        assert_eq!(b.update(None), None);
        assert_eq!(b.pos().y, 805);
    }

    #[test]
    fn test_huge_space_update_stays_on_grid() {
        let huge = GameSpace::new(2_000_000_000, 2_000_000_000).unwrap();
        for seed in 0..32 {
            let mut b = Ball::seeded(huge, 500_000_000, 2, seed).unwrap();
            b.reset_to_starting_position();
            b.randomize_velocity();
            for _ in 0..40 {
                b.update(None);
                assert!(b.pos().x >= 0 && b.pos().x <= 1_000_000_000, "x {}", b.pos().x);
                let c = b.center();
                assert!(c.x >= b.pos().x && c.y >= b.pos().y);
            }
        }
    }

    #[test]
    fn test_center_saturates_at_grid_edge() {
        let mut b = ball(0);
        b.set_pos(IVec2::new(i32::MAX - 10, i32::MAX));
        assert_eq!(b.center(), IVec2::splat(i32::MAX));
    }

    #[test]
    fn test_launch_with_extreme_frame_rate() {
        let space = GameSpace::new(2_100_000_000, 2_100_000_000).unwrap();
        let mut b = Ball::seeded(space, 1, 3_000_000_000, 5).unwrap();
        b.reset_to_starting_position();
        b.randomize_velocity();

        let m = b.motion();
        assert!(m.gravity.is_finite() && m.gravity > 0.0);
        let window = m.vel.y.abs() / m.gravity;
        assert!(window >= 6.0e9 * 0.999 && window < 1.2e10, "window {window}");
    }

    proptest! {
        #[test]
        fn prop_launch_moves_both_axes(seed in any::<u64>()) {
            let mut b = ball(seed);
            let before = b.pos();
            b.randomize_velocity();
            b.update(None);
            prop_assert_ne!(b.pos().x, before.x);
            prop_assert_ne!(b.pos().y, before.y);
        }

        #[test]
        fn prop_wall_clamp_keeps_ball_inside(seed in any::<u64>(), frames in 1usize..120) {
            let mut b = ball(seed);
            b.randomize_velocity();
            for _ in 0..frames {
                b.update(None);
                prop_assert!(b.pos().x >= 0 && b.pos().x <= 300);
            }
        }
    }
}
