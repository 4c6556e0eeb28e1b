//! One game session: the ball and the score, mutated together
//!
//! The loop thread and the input thread share a session behind one lock, so a
//! tap lands either fully before or fully after a frame's update.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::ball::{Ball, BallEvent, ScoreKeeper};
use super::input::InputMapper;
use super::space::GameSpace;
use crate::error::{ConfigError, FrameError};
use crate::persistence::PersistenceStore;
use crate::platform::TouchEvent;
use crate::renderer::RenderAdapter;
use crate::score::{HIGH_SCORE_LABEL, ScoreTracker};

/// Launch RNG: fixed seed for reproducible runs, otherwise a fresh one
pub fn launch_rng(seed: Option<u64>) -> Pcg32 {
    let seed = seed.unwrap_or_else(rand::random);
    log::info!("Launch RNG seed: {}", seed);
    Pcg32::seed_from_u64(seed)
}

#[derive(Debug)]
pub struct GameSession {
    space: GameSpace,
    ball: Ball,
    score: ScoreTracker,
    input: InputMapper,
}

impl GameSession {
    /// Start a session on a ready surface. The ball's radius is a quarter of
    /// the game width and it starts at rest, bottom centre.
    pub fn new(
        space: GameSpace,
        surface: Vec2,
        fps: u32,
        store: Box<dyn PersistenceStore>,
        rng: Pcg32,
    ) -> Result<Self, ConfigError> {
        let input = InputMapper::new(surface.x, surface.y, space)?;
        let mut ball = Ball::new(space, space.ball_radius(), fps, rng)?;
        ball.reset_to_starting_position();
        log::info!(
            "Session ready: {}x{} game space, radius {}, {} fps",
            space.width(),
            space.height(),
            ball.radius(),
            fps
        );
        Ok(Self {
            space,
            ball,
            score: ScoreTracker::new(store),
            input,
        })
    }

    pub fn space(&self) -> GameSpace {
        self.space
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn ball_mut(&mut self) -> &mut Ball {
        &mut self.ball
    }

    pub fn score(&self) -> &ScoreTracker {
        &self.score
    }

    /// One physics step
    pub fn update(&mut self) -> Option<BallEvent> {
        self.ball.update(Some(&mut self.score as &mut dyn ScoreKeeper))
    }

    /// Apply a touch; only a press on the ball launches it
    pub fn handle_touch(&mut self, event: &TouchEvent) -> Option<BallEvent> {
        if !self.input.is_hit(event, &self.ball) {
            return None;
        }
        self.ball.on_tapped(&mut self.score)
    }

    /// Paint background, score, then ball
    pub fn render<C>(
        &self,
        renderer: &mut dyn RenderAdapter<C>,
        canvas: &mut C,
    ) -> Result<(), FrameError> {
        renderer.draw_background(canvas)?;
        renderer.draw_score(
            canvas,
            self.score.score(),
            self.score.high_score(),
            HIGH_SCORE_LABEL,
        )?;
        renderer.draw_ball(canvas, self.ball.pos(), self.ball.radius())
    }
}
