//! Platform abstraction layer
//!
//! The host owns the window and the real drawing surface. The core sees:
//! - a [`DrawSurface`] it can lock for exactly one frame ([`draw_frame`])
//! - [`TouchEvent`]s delivered from the host's input thread

use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::{Duration, Instant};

use glam::Vec2;

use crate::error::FrameError;

/// Gesture phase of a touch event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Began,
    Moved,
    Ended,
    Cancelled,
}

/// A raw touch in surface pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub pos: Vec2,
    pub phase: TouchPhase,
}

impl TouchEvent {
    pub fn began(x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            phase: TouchPhase::Began,
        }
    }

    /// Only the press that starts a gesture can hit the ball
    pub fn is_press(&self) -> bool {
        self.phase == TouchPhase::Began
    }
}

/// A drawing surface that hands out one canvas per frame
pub trait DrawSurface: Send {
    type Canvas;

    /// Lock the surface for drawing. `None` means the surface is not
    /// available right now and the frame should be skipped.
    fn lock_canvas(&mut self) -> Option<Self::Canvas>;

    /// Release the canvas and present what was drawn on it
    fn unlock_and_post(&mut self, canvas: Self::Canvas) -> Result<(), FrameError>;
}

/// Lock a canvas, draw one frame on it, and post it. The canvas is posted on
/// every exit path: a draw error is returned after posting, a panic is
/// resumed after posting. `None` means no canvas was available.
pub fn draw_frame<S, T>(
    surface: &mut S,
    frame: impl FnOnce(&mut S::Canvas) -> Result<T, FrameError>,
) -> Option<Result<T, FrameError>>
where
    S: DrawSurface,
{
    let mut canvas = surface.lock_canvas()?;
    let drawn = panic::catch_unwind(AssertUnwindSafe(|| frame(&mut canvas)));
    let posted = surface.unlock_and_post(canvas);

    let drawn = match drawn {
        Ok(drawn) => drawn,
        Err(payload) => {
            if let Err(e) = posted {
                log::warn!("Canvas post failed: {}", e);
            }
            panic::resume_unwind(payload)
        }
    };
    Some(match (drawn, posted) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(post)) => {
            log::warn!("Canvas post failed: {}", post);
            Err(e)
        }
    })
}

/// Holds `lock_canvas` back to one canvas per frame slot, the way a display
/// surface blocks until the next vsync
pub struct Paced<S> {
    inner: S,
    frame: Duration,
    next: Option<Instant>,
}

impl<S: DrawSurface> Paced<S> {
    pub fn new(inner: S, fps: u32) -> Self {
        Self {
            inner,
            frame: Duration::from_secs(1) / fps.max(1),
            next: None,
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: DrawSurface> DrawSurface for Paced<S> {
    type Canvas = S::Canvas;

    fn lock_canvas(&mut self) -> Option<Self::Canvas> {
        let now = Instant::now();
        let due = self.next.unwrap_or(now);
        if due > now {
            thread::sleep(due - now);
        }
        // Late frames don't accumulate debt
        self.next = Some(due.max(now) + self.frame);
        self.inner.lock_canvas()
    }

    fn unlock_and_post(&mut self, canvas: Self::Canvas) -> Result<(), FrameError> {
        self.inner.unlock_and_post(canvas)
    }
}
