//! Update/render loop
//!
//! The loop runs on its own thread, as fast as the surface hands out
//! canvases. Each frame: lock a canvas, step the session once, paint it,
//! post the canvas. The session lock is held for the whole step + paint, and
//! the input path takes the same lock, so taps never interleave with a frame.

mod clock;

pub use clock::{FrameClock, FrameStats, nanos_to_millis};

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::error::FrameError;
use crate::platform::{self, DrawSurface, TouchEvent};
use crate::renderer::RenderAdapter;
use crate::sim::{BallEvent, GameSession};

/// Loop lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
}

/// Lock the session, recovering it if a previous holder panicked. The
/// session is plain data and stays usable.
pub fn lock_session(session: &Mutex<GameSession>) -> MutexGuard<'_, GameSession> {
    session.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
        log::warn!("Session lock was poisoned, recovering");
        poisoned.into_inner()
    })
}

/// Input side of a running game, safe to use from any thread
#[derive(Debug, Clone)]
pub struct InputHandle {
    session: Arc<Mutex<GameSession>>,
}

impl InputHandle {
    pub fn handle_touch(&self, event: &TouchEvent) -> Option<BallEvent> {
        let outcome = lock_session(&self.session).handle_touch(event);
        if outcome.is_some() {
            log::trace!("Tap at ({:.0}, {:.0}) launched the ball", event.pos.x, event.pos.y);
        }
        outcome
    }

    /// Read the session under the frame lock
    pub fn peek<T>(&self, f: impl FnOnce(&GameSession) -> T) -> T {
        f(&lock_session(&self.session))
    }
}

/// Runs a [`GameSession`] against a drawing surface
pub struct GameLoop<S, R>
where
    S: DrawSurface + 'static,
    R: RenderAdapter<S::Canvas> + 'static,
{
    session: Arc<Mutex<GameSession>>,
    running: Arc<AtomicBool>,
    /// Surface and renderer while stopped; the loop thread owns them while running
    parts: Option<(S, R)>,
    handle: Option<JoinHandle<(S, R)>>,
    fps_window: u32,
    log_fps: bool,
}

impl<S, R> GameLoop<S, R>
where
    S: DrawSurface + 'static,
    R: RenderAdapter<S::Canvas> + 'static,
{
    /// `fps_window` is the target frame rate; FPS is averaged over that many frames
    pub fn new(
        session: GameSession,
        surface: S,
        renderer: R,
        fps_window: u32,
        log_fps: bool,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            running: Arc::new(AtomicBool::new(false)),
            parts: Some((surface, renderer)),
            handle: None,
            fps_window,
            log_fps,
        }
    }

    pub fn state(&self) -> LoopState {
        if self.handle.is_some() {
            LoopState::Running
        } else {
            LoopState::Stopped
        }
    }

    pub fn input(&self) -> InputHandle {
        InputHandle {
            session: Arc::clone(&self.session),
        }
    }

    pub fn handle_touch(&self, event: &TouchEvent) -> Option<BallEvent> {
        lock_session(&self.session).handle_touch(event)
    }

    /// Surface and renderer, available while stopped
    pub fn parts(&self) -> Option<&(S, R)> {
        self.parts.as_ref()
    }

    /// Start the loop thread. Returns false if it was already running or
    /// could not be started.
    pub fn start(&mut self) -> bool {
        if self.handle.is_some() {
            return false;
        }
        let Some((mut surface, mut renderer)) = self.parts.take() else {
            log::error!("Game loop lost its surface, cannot start");
            return false;
        };

        self.running.store(true, Ordering::Release);
        let running = Arc::clone(&self.running);
        let session = Arc::clone(&self.session);
        let mut clock = FrameClock::new(self.fps_window);
        let log_fps = self.log_fps;

        let spawned = thread::Builder::new()
            .name("game-loop".into())
            .spawn(move || {
                log::info!("Game loop running");
                while running.load(Ordering::Acquire) {
                    let started = Instant::now();
                    match run_frame(&mut surface, &mut renderer, &session) {
                        Ok(true) => {}
                        Ok(false) => thread::yield_now(),
                        Err(e) => log::warn!("Frame skipped: {}", e),
                    }
                    if let Some(stats) = clock.record(started.elapsed()) {
                        if log_fps {
                            log::debug!(
                                "Average FPS: {:.1} ({} ms/frame)",
                                stats.average_fps,
                                stats.millis_per_frame
                            );
                        }
                    }
                }
                log::info!("Game loop stopped");
                (surface, renderer)
            });

        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                true
            }
            Err(e) => {
                self.running.store(false, Ordering::Release);
                log::error!("Failed to spawn game loop thread: {}", e);
                false
            }
        }
    }

    /// Stop the loop and wait for its thread to exit. Safe to call when
    /// already stopped.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        let Some(handle) = self.handle.take() else {
            return;
        };
        match handle.join() {
            Ok(parts) => self.parts = Some(parts),
            Err(_) => log::error!("Game loop thread panicked; surface is gone"),
        }
    }
}

impl<S, R> Drop for GameLoop<S, R>
where
    S: DrawSurface + 'static,
    R: RenderAdapter<S::Canvas> + 'static,
{
    fn drop(&mut self) {
        self.stop();
    }
}

/// One frame. `Ok(false)` when no canvas was available.
fn run_frame<S, R>(
    surface: &mut S,
    renderer: &mut R,
    session: &Mutex<GameSession>,
) -> Result<bool, FrameError>
where
    S: DrawSurface,
    R: RenderAdapter<S::Canvas>,
{
    let drawn = platform::draw_frame(surface, |canvas| {
        let mut session = lock_session(session);
        // Caught inside the lock scope so a bad frame can't poison the session
        let frame = panic::catch_unwind(AssertUnwindSafe(|| {
            session.update();
            session.render(&mut *renderer, canvas)
        }));
        match frame {
            Ok(result) => result,
            Err(payload) => Err(FrameError::Panic(panic_message(payload.as_ref()))),
        }
    });
    match drawn {
        Some(result) => result.map(|()| true),
        None => Ok(false),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
