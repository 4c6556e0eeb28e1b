//! Inoball headless host
//!
//! Runs the game loop against a terminal surface. With `--autoplay` a bot
//! taps the ball whenever it rests or falls in the lower half of the screen.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use glam::Vec2;

use inoball::game_loop::InputHandle;
use inoball::persistence::JsonFileStore;
use inoball::platform::{Paced, TouchEvent};
use inoball::renderer::{AsciiRenderer, AsciiSurface};
use inoball::sim::{BallEvent, GameSession, GameSpace, launch_rng};
use inoball::{ConfigError, GameLoop, Settings};

#[derive(Parser)]
#[command(about, long_about = None)]
struct Cli {
    /// Game space width in pixels
    #[arg(long, default_value_t = 400)]
    width: i32,

    /// Game space height in pixels
    #[arg(long, default_value_t = 800)]
    height: i32,

    /// Seconds to run before stopping
    #[arg(long, short, default_value_t = 10)]
    seconds: u64,

    /// Settings file (JSON)
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Let a bot tap the ball
    #[arg(long)]
    autoplay: bool,

    /// Print every Nth frame to stdout (0 prints nothing)
    #[arg(long, default_value_t = 0)]
    draw_every: u64,

    /// Terminal columns used for drawing
    #[arg(long, default_value_t = 20)]
    cols: usize,

    /// Terminal rows used for drawing
    #[arg(long, default_value_t = 30)]
    rows: usize,
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Inoball (headless) starting...");

    let cli = Cli::parse();
    let settings = cli.settings.as_ref().map(Settings::load).unwrap_or_default();

    match run(&cli, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Cannot start game: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, settings: &Settings) -> Result<(), ConfigError> {
    let space = GameSpace::new(cli.width, cli.height)?;
    let store = JsonFileStore::open(&settings.high_score_path);
    let session = GameSession::new(
        space,
        space.size().as_vec2(),
        settings.target_fps,
        Box::new(store),
        launch_rng(settings.seed),
    )?;

    let renderer = AsciiRenderer::new(space, cli.cols, cli.rows, space.ball_radius());
    let surface = AsciiSurface::new(Box::new(io::stdout()), cli.cols, cli.rows, cli.draw_every);
    let surface = Paced::new(surface, settings.target_fps);

    let mut game = GameLoop::new(session, surface, renderer, settings.target_fps, settings.log_fps);
    let input = game.input();
    game.start();

    let deadline = Instant::now() + Duration::from_secs(cli.seconds);
    let mut launches = 0u32;
    while Instant::now() < deadline {
        if cli.autoplay && autoplay_tap(&input, space) == Some(BallEvent::Launched) {
            launches += 1;
        }
        thread::sleep(Duration::from_millis(10));
    }

    game.stop();
    let (score, high_score) = input.peek(|s| (s.score().score(), s.score().high_score()));
    log::info!(
        "Stopped after {}s: score {}, high score {}, {} launches",
        cli.seconds,
        score,
        high_score,
        launches
    );
    Ok(())
}

/// Tap the ball's centre when it rests or falls through the lower half
fn autoplay_tap(input: &InputHandle, space: GameSpace) -> Option<BallEvent> {
    let (center, falling) = input.peek(|s| (s.ball().center(), s.ball().motion().vel.y >= 0.0));
    if !falling || center.y < space.height() / 2 {
        return None;
    }
    let tap = center.as_vec2() + Vec2::splat(0.5);
    input.handle_touch(&TouchEvent::began(tap.x, tap.y))
}
