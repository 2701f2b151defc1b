use std::io::{self, Write};
use std::time::{Duration, Instant};
use crossterm::{
    terminal::{enable_raw_mode, disable_raw_mode, size, EnterAlternateScreen, LeaveAlternateScreen},
    cursor::{Hide, Show},
    event::{KeyboardEnhancementFlags, PushKeyboardEnhancementFlags, PopKeyboardEnhancementFlags},
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use log::{info, warn, error};
use std::env;

mod audio;
mod collision;
mod config;
mod constants;
mod entities;
mod game;
mod input;
mod presentation;
mod rendering;
mod state;
mod terminal_io;
mod types;

use audio::{RecordingAudio, TerminalAudio};
use config::{Config, DebugRun};
use game::Game;
use rendering::{OutputTarget, ScreenBuffer, TerminalPresenter};
use terminal_io::{HostCommand, KeyboardDriver, SimulatedInput};

const FRAME_TIMEOUT: Duration = Duration::from_millis(16);
const DEBUG_FRAME_MS: f64 = 1000.0 / 60.0;
const DEBUG_LOG_EVERY: u64 = 60;

fn main() -> io::Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let config = Config::from_args(&args);

    simple_logging::log_to_file(&config.log_file, config.log_level)?;
    info!("Starting torus-asteroids with {:?}", config);

    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut game = Game::new(rng);

    let result = match config.debug {
        Some(run) => run_headless(&mut game, run),
        None => run_interactive(&mut game, &config),
    };

    match &result {
        Ok(()) => info!("Exiting with final score {}", game.state.score),
        Err(e) => error!("Exiting after error: {}", e),
    }
    result
}

/// Scripted run into a screen buffer, dumped to the log.
fn run_headless(game: &mut Game<StdRng>, run: DebugRun) -> io::Result<()> {
    info!("Debug mode: {}x{} for {} frames", run.width, run.height, run.frames);
    let out = OutputTarget::ScreenBuffer(ScreenBuffer::new(run.width, run.height));
    let mut presenter = TerminalPresenter::new(out, run.width, run.height, RecordingAudio::default())
        .with_log_every(DEBUG_LOG_EVERY);
    let mut script = SimulatedInput::demo();
    let mut keyboard = KeyboardDriver::new();
    let start = Instant::now();

    for frame_count in 0..run.frames {
        for event in script.poll(frame_count) {
            keyboard.apply(event, &mut game.input, start);
        }
        game.frame(frame_count as f64 * DEBUG_FRAME_MS, &mut presenter)?;
    }

    info!("Debug run played {} sound cues", presenter.audio().played.len());
    Ok(())
}

fn run_interactive(game: &mut Game<StdRng>, config: &Config) -> io::Result<()> {
    info!("Attempting to enable raw mode.");
    enable_raw_mode().map_err(|e| { error!("Failed to enable raw mode: {}", e); e })?;

    let result = play(game, config);
    if let Err(e) = &result {
        error!("Game loop failed: {}", e);
    }

    let mut stdout = io::stdout();
    if let Err(e) = crossterm::execute!(stdout, PopKeyboardEnhancementFlags, Show, LeaveAlternateScreen) {
        warn!("Failed to restore terminal screen: {}", e);
    }
    let restored = disable_raw_mode().map_err(|e| { error!("Failed to disable raw mode: {}", e); e });
    if restored.is_ok() {
        info!("Raw mode disabled.");
    }
    first_error(result, restored)
}

/// The game loop's error wins over a teardown error.
fn first_error(result: io::Result<()>, teardown: io::Result<()>) -> io::Result<()> {
    result.and(teardown)
}

fn play(game: &mut Game<StdRng>, config: &Config) -> io::Result<()> {
    let (width, height) = size().map_err(|e| { error!("Failed to get terminal size: {}", e); e })?;
    info!("Terminal size: {}x{}", width, height);

    let mut out = OutputTarget::Stdout(io::stdout());
    out.execute_other_command(EnterAlternateScreen)
        .map_err(|e| { error!("Failed to enter alternate screen: {}", e); e })?;
    out.execute_other_command(Hide).map_err(|e| { error!("Failed to hide cursor: {}", e); e })?;
    // Only some terminals honour this; the keyboard driver copes either way
    if let Err(e) = out.execute_other_command(PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)) {
        warn!("Keyboard enhancement unavailable: {}", e);
    }
    out.flush()?;

    let mut presenter = TerminalPresenter::new(out, width, height, TerminalAudio::new(config.muted));
    let mut keyboard = KeyboardDriver::new();
    let start = Instant::now();
    let mut frame_count: u64 = 0;

    while config.max_frames.is_none_or(|max| frame_count < max) {
        match keyboard.poll(&mut game.input, FRAME_TIMEOUT)? {
            HostCommand::Quit => {
                info!("Quit requested at frame {}", frame_count);
                break;
            }
            HostCommand::Resize(w, h) => {
                presenter.output().execute_other_command(crossterm::terminal::Clear(crossterm::terminal::ClearType::All))?;
                presenter.resize(w, h);
            }
            HostCommand::Continue => {}
        }

        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        game.frame(elapsed_ms, &mut presenter)?;
        frame_count += 1;
    }

    Ok(())
}
