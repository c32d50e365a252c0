//! BLOCKFALL - a falling-block puzzle game for the terminal
//!
//! The game core is driven by elapsed time and player actions and reports
//! what changed through events; this binary wires it to crossterm input and
//! a ratatui view.

mod board;
mod game;
mod input;
mod piece;
mod randomizer;
mod score;
mod settings;
mod tetromino;
mod ui;

use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, Event, KeyEventKind, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use game::{Action, Game};
use input::InputHandler;
use ratatui::{backend::CrosstermBackend, Terminal};
use settings::Settings;
use std::{
    io::{self, stdout},
    path::PathBuf,
    time::{Duration, Instant},
};
use ui::View;

/// Get the blockfall temp directory, creating it if needed
fn blockfall_temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join("blockfall");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn main() -> Result<()> {
    // Generate session ID for this instance
    let session_id: u32 = rand::random();

    let log_dir = blockfall_temp_dir();
    let log_file = format!("{:08x}.log", session_id);

    // Setup tracing to log file
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("blockfall=debug".parse().context("invalid log directive")?),
        )
        .with_ansi(false)
        .init();

    tracing::info!(
        session = %format!("{:08x}", session_id),
        log = %log_dir.join(&log_file).display(),
        "blockfall starting up"
    );

    let settings = Settings::load_or_init();
    let game = match settings.gameplay.seed {
        Some(seed) => {
            tracing::info!(seed, "using fixed randomizer seed");
            Game::with_seed(seed)
        }
        None => Game::new(),
    };

    // Setup terminal
    enable_raw_mode().context("failed to enable raw mode")?;
    if let Err(e) = execute!(stdout(), EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e).context("failed to enter alternate screen");
    }

    // Ask for real key release events where the terminal can report them
    let enhanced_keys = supports_keyboard_enhancement().unwrap_or(false)
        && execute!(
            stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )
        .is_ok();
    tracing::debug!(enhanced_keys, "keyboard enhancement");

    let result = Terminal::new(CrosstermBackend::new(stdout()))
        .context("failed to create terminal")
        .and_then(|mut terminal| {
            terminal.clear()?;
            run_app(&mut terminal, game, &settings)
        });

    // Restore terminal before reporting anything
    if enhanced_keys {
        let _ = execute!(stdout(), PopKeyboardEnhancementFlags);
    }
    let restored = disable_raw_mode()
        .and_then(|()| execute!(stdout(), LeaveAlternateScreen))
        .context("failed to restore terminal");

    match &result {
        Ok(game) => {
            tracing::info!(score = game.score.points, "blockfall exiting");
            println!("\nThanks for playing BLOCKFALL!");
            println!("Final Score: {}", game.score.points);
            println!("Level: {} | Lines: {}", game.score.level, game.score.lines);
        }
        Err(e) => tracing::error!("{:#}", e),
    }

    result.and(restored)?;
    Ok(())
}

/// Frame loop: draw, read input, advance the game, fold events into the view
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut game: Game,
    settings: &Settings,
) -> Result<Game> {
    let frame_duration = Duration::from_micros(1_000_000 / settings.gameplay.fps.max(1));
    let mut input = InputHandler::from_settings(settings);
    let mut view = View::new();
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|frame| ui::render_game(frame, &view, settings))?;

        let mut actions = Vec::new();
        if event::poll(frame_duration)? {
            if let Event::Key(key) = event::read()? {
                match key.kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => {
                        actions.extend(input.key_down(key, Instant::now()));
                    }
                    KeyEventKind::Release => actions.extend(input.key_up(key)),
                }
            }
        }

        let now = Instant::now();
        actions.extend(input.update(now));

        for action in actions {
            game.process_action(action);
            if action == Action::Quit {
                return Ok(game);
            }
        }

        game.tick(now.duration_since(last_tick));
        last_tick = now;

        for event in game.drain_events() {
            tracing::debug!(?event, "game event");
            view.apply(event);
        }
        if !game.is_running() {
            input.clear();
        }
    }
}
