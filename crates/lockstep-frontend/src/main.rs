//! Lockstep terminal frontend
//!
//! Runs a built-in deterministic engine through the lockstep scheduler.
//! - `-L paddles match.ron` plays alone
//! - `--listen` / `--join` plays against a peer; both sides only exchange input
//! - Space pauses, F1 opens the menu, Esc quits

mod app;
mod cli;
mod config;
mod engines;
mod keyboard;
mod render;

use app::{App, Launch};
use clap::Parser;
use cli::Args;
use config::Config;
use crossterm::{
    cursor::{Hide, Show},
    event::{
        self, Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use keyboard::KeyboardInput;
use std::io::{stdout, Stdout};
use std::time::{Duration, Instant};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Longest wait for terminal input per frame
const INPUT_WAIT: Duration = Duration::from_millis(4);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = Config::load_or_default(args.config.as_deref());
    if let Some(addr) = args.addr {
        config.netplay.addr = addr;
    }
    let launch = Launch {
        engine: args.engine.clone(),
        content: args.content.clone(),
        role: args.role(),
        record: args.record.clone(),
    };

    // Initialize terminal
    terminal::enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, Hide)?;
    let release_events = terminal::supports_keyboard_enhancement().unwrap_or(false);
    if release_events {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    let keyboard = if release_events {
        KeyboardInput::with_release_events()
    } else {
        KeyboardInput::default()
    };
    debug!(release_events, "terminal ready");

    let mut app = App::new(config, launch, keyboard);
    app.boot();
    let result = run_loop(&mut stdout, &mut app);
    app.unload();

    // Restore terminal
    if release_events {
        execute!(stdout, PopKeyboardEnhancementFlags)?;
    }
    execute!(stdout, Show, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    result
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Poll input, run the frame's ticks, draw; until the user quits
fn run_loop(stdout: &mut Stdout, app: &mut App) -> Result<(), Box<dyn std::error::Error>> {
    let mut prev = Instant::now();
    while !app.should_quit() {
        if event::poll(INPUT_WAIT)? {
            loop {
                if let Event::Key(key) = event::read()? {
                    app.handle_key(&key, Instant::now());
                }
                if !event::poll(Duration::ZERO)? {
                    break;
                }
            }
        }

        let now = Instant::now();
        let dt = now.duration_since(prev).as_secs_f64();
        prev = now;
        app.update(dt, now);

        render::draw(stdout, app, terminal::size()?, now)?;
    }
    Ok(())
}
