//! Built-in deterministic engines
//!
//! Both engines use integer arithmetic only, so two machines fed the same
//! latched inputs end up in the same state.

use lockstep_core::{
    AudioCallback, Button, Engine, FrameTimeCallback, InputState, LatchedInput, Port, TickRate,
    PORT_COUNT,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Names accepted by [`load_engine`]
pub const ENGINES: &[&str] = &["paddles", "counter"];

/// Engine or content loading error
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown engine '{0}' (available: paddles, counter)")]
    Unknown(String),
    #[error("cannot read content {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid content: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid content: {0}")]
    Invalid(String),
}

/// An engine the frontend can load, feed content and draw
pub trait Module: Engine {
    /// Engine name as given on the command line
    fn name(&self) -> &'static str;

    /// Load content from a file before the session starts
    fn load_content(&mut self, path: &Path) -> Result<(), EngineError>;

    /// Text frame of the current state
    fn render(&self) -> Vec<String>;
}

/// Instantiate a built-in engine by name
pub fn load_engine(name: &str, tick_rate: TickRate) -> Result<Box<dyn Module>, EngineError> {
    let engine: Box<dyn Module> = match name {
        "paddles" => Box::new(Paddles::new(PaddlesSetup::default(), tick_rate)),
        "counter" => Box::new(Counter::new(tick_rate)),
        other => return Err(EngineError::Unknown(other.to_string())),
    };
    debug!(engine = name, "engine loaded");
    Ok(engine)
}

fn read_content(path: &Path) -> Result<Vec<u8>, EngineError> {
    fs::read(path).map_err(|source| EngineError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Frame-time hook: counts calls
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    reference: Duration,
    calls: u64,
}

impl FrameClock {
    fn new(tick_rate: TickRate) -> Self {
        Self {
            reference: tick_rate.period(),
            ..Self::default()
        }
    }
}

impl FrameTimeCallback for FrameClock {
    fn reference(&self) -> Duration {
        self.reference
    }

    fn frame_time(&mut self, reference: Duration) {
        debug_assert_eq!(reference, self.reference);
        self.calls += 1;
    }
}

/// Audio hook: plays queued blips, one batch per step
#[derive(Debug, Clone, Default)]
pub struct Blips {
    queued: u32,
    played: u64,
    pumps: u64,
}

impl Blips {
    fn queue(&mut self) {
        self.queued += 1;
    }
}

impl AudioCallback for Blips {
    fn audio(&mut self) {
        self.pumps += 1;
        self.played += u64::from(self.queued);
        self.queued = 0;
    }
}

// Paddles

/// Sub-cell units per character cell
const SCALE: i32 = 16;
/// Widest field, in cells
const MAX_WIDTH: i32 = 512;
/// Tallest field, in cells
const MAX_HEIGHT: i32 = 256;

/// Playfield parameters, loadable from a RON content file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaddlesSetup {
    /// Field width in cells
    pub width: i32,
    /// Field height in cells
    pub height: i32,
    /// Paddle height in cells
    pub paddle_height: i32,
    /// Paddle movement per tick, in sub-cells
    pub paddle_speed: i32,
    /// Horizontal ball movement per tick, in sub-cells
    pub ball_speed: i32,
    /// Points needed to win a match
    pub win_score: u32,
}

impl PaddlesSetup {
    fn validate(&self) -> Result<(), EngineError> {
        if !(8..=MAX_WIDTH).contains(&self.width) || !(4..=MAX_HEIGHT).contains(&self.height) {
            return Err(EngineError::Invalid(format!(
                "field must be between 8x4 and {MAX_WIDTH}x{MAX_HEIGHT}"
            )));
        }
        if self.paddle_height < 1 || self.paddle_height >= self.height {
            return Err(EngineError::Invalid(
                "paddle_height must be between 1 and height - 1".to_string(),
            ));
        }
        if self.paddle_speed < 1 || self.ball_speed < 1 || self.ball_speed >= SCALE {
            return Err(EngineError::Invalid(format!(
                "speeds must be positive and ball_speed below {SCALE}"
            )));
        }
        if self.paddle_speed >= self.height * SCALE {
            return Err(EngineError::Invalid(format!(
                "paddle_speed must be below {}",
                self.height * SCALE
            )));
        }
        if self.win_score == 0 {
            return Err(EngineError::Invalid("win_score must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl Default for PaddlesSetup {
    fn default() -> Self {
        Self {
            width: 60,
            height: 20,
            paddle_height: 4,
            paddle_speed: 6,
            ball_speed: 5,
            win_score: 7,
        }
    }
}

/// Two-player paddle game; port 1 plays the left paddle, port 2 the right
#[derive(Debug, Clone)]
pub struct Paddles {
    setup: PaddlesSetup,
    /// Top edge of each paddle, in sub-cells
    paddles: [i32; PORT_COUNT],
    ball: (i32, i32),
    velocity: (i32, i32),
    scores: [u32; PORT_COUNT],
    serves: u32,
    ticks: u64,
    clock: FrameClock,
    blips: Blips,
}

impl Paddles {
    /// New match on the given field
    pub fn new(setup: PaddlesSetup, tick_rate: TickRate) -> Self {
        let mut game = Self {
            setup,
            paddles: [0; PORT_COUNT],
            ball: (0, 0),
            velocity: (0, 0),
            scores: [0; PORT_COUNT],
            serves: 0,
            ticks: 0,
            clock: FrameClock::new(tick_rate),
            blips: Blips::default(),
        };
        game.reset_match();
        game
    }

    fn reset_match(&mut self) {
        let top = (self.setup.height - self.setup.paddle_height) * SCALE / 2;
        self.paddles = [top; PORT_COUNT];
        self.scores = [0; PORT_COUNT];
        self.serves = 0;
        self.serve(1);
    }

    /// Put the ball in the middle, moving toward `direction` (-1 left, 1 right)
    fn serve(&mut self, direction: i32) {
        const SLOPES: [i32; 4] = [1, -2, 2, -1];
        self.ball = (self.setup.width * SCALE / 2, self.setup.height * SCALE / 2);
        self.velocity = (
            direction * self.setup.ball_speed,
            SLOPES[(self.serves % 4) as usize],
        );
        self.serves += 1;
    }

    fn winner(&self) -> Option<Port> {
        let win = self.setup.win_score;
        if self.scores[0] >= win {
            Some(Port::One)
        } else if self.scores[1] >= win {
            Some(Port::Two)
        } else {
            None
        }
    }

    fn move_paddle(&mut self, port: Port, input: InputState) {
        let lowest = (self.setup.height - self.setup.paddle_height) * SCALE;
        let paddle = &mut self.paddles[port.index()];
        if input.pressed(Button::Up) {
            *paddle -= self.setup.paddle_speed;
        }
        if input.pressed(Button::Down) {
            *paddle += self.setup.paddle_speed;
        }
        *paddle = (*paddle).clamp(0, lowest);
    }

    /// Vertical speed after hitting `paddle`, steeper toward its edges
    fn deflect(&self, paddle: i32) -> i32 {
        let half = self.setup.paddle_height * SCALE / 2;
        let offset = self.ball.1 - (paddle + half);
        (offset * 4 / half.max(1)).clamp(-4, 4)
    }

    fn move_ball(&mut self) {
        let bottom = self.setup.height * SCALE - 1;
        self.ball.0 += self.velocity.0;
        self.ball.1 += self.velocity.1;

        if self.ball.1 < 0 {
            self.ball.1 = -self.ball.1;
            self.velocity.1 = -self.velocity.1;
            self.blips.queue();
        } else if self.ball.1 > bottom {
            self.ball.1 = 2 * bottom - self.ball.1;
            self.velocity.1 = -self.velocity.1;
            self.blips.queue();
        }

        let height = self.setup.paddle_height * SCALE;
        let left_face = 2 * SCALE;
        let right_face = (self.setup.width - 2) * SCALE;
        if self.velocity.0 < 0 && self.ball.0 < left_face {
            let paddle = self.paddles[0];
            if (paddle..paddle + height).contains(&self.ball.1) {
                self.ball.0 = 2 * left_face - self.ball.0;
                self.velocity = (-self.velocity.0, self.deflect(paddle));
                self.blips.queue();
            } else if self.ball.0 < 0 {
                self.scores[1] += 1;
                self.serve(-1);
            }
        } else if self.velocity.0 > 0 && self.ball.0 >= right_face {
            let paddle = self.paddles[1];
            if (paddle..paddle + height).contains(&self.ball.1) {
                self.ball.0 = 2 * right_face - self.ball.0 - 1;
                self.velocity = (-self.velocity.0, self.deflect(paddle));
                self.blips.queue();
            } else if self.ball.0 >= self.setup.width * SCALE {
                self.scores[0] += 1;
                self.serve(1);
            }
        }
    }
}

impl Engine for Paddles {
    fn step(&mut self, input: &LatchedInput) {
        self.ticks += 1;
        if self.winner().is_some() {
            if input.ports.iter().any(|port| port.pressed(Button::Start)) {
                self.reset_match();
            }
            return;
        }
        self.move_paddle(Port::One, input.port(Port::One));
        self.move_paddle(Port::Two, input.port(Port::Two));
        self.move_ball();
    }

    fn frame_time_callback(&mut self) -> Option<&mut dyn FrameTimeCallback> {
        Some(&mut self.clock)
    }

    fn audio_callback(&mut self) -> Option<&mut dyn AudioCallback> {
        Some(&mut self.blips)
    }
}

impl Module for Paddles {
    fn name(&self) -> &'static str {
        "paddles"
    }

    fn load_content(&mut self, path: &Path) -> Result<(), EngineError> {
        let bytes = read_content(path)?;
        let text = String::from_utf8_lossy(&bytes);
        let setup: PaddlesSetup = ron::from_str(&text)?;
        setup.validate()?;
        self.setup = setup;
        self.reset_match();
        Ok(())
    }

    fn render(&self) -> Vec<String> {
        let width = self.setup.width as usize;
        let height = self.setup.height as usize;
        let mut rows = vec![vec![' '; width]; height];

        for (port, column) in [(0, 1), (1, width - 2)] {
            let top = (self.paddles[port] / SCALE) as usize;
            for row in rows.iter_mut().skip(top).take(self.setup.paddle_height as usize) {
                row[column] = '|';
            }
        }
        let (x, y) = (self.ball.0 / SCALE, self.ball.1 / SCALE);
        if (0..self.setup.width).contains(&x) && (0..self.setup.height).contains(&y) {
            rows[y as usize][x as usize] = 'o';
        }

        let border = format!("+{}+", "-".repeat(width));
        let mut lines = Vec::with_capacity(height + 4);
        let banner = match self.winner() {
            Some(port) => format!("player {} wins, Start for a rematch", port.index() + 1),
            None => format!("{:>3}  :  {:<3}", self.scores[0], self.scores[1]),
        };
        lines.push(format!("{:^w$}", banner, w = width + 2));
        lines.push(border.clone());
        lines.extend(rows.into_iter().map(|row| format!("|{}|", row.into_iter().collect::<String>())));
        lines.push(border);
        lines.push(format!("tick {}  blips {}", self.ticks, self.blips.played));
        lines
    }
}

// Counter

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(seed: u64, bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(seed, |hash, byte| (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME))
}

/// Folds every latched input into a running checksum
///
/// Useful for spotting a desync: both participants print the same
/// checksum for the same tick or something is wrong.
#[derive(Debug, Clone)]
pub struct Counter {
    checksum: u64,
    ticks: u64,
    presses: [u64; PORT_COUNT],
    last: LatchedInput,
    clock: FrameClock,
    blips: Blips,
}

impl Counter {
    /// Fresh counter with the default seed
    pub fn new(tick_rate: TickRate) -> Self {
        Self {
            checksum: FNV_OFFSET,
            ticks: 0,
            presses: [0; PORT_COUNT],
            last: LatchedInput::neutral(0),
            clock: FrameClock::new(tick_rate),
            blips: Blips::default(),
        }
    }
}

impl Engine for Counter {
    fn step(&mut self, input: &LatchedInput) {
        let mut bytes = [0u8; 12];
        bytes[..8].copy_from_slice(&input.tick.to_le_bytes());
        bytes[8..10].copy_from_slice(&input.port(Port::One).bits().to_le_bytes());
        bytes[10..].copy_from_slice(&input.port(Port::Two).bits().to_le_bytes());
        self.checksum = fnv1a(self.checksum, &bytes);

        for (port, state) in input.ports.iter().enumerate() {
            // Count fresh presses, not held buttons
            let fresh = state.bits() & !self.last.ports[port].bits();
            if fresh != 0 {
                self.presses[port] += u64::from(fresh.count_ones());
                self.blips.queue();
            }
        }
        self.last = *input;
        self.ticks += 1;
    }

    fn frame_time_callback(&mut self) -> Option<&mut dyn FrameTimeCallback> {
        Some(&mut self.clock)
    }

    fn audio_callback(&mut self) -> Option<&mut dyn AudioCallback> {
        Some(&mut self.blips)
    }
}

impl Module for Counter {
    fn name(&self) -> &'static str {
        "counter"
    }

    fn load_content(&mut self, path: &Path) -> Result<(), EngineError> {
        let bytes = read_content(path)?;
        self.checksum = fnv1a(FNV_OFFSET, &bytes);
        Ok(())
    }

    fn render(&self) -> Vec<String> {
        let held = |port: Port| {
            let names: Vec<String> = self
                .last
                .port(port)
                .held()
                .map(|button| format!("{button:?}"))
                .collect();
            if names.is_empty() {
                "-".to_string()
            } else {
                names.join(" ")
            }
        };
        vec![
            format!("ticks     {}", self.ticks),
            format!("checksum  {:016x}", self.checksum),
            format!("presses   {} / {}", self.presses[0], self.presses[1]),
            format!("port 1    {}", held(Port::One)),
            format!("port 2    {}", held(Port::Two)),
            format!("hooks     {} frame time / {} audio", self.clock.calls, self.blips.pumps),
        ]
    }
}
