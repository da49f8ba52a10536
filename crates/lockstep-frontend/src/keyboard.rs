//! Keyboard input source
//!
//! Terminals report key presses, but most do not report releases. When the
//! terminal supports release events a button stays held until its key is
//! released; otherwise every press (including auto-repeat) holds the button
//! for a short window.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use lockstep_core::{Button, InputSource, InputState};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// How long a press holds a button when releases are not reported
pub const DEFAULT_HOLD: Duration = Duration::from_millis(150);

/// Button bound to a key, if any
pub fn button_for(code: KeyCode) -> Option<Button> {
    let button = match code {
        KeyCode::Up => Button::Up,
        KeyCode::Down => Button::Down,
        KeyCode::Left => Button::Left,
        KeyCode::Right => Button::Right,
        KeyCode::Enter => Button::Start,
        KeyCode::Backspace => Button::Select,
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'w' => Button::Up,
            's' => Button::Down,
            'a' => Button::Left,
            'd' => Button::Right,
            'z' => Button::B,
            'x' => Button::A,
            'c' => Button::Y,
            'v' => Button::X,
            'q' => Button::L,
            'e' => Button::R,
            _ => return None,
        },
        _ => return None,
    };
    Some(button)
}

/// Local joypad state built from terminal key events
#[derive(Debug, Clone)]
pub struct KeyboardInput {
    /// Held buttons and when they expire; `None` waits for a release
    held: HashMap<Button, Option<Instant>>,
    /// Hold window per press; `None` when the terminal reports releases
    hold: Option<Duration>,
}

impl KeyboardInput {
    /// Buttons released only by release events
    pub fn with_release_events() -> Self {
        Self {
            held: HashMap::new(),
            hold: None,
        }
    }

    /// Buttons released after `hold` without a repeat
    pub fn with_hold(hold: Duration) -> Self {
        Self {
            held: HashMap::new(),
            hold: Some(hold),
        }
    }

    /// Apply a key event; returns `false` if the key is not bound
    pub fn handle_key(&mut self, event: &KeyEvent, now: Instant) -> bool {
        let Some(button) = button_for(event.code) else {
            return false;
        };
        match event.kind {
            KeyEventKind::Release => {
                self.held.remove(&button);
            }
            KeyEventKind::Press | KeyEventKind::Repeat => {
                self.held.insert(button, self.hold.map(|hold| now + hold));
            }
        }
        true
    }

    /// Release everything, e.g. when focus moves to the menu
    pub fn clear(&mut self) {
        self.held.clear();
    }

    /// Current state at `now`, dropping expired holds
    pub fn state_at(&mut self, now: Instant) -> InputState {
        self.held
            .retain(|_, expiry| expiry.map_or(true, |expiry| expiry > now));
        self.held.keys().copied().collect()
    }
}

impl Default for KeyboardInput {
    fn default() -> Self {
        Self::with_hold(DEFAULT_HOLD)
    }
}

impl InputSource for KeyboardInput {
    fn poll(&mut self) -> InputState {
        self.state_at(Instant::now())
    }
}
