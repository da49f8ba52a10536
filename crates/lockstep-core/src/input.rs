//! Per-tick input values
//!
//! An [`InputState`] is one participant's controller state for one tick.
//! The scheduler combines the states of all participants into a
//! [`LatchedInput`] before stepping the engine.

use crate::Tick;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of controller ports an engine sees
pub const PORT_COUNT: usize = 2;

/// Joypad buttons, in libretro order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Button {
    B = 0,
    Y = 1,
    Select = 2,
    Start = 3,
    Up = 4,
    Down = 5,
    Left = 6,
    Right = 7,
    A = 8,
    X = 9,
    L = 10,
    R = 11,
    L2 = 12,
    R2 = 13,
    L3 = 14,
    R3 = 15,
}

impl Button {
    /// All buttons in bit order
    pub const ALL: [Button; 16] = [
        Button::B,
        Button::Y,
        Button::Select,
        Button::Start,
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
        Button::A,
        Button::X,
        Button::L,
        Button::R,
        Button::L2,
        Button::R2,
        Button::L3,
        Button::R3,
    ];

    fn mask(self) -> u16 {
        1 << self as u8
    }
}

/// Controller state of one participant for one tick
///
/// Immutable once captured: the builder methods return new values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct InputState {
    buttons: u16,
}

impl InputState {
    /// No buttons held
    pub const NEUTRAL: InputState = InputState { buttons: 0 };

    /// Create from a raw button bitmask (bit n = `Button` with discriminant n)
    pub fn from_bits(buttons: u16) -> Self {
        Self { buttons }
    }

    /// Raw button bitmask
    pub fn bits(&self) -> u16 {
        self.buttons
    }

    /// Return a copy with `button` held
    pub fn with(self, button: Button) -> Self {
        Self {
            buttons: self.buttons | button.mask(),
        }
    }

    /// Check whether `button` is held
    pub fn pressed(&self, button: Button) -> bool {
        self.buttons & button.mask() != 0
    }

    /// Check if no button is held
    pub fn is_neutral(&self) -> bool {
        self.buttons == 0
    }

    /// Iterate over the held buttons
    pub fn held(&self) -> impl Iterator<Item = Button> + '_ {
        Button::ALL.into_iter().filter(move |b| self.pressed(*b))
    }
}

impl FromIterator<Button> for InputState {
    fn from_iter<I: IntoIterator<Item = Button>>(iter: I) -> Self {
        iter.into_iter().fold(InputState::NEUTRAL, InputState::with)
    }
}

impl fmt::Display for InputState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}", self.buttons)
    }
}

/// Controller port an input is latched into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Port {
    /// Port 1 - the solo player or the host
    One,
    /// Port 2 - the joining client
    Two,
}

impl Port {
    /// Zero-based index into [`LatchedInput::ports`]
    pub fn index(self) -> usize {
        match self {
            Port::One => 0,
            Port::Two => 1,
        }
    }

    /// The other port
    pub fn other(self) -> Port {
        match self {
            Port::One => Port::Two,
            Port::Two => Port::One,
        }
    }

    /// Port for a zero-based index
    pub fn from_index(index: usize) -> crate::Result<Self> {
        match index {
            0 => Ok(Port::One),
            1 => Ok(Port::Two),
            _ => Err(crate::Error::InvalidPort(index)),
        }
    }
}

/// Input handed to the engine for exactly one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LatchedInput {
    /// The tick being simulated
    pub tick: Tick,
    /// One state per controller port
    pub ports: [InputState; PORT_COUNT],
}

impl LatchedInput {
    /// All ports neutral
    pub fn neutral(tick: Tick) -> Self {
        Self {
            tick,
            ports: [InputState::NEUTRAL; PORT_COUNT],
        }
    }

    /// State latched into `port`
    pub fn port(&self, port: Port) -> InputState {
        self.ports[port.index()]
    }
}

/// Produces the local participant's input
///
/// Called exactly once per simulated tick, synchronously, and must not
/// block on hardware.
pub trait InputSource {
    /// Sample the current input state
    fn poll(&mut self) -> InputState;
}

impl<F> InputSource for F
where
    F: FnMut() -> InputState,
{
    fn poll(&mut self) -> InputState {
        self()
    }
}
