//! Lockstep Core - Ticks, inputs and the engine boundary
//!
//! This crate provides the vocabulary shared by the scheduler crates:
//! - Logical time (`Tick`, `TickRate`)
//! - Per-tick input values (`InputState`, `LatchedInput`, `Button`)
//! - The `InputSource` polled once per tick for the local participant
//! - The opaque `Engine` boundary and its optional per-step capabilities
//!
//! ## Engine Capabilities
//!
//! An engine only has to implement [`Engine::step`]. Engines that need a
//! frame-time reference or an audio pump after every step expose them as
//! optional capabilities; [`run_step`] invokes whichever ones are present:
//!
//! ```
//! use lockstep_core::{run_step, Engine, LatchedInput};
//!
//! struct Counter(u64);
//!
//! impl Engine for Counter {
//!     fn step(&mut self, _input: &LatchedInput) {
//!         self.0 += 1;
//!     }
//! }
//!
//! let mut engine = Counter(0);
//! run_step(&mut engine, &LatchedInput::neutral(0));
//! assert_eq!(engine.0, 1);
//! ```

mod engine;
mod error;
mod input;
pub mod time;

pub use engine::{run_step, AudioCallback, Engine, FrameTimeCallback};
pub use error::{Error, Result};
pub use input::{Button, InputSource, InputState, LatchedInput, Port, PORT_COUNT};
pub use time::{Tick, TickRate};
