//! Lockstep Session - Fixed-timestep play sessions
//!
//! This crate turns wall-clock frames into lockstep ticks:
//! - [`FixedTimestep`]: bounded lag accumulator, ticks owed per frame
//! - [`Session`]: engine + synchronizer + driver + pause, for one loaded game
//! - [`SessionConfig`]: RON-loadable tick rate, frame skip and netplay tuning
//! - [`InputRecording`] and [`replay`]: reproduce a session from its inputs
//!
//! # Example
//!
//! ```
//! use lockstep_core::{Engine, InputState, LatchedInput};
//! use lockstep_session::{Session, SessionConfig};
//!
//! #[derive(Default)]
//! struct Ticks(u64);
//!
//! impl Engine for Ticks {
//!     fn step(&mut self, _input: &LatchedInput) {
//!         self.0 += 1;
//!     }
//! }
//!
//! let mut session = Session::solo(Ticks::default(), SessionConfig::default()).unwrap();
//! let mut input = || InputState::NEUTRAL;
//!
//! // 50 ms at 60 Hz owes three ticks
//! let outcome = session.frame(0.05, &mut input);
//! assert_eq!(outcome.report.ticks, 3);
//! assert_eq!(session.engine().0, 3);
//! ```

mod config;
pub mod driver;
mod error;
mod replay;
mod session;

pub use config::SessionConfig;
pub use driver::{FixedTimestep, FrameReport};
pub use error::{Error, Result};
pub use replay::{replay, InputRecording};
pub use session::{FrameOutcome, Session, SessionEvent};
