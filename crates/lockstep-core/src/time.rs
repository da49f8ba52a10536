//! Time system for tick-based simulation
//!
//! Provides discrete time management for deterministic systems:
//! - `Tick` - Logical time unit
//! - `TickRate` - Fixed wall-clock length of one tick

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A discrete tick identifier (logical time unit)
pub type Tick = u64;

/// Fixed simulation rate, stored in ticks per second
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickRate {
    hz: f64,
}

impl TickRate {
    /// The rate most console engines run at
    pub const SIXTY_HZ: TickRate = TickRate { hz: 60.0 };

    /// Create a tick rate from a frequency in Hz
    ///
    /// Returns `Err` for zero, negative or non-finite frequencies.
    pub fn from_hz(hz: f64) -> crate::Result<Self> {
        if !hz.is_finite() || hz <= 0.0 {
            return Err(crate::Error::InvalidTickRate(hz));
        }
        Ok(Self { hz })
    }

    /// Ticks per second
    pub fn hz(&self) -> f64 {
        self.hz
    }

    /// Length of one tick in seconds
    pub fn period_secs(&self) -> f64 {
        1.0 / self.hz
    }

    /// Length of one tick as a `Duration`
    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(self.period_secs())
    }
}

impl Default for TickRate {
    fn default() -> Self {
        Self::SIXTY_HZ
    }
}

impl fmt::Display for TickRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz", self.hz)
    }
}
