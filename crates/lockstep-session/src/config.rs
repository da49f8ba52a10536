//! Session Configuration - Tick rate, catch-up bound and netplay tuning
//!
//! Every field has a default so a configuration file only needs to name
//! the values it changes:
//!
//! ```
//! use lockstep_session::SessionConfig;
//!
//! let config: SessionConfig = ron::from_str("(input_delay: 2)").unwrap();
//! assert_eq!(config.input_delay, 2);
//! assert_eq!(config.max_frame_skip, 25);
//! ```

use lockstep_core::TickRate;
use lockstep_netcode::SyncConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for one play session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Simulation ticks per second
    pub tick_rate_hz: f64,
    /// Most ticks simulated in a single frame; bounds catch-up after a slow frame
    pub max_frame_skip: u32,
    /// Ticks between polling a local input and the tick it applies to (netplay only)
    pub input_delay: u64,
    /// Peer silence, in milliseconds, after which netplay is abandoned
    pub peer_timeout_ms: u64,
    /// How long, in milliseconds, a joining client waits for the host; 0 waits forever
    pub join_timeout_ms: u64,
    /// Drop accumulated lag when the session is unpaused
    pub reset_lag_on_resume: bool,
    /// Maximum ticks buffered ahead per participant
    pub input_capacity: usize,
}

impl SessionConfig {
    /// Check the configuration for values a session cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        self.tick_rate()?;
        if self.max_frame_skip == 0 {
            return Err(crate::Error::InvalidConfig(
                "max_frame_skip must be at least 1".to_string(),
            ));
        }
        self.sync_config().validate()?;
        Ok(())
    }

    /// Simulation rate
    pub fn tick_rate(&self) -> crate::Result<TickRate> {
        Ok(TickRate::from_hz(self.tick_rate_hz)?)
    }

    /// Peer silence after which netplay is abandoned
    pub fn peer_timeout(&self) -> Duration {
        Duration::from_millis(self.peer_timeout_ms)
    }

    /// How long a joining client waits for the host, if bounded
    pub fn join_timeout(&self) -> Option<Duration> {
        (self.join_timeout_ms > 0).then(|| Duration::from_millis(self.join_timeout_ms))
    }

    /// Synchronizer settings derived from this configuration
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            input_delay: self.input_delay,
            input_capacity: self.input_capacity,
            peer_timeout: self.peer_timeout(),
            join_timeout: self.join_timeout(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60.0,
            max_frame_skip: 25,
            input_delay: 0,
            peer_timeout_ms: 5000,
            join_timeout_ms: 10_000,
            reset_lag_on_resume: true,
            input_capacity: 256,
        }
    }
}
