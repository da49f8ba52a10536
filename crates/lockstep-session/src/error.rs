//! Error types for lockstep-session

use lockstep_core::Tick;
use thiserror::Error;

/// Result type for session operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in lockstep-session
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration rejected
    #[error("invalid session configuration: {0}")]
    InvalidConfig(String),

    /// A recording skips or repeats a tick
    #[error("recording gap: expected tick {expected}, found tick {found}")]
    RecordingGap { expected: Tick, found: Tick },

    /// Core error
    #[error("core error: {0}")]
    Core(#[from] lockstep_core::Error),

    /// Netcode error
    #[error("netcode error: {0}")]
    Netcode(#[from] lockstep_netcode::Error),

    /// RON parse error
    #[error("RON parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// RON serialization error
    #[error("RON serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
