//! Error types for lockstep-netcode

use lockstep_core::Tick;
use thiserror::Error;

/// Netcode error type
#[derive(Debug, Error)]
pub enum Error {
    /// Input buffer overflow
    #[error("Input buffer full: tick {tick} is more than {capacity} ticks past tick {floor}")]
    InputBufferFull {
        tick: Tick,
        floor: Tick,
        capacity: usize,
    },

    /// The synchronizer is not draining its inbox fast enough
    #[error("Peer inbox full, message dropped")]
    InboxFull,

    /// The other end of the peer channel is gone
    #[error("Peer channel disconnected")]
    Disconnected,

    /// A networked synchronizer was requested without a peer role
    #[error("Role {0:?} cannot be used for a networked session")]
    NotNetworked(crate::SessionRole),

    /// Configuration rejected
    #[error("Invalid netplay configuration: {0}")]
    InvalidConfig(String),

    /// Socket error
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

/// Result type for netcode operations
pub type Result<T> = std::result::Result<T, Error>;
