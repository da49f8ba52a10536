//! Lockstep Netcode - Input synchronization for two participants
//!
//! This crate keeps two participants' simulations in step by exchanging
//! nothing but input:
//!
//! - **Input Buffering**: write-once, tick-keyed inputs per participant
//! - **Synchronization**: simulate a tick only once both inputs are known
//! - **Transport**: best-effort input delivery (UDP or in-process)
//! - **Liveness**: decide when a silent peer is gone for good
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────── frame loop ─────────────────────────────┐
//! │                                                                     │
//! │  poll() ──▶ ┌──────────────┐   advance()   ┌────────────────────┐   │
//! │             │ Local Buffer │──────────────▶│                    │   │
//! │             └──────┬───────┘               │    LockstepSync    │──▶ step()
//! │                    │ send                  │                    │   │
//! │                    ▼                       └─────────▲──────────┘   │
//! │             ┌──────────────┐               ┌─────────┴──────────┐   │
//! │             │  Transport   │               │   Remote Buffer    │   │
//! │             └──────┬───────┘               └─────────▲──────────┘   │
//! └────────────────────┼─────────────────────────────────┼──────────────┘
//!                      │                      try_recv   │
//!                      ▼                       ┌─────────┴──────────┐
//!                   network ─────────────────▶ │  PeerInbox channel │
//!                            receiver thread   └────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use lockstep_core::{InputState, LatchedInput};
//! use lockstep_netcode::{
//!     peer_channel, AdvanceStatus, ChannelTransport, LockstepSync, PeerLink, SessionRole,
//!     SyncConfig,
//! };
//!
//! let (to_peer, _peer_inbox) = peer_channel(64);
//! let (from_peer, inbox) = peer_channel(64);
//! let link = PeerLink::new(ChannelTransport::new(to_peer), inbox);
//! let mut sync = LockstepSync::networked(SessionRole::Host, link, &SyncConfig::default()).unwrap();
//!
//! // No remote input for tick 0 yet
//! assert_eq!(sync.advance(|| InputState::NEUTRAL, |_| {}), AdvanceStatus::Stalled);
//!
//! from_peer.deliver_input(0, InputState::NEUTRAL).unwrap();
//! let mut stepped: Option<LatchedInput> = None;
//! assert_eq!(
//!     sync.advance(|| InputState::NEUTRAL, |input| stepped = Some(*input)),
//!     AdvanceStatus::Advanced
//! );
//! assert_eq!(stepped.map(|input| input.tick), Some(0));
//! ```

mod config;
mod error;
mod input_buffer;
mod lockstep;
mod peer;
mod transport;
pub mod udp;

pub use config::NetplayConfig;
pub use error::{Error, Result};
pub use input_buffer::{InputBuffer, Insert};
pub use lockstep::{AdvanceStatus, LockstepSync, PeerLink, SessionRole, SyncConfig, SyncStats};
pub use peer::{LossReason, PeerMonitor, PeerStatus};
pub use transport::{peer_channel, ChannelTransport, Packet, PeerInbox, PeerMessage, PeerSender, Transport};
pub use udp::{connect, TransportStats, UdpTransport};
