//! Transport traits and the peer message channel
//!
//! A [`Transport`] ships the local participant's inputs to the peer. Inputs
//! coming back from the peer never touch the synchronizer directly: the
//! receiving side (usually a network thread) hands them over a bounded
//! channel as [`PeerMessage`]s, and the synchronizer drains its
//! [`PeerInbox`] without blocking at the start of every advance.

use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError};
use lockstep_core::{InputState, Tick};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Something the peer told us
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerMessage {
    /// The peer's input for a tick
    Input { tick: Tick, input: InputState },
    /// The peer is alive and reachable
    Hello,
    /// The peer is leaving the session
    Goodbye,
}

/// Outbound side of a peer connection
///
/// Sends are best-effort and must not block the frame loop.
pub trait Transport: Send {
    /// Send the local input for `tick`, as soon as it has been polled
    fn send_local_input(&mut self, tick: Tick, input: InputState) -> crate::Result<()>;

    /// Re-send recently sent inputs
    ///
    /// Called while the synchronizer is stalled so that a lost datagram
    /// cannot leave both participants waiting on each other.
    fn resend(&mut self) -> crate::Result<()> {
        Ok(())
    }

    /// Tell the peer we are leaving and release resources
    fn close(&mut self) {}
}

/// Create a bounded peer channel
///
/// The sender goes to whatever receives from the network; the inbox goes to
/// the synchronizer.
pub fn peer_channel(capacity: usize) -> (PeerSender, PeerInbox) {
    let (tx, rx) = crossbeam_channel::bounded(capacity);
    (PeerSender { tx }, PeerInbox { rx })
}

/// Producer half of the peer channel
#[derive(Debug, Clone)]
pub struct PeerSender {
    tx: Sender<PeerMessage>,
}

impl PeerSender {
    /// Hand a message to the synchronizer
    ///
    /// Blocks while the channel is full. Returns `Err` once the inbox has
    /// been dropped (the session ended).
    pub fn deliver(&self, msg: PeerMessage) -> crate::Result<()> {
        self.tx.send(msg).map_err(|_| crate::Error::Disconnected)
    }

    /// Hand a message to the synchronizer without waiting
    ///
    /// Returns `Err(InboxFull)` if the synchronizer has fallen behind.
    pub fn try_deliver(&self, msg: PeerMessage) -> crate::Result<()> {
        self.tx.try_send(msg).map_err(|err| match err {
            TrySendError::Full(_) => crate::Error::InboxFull,
            TrySendError::Disconnected(_) => crate::Error::Disconnected,
        })
    }

    /// Convenience for delivering one tick's input
    pub fn deliver_input(&self, tick: Tick, input: InputState) -> crate::Result<()> {
        self.deliver(PeerMessage::Input { tick, input })
    }
}

/// Consumer half of the peer channel, owned by the synchronizer
#[derive(Debug)]
pub struct PeerInbox {
    rx: Receiver<PeerMessage>,
}

impl PeerInbox {
    /// Receive a message (non-blocking)
    ///
    /// Returns `Ok(None)` if no message is waiting.
    /// Returns `Err(Disconnected)` once every sender is gone and the
    /// channel is empty.
    pub fn recv(&self) -> crate::Result<Option<PeerMessage>> {
        match self.rx.try_recv() {
            Ok(msg) => Ok(Some(msg)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(crate::Error::Disconnected),
        }
    }

    /// Number of messages waiting
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Check if no message is waiting
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

/// In-process transport that delivers straight into another inbox
///
/// Useful for running a host and a client in the same process.
#[derive(Debug)]
pub struct ChannelTransport {
    peer: Option<PeerSender>,
    sent: u64,
}

impl ChannelTransport {
    /// Create a transport delivering into the inbox paired with `peer`
    pub fn new(peer: PeerSender) -> Self {
        Self {
            peer: Some(peer),
            sent: 0,
        }
    }

    /// Number of inputs sent so far
    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl Transport for ChannelTransport {
    fn send_local_input(&mut self, tick: Tick, input: InputState) -> crate::Result<()> {
        let peer = self.peer.as_ref().ok_or(crate::Error::Disconnected)?;
        peer.try_deliver(PeerMessage::Input { tick, input })?;
        self.sent += 1;
        Ok(())
    }

    fn close(&mut self) {
        if let Some(peer) = self.peer.take() {
            // The peer may already be gone
            let _ = peer.try_deliver(PeerMessage::Goodbye);
        }
    }
}

/// Wire packets exchanged between participants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Packet {
    /// Announce ourselves (the host learns the client address from this)
    Hello,
    /// Local inputs for consecutive ticks starting at `first_tick`
    Inputs {
        /// Tick the first input applies to
        first_tick: Tick,
        /// One input per tick
        inputs: Vec<InputState>,
    },
    /// Leaving the session
    Goodbye,
}

impl Packet {
    /// Encode for the wire
    pub fn encode(&self) -> crate::Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode from the wire
    pub fn decode(bytes: &[u8]) -> crate::Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Expand into the messages handed to the synchronizer
    pub fn into_messages(self) -> Vec<PeerMessage> {
        match self {
            Packet::Hello => vec![PeerMessage::Hello],
            Packet::Goodbye => vec![PeerMessage::Goodbye],
            Packet::Inputs { first_tick, inputs } => {
                let count = inputs.len();
                let messages: Option<Vec<_>> = inputs
                    .into_iter()
                    .enumerate()
                    .map(|(offset, input)| {
                        first_tick
                            .checked_add(offset as u64)
                            .map(|tick| PeerMessage::Input { tick, input })
                    })
                    .collect();
                messages.unwrap_or_else(|| {
                    debug!(first_tick, count, "dropping inputs past the last tick");
                    Vec::new()
                })
            }
        }
    }
}
