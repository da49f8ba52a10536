//! Peer liveness tracking
//!
//! A stall is normal under latency, so the synchronizer never decides on
//! its own that the peer is gone. It records what it hears here and the
//! session asks for a verdict after stalled frames.

use std::time::{Duration, Instant};

/// Why a peer is considered unreachable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossReason {
    /// The peer announced it was leaving
    Goodbye,
    /// The receiving side of the connection shut down
    ChannelClosed,
    /// Nothing arrived for longer than the configured timeout
    TimedOut,
    /// The peer never answered within the join timeout
    NoAnswer,
}

/// Verdict on the peer connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerStatus {
    /// Nothing heard yet; the peer may still be joining
    Waiting,
    /// Heard from recently
    Connected,
    /// Give up on this peer
    Lost(LossReason),
}

/// Tracks the last sign of life from the peer
///
/// The silence timeout only starts counting after first contact, so a host
/// can wait for a client to join for as long as it likes. A joining client
/// gives up after the join timeout, if one is set.
#[derive(Debug, Clone)]
pub struct PeerMonitor {
    timeout: Duration,
    join_timeout: Option<Duration>,
    waiting_since: Option<Instant>,
    last_heard: Option<Instant>,
    lost: Option<LossReason>,
}

impl PeerMonitor {
    /// Create a monitor declaring the peer lost after `timeout` of silence
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            join_timeout: None,
            waiting_since: None,
            last_heard: None,
            lost: None,
        }
    }

    /// Declare the peer lost if nothing at all arrives within `timeout`
    ///
    /// The clock starts at the first [`observe`](Self::observe).
    pub fn with_join_timeout(mut self, timeout: Duration) -> Self {
        self.join_timeout = Some(timeout);
        self
    }

    /// Note that the session is running at `now`
    pub fn observe(&mut self, now: Instant) {
        self.waiting_since.get_or_insert(now);
    }

    /// Record a message from the peer
    pub fn heard(&mut self, now: Instant) {
        self.last_heard = Some(now);
    }

    /// Record that the peer said goodbye
    pub fn goodbye(&mut self) {
        self.lost.get_or_insert(LossReason::Goodbye);
    }

    /// Record that the peer channel shut down
    pub fn channel_closed(&mut self) {
        self.lost.get_or_insert(LossReason::ChannelClosed);
    }

    /// Current verdict
    pub fn status(&self, now: Instant) -> PeerStatus {
        if let Some(reason) = self.lost {
            return PeerStatus::Lost(reason);
        }
        match self.last_heard {
            None => match (self.join_timeout, self.waiting_since) {
                (Some(limit), Some(since)) if now.saturating_duration_since(since) > limit => {
                    PeerStatus::Lost(LossReason::NoAnswer)
                }
                _ => PeerStatus::Waiting,
            },
            Some(at) if now.saturating_duration_since(at) > self.timeout => {
                PeerStatus::Lost(LossReason::TimedOut)
            }
            Some(_) => PeerStatus::Connected,
        }
    }

    /// Time of the last message, if any
    pub fn last_heard(&self) -> Option<Instant> {
        self.last_heard
    }

    /// The configured silence timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
