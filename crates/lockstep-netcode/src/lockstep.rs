//! Lockstep synchronizer
//!
//! [`LockstepSync`] decides whether the current tick can be simulated. A
//! tick is ready once the local input for it has been polled and, in a
//! networked session, the peer's input for it has arrived. When the peer's
//! input is missing the synchronizer reports [`AdvanceStatus::Stalled`] and
//! keeps everything it already has, so the next attempt picks up exactly
//! where this one stopped.
//!
//! # Input delay
//!
//! With `input_delay = d` the input polled while simulating tick `t` is
//! scheduled for tick `t + d`, giving it `d` ticks to cross the network
//! before anyone needs it. Ticks `0..d` start out neutral on both sides.
//! The default delay is 0: input is polled for the very tick about to be
//! simulated.

use crate::input_buffer::{Insert, InputBuffer};
use crate::peer::{PeerMonitor, PeerStatus};
use crate::transport::{PeerInbox, PeerMessage, Transport};
use lockstep_core::{InputState, LatchedInput, Port, Tick};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace, warn};

/// Who this participant is in the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SessionRole {
    /// All input is local
    #[default]
    Solo,
    /// Networked, listening for a client, plays port 1
    Host,
    /// Networked, joined a host, plays port 2
    Client,
}

impl SessionRole {
    /// Port the local participant's input is latched into
    pub fn local_port(self) -> Port {
        match self {
            SessionRole::Solo | SessionRole::Host => Port::One,
            SessionRole::Client => Port::Two,
        }
    }

    /// Check whether remote input is required to advance
    pub fn is_networked(self) -> bool {
        !matches!(self, SessionRole::Solo)
    }
}

impl fmt::Display for SessionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionRole::Solo => "solo",
            SessionRole::Host => "host",
            SessionRole::Client => "client",
        };
        f.write_str(name)
    }
}

/// Result of one [`LockstepSync::advance`] attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceStatus {
    /// The tick was simulated and the tick counter moved on
    Advanced,
    /// Remote input for the tick is missing; nothing was simulated
    Stalled,
}

/// Synchronizer tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Ticks between polling a local input and the tick it applies to
    pub input_delay: u64,
    /// Maximum number of ticks buffered ahead per participant
    pub input_capacity: usize,
    /// Peer silence after which the peer is declared lost
    pub peer_timeout: Duration,
    /// How long a client waits for the host's first message; `None` waits forever
    pub join_timeout: Option<Duration>,
}

impl SyncConfig {
    /// Check the configuration for values the synchronizer cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.input_capacity == 0 {
            return Err(crate::Error::InvalidConfig(
                "input_capacity must be at least 1".to_string(),
            ));
        }
        if self.input_delay >= self.input_capacity as u64 {
            return Err(crate::Error::InvalidConfig(format!(
                "input_delay {} must be smaller than input_capacity {}",
                self.input_delay, self.input_capacity
            )));
        }
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            input_delay: 0,
            input_capacity: 256,
            peer_timeout: Duration::from_secs(5),
            join_timeout: Some(Duration::from_secs(10)),
        }
    }
}

/// Counters for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Ticks simulated
    pub advanced: u64,
    /// Advance attempts that stalled
    pub stalls: u64,
    /// Local input polls
    pub polls: u64,
    /// Remote inputs received twice with the same value
    pub duplicates: u64,
    /// Remote inputs received twice with a different value (first kept)
    pub conflicts: u64,
    /// Remote inputs received for ticks already simulated
    pub stale: u64,
}

/// The networked half of a session: where inputs go and where they come from
pub struct PeerLink {
    transport: Box<dyn Transport>,
    inbox: PeerInbox,
}

impl PeerLink {
    /// Bundle an outbound transport with the inbox its peer delivers into
    pub fn new(transport: impl Transport + 'static, inbox: PeerInbox) -> Self {
        Self {
            transport: Box::new(transport),
            inbox,
        }
    }

    /// Close the transport, telling the peer we are leaving
    pub fn close(mut self) {
        self.transport.close();
    }
}

impl fmt::Debug for PeerLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerLink")
            .field("pending", &self.inbox.len())
            .finish()
    }
}

/// Decides, tick by tick, when the engine may step
///
/// Owns the local and remote input buffers and the tick counter of one
/// session. Dropping it discards all buffered input.
#[derive(Debug)]
pub struct LockstepSync {
    role: SessionRole,
    tick: Tick,
    input_delay: u64,
    local: InputBuffer,
    remote: InputBuffer,
    link: Option<PeerLink>,
    monitor: PeerMonitor,
    stats: SyncStats,
}

impl LockstepSync {
    /// Create a synchronizer where all input is local
    ///
    /// Input delay only hides network latency, so it is not applied here.
    pub fn solo(config: &SyncConfig) -> crate::Result<Self> {
        config.validate()?;
        Ok(Self {
            role: SessionRole::Solo,
            tick: 0,
            input_delay: 0,
            local: InputBuffer::new(config.input_capacity),
            remote: InputBuffer::new(config.input_capacity),
            link: None,
            monitor: PeerMonitor::new(config.peer_timeout),
            stats: SyncStats::default(),
        })
    }

    /// Create a synchronizer for a networked role
    ///
    /// Returns `Err` for [`SessionRole::Solo`] or an invalid configuration.
    pub fn networked(role: SessionRole, link: PeerLink, config: &SyncConfig) -> crate::Result<Self> {
        if !role.is_networked() {
            return Err(crate::Error::NotNetworked(role));
        }
        config.validate()?;
        debug!(%role, input_delay = config.input_delay, "lockstep synchronizer created");
        let mut monitor = PeerMonitor::new(config.peer_timeout);
        // The host waits for a client for as long as it takes
        if let (SessionRole::Client, Some(limit)) = (role, config.join_timeout) {
            monitor = monitor.with_join_timeout(limit);
        }
        Ok(Self {
            role,
            tick: 0,
            input_delay: config.input_delay,
            local: InputBuffer::with_neutral_prefix(config.input_capacity, config.input_delay),
            remote: InputBuffer::with_neutral_prefix(config.input_capacity, config.input_delay),
            link: Some(link),
            monitor,
            stats: SyncStats::default(),
        })
    }

    /// Try to simulate the current tick
    ///
    /// `poll` is called at most once, and only if the local input for the
    /// tick has not been polled yet. `step` is called exactly when the
    /// result is [`AdvanceStatus::Advanced`]. Never blocks.
    pub fn advance<P, S>(&mut self, poll: P, step: S) -> AdvanceStatus
    where
        P: FnOnce() -> InputState,
        S: FnOnce(&LatchedInput),
    {
        self.advance_at(Instant::now(), poll, step)
    }

    /// [`advance`](Self::advance) with an explicit clock reading
    pub fn advance_at<P, S>(&mut self, now: Instant, poll: P, step: S) -> AdvanceStatus
    where
        P: FnOnce() -> InputState,
        S: FnOnce(&LatchedInput),
    {
        self.drain_inbox(now);

        let tick = self.tick;
        let target = tick + self.input_delay;
        if !self.local.contains(target) {
            let state = poll();
            self.stats.polls += 1;
            if let Err(err) = self.local.insert(target, state) {
                error!(%err, tick = target, "local input dropped");
                return AdvanceStatus::Stalled;
            }
            if let Some(link) = &mut self.link {
                if let Err(err) = link.transport.send_local_input(target, state) {
                    warn!(%err, tick = target, "failed to send local input");
                }
            }
        }

        let Some(local) = self.local.get(tick) else {
            error!(tick, "no local input buffered for tick");
            return AdvanceStatus::Stalled;
        };

        let remote = if self.role.is_networked() {
            match self.remote.get(tick) {
                Some(state) => state,
                None => {
                    self.stats.stalls += 1;
                    trace!(tick, "stalled waiting for remote input");
                    if let Some(link) = &mut self.link {
                        if let Err(err) = link.transport.resend() {
                            warn!(%err, "failed to resend local inputs");
                        }
                    }
                    return AdvanceStatus::Stalled;
                }
            }
        } else {
            InputState::NEUTRAL
        };

        let local_port = self.role.local_port();
        let mut latched = LatchedInput::neutral(tick);
        latched.ports[local_port.index()] = local;
        latched.ports[local_port.other().index()] = remote;

        step(&latched);

        self.tick += 1;
        self.local.discard_before(self.tick);
        self.remote.discard_before(self.tick);
        self.stats.advanced += 1;
        AdvanceStatus::Advanced
    }

    /// Keep the link alive without simulating
    ///
    /// Used while the session is paused: peer messages are still taken in
    /// (so the peer does not look silent) and our recent inputs are repeated.
    pub fn idle(&mut self, now: Instant) {
        self.drain_inbox(now);
        if let Some(link) = &mut self.link {
            if let Err(err) = link.transport.resend() {
                warn!(%err, "failed to resend local inputs");
            }
        }
    }

    fn drain_inbox(&mut self, now: Instant) {
        let Some(link) = &self.link else {
            return;
        };
        self.monitor.observe(now);
        loop {
            match link.inbox.recv() {
                Ok(Some(msg)) => {
                    self.monitor.heard(now);
                    match msg {
                        PeerMessage::Input { tick, input } => match self.remote.insert(tick, input) {
                            Ok(Insert::Inserted) => {}
                            Ok(Insert::Duplicate) => self.stats.duplicates += 1,
                            Ok(Insert::Conflict { kept }) => {
                                self.stats.conflicts += 1;
                                warn!(tick, %kept, ignored = %input, "conflicting remote input ignored");
                            }
                            Ok(Insert::Stale) => self.stats.stale += 1,
                            Err(err) => warn!(%err, "remote input dropped"),
                        },
                        PeerMessage::Hello => debug!("peer said hello"),
                        PeerMessage::Goodbye => {
                            info!("peer left the session");
                            self.monitor.goodbye();
                        }
                    }
                }
                Ok(None) => break,
                Err(_) => {
                    self.monitor.channel_closed();
                    break;
                }
            }
        }
    }

    /// Verdict on the peer; always [`PeerStatus::Connected`] when solo
    pub fn peer_status(&self, now: Instant) -> PeerStatus {
        if self.link.is_none() {
            return PeerStatus::Connected;
        }
        self.monitor.status(now)
    }

    /// Stop waiting for the peer and continue as a solo session
    ///
    /// The tick counter and already polled local inputs are kept; remote
    /// input and the transport are dropped. Returns the closed role.
    pub fn end_netplay(&mut self) -> SessionRole {
        let previous = self.role;
        if let Some(link) = self.link.take() {
            link.close();
        }
        self.role = SessionRole::Solo;
        self.input_delay = 0;
        self.remote.clear();
        info!(tick = self.tick, %previous, "netplay ended, continuing solo");
        previous
    }

    /// The tick that will be simulated next
    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Current role
    pub fn role(&self) -> SessionRole {
        self.role
    }

    /// Active input delay in ticks
    pub fn input_delay(&self) -> u64 {
        self.input_delay
    }

    /// Diagnostic counters
    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    /// Local input buffer (read-only)
    pub fn local_inputs(&self) -> &InputBuffer {
        &self.local
    }

    /// Remote input buffer (read-only)
    pub fn remote_inputs(&self) -> &InputBuffer {
        &self.remote
    }
}

impl Drop for LockstepSync {
    fn drop(&mut self) {
        if let Some(link) = self.link.take() {
            link.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peer::LossReason;
    use crate::transport::{peer_channel, ChannelTransport, PeerSender};
    use lockstep_core::Button;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn pressed(bits: u16) -> InputState {
        InputState::from_bits(bits)
    }

    /// Transport that records nothing but counts resends
    struct CountingTransport {
        resends: Arc<AtomicU32>,
    }

    impl Transport for CountingTransport {
        fn send_local_input(&mut self, _tick: Tick, _input: InputState) -> crate::Result<()> {
            Ok(())
        }

        fn resend(&mut self) -> crate::Result<()> {
            self.resends.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Networked synchronizer fed by a test-controlled remote sender
    fn host_with_remote(config: &SyncConfig) -> (LockstepSync, PeerSender, Arc<AtomicU32>) {
        let (remote_tx, inbox) = peer_channel(64);
        let resends = Arc::new(AtomicU32::new(0));
        let transport = CountingTransport {
            resends: resends.clone(),
        };
        let sync =
            LockstepSync::networked(SessionRole::Host, PeerLink::new(transport, inbox), config)
                .unwrap();
        (sync, remote_tx, resends)
    }

    #[test]
    fn test_solo_polls_once_per_tick() {
        let mut sync = LockstepSync::solo(&SyncConfig::default()).unwrap();
        let mut polls = 0;
        let mut stepped = Vec::new();

        for i in 0..5u16 {
            let status = sync.advance(
                || {
                    polls += 1;
                    pressed(i)
                },
                |latched| stepped.push(*latched),
            );
            assert_eq!(status, AdvanceStatus::Advanced);
            assert_eq!(sync.tick(), u64::from(i) + 1);
        }

        assert_eq!(polls, 5);
        assert_eq!(stepped.len(), 5);
        for (i, latched) in stepped.iter().enumerate() {
            assert_eq!(latched.tick, i as u64);
            assert_eq!(latched.port(Port::One), pressed(i as u16));
            assert!(latched.port(Port::Two).is_neutral());
        }
    }

    #[test]
    fn test_stall_reuses_local_input() {
        let (mut sync, remote, resends) = host_with_remote(&SyncConfig::default());
        let mut polls = 0;
        let mut steps = 0;

        // Remote input for tick 0 shows up only before the 4th attempt
        for attempt in 1..=4 {
            if attempt == 4 {
                remote.deliver_input(0, pressed(0x20)).unwrap();
            }
            let status = sync.advance(
                || {
                    polls += 1;
                    pressed(0x01)
                },
                |_| steps += 1,
            );
            if attempt < 4 {
                assert_eq!(status, AdvanceStatus::Stalled);
                assert_eq!(sync.tick(), 0);
            } else {
                assert_eq!(status, AdvanceStatus::Advanced);
            }
        }

        assert_eq!(polls, 1);
        assert_eq!(steps, 1);
        assert_eq!(sync.tick(), 1);
        assert_eq!(sync.stats().stalls, 3);
        assert_eq!(resends.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_host_stalls_on_missing_tick() {
        let (mut sync, remote, _) = host_with_remote(&SyncConfig::default());
        remote.deliver_input(0, InputState::NEUTRAL).unwrap();
        remote.deliver_input(1, InputState::NEUTRAL).unwrap();

        let statuses: Vec<_> = (0..3u16)
            .map(|i| sync.advance(|| pressed(i), |_| {}))
            .collect();

        assert_eq!(
            statuses,
            vec![
                AdvanceStatus::Advanced,
                AdvanceStatus::Advanced,
                AdvanceStatus::Stalled
            ]
        );
        assert_eq!(sync.tick(), 2);
        // Local input for tick 2 was polled and kept for the retry
        assert_eq!(sync.local_inputs().get(2), Some(pressed(2)));
    }

    #[test]
    fn test_duplicate_delivery_keeps_first_value() {
        let (mut sync, remote, _) = host_with_remote(&SyncConfig::default());
        for tick in 0..5 {
            remote.deliver_input(tick, InputState::NEUTRAL).unwrap();
        }
        remote.deliver_input(5, pressed(0x100)).unwrap();
        remote.deliver_input(5, pressed(0x200)).unwrap();
        remote.deliver_input(5, pressed(0x100)).unwrap();

        let mut stepped = Vec::new();
        for _ in 0..6 {
            sync.advance(|| InputState::NEUTRAL, |latched| stepped.push(*latched));
        }

        assert_eq!(stepped.len(), 6);
        assert_eq!(stepped[5].port(Port::Two), pressed(0x100));
        assert_eq!(sync.stats().conflicts, 1);
        assert_eq!(sync.stats().duplicates, 1);
    }

    #[test]
    fn test_late_delivery_for_consumed_tick_is_stale() {
        let (mut sync, remote, _) = host_with_remote(&SyncConfig::default());
        remote.deliver_input(0, InputState::NEUTRAL).unwrap();
        assert_eq!(sync.advance(|| InputState::NEUTRAL, |_| {}), AdvanceStatus::Advanced);

        remote.deliver_input(0, pressed(0x8)).unwrap();
        assert_eq!(sync.advance(|| InputState::NEUTRAL, |_| {}), AdvanceStatus::Stalled);
        assert_eq!(sync.stats().stale, 1);
    }

    #[test]
    fn test_client_latches_into_port_two() {
        let (remote_tx, inbox) = peer_channel(8);
        let (unused_tx, _unused_inbox) = peer_channel(8);
        let mut sync = LockstepSync::networked(
            SessionRole::Client,
            PeerLink::new(ChannelTransport::new(unused_tx), inbox),
            &SyncConfig::default(),
        )
        .unwrap();
        remote_tx.deliver_input(0, pressed(0x4)).unwrap();

        let mut latched = None;
        sync.advance(|| pressed(0x8), |l| latched = Some(*l));

        let latched = latched.unwrap();
        assert_eq!(latched.port(Port::One), pressed(0x4));
        assert_eq!(latched.port(Port::Two), pressed(0x8));
    }

    #[test]
    fn test_host_and_client_step_identically() {
        let (to_client, client_inbox) = peer_channel(256);
        let (to_host, host_inbox) = peer_channel(256);
        let config = SyncConfig::default();
        let mut host = LockstepSync::networked(
            SessionRole::Host,
            PeerLink::new(ChannelTransport::new(to_client), host_inbox),
            &config,
        )
        .unwrap();
        let mut client = LockstepSync::networked(
            SessionRole::Client,
            PeerLink::new(ChannelTransport::new(to_host), client_inbox),
            &config,
        )
        .unwrap();

        let host_script: Vec<InputState> = (0..40u16).map(|i| pressed(i * 3)).collect();
        let client_script: Vec<InputState> = (0..40u16).map(|i| pressed(i * 7 + 1)).collect();
        let mut host_steps = Vec::new();
        let mut client_steps = Vec::new();

        // Uneven scheduling: the host gets two attempts per client attempt
        for round in 0..200 {
            for _ in 0..2 {
                let tick = host.tick() as usize;
                if tick < host_script.len() {
                    host.advance(|| host_script[tick], |l| host_steps.push(*l));
                }
            }
            if round % 3 != 0 {
                let tick = client.tick() as usize;
                if tick < client_script.len() {
                    client.advance(|| client_script[tick], |l| client_steps.push(*l));
                }
            }
        }

        assert_eq!(host_steps.len(), 40);
        assert_eq!(host_steps, client_steps);
        for (tick, latched) in host_steps.iter().enumerate() {
            assert_eq!(latched.tick, tick as u64);
            assert_eq!(latched.port(Port::One), host_script[tick]);
            assert_eq!(latched.port(Port::Two), client_script[tick]);
        }
    }

    #[test]
    fn test_input_delay_shifts_local_input() {
        let config = SyncConfig {
            input_delay: 2,
            ..SyncConfig::default()
        };
        let (mut sync, remote, _) = host_with_remote(&config);
        for tick in 2..6 {
            remote.deliver_input(tick, InputState::NEUTRAL).unwrap();
        }

        let mut stepped = Vec::new();
        for i in 0..6u16 {
            let status = sync.advance(|| pressed(0x10 + i), |l| stepped.push(*l));
            assert_eq!(status, AdvanceStatus::Advanced);
        }

        let host_inputs: Vec<_> = stepped.iter().map(|l| l.port(Port::One)).collect();
        assert_eq!(
            host_inputs,
            vec![
                InputState::NEUTRAL,
                InputState::NEUTRAL,
                pressed(0x10),
                pressed(0x11),
                pressed(0x12),
                pressed(0x13),
            ]
        );
    }

    #[test]
    fn test_end_netplay_continues_solo() {
        let config = SyncConfig {
            input_delay: 1,
            ..SyncConfig::default()
        };
        let (mut sync, remote, _) = host_with_remote(&config);
        remote.deliver_input(1, InputState::NEUTRAL).unwrap();

        let mut polls = 0;
        let mut stepped = Vec::new();
        let next = |polls: &mut u16| {
            *polls += 1;
            InputState::NEUTRAL.with(Button::A)
        };
        sync.advance(|| next(&mut polls), |l| stepped.push(*l));
        sync.advance(|| next(&mut polls), |l| stepped.push(*l));
        assert_eq!(sync.advance(|| next(&mut polls), |l| stepped.push(*l)), AdvanceStatus::Stalled);
        assert_eq!(polls, 3);

        assert_eq!(sync.end_netplay(), SessionRole::Host);
        assert_eq!(sync.role(), SessionRole::Solo);
        assert_eq!(sync.peer_status(Instant::now()), PeerStatus::Connected);

        // Ticks 2 and 3 were polled before the fallback and are reused
        for _ in 0..2 {
            let status = sync.advance(|| next(&mut polls), |l| stepped.push(*l));
            assert_eq!(status, AdvanceStatus::Advanced);
        }
        assert_eq!(polls, 3);
        assert_eq!(sync.advance(|| next(&mut polls), |l| stepped.push(*l)), AdvanceStatus::Advanced);
        assert_eq!(polls, 4);

        let ticks: Vec<_> = stepped.iter().map(|l| l.tick).collect();
        assert_eq!(ticks, vec![0, 1, 2, 3, 4]);
        drop(remote);
    }

    #[test]
    fn test_goodbye_marks_peer_lost() {
        let (mut sync, remote, _) = host_with_remote(&SyncConfig::default());
        let now = Instant::now();
        assert_eq!(sync.peer_status(now), PeerStatus::Waiting);

        remote.deliver(PeerMessage::Hello).unwrap();
        sync.advance_at(now, || InputState::NEUTRAL, |_| {});
        assert_eq!(sync.peer_status(now), PeerStatus::Connected);

        remote.deliver(PeerMessage::Goodbye).unwrap();
        sync.advance_at(now, || InputState::NEUTRAL, |_| {});
        assert_eq!(sync.peer_status(now), PeerStatus::Lost(LossReason::Goodbye));
    }

    #[test]
    fn test_silence_times_out() {
        let config = SyncConfig {
            peer_timeout: Duration::from_millis(100),
            ..SyncConfig::default()
        };
        let (mut sync, remote, _) = host_with_remote(&config);
        let start = Instant::now();
        remote.deliver(PeerMessage::Hello).unwrap();
        sync.advance_at(start, || InputState::NEUTRAL, |_| {});

        sync.advance_at(start + Duration::from_millis(50), || InputState::NEUTRAL, |_| {});
        assert_eq!(
            sync.peer_status(start + Duration::from_millis(50)),
            PeerStatus::Connected
        );
        assert_eq!(
            sync.peer_status(start + Duration::from_millis(150)),
            PeerStatus::Lost(LossReason::TimedOut)
        );
    }

    #[test]
    fn test_only_client_gives_up_on_silent_peer() {
        let config = SyncConfig {
            join_timeout: Some(Duration::from_millis(100)),
            ..SyncConfig::default()
        };
        let (_to_client, client_inbox) = peer_channel(8);
        let (to_host, _host_inbox) = peer_channel(8);
        let mut client = LockstepSync::networked(
            SessionRole::Client,
            PeerLink::new(ChannelTransport::new(to_host), client_inbox),
            &config,
        )
        .unwrap();
        let (mut host, _remote, _) = host_with_remote(&config);

        let start = Instant::now();
        client.advance_at(start, || InputState::NEUTRAL, |_| {});
        host.advance_at(start, || InputState::NEUTRAL, |_| {});
        let later = start + Duration::from_millis(150);
        client.advance_at(later, || InputState::NEUTRAL, |_| {});
        host.advance_at(later, || InputState::NEUTRAL, |_| {});

        assert_eq!(client.tick(), 0);
        assert_eq!(client.peer_status(later), PeerStatus::Lost(LossReason::NoAnswer));
        assert_eq!(host.peer_status(later), PeerStatus::Waiting);
    }

    #[test]
    fn test_closed_channel_marks_peer_lost() {
        let (mut sync, remote, _) = host_with_remote(&SyncConfig::default());
        drop(remote);
        sync.advance(|| InputState::NEUTRAL, |_| {});
        assert_eq!(
            sync.peer_status(Instant::now()),
            PeerStatus::Lost(LossReason::ChannelClosed)
        );
    }

    #[test]
    fn test_idle_takes_in_messages_without_stepping() {
        let (mut sync, remote, resends) = host_with_remote(&SyncConfig::default());
        let now = Instant::now();
        remote.deliver(PeerMessage::Hello).unwrap();
        remote.deliver_input(0, pressed(0x2)).unwrap();

        sync.idle(now);

        assert_eq!(sync.tick(), 0);
        assert_eq!(sync.stats().polls, 0);
        assert_eq!(sync.remote_inputs().get(0), Some(pressed(0x2)));
        assert_eq!(sync.peer_status(now), PeerStatus::Connected);
        assert_eq!(resends.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_solo_role_is_not_networked() {
        let (tx, inbox) = peer_channel(1);
        let result = LockstepSync::networked(
            SessionRole::Solo,
            PeerLink::new(ChannelTransport::new(tx), inbox),
            &SyncConfig::default(),
        );
        assert!(matches!(result, Err(crate::Error::NotNetworked(SessionRole::Solo))));
    }

    #[test]
    fn test_delay_must_fit_capacity() {
        let config = SyncConfig {
            input_delay: 8,
            input_capacity: 8,
            ..SyncConfig::default()
        };
        assert!(LockstepSync::solo(&config).is_err());
    }
}
