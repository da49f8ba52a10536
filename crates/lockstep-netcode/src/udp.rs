//! UDP transport
//!
//! Plain datagrams, no reliability layer. Loss is covered by redundancy
//! instead: every input packet carries the last few local inputs, and a
//! stalled synchronizer periodically repeats them. Duplicates are harmless
//! because the receiving input buffer keys on tick and keeps the first
//! value.
//!
//! A background thread owns the receive side of the socket and hands
//! decoded messages to the synchronizer through the peer channel.

use crate::config::NetplayConfig;
use crate::lockstep::{PeerLink, SessionRole};
use crate::transport::{peer_channel, Packet, PeerInbox, PeerSender, Transport};
use lockstep_core::{InputState, Tick};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Largest datagram we expect to receive
pub const MAX_PACKET_SIZE: usize = 1200;

/// How often the receiver thread checks for shutdown
const RECV_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Open a UDP peer link for a networked role
///
/// The host binds `config.addr` and waits; the client binds an ephemeral
/// port and greets the host at `config.addr`.
pub fn connect(role: SessionRole, config: &NetplayConfig) -> crate::Result<PeerLink> {
    let (transport, inbox) = match role {
        SessionRole::Host => UdpTransport::host(config)?,
        SessionRole::Client => UdpTransport::join(config)?,
        SessionRole::Solo => return Err(crate::Error::NotNetworked(role)),
    };
    Ok(PeerLink::new(transport, inbox))
}

/// Transport statistics
#[derive(Clone, Copy, Debug, Default)]
pub struct TransportStats {
    /// Packets sent
    pub packets_sent: u64,
    /// Bytes sent
    pub bytes_sent: u64,
    /// Re-sends triggered by stalls
    pub resends: u64,
}

/// Best-effort UDP input transport
pub struct UdpTransport {
    socket: Arc<UdpSocket>,
    /// Peer address; the host learns it from the first datagram
    peer: Arc<Mutex<Option<SocketAddr>>>,
    /// Most recent local inputs, consecutive ticks, oldest first
    recent: VecDeque<(Tick, InputState)>,
    redundancy: usize,
    resend_interval: Duration,
    last_resend: Option<Instant>,
    shutdown: Arc<AtomicBool>,
    receiver: Option<JoinHandle<()>>,
    stats: TransportStats,
}

impl UdpTransport {
    /// Bind `config.addr` and wait for a client
    pub fn host(config: &NetplayConfig) -> crate::Result<(Self, PeerInbox)> {
        config.validate()?;
        let socket = UdpSocket::bind(config.addr)?;
        info!(addr = %socket.local_addr()?, "netplay host listening");
        Self::start(socket, None, true, config)
    }

    /// Bind an ephemeral port and greet the host at `config.addr`
    pub fn join(config: &NetplayConfig) -> crate::Result<(Self, PeerInbox)> {
        config.validate()?;
        let any: SocketAddr = if config.addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(any)?;
        let (mut transport, inbox) = Self::start(socket, Some(config.addr), false, config)?;
        transport.send_packet(&Packet::Hello)?;
        info!(host = %config.addr, "netplay client joining");
        Ok((transport, inbox))
    }

    fn start(
        socket: UdpSocket,
        peer: Option<SocketAddr>,
        answer_hello: bool,
        config: &NetplayConfig,
    ) -> crate::Result<(Self, PeerInbox)> {
        socket.set_read_timeout(Some(RECV_POLL_INTERVAL))?;
        let socket = Arc::new(socket);
        let peer = Arc::new(Mutex::new(peer));
        let shutdown = Arc::new(AtomicBool::new(false));
        let (tx, inbox) = peer_channel(config.inbox_capacity);

        let receiver = ReceiverLoop {
            socket: socket.clone(),
            peer: peer.clone(),
            shutdown: shutdown.clone(),
            answer_hello,
            tx,
        };
        let handle = thread::Builder::new()
            .name("netplay-recv".to_string())
            .spawn(move || receiver.run())?;

        Ok((
            Self {
                socket,
                peer,
                recent: VecDeque::with_capacity(config.redundancy),
                redundancy: config.redundancy,
                resend_interval: config.resend_interval(),
                last_resend: None,
                shutdown,
                receiver: Some(handle),
                stats: TransportStats::default(),
            },
            inbox,
        ))
    }

    /// Returns the local address
    pub fn local_addr(&self) -> crate::Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Returns the peer address, once known
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        *self.peer.lock()
    }

    /// Returns statistics
    pub fn stats(&self) -> TransportStats {
        self.stats
    }

    fn send_packet(&mut self, packet: &Packet) -> crate::Result<()> {
        let Some(addr) = *self.peer.lock() else {
            // Nobody to talk to yet
            return Ok(());
        };
        let bytes = packet.encode()?;
        let sent = self.socket.send_to(&bytes, addr)?;
        self.stats.packets_sent += 1;
        self.stats.bytes_sent += sent as u64;
        Ok(())
    }

    fn send_recent(&mut self) -> crate::Result<()> {
        let Some(&(first_tick, _)) = self.recent.front() else {
            return self.send_packet(&Packet::Hello);
        };
        let inputs = self.recent.iter().map(|(_, input)| *input).collect();
        self.send_packet(&Packet::Inputs { first_tick, inputs })
    }
}

impl Transport for UdpTransport {
    fn send_local_input(&mut self, tick: Tick, input: InputState) -> crate::Result<()> {
        if let Some(&(last, _)) = self.recent.back() {
            if tick != last + 1 {
                // Packets describe consecutive ticks only
                self.recent.clear();
            }
        }
        self.recent.push_back((tick, input));
        while self.recent.len() > self.redundancy {
            self.recent.pop_front();
        }
        self.send_recent()
    }

    fn resend(&mut self) -> crate::Result<()> {
        let now = Instant::now();
        if let Some(last) = self.last_resend {
            if now.duration_since(last) < self.resend_interval {
                return Ok(());
            }
        }
        self.last_resend = Some(now);
        self.stats.resends += 1;
        self.send_recent()
    }

    fn close(&mut self) {
        let Some(handle) = self.receiver.take() else {
            return;
        };
        if let Err(err) = self.send_packet(&Packet::Goodbye) {
            debug!(%err, "goodbye not sent");
        }
        self.shutdown.store(true, Ordering::Release);
        if handle.join().is_err() {
            warn!("netplay receiver thread panicked");
        }
        debug!(stats = ?self.stats, "netplay transport closed");
    }
}

impl Drop for UdpTransport {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for UdpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpTransport")
            .field("local_addr", &self.socket.local_addr().ok())
            .field("peer", &self.peer_addr())
            .field("stats", &self.stats)
            .finish()
    }
}

/// Receive side, run on its own thread
struct ReceiverLoop {
    socket: Arc<UdpSocket>,
    peer: Arc<Mutex<Option<SocketAddr>>>,
    shutdown: Arc<AtomicBool>,
    answer_hello: bool,
    tx: PeerSender,
}

impl ReceiverLoop {
    fn run(self) {
        let mut buf = [0u8; MAX_PACKET_SIZE];
        while !self.shutdown.load(Ordering::Acquire) {
            let (len, from) = match self.socket.recv_from(&mut buf) {
                Ok(received) => received,
                Err(err) if matches!(err.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                    continue
                }
                Err(err) => {
                    debug!(%err, "netplay receive failed");
                    continue;
                }
            };
            if !self.accept_from(from) {
                continue;
            }
            let packet = match Packet::decode(&buf[..len]) {
                Ok(packet) => packet,
                Err(err) => {
                    debug!(%err, %from, "undecodable packet dropped");
                    continue;
                }
            };
            if packet == Packet::Hello && self.answer_hello {
                self.answer(from);
            }
            for msg in packet.into_messages() {
                match self.tx.try_deliver(msg) {
                    Ok(()) => {}
                    Err(crate::Error::InboxFull) => {
                        // Redundant re-sends will bring it back
                        debug!("peer inbox full, message dropped");
                    }
                    Err(_) => return,
                }
            }
        }
    }

    fn accept_from(&self, from: SocketAddr) -> bool {
        let mut peer = self.peer.lock();
        match *peer {
            None => {
                info!(%from, "netplay peer connected");
                *peer = Some(from);
                true
            }
            Some(addr) if addr == from => true,
            Some(addr) => {
                debug!(%from, peer = %addr, "datagram from unknown address ignored");
                false
            }
        }
    }

    fn answer(&self, to: SocketAddr) {
        let sent = Packet::Hello
            .encode()
            .and_then(|bytes| Ok(self.socket.send_to(&bytes, to)?));
        if let Err(err) = sent {
            debug!(%err, "hello reply not sent");
        }
    }
}
