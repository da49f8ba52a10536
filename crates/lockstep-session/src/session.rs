//! Session - One loaded game, from load to unload
//!
//! A [`Session`] owns everything whose lifetime is one play session: the
//! engine, the synchronizer with its input buffers and tick counter, the
//! fixed-timestep driver with its lag, the pause flag and the optional
//! input recording. Dropping the session (or calling [`Session::end`])
//! discards all of it, including the network link.
//!
//! # Frame flow
//!
//! ```text
//! frame(dt) ──▶ FixedTimestep::update ──▶ LockstepSync::advance ──▶ run_step(engine)
//!     │                 (0..=max_frame_skip times, stops on stall)
//!     └──▶ peer check ──▶ PeerLost? ──▶ end_netplay, continue solo
//! ```

use crate::config::SessionConfig;
use crate::driver::{FixedTimestep, FrameReport};
use crate::replay::InputRecording;
use lockstep_core::{run_step, Engine, InputSource, Tick, TickRate};
use lockstep_netcode::{LockstepSync, LossReason, PeerLink, PeerStatus, SessionRole, SyncStats};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Something the caller should know about, reported at most once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The peer is gone; the session continues as solo from `tick`
    PeerLost {
        /// Role the session had before falling back
        role: SessionRole,
        /// Why the peer was declared lost
        reason: LossReason,
        /// First tick simulated without the peer
        tick: Tick,
    },
}

/// Result of [`Session::frame`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutcome {
    /// What the driver did
    pub report: FrameReport,
    /// Event raised during the frame
    pub event: Option<SessionEvent>,
}

/// A running game: engine, synchronizer, driver and pause state
pub struct Session<E: Engine> {
    config: SessionConfig,
    tick_rate: TickRate,
    engine: E,
    sync: LockstepSync,
    driver: FixedTimestep,
    paused: bool,
    recording: Option<InputRecording>,
}

impl<E: Engine> Session<E> {
    /// Start a session where all input is local
    pub fn solo(engine: E, config: SessionConfig) -> crate::Result<Self> {
        config.validate()?;
        let sync = LockstepSync::solo(&config.sync_config())?;
        Self::start(engine, config, sync)
    }

    /// Start a networked session over an established peer link
    pub fn networked(
        engine: E,
        role: SessionRole,
        link: PeerLink,
        config: SessionConfig,
    ) -> crate::Result<Self> {
        config.validate()?;
        let sync = LockstepSync::networked(role, link, &config.sync_config())?;
        Self::start(engine, config, sync)
    }

    fn start(engine: E, config: SessionConfig, sync: LockstepSync) -> crate::Result<Self> {
        let tick_rate = config.tick_rate()?;
        let driver = FixedTimestep::new(tick_rate, config.max_frame_skip)?;
        info!(role = %sync.role(), %tick_rate, max_frame_skip = config.max_frame_skip, "session started");
        Ok(Self {
            config,
            tick_rate,
            engine,
            sync,
            driver,
            paused: false,
            recording: None,
        })
    }

    /// Record the latched input of every tick from now on
    pub fn with_recording(mut self) -> Self {
        self.recording = Some(InputRecording::new(self.tick_rate));
        self
    }

    /// Run one wall-clock frame of `dt` seconds
    pub fn frame<I>(&mut self, dt: f64, input: &mut I) -> FrameOutcome
    where
        I: InputSource + ?Sized,
    {
        self.frame_at(dt, input, Instant::now())
    }

    /// [`frame`](Self::frame) with an explicit clock reading
    pub fn frame_at<I>(&mut self, dt: f64, input: &mut I, now: Instant) -> FrameOutcome
    where
        I: InputSource + ?Sized,
    {
        let sync = &mut self.sync;
        let engine = &mut self.engine;
        let recording = &mut self.recording;
        let report = self.driver.update(dt, self.paused, || {
            sync.advance_at(now, || input.poll(), |latched| {
                run_step(&mut *engine, latched);
                if let Some(recording) = recording.as_mut() {
                    recording.push(*latched);
                }
            })
        });

        if report.paused {
            self.sync.idle(now);
        }
        if report.stalled {
            debug!(tick = self.sync.tick(), "frame stalled on remote input");
        }

        FrameOutcome {
            report,
            event: self.check_peer(now),
        }
    }

    fn check_peer(&mut self, now: Instant) -> Option<SessionEvent> {
        if !self.sync.role().is_networked() {
            return None;
        }
        let PeerStatus::Lost(reason) = self.sync.peer_status(now) else {
            return None;
        };
        let role = self.sync.end_netplay();
        let tick = self.sync.tick();
        warn!(%role, ?reason, tick, "peer lost, continuing solo");
        Some(SessionEvent::PeerLost { role, reason, tick })
    }

    /// Pause or resume tick advancement
    ///
    /// On resume the accumulated lag is dropped when the configuration asks
    /// for it, so the game does not jump ahead.
    pub fn set_paused(&mut self, paused: bool) {
        if self.paused == paused {
            return;
        }
        self.paused = paused;
        if !paused && self.config.reset_lag_on_resume {
            self.driver.reset();
        }
        debug!(paused, tick = self.sync.tick(), "pause changed");
    }

    /// Check if tick advancement is paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// The tick that will be simulated next
    pub fn tick(&self) -> Tick {
        self.sync.tick()
    }

    /// Current role
    pub fn role(&self) -> SessionRole {
        self.sync.role()
    }

    /// Peer verdict; always connected when solo
    pub fn peer_status(&self, now: Instant) -> PeerStatus {
        self.sync.peer_status(now)
    }

    /// Seconds of simulation currently owed
    pub fn lag(&self) -> f64 {
        self.driver.lag()
    }

    /// Synchronizer counters
    pub fn stats(&self) -> SyncStats {
        self.sync.stats()
    }

    /// Simulation rate
    pub fn tick_rate(&self) -> TickRate {
        self.tick_rate
    }

    /// Active configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Mutable access to the engine, e.g. to load content
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Input recorded so far, if recording
    pub fn recording(&self) -> Option<&InputRecording> {
        self.recording.as_ref()
    }

    /// Unload: close the link and hand back the engine and the recording
    pub fn end(self) -> (E, Option<InputRecording>) {
        let Session {
            engine,
            sync,
            recording,
            ..
        } = self;
        info!(tick = sync.tick(), role = %sync.role(), "session ended");
        drop(sync);
        (engine, recording)
    }
}

impl<E: Engine> std::fmt::Debug for Session<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("role", &self.sync.role())
            .field("tick", &self.sync.tick())
            .field("paused", &self.paused)
            .field("lag", &self.driver.lag())
            .field("recording", &self.recording.as_ref().map(InputRecording::len))
            .finish()
    }
}
