//! Fixed-timestep driver
//!
//! Converts elapsed wall-clock time into a bounded number of simulation
//! ticks. Time arrives once per frame and is added to a lag accumulator;
//! every whole tick period in the accumulator is one tick to simulate.
//!
//! The accumulator is clamped to `max_frame_skip` tick periods, so after a
//! slow frame (or a long pause) the simulation catches up by at most that
//! many ticks and then carries on in real time instead of racing to make
//! up the difference.

use lockstep_core::TickRate;
use lockstep_netcode::AdvanceStatus;
use tracing::trace;

/// What happened during one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Ticks simulated this frame
    pub ticks: u32,
    /// The frame ended early on a stalled tick
    pub stalled: bool,
    /// No tick was attempted because the session is paused
    pub paused: bool,
    /// Lag left in the accumulator, in seconds
    pub lag: f64,
}

/// Lag accumulator plus the loop that spends it
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    /// Length of one tick in seconds
    period: f64,
    max_frame_skip: u32,
    /// Seconds of simulation owed, always within `0..=max_lag`
    lag: f64,
}

impl FixedTimestep {
    /// Create a driver with an empty accumulator
    ///
    /// Returns `Err` if `max_frame_skip` is 0, which could never run a tick.
    pub fn new(tick_rate: TickRate, max_frame_skip: u32) -> crate::Result<Self> {
        if max_frame_skip == 0 {
            return Err(crate::Error::InvalidConfig(
                "max_frame_skip must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            period: tick_rate.period_secs(),
            max_frame_skip,
            lag: 0.0,
        })
    }

    /// Account for `dt` seconds of wall-clock time and run the ticks it pays for
    ///
    /// `advance` is called once per owed tick until it stalls or the lag is
    /// spent. A stalled tick keeps its lag, so it is retried next frame.
    /// While `paused` nothing is advanced but the lag still accumulates
    /// (bounded as always). Negative or non-finite `dt` counts as zero.
    pub fn update<F>(&mut self, dt: f64, paused: bool, mut advance: F) -> FrameReport
    where
        F: FnMut() -> AdvanceStatus,
    {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        self.lag = (self.lag + dt).min(self.max_lag());

        let mut report = FrameReport {
            ticks: 0,
            stalled: false,
            paused,
            lag: self.lag,
        };
        if paused {
            return report;
        }

        while self.lag >= self.period && report.ticks < self.max_frame_skip {
            match advance() {
                AdvanceStatus::Advanced => {
                    self.lag = (self.lag - self.period).max(0.0);
                    report.ticks += 1;
                }
                AdvanceStatus::Stalled => {
                    report.stalled = true;
                    break;
                }
            }
        }

        trace!(ticks = report.ticks, stalled = report.stalled, lag = self.lag, "frame");
        report.lag = self.lag;
        report
    }

    /// Empty the accumulator
    pub fn reset(&mut self) {
        self.lag = 0.0;
    }

    /// Seconds of simulation currently owed
    pub fn lag(&self) -> f64 {
        self.lag
    }

    /// Upper bound of the accumulator
    pub fn max_lag(&self) -> f64 {
        self.period * f64::from(self.max_frame_skip)
    }

    /// Length of one tick in seconds
    pub fn period(&self) -> f64 {
        self.period
    }

    /// Most ticks a single frame can run
    pub fn max_frame_skip(&self) -> u32 {
        self.max_frame_skip
    }
}
