//! FTL phase clock.
//!
//! Pure countdown over plain data; no ECS dependency. The simulation owns
//! one clock per shuttle in transit and applies side effects when
//! [`TransitClock::advance`] reports a phase change.

use serde::{Deserialize, Serialize};

use shuttle_core::config::FtlConfig;
use shuttle_core::enums::FtlPhase;

/// Durations a clock runs through, fixed when travel is requested.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitTimings {
    pub startup_secs: f32,
    /// Total time from leaving the origin to arrival.
    pub travel_secs: f32,
    /// Part of `travel_secs` spent braking. Never longer than the trip.
    pub arrival_lead_secs: f32,
    pub cooldown_secs: f32,
}

impl TransitTimings {
    pub fn new(startup_secs: f32, travel_secs: f32, config: &FtlConfig) -> Self {
        let travel_secs = travel_secs.max(0.0);
        Self {
            startup_secs: startup_secs.max(0.0),
            travel_secs,
            arrival_lead_secs: config.arrival_lead_secs.clamp(0.0, travel_secs),
            cooldown_secs: config.cooldown_secs.max(0.0),
        }
    }

    /// Seconds from request until the transit state is removed.
    pub fn total_secs(&self) -> f32 {
        self.startup_secs + self.travel_secs + self.cooldown_secs
    }

    /// Length of the given phase.
    pub fn phase_secs(&self, phase: FtlPhase) -> f32 {
        match phase {
            FtlPhase::Starting => self.startup_secs,
            FtlPhase::Travelling => self.travel_secs - self.arrival_lead_secs,
            FtlPhase::Arriving => self.arrival_lead_secs,
            FtlPhase::Cooldown => self.cooldown_secs,
        }
    }
}

/// Result of advancing a clock by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitStep {
    /// Still counting down the current phase.
    Hold,
    /// The clock moved into this phase this tick.
    Enter(FtlPhase),
    /// Cooldown elapsed; the transit is over.
    Expired,
}

/// Countdown through the FTL phases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitClock {
    phase: FtlPhase,
    accumulator: f32,
    timings: TransitTimings,
}

impl TransitClock {
    /// A new clock in `Starting`.
    pub fn new(timings: TransitTimings) -> Self {
        Self {
            phase: FtlPhase::Starting,
            accumulator: timings.startup_secs,
            timings,
        }
    }

    pub fn phase(&self) -> FtlPhase {
        self.phase
    }

    /// Seconds left in the current phase (never negative).
    pub fn remaining(&self) -> f32 {
        self.accumulator.max(0.0)
    }

    pub fn timings(&self) -> &TransitTimings {
        &self.timings
    }

    /// Count down by `dt`. At most one phase change per call.
    ///
    /// Overshoot carries into the next phase, so a run of ticks reaches
    /// each boundary at the same simulated time regardless of `dt`.
    pub fn advance(&mut self, dt: f32) -> TransitStep {
        self.accumulator -= dt;
        if self.accumulator > 0.0 {
            return TransitStep::Hold;
        }
        match self.phase.next() {
            Some(next) => {
                self.phase = next;
                self.accumulator += self.timings.phase_secs(next);
                TransitStep::Enter(next)
            }
            None => TransitStep::Expired,
        }
    }
}
