//! Per-shuttle FTL transit state.
//!
//! Stored in `ShuttleSimulation`'s transit map keyed by the shuttle grid,
//! not as an ECS component.

use hecs::Entity;

use shuttle_core::enums::FtlPhase;
use shuttle_core::types::TravelTarget;
use shuttle_transit::fsm::{TransitClock, TransitTimings};

/// What a caller asks for when sending a shuttle somewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelRequest {
    pub target: TravelTarget,
    pub startup_secs: f32,
    pub travel_secs: f32,
    /// Dock on arrival when the target is a grid.
    pub dock: bool,
    pub priority_tag: Option<String>,
}

impl TravelRequest {
    /// Travel to a target with the given durations, no docking.
    pub fn new(target: TravelTarget, startup_secs: f32, travel_secs: f32) -> Self {
        Self {
            target,
            startup_secs,
            travel_secs,
            dock: false,
            priority_tag: None,
        }
    }

    pub fn docking(mut self, priority_tag: Option<&str>) -> Self {
        self.dock = true;
        self.priority_tag = priority_tag.map(str::to_owned);
        self
    }
}

/// One shuttle's trip, from request until cooldown ends.
#[derive(Debug, Clone)]
pub struct Transit {
    pub shuttle: Entity,
    pub clock: TransitClock,
    pub target: TravelTarget,
    pub dock: bool,
    pub priority_tag: Option<String>,
}

impl Transit {
    pub fn new(shuttle: Entity, request: &TravelRequest, timings: TransitTimings) -> Self {
        Self {
            shuttle,
            clock: TransitClock::new(timings),
            target: request.target,
            dock: request.dock,
            priority_tag: request.priority_tag.clone(),
        }
    }

    pub fn phase(&self) -> FtlPhase {
        self.clock.phase()
    }

    /// Seconds left in the current phase.
    pub fn remaining_secs(&self) -> f32 {
        self.clock.remaining()
    }
}
