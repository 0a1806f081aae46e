//! Simulation snapshot: the visible docking and FTL state after each tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::{AudioEvent, EventView, Notice};
use crate::types::{MapId, SimTime};

/// Everything the frontend needs after a tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShuttleSnapshot {
    pub time: SimTime,
    pub transits: Vec<TransitView>,
    pub ports: Vec<PortView>,
    pub emergency: EmergencyView,
    /// Lifecycle events published since the previous snapshot.
    pub events: Vec<EventView>,
    pub audio_events: Vec<AudioEvent>,
    pub notices: Vec<Notice>,
}

/// One shuttle in FTL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitView {
    pub shuttle: u64,
    pub phase: FtlPhase,
    /// Seconds until the next phase.
    pub remaining_secs: f32,
    pub target: TargetView,
    pub dock: bool,
    pub priority_tag: Option<String>,
}

/// Where a transit is headed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TargetView {
    Coordinates { map: MapId, position: Vec2 },
    Entity { id: u64 },
}

/// Docking port status for the shuttle console.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortView {
    pub port: u64,
    pub grid: Option<u64>,
    pub enabled: bool,
    pub docked_with: Option<u64>,
    pub priority_tag: Option<String>,
    pub autodock: bool,
}

/// Emergency shuttle status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmergencyView {
    pub called: bool,
    /// Seconds until departure once docked at the station.
    pub launch_remaining_secs: Option<f32>,
    pub authorized: Vec<String>,
    pub authorizations_required: usize,
    pub early_launch_authorized: bool,
    pub launched: bool,
    pub departed: bool,
}
