//! Console commands sent from the frontend to the simulation.
//!
//! Entities are referenced by their stable numeric id (`types::entity_id`).

use serde::{Deserialize, Serialize};

/// A console interaction, processed at the next tick boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShuttleCommand {
    /// Fly the console's shuttle to a destination grid or map.
    RequestFtl {
        console: u64,
        destination: u64,
        #[serde(default)]
        dock: bool,
    },
    /// Undock one port of the console's shuttle.
    RequestUndock { console: u64, port: u64 },
    /// Keep trying to dock this port each tick.
    RequestAutodock { console: u64, port: u64 },
    StopAutodock { console: u64, port: u64 },
    /// Swipe an ID card at the emergency console.
    EmergencyAuthorize { console: u64, user: u64 },
    EmergencyRepeal { console: u64, user: u64 },
    EmergencyRepealAll { console: u64, user: u64 },
    /// Send the emergency shuttle to the station.
    CallEmergencyShuttle,
}
