//! Emergency shuttle round state.
//!
//! Stored in `ShuttleSimulation`, not as ECS entities. The shuttle, the
//! station it docks at and the central command target are set up by the
//! caller; the countdown starts once the shuttle arrives at the station.

use hecs::Entity;

use shuttle_core::config::EmergencyConfig;
use shuttle_core::state::EmergencyView;

#[derive(Debug, Clone, Default)]
pub struct EmergencyShuttle {
    pub shuttle: Option<Entity>,
    pub station: Option<Entity>,
    pub centcomm: Option<Entity>,
    pub called: bool,
    /// Docked (or landed) at the station and counting down.
    pub arrived: bool,
    /// Seconds until the shuttle leaves the station.
    pub launch_remaining_secs: Option<f32>,
    pub early_launch_authorized: bool,
    /// FTL to central command has been requested.
    pub launched: bool,
    /// The countdown ran out; the shuttle is gone.
    pub departed: bool,
    /// The early-launch announcement went out.
    pub early_launch_announced: bool,
    /// Rolled travel time to central command.
    pub transit_secs: f32,
}

impl EmergencyShuttle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self, authorized: Vec<String>, config: &EmergencyConfig) -> EmergencyView {
        EmergencyView {
            called: self.called,
            launch_remaining_secs: self.launch_remaining_secs.map(|s| s.max(0.0)),
            authorized,
            authorizations_required: config.authorizations_required,
            early_launch_authorized: self.early_launch_authorized,
            launched: self.launched,
            departed: self.departed,
        }
    }
}
