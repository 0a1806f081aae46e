//! Class-specific transit profiles.
//!
//! Consolidates per-class parameters for an FTL request.

use shuttle_core::config::FtlConfig;
use shuttle_core::constants::{DOCK_TAG_ARRIVALS, DOCK_TAG_EMERGENCY};
use shuttle_core::enums::ShuttleClass;

/// How a shuttle class travels by default.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitProfile {
    pub startup_secs: f32,
    pub travel_secs: f32,
    /// Try to dock on arrival when the target is a grid.
    pub dock: bool,
    /// Preferred port tag at the destination.
    pub priority_tag: Option<&'static str>,
}

/// Get the transit profile for a shuttle class.
pub fn get_profile(class: ShuttleClass, config: &FtlConfig) -> TransitProfile {
    match class {
        ShuttleClass::Standard => TransitProfile {
            startup_secs: config.startup_secs,
            travel_secs: config.travel_secs,
            dock: false,
            priority_tag: None,
        },
        ShuttleClass::Emergency => TransitProfile {
            startup_secs: config.startup_secs,
            travel_secs: config.travel_secs,
            dock: true,
            priority_tag: Some(DOCK_TAG_EMERGENCY),
        },
        // Pods fire off quickly and land wherever they fit.
        ShuttleClass::EscapePod => TransitProfile {
            startup_secs: config.startup_secs * 0.5,
            travel_secs: config.travel_secs,
            dock: false,
            priority_tag: None,
        },
        ShuttleClass::Arrivals => TransitProfile {
            startup_secs: config.startup_secs,
            travel_secs: config.travel_secs,
            dock: true,
            priority_tag: Some(DOCK_TAG_ARRIVALS),
        },
    }
}
