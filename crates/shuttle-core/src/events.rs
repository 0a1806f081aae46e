//! Events emitted by the simulation.
//!
//! `ShuttleEvent` is the in-process lifecycle signal routed through the
//! event bus; its id-based `EventView` is handed out in each snapshot.
//! `AudioEvent` and `Notice` are presentation cues collected the same way.

use hecs::Entity;
use serde::{Deserialize, Serialize};

use shuttle_geometry::Pose;

use crate::enums::AlertLevel;
use crate::types::{entity_id, MapId, TravelTarget};

/// Discriminant used to register handlers on the event bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Docked,
    Undocked,
    TransitStarted,
    TransitCompleted,
}

/// Docking and FTL lifecycle events.
#[derive(Debug, Clone, PartialEq)]
pub enum ShuttleEvent {
    Docked {
        port_a: Entity,
        port_b: Entity,
        grid_a: Entity,
        grid_b: Entity,
    },
    Undocked {
        port_a: Entity,
        port_b: Entity,
        grid_a: Entity,
        grid_b: Entity,
    },
    /// The shuttle left its origin for the staging map.
    TransitStarted {
        shuttle: Entity,
        origin_map: MapId,
        origin: Pose,
        target: TravelTarget,
    },
    /// The shuttle was placed at its destination.
    TransitCompleted { shuttle: Entity, map: MapId },
}

impl ShuttleEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ShuttleEvent::Docked { .. } => EventKind::Docked,
            ShuttleEvent::Undocked { .. } => EventKind::Undocked,
            ShuttleEvent::TransitStarted { .. } => EventKind::TransitStarted,
            ShuttleEvent::TransitCompleted { .. } => EventKind::TransitCompleted,
        }
    }

    /// Entities whose local handlers receive this event.
    pub fn targets(&self) -> Vec<Entity> {
        match *self {
            ShuttleEvent::Docked { port_a, port_b, .. }
            | ShuttleEvent::Undocked { port_a, port_b, .. } => vec![port_a, port_b],
            ShuttleEvent::TransitStarted { shuttle, .. }
            | ShuttleEvent::TransitCompleted { shuttle, .. } => vec![shuttle],
        }
    }

    pub fn view(&self) -> EventView {
        match *self {
            ShuttleEvent::Docked {
                port_a,
                port_b,
                grid_a,
                grid_b,
            } => EventView::Docked {
                port_a: entity_id(port_a),
                port_b: entity_id(port_b),
                grid_a: entity_id(grid_a),
                grid_b: entity_id(grid_b),
            },
            ShuttleEvent::Undocked {
                port_a,
                port_b,
                grid_a,
                grid_b,
            } => EventView::Undocked {
                port_a: entity_id(port_a),
                port_b: entity_id(port_b),
                grid_a: entity_id(grid_a),
                grid_b: entity_id(grid_b),
            },
            ShuttleEvent::TransitStarted {
                shuttle,
                origin_map,
                origin,
                ..
            } => EventView::TransitStarted {
                shuttle: entity_id(shuttle),
                origin_map,
                origin,
            },
            ShuttleEvent::TransitCompleted { shuttle, map } => EventView::TransitCompleted {
                shuttle: entity_id(shuttle),
                map,
            },
        }
    }
}

/// Lifecycle event as it appears in a snapshot, with entities as stable ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventView {
    Docked {
        port_a: u64,
        port_b: u64,
        grid_a: u64,
        grid_b: u64,
    },
    Undocked {
        port_a: u64,
        port_b: u64,
        grid_a: u64,
        grid_b: u64,
    },
    TransitStarted {
        shuttle: u64,
        origin_map: MapId,
        origin: Pose,
    },
    TransitCompleted { shuttle: u64, map: MapId },
}

/// Audio cues for the frontend sound system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AudioEvent {
    /// Drive spin-up at the origin.
    FtlStartup { shuttle: u64, range: f32 },
    /// Arrival thump at the destination.
    FtlArrival { shuttle: u64, range: f32 },
    /// Hyperspace loop starts.
    TravelAmbienceStart { shuttle: u64 },
    TravelAmbienceStop { shuttle: u64 },
    /// Door bolts dropped or raised.
    BoltsToggled { door: u64, bolted: bool },
}

/// UI-facing notices: popups, announcements, console refreshes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Notice {
    /// Shown to whoever used a console.
    Popup { console: u64, message: String },
    /// Station-wide announcement.
    Announcement {
        level: AlertLevel,
        message: String,
        tick: u64,
    },
    /// Docking state on this grid changed; open consoles should redraw.
    ConsoleRefresh { grid: u64 },
    MapUnpaused { map: MapId },
}
