//! Fundamental identifiers and simulation types.

use std::fmt;

use glam::Vec2;
use hecs::Entity;
use serde::{Deserialize, Serialize};

/// Identifier of a map (a coordinate space hosting grids and loose entities).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MapId(pub u32);

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "map-{}", self.0)
    }
}

/// Identifier of a weld joint in the joint registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JointId(pub String);

/// Handle of a pathfinding shortcut between two docked ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortalHandle(pub u32);

/// Where a transit should end up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TravelTarget {
    /// Absolute coordinates on a map.
    Coordinates { map: MapId, position: Vec2 },
    /// A grid or map entity to dock with or arrive near.
    Entity(Entity),
}

/// Stable numeric id for an entity, used in serializable views and events.
pub fn entity_id(entity: Entity) -> u64 {
    entity.to_bits().get()
}

/// Sort entities by their stable bit representation.
pub fn sort_entities(entities: &mut [Entity]) {
    entities.sort_by_key(|e| e.to_bits());
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Seconds per tick at the default tick rate.
    pub fn dt(&self) -> f32 {
        crate::constants::DT
    }

    /// Advance by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.elapsed_secs += f64::from(self.dt());
    }
}
