//! Enumeration types used throughout the simulation.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// FTL transit phase. Linear: each phase has exactly one successor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FtlPhase {
    /// Spinning up on the origin map.
    #[default]
    Starting,
    /// Parked on the staging map, cruising.
    Travelling,
    /// Braking on the staging map just before arrival.
    Arriving,
    /// Arrived; drive still locked out.
    Cooldown,
}

impl FtlPhase {
    /// The phase that follows this one, or `None` when the transit ends.
    pub fn next(self) -> Option<FtlPhase> {
        match self {
            FtlPhase::Starting => Some(FtlPhase::Travelling),
            FtlPhase::Travelling => Some(FtlPhase::Arriving),
            FtlPhase::Arriving => Some(FtlPhase::Cooldown),
            FtlPhase::Cooldown => None,
        }
    }
}

/// Cardinal direction in grid-local space. North is +Y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn vector(self) -> Vec2 {
        match self {
            Direction::North => Vec2::Y,
            Direction::East => Vec2::X,
            Direction::South => Vec2::NEG_Y,
            Direction::West => Vec2::NEG_X,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Local rotation that makes a docking port face this way.
    /// Ports face along their local -Y axis.
    pub fn port_rotation(self) -> f32 {
        match self {
            Direction::South => 0.0,
            Direction::East => FRAC_PI_2,
            Direction::North => PI,
            Direction::West => -FRAC_PI_2,
        }
    }

    pub fn flag(self) -> u8 {
        match self {
            Direction::North => 1,
            Direction::East => 1 << 1,
            Direction::South => 1 << 2,
            Direction::West => 1 << 3,
        }
    }
}

/// Physics body simulation mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyType {
    /// Never moves (grounded shuttles, stations bolted to a planet).
    Static,
    #[default]
    Dynamic,
}

/// What kind of ground a map has.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapSurface {
    /// Open space; nothing to land on.
    #[default]
    Space,
    /// Solid ground; arriving shuttles are grounded.
    Planet,
}

/// Tile material. Lattice tiles are open to space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    #[default]
    Floor,
    Plating,
    Lattice,
}

impl TileKind {
    /// Whether something standing on this tile is exposed to vacuum.
    pub fn is_exposed(self) -> bool {
        matches!(self, TileKind::Lattice)
    }
}

/// Door position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoorState {
    #[default]
    Closed,
    Open,
}

/// Shuttle category; selects transit timings and docking preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShuttleClass {
    #[default]
    Standard,
    Emergency,
    EscapePod,
    Arrivals,
}

/// Alert severity level for announcements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertLevel {
    Info,
    Warning,
    Critical,
}
