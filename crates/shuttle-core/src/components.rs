//! ECS components for hecs entities.
//!
//! Most components are plain data. `DockingPort` and `FtlDestination` keep
//! their state private so the dock pairing and destination toggles only
//! change through the methods below.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use hecs::Entity;
use serde::{Deserialize, Serialize};

use shuttle_geometry::{Aabb, Pose, Shape};

use crate::constants::{DOCKING_RADIUS, TILE_SIZE};
use crate::enums::*;
use crate::types::{JointId, MapId, PortalHandle};

// ---------------------------------------------------------------------------
// Transforms and maps
// ---------------------------------------------------------------------------

/// What an entity's transform is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    /// Root entity on a map (grids, loose items in space).
    Map(MapId),
    /// Child of a grid entity.
    Grid(Entity),
}

/// Local transform. Maps themselves have no `Xform`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Xform {
    pub parent: Parent,
    pub local: Pose,
    /// Anchored entities are fixed to their grid (ports, doors, thrusters).
    pub anchored: bool,
}

impl Xform {
    pub fn on_map(map: MapId, local: Pose) -> Self {
        Self {
            parent: Parent::Map(map),
            local,
            anchored: false,
        }
    }

    pub fn on_grid(grid: Entity, local: Pose, anchored: bool) -> Self {
        Self {
            parent: Parent::Grid(grid),
            local,
            anchored,
        }
    }

    pub fn grid(&self) -> Option<Entity> {
        match self.parent {
            Parent::Grid(grid) => Some(grid),
            Parent::Map(_) => None,
        }
    }
}

/// Marks the root entity of a map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapComponent {
    pub id: MapId,
    pub surface: MapSurface,
    pub paused: bool,
}

/// Procedurally generated ground on a planet map. Tiles listed here have
/// been cleared and must not be regenerated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProceduralTerrain {
    pub reserved: BTreeSet<(i32, i32)>,
}

impl ProceduralTerrain {
    /// Reserve every tile cell overlapping `area` (map coordinates).
    /// Returns how many cells were newly reserved.
    pub fn reserve_area(&mut self, area: &Aabb) -> usize {
        let min_x = (area.min.x / TILE_SIZE).floor() as i32;
        let min_y = (area.min.y / TILE_SIZE).floor() as i32;
        let max_x = (area.max.x / TILE_SIZE).ceil() as i32;
        let max_y = (area.max.y / TILE_SIZE).ceil() as i32;
        let mut added = 0;
        for x in min_x..max_x {
            for y in min_y..max_y {
                if self.reserved.insert((x, y)) {
                    added += 1;
                }
            }
        }
        added
    }
}

// ---------------------------------------------------------------------------
// Grids and physics
// ---------------------------------------------------------------------------

/// A rigid collection of tiles. Tile `(x, y)` covers
/// `[x, x + 1] × [y, y + 1]` in grid-local space.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Grid {
    tiles: BTreeMap<(i32, i32), TileKind>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filled rectangle of floor tiles from `min` to `max` inclusive.
    pub fn rect(min: (i32, i32), max: (i32, i32)) -> Self {
        let mut grid = Self::new();
        for x in min.0..=max.0 {
            for y in min.1..=max.1 {
                grid.set_tile((x, y), TileKind::Floor);
            }
        }
        grid
    }

    pub fn set_tile(&mut self, index: (i32, i32), kind: TileKind) {
        self.tiles.insert(index, kind);
    }

    pub fn remove_tile(&mut self, index: (i32, i32)) -> Option<TileKind> {
        self.tiles.remove(&index)
    }

    pub fn tile(&self, index: (i32, i32)) -> Option<TileKind> {
        self.tiles.get(&index).copied()
    }

    /// Tile under a grid-local point.
    pub fn tile_at(&self, local: Vec2) -> Option<TileKind> {
        self.tile(Self::index_of(local))
    }

    pub fn index_of(local: Vec2) -> (i32, i32) {
        (
            (local.x / TILE_SIZE).floor() as i32,
            (local.y / TILE_SIZE).floor() as i32,
        )
    }

    pub fn tile_box(index: (i32, i32)) -> Aabb {
        let min = Vec2::new(index.0 as f32, index.1 as f32) * TILE_SIZE;
        Aabb::new(min, min + Vec2::splat(TILE_SIZE))
    }

    pub fn tiles(&self) -> impl Iterator<Item = ((i32, i32), TileKind)> + '_ {
        self.tiles.iter().map(|(index, kind)| (*index, *kind))
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Grid-local bounds of all tiles. Zero box at the origin when empty.
    pub fn local_aabb(&self) -> Aabb {
        Aabb::from_points(self.tiles.keys().flat_map(|index| {
            let b = Self::tile_box(*index);
            [b.min, b.max]
        }))
        .unwrap_or_default()
    }

    /// Centroid of all tiles in grid-local space.
    pub fn center_of_mass(&self) -> Vec2 {
        if self.tiles.is_empty() {
            return Vec2::ZERO;
        }
        let sum: Vec2 = self
            .tiles
            .keys()
            .map(|index| Self::tile_box(*index).center())
            .sum();
        sum / self.tiles.len() as f32
    }
}

/// Rigid body state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub body_type: BodyType,
    pub mass: f32,
    /// Center of mass in the body's local frame.
    pub local_center: Vec2,
    pub linear_velocity: Vec2,
    pub angular_velocity: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl Body {
    pub fn dynamic(mass: f32, local_center: Vec2) -> Self {
        Self {
            body_type: BodyType::Dynamic,
            mass,
            local_center,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
        }
    }

    pub fn stop(&mut self) {
        self.linear_velocity = Vec2::ZERO;
        self.angular_velocity = 0.0;
    }
}

/// One collision shape on a body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: String,
    pub shape: Shape,
    /// Hard fixtures collide; soft ones are sensors.
    pub hard: bool,
}

/// All fixtures of an entity, in its local frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixtures {
    pub list: Vec<Fixture>,
}

impl Fixtures {
    pub fn get(&self, id: &str) -> Option<&Fixture> {
        self.list.iter().find(|f| f.id == id)
    }

    /// Insert or replace the fixture with the same id.
    pub fn insert(&mut self, fixture: Fixture) {
        match self.list.iter_mut().find(|f| f.id == fixture.id) {
            Some(existing) => *existing = fixture,
            None => self.list.push(fixture),
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Fixture> {
        let index = self.list.iter().position(|f| f.id == id)?;
        Some(self.list.remove(index))
    }

    pub fn hard(&self) -> impl Iterator<Item = &Fixture> {
        self.list.iter().filter(|f| f.hard)
    }
}

// ---------------------------------------------------------------------------
// Docking
// ---------------------------------------------------------------------------

/// A docking port anchored to a grid.
///
/// Pairing is symmetric: the simulation only calls [`DockingPort::attach`]
/// and [`DockingPort::detach`] on both ports of a pair together.
#[derive(Debug, Clone, PartialEq)]
pub struct DockingPort {
    enabled: bool,
    docked_with: Option<Entity>,
    joint: Option<JointId>,
    portal: Option<PortalHandle>,
    /// Ports carrying a tag are preferred by shuttles asking for that tag.
    pub priority_tag: Option<String>,
    pub radius: f32,
}

impl Default for DockingPort {
    fn default() -> Self {
        Self {
            enabled: false,
            docked_with: None,
            joint: None,
            portal: None,
            priority_tag: None,
            radius: DOCKING_RADIUS,
        }
    }
}

impl DockingPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(tag: impl Into<String>) -> Self {
        Self {
            priority_tag: Some(tag.into()),
            ..Self::default()
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn docked(&self) -> bool {
        self.docked_with.is_some()
    }

    pub fn docked_with(&self) -> Option<Entity> {
        self.docked_with
    }

    pub fn joint(&self) -> Option<&JointId> {
        self.joint.as_ref()
    }

    pub fn portal(&self) -> Option<PortalHandle> {
        self.portal
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.priority_tag.as_deref() == Some(tag)
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn attach(&mut self, partner: Entity, joint: Option<JointId>, portal: Option<PortalHandle>) {
        self.docked_with = Some(partner);
        self.joint = joint;
        self.portal = portal;
    }

    /// Clear the pairing, returning what was attached.
    pub fn detach(&mut self) -> (Option<Entity>, Option<JointId>, Option<PortalHandle>) {
        (self.docked_with.take(), self.joint.take(), self.portal.take())
    }
}

/// Ports a console has asked to dock automatically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AutoDock {
    pub requesters: Vec<Entity>,
}

/// Set on both ports after an undock until they drift apart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecentlyDocked {
    pub last_docked: Entity,
    pub radius: f32,
}

/// Airlock door. Usually shares an entity with a docking port.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub state: DoorState,
    pub bolted: bool,
    /// Whether opening the door changes atmosphere sealing.
    pub change_airtight: bool,
}

// ---------------------------------------------------------------------------
// Shuttles
// ---------------------------------------------------------------------------

/// A grid that can fly and FTL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Shuttle {
    pub class: ShuttleClass,
    /// Bitmask of `Direction::flag` values currently thrusting.
    pub linear_thrust: u8,
    pub angular_thrust: bool,
}

/// Thruster anchored to a shuttle grid; pushes the grid along `direction`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thruster {
    pub direction: Direction,
    pub firing: bool,
}

/// Tags matched against FTL destination whitelists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShuttleTags(pub BTreeSet<String>);

/// Marks a grid or map as a valid FTL arrival target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FtlDestination {
    enabled: bool,
    whitelist: Option<BTreeSet<String>>,
}

impl FtlDestination {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            whitelist: None,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn whitelist(&self) -> Option<&BTreeSet<String>> {
        self.whitelist.as_ref()
    }

    pub fn set_whitelist(&mut self, whitelist: Option<BTreeSet<String>>) {
        self.whitelist = whitelist;
    }

    /// Whether a shuttle with these tags may target this destination.
    pub fn allows(&self, tags: Option<&ShuttleTags>) -> bool {
        match &self.whitelist {
            None => true,
            Some(list) => tags.is_some_and(|t| t.0.iter().any(|tag| list.contains(tag))),
        }
    }
}

/// Pilot console on a shuttle grid.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShuttleConsole;

/// Early-launch authorization console aboard the emergency shuttle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmergencyConsole {
    /// Card holder names, in authorization order.
    pub authorized: Vec<String>,
}

// ---------------------------------------------------------------------------
// Occupants
// ---------------------------------------------------------------------------

/// A living (or dead) creature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mob {
    pub alive: bool,
}

/// Strapped into a seat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Buckle {
    pub buckled: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusEffects {
    /// Seconds of paralysis left.
    pub paralyzed_secs: f32,
}

impl StatusEffects {
    pub fn knock_down(&mut self, secs: f32) {
        self.paralyzed_secs = self.paralyzed_secs.max(secs);
    }

    pub fn is_paralyzed(&self) -> bool {
        self.paralyzed_secs > 0.0
    }
}

/// Non-corporeal observer; ignored by physics and the flatten pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Ghost;

/// Gibs left behind by a crushed mob.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Remains {
    pub of: u64,
}

/// Access tags carried by a player's ID card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Access(pub BTreeSet<String>);

impl Access {
    pub fn has(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name(pub String);
