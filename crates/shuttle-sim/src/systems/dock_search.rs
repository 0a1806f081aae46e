//! Search for docking configurations between a shuttle and a target grid.
//!
//! Every free shuttle port is tried against every free target port. A pair
//! yields a placement of the shuttle that puts the two ports face to face;
//! the placement is kept if the shuttle's tiles stay clear of the target
//! and its bounds stay clear of every third grid. Other port pairs that
//! line up under the same placement join the configuration.

use std::cmp::Ordering;

use glam::Vec2;
use hecs::{Entity, World};

use shuttle_core::components::{DockingPort, Fixtures, Grid};
use shuttle_core::constants::{DOCK_MATCH_DECIMALS, GRID_OVERLAP_EPSILON};
use shuttle_core::types::MapId;
use shuttle_geometry::angle::{self, round_to};
use shuttle_geometry::{dock_alignment, Aabb, Pose};

use crate::lookup;
use crate::systems::docking::ports_on;

/// A way to dock a shuttle to a target.
#[derive(Debug, Clone, PartialEq)]
pub struct DockingConfig {
    /// `(shuttle port, target port)` pairs that connect at this placement.
    pub docks: Vec<(Entity, Entity)>,
    pub target: Entity,
    pub map: MapId,
    /// Shuttle origin in map coordinates.
    pub coordinates: Vec2,
    /// Shuttle rotation in map coordinates.
    pub angle: f32,
    /// Shuttle bounds in the target's local frame.
    pub area: Aabb,
}

impl DockingConfig {
    pub fn pose(&self) -> Pose {
        Pose::new(self.coordinates, self.angle)
    }
}

/// Best configuration, or `None` if no port pair fits.
///
/// Ranked by: a target port carrying `priority_tag`, then more connected
/// pairs, then the smallest turn relative to the target's rotation.
pub fn get_docking_config(
    world: &World,
    shuttle: Entity,
    target: Entity,
    priority_tag: Option<&str>,
) -> Option<DockingConfig> {
    let search = Search::new(world, shuttle, target)?;
    let mut configs = search.all_configs(world);
    rank(world, &mut configs, search.target_pose.rotation, priority_tag);
    configs.into_iter().next()
}

/// The candidate placed at exactly these map coordinates and angle, if it
/// is still valid.
pub fn get_docking_config_at(
    world: &World,
    shuttle: Entity,
    target: Entity,
    coordinates: Vec2,
    angle_rad: f32,
) -> Option<DockingConfig> {
    let search = Search::new(world, shuttle, target)?;
    let wanted = round_vec(coordinates);
    search
        .all_configs(world)
        .into_iter()
        .find(|c| {
            round_vec(c.coordinates) == wanted
                && angle::approx_eq(c.angle, angle_rad, DOCK_MATCH_DECIMALS)
        })
}

/// Configuration built from one specific port pair.
pub fn get_docking_config_for_ports(
    world: &World,
    shuttle_port: Entity,
    target_port: Entity,
) -> Option<DockingConfig> {
    let shuttle = lookup::grid_of(world, shuttle_port)?;
    let target = lookup::grid_of(world, target_port)?;
    let search = Search::new(world, shuttle, target)?;
    let s = search.shuttle_ports.iter().find(|p| p.0 == shuttle_port)?;
    let t = search.target_ports.iter().find(|p| p.0 == target_port)?;
    search.config_for(world, s, t)
}

fn round_vec(v: Vec2) -> (i64, i64) {
    let scale = 10f32.powi(DOCK_MATCH_DECIMALS);
    (
        (round_to(v.x, DOCK_MATCH_DECIMALS) * scale).round() as i64,
        (round_to(v.y, DOCK_MATCH_DECIMALS) * scale).round() as i64,
    )
}

fn rank(world: &World, configs: &mut Vec<DockingConfig>, target_rotation: f32, tag: Option<&str>) {
    let tagged = |config: &DockingConfig| {
        tag.is_some_and(|tag| {
            config.docks.iter().any(|(_, target_port)| {
                world
                    .get::<&DockingPort>(*target_port)
                    .map(|d| d.has_tag(tag))
                    .unwrap_or(false)
            })
        })
    };
    let mut keyed: Vec<(bool, usize, f32, DockingConfig)> = configs
        .drain(..)
        .map(|c| {
            let turn = angle::reduce(c.angle - target_rotation).abs();
            (tagged(&c), c.docks.len(), turn, c)
        })
        .collect();
    keyed.sort_by(|a, b| {
        b.0.cmp(&a.0)
            .then(b.1.cmp(&a.1))
            .then(a.2.partial_cmp(&b.2).unwrap_or(Ordering::Equal))
    });
    configs.extend(keyed.into_iter().map(|(_, _, _, c)| c));
}

/// Everything the search needs about one shuttle/target pair.
struct Search {
    shuttle: Entity,
    target: Entity,
    map: MapId,
    target_pose: Pose,
    target_open: bool,
    shuttle_aabb: Aabb,
    shuttle_tiles: Vec<Aabb>,
    shuttle_ports: Vec<(Entity, Pose)>,
    target_ports: Vec<(Entity, Pose)>,
}

impl Search {
    fn new(world: &World, shuttle: Entity, target: Entity) -> Option<Self> {
        if shuttle == target || lookup::is_open_map(world, shuttle) {
            return None;
        }
        let (shuttle_aabb, shuttle_tiles) = {
            let grid = world.get::<&Grid>(shuttle).ok()?;
            let tiles: Vec<Aabb> = grid.tiles().map(|(i, _)| Grid::tile_box(i)).collect();
            (grid.local_aabb(), tiles)
        };
        let target_open = lookup::is_open_map(world, target);
        if !target_open && !lookup::is_grid(world, target) {
            return None;
        }
        Some(Self {
            shuttle,
            target,
            map: lookup::map_of(world, target)?,
            target_pose: lookup::world_pose(world, target)?,
            target_open,
            shuttle_aabb,
            shuttle_tiles,
            shuttle_ports: free_ports(world, shuttle),
            target_ports: free_ports(world, target),
        })
    }

    fn all_configs(&self, world: &World) -> Vec<DockingConfig> {
        let mut configs = Vec::new();
        for s in &self.shuttle_ports {
            for t in &self.target_ports {
                if let Some(config) = self.config_for(world, s, t) {
                    configs.push(config);
                }
            }
        }
        configs
    }

    /// Shuttle pose in the target frame, and the shuttle bounds there.
    fn placement(&self, shuttle_port: &Pose, target_port: &Pose) -> (Pose, Aabb) {
        let relative = dock_alignment(shuttle_port, target_port);
        (relative, self.shuttle_aabb.transformed(&relative.matrix()))
    }

    fn config_for(
        &self,
        world: &World,
        s: &(Entity, Pose),
        t: &(Entity, Pose),
    ) -> Option<DockingConfig> {
        let (relative, area) = self.placement(&s.1, &t.1);
        if !self.valid_spawn(world, &relative) {
            return None;
        }
        let placed = self.target_pose.compose(&relative);
        let world_area = self.shuttle_aabb.transformed(&placed.matrix());
        if self.hits_third_grid(world, &world_area) {
            return None;
        }

        let mut docks = vec![(s.0, t.0)];
        for other_s in &self.shuttle_ports {
            if docks.iter().any(|(a, _)| *a == other_s.0) {
                continue;
            }
            for other_t in &self.target_ports {
                if docks.iter().any(|(_, b)| *b == other_t.0) {
                    continue;
                }
                let (other_rel, other_area) = self.placement(&other_s.1, &other_t.1);
                if angle::approx_eq(other_rel.rotation, relative.rotation, DOCK_MATCH_DECIMALS)
                    && other_area.approx_eq(&area, DOCK_MATCH_DECIMALS)
                {
                    docks.push((other_s.0, other_t.0));
                    break;
                }
            }
        }

        Some(DockingConfig {
            docks,
            target: self.target,
            map: self.map,
            coordinates: placed.position,
            angle: placed.rotation,
            area,
        })
    }

    /// Shuttle tiles must miss every target tile, or for an open map every
    /// anchored hard fixture on it.
    fn valid_spawn(&self, world: &World, relative: &Pose) -> bool {
        let matrix = relative.matrix();
        let placed: Vec<Aabb> = self
            .shuttle_tiles
            .iter()
            .map(|t| t.transformed(&matrix).enlarged(-GRID_OVERLAP_EPSILON))
            .collect();

        if self.target_open {
            let obstacles = anchored_obstacles(world, self.target);
            return !placed
                .iter()
                .any(|tile| obstacles.iter().any(|o| o.intersects(tile)));
        }

        let Ok(target_grid) = world.get::<&Grid>(self.target) else {
            return false;
        };
        !placed.iter().any(|tile| {
            let (min_x, min_y) = Grid::index_of(tile.min);
            let (max_x, max_y) = Grid::index_of(tile.max);
            (min_x..=max_x).any(|x| {
                (min_y..=max_y).any(|y| {
                    target_grid.tile((x, y)).is_some() && Grid::tile_box((x, y)).intersects(tile)
                })
            })
        })
    }

    fn hits_third_grid(&self, world: &World, world_area: &Aabb) -> bool {
        lookup::grids_intersecting(world, self.map, &world_area.enlarged(-GRID_OVERLAP_EPSILON))
            .into_iter()
            .any(|g| g != self.shuttle && g != self.target)
    }
}

/// Enabled, undocked, anchored ports with their grid-local pose.
fn free_ports(world: &World, grid: Entity) -> Vec<(Entity, Pose)> {
    ports_on(world, grid)
        .into_iter()
        .filter_map(|port| {
            let xf = lookup::xform(world, port)?;
            let dock = world.get::<&DockingPort>(port).ok()?;
            (xf.anchored && dock.enabled() && !dock.docked()).then_some((port, xf.local))
        })
        .collect()
}

/// Map-frame bounds of hard fixtures anchored directly on an open map.
fn anchored_obstacles(world: &World, map_entity: Entity) -> Vec<Aabb> {
    lookup::children_of(world, map_entity)
        .into_iter()
        .filter(|e| lookup::xform(world, *e).is_some_and(|x| x.anchored))
        .filter_map(|e| {
            let pose = lookup::world_pose(world, e)?;
            let fixtures = world.get::<&Fixtures>(e).ok()?;
            let boxes: Vec<Aabb> = fixtures.hard().map(|f| f.shape.compute_aabb(&pose)).collect();
            Some(boxes)
        })
        .flatten()
        .collect()
}
