//! Read-only world queries: transforms, map membership, grid bounds and
//! the broad-phase "grids intersecting a box" search.

use glam::Vec2;
use hecs::{Component, Entity, World};

use shuttle_core::components::*;
use shuttle_core::constants::DOCKING_FIXTURE;
use shuttle_core::types::{sort_entities, MapId};
use shuttle_geometry::{Aabb, Pose};

pub fn has<T: Component>(world: &World, entity: Entity) -> bool {
    world.get::<&T>(entity).is_ok()
}

pub fn cloned<T: Component + Clone>(world: &World, entity: Entity) -> Option<T> {
    world.get::<&T>(entity).ok().map(|c| (*c).clone())
}

pub fn xform(world: &World, entity: Entity) -> Option<Xform> {
    world.get::<&Xform>(entity).ok().map(|x| *x)
}

/// Open maps are map entities; everything else (stations, ships) is finite.
pub fn is_open_map(world: &World, entity: Entity) -> bool {
    has::<MapComponent>(world, entity)
}

pub fn is_grid(world: &World, entity: Entity) -> bool {
    has::<Grid>(world, entity)
}

/// Pose in map coordinates. Map entities sit at the identity.
pub fn world_pose(world: &World, entity: Entity) -> Option<Pose> {
    if is_open_map(world, entity) {
        return Some(Pose::IDENTITY);
    }
    let xf = xform(world, entity)?;
    match xf.parent {
        Parent::Map(_) => Some(xf.local),
        Parent::Grid(grid) => Some(world_pose(world, grid)?.compose(&xf.local)),
    }
}

pub fn map_of(world: &World, entity: Entity) -> Option<MapId> {
    if let Ok(map) = world.get::<&MapComponent>(entity) {
        return Some(map.id);
    }
    match xform(world, entity)?.parent {
        Parent::Map(id) => Some(id),
        Parent::Grid(grid) => map_of(world, grid),
    }
}

/// The grid an entity is parented to.
pub fn grid_of(world: &World, entity: Entity) -> Option<Entity> {
    xform(world, entity)?.grid()
}

/// Grid bounds in its own frame. Open maps report the zero box.
pub fn grid_local_aabb(world: &World, grid: Entity) -> Aabb {
    world
        .get::<&Grid>(grid)
        .ok()
        .filter(|_| !is_open_map(world, grid))
        .map(|g| g.local_aabb())
        .unwrap_or_default()
}

pub fn grid_world_aabb(world: &World, grid: Entity) -> Option<Aabb> {
    let pose = world_pose(world, grid)?;
    Some(grid_local_aabb(world, grid).transformed(&pose.matrix()))
}

/// Finite grids rooted on a map, in stable order.
pub fn grids_on_map(world: &World, map: MapId) -> Vec<Entity> {
    let mut grids: Vec<Entity> = world
        .query::<(&Grid, &Xform)>()
        .iter()
        .filter(|(_, (_, xf))| xf.parent == Parent::Map(map))
        .map(|(e, _)| e)
        .collect();
    sort_entities(&mut grids);
    grids
}

/// Broad phase: finite grids on `map` whose world bounds overlap `area`.
pub fn grids_intersecting(world: &World, map: MapId, area: &Aabb) -> Vec<Entity> {
    grids_on_map(world, map)
        .into_iter()
        .filter(|grid| grid_world_aabb(world, *grid).is_some_and(|b| b.intersects(area)))
        .collect()
}

/// Direct children of a grid (or map grid), in stable order.
pub fn children_of(world: &World, grid: Entity) -> Vec<Entity> {
    let mut children: Vec<Entity> = world
        .query::<&Xform>()
        .iter()
        .filter(|(_, xf)| xf.parent == Parent::Grid(grid))
        .map(|(e, _)| e)
        .collect();
    sort_entities(&mut children);
    children
}

/// World bounds of an entity: its grid tiles, its fixtures, or a point.
pub fn entity_world_aabb(world: &World, entity: Entity) -> Option<Aabb> {
    let pose = world_pose(world, entity)?;
    if is_grid(world, entity) && !is_open_map(world, entity) {
        return grid_world_aabb(world, entity);
    }
    if let Ok(fixtures) = world.get::<&Fixtures>(entity) {
        let bounds = fixtures
            .list
            .iter()
            .map(|f| f.shape.compute_aabb(&pose))
            .reduce(|a, b| a.union(&b));
        if let Some(bounds) = bounds {
            return Some(bounds);
        }
    }
    Some(Aabb::point(pose.position))
}

/// World bounds of every tile of a grid, each shrunk by `shrink`.
pub fn tile_world_boxes(world: &World, grid: Entity, shrink: f32) -> Vec<Aabb> {
    let Some(pose) = world_pose(world, grid) else {
        return Vec::new();
    };
    let Ok(g) = world.get::<&Grid>(grid) else {
        return Vec::new();
    };
    let matrix = pose.matrix();
    g.tiles()
        .map(|(index, _)| Grid::tile_box(index).transformed(&matrix).enlarged(-shrink))
        .collect()
}

/// World bounds of a port's docking fixture, if it has one.
pub fn docking_fixture_aabb(world: &World, port: Entity) -> Option<Aabb> {
    let pose = world_pose(world, port)?;
    let fixtures = world.get::<&Fixtures>(port).ok()?;
    let fixture = fixtures.get(DOCKING_FIXTURE)?;
    Some(fixture.shape.compute_aabb(&pose))
}

pub fn world_position(world: &World, entity: Entity) -> Option<Vec2> {
    world_pose(world, entity).map(|p| p.position)
}

/// Re-root an entity directly on a map at a world pose.
pub fn set_world_pose(world: &mut World, entity: Entity, map: MapId, pose: Pose) {
    if let Ok(mut xf) = world.get::<&mut Xform>(entity) {
        xf.parent = Parent::Map(map);
        xf.local = pose;
    }
}

/// Total mass of a body, zero when it has none.
pub fn mass_of(world: &World, entity: Entity) -> f32 {
    world.get::<&Body>(entity).map(|b| b.mass).unwrap_or(0.0)
}
