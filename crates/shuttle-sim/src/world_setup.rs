//! Entity spawn factories for setting up the simulation world.
//!
//! Creates stations, shuttles, docking ports, crew and loose items with
//! the component bundles the systems expect.

use std::collections::BTreeSet;

use glam::Vec2;
use hecs::{Entity, World};

use shuttle_core::components::*;
use shuttle_core::constants::*;
use shuttle_core::enums::*;
use shuttle_core::types::MapId;
use shuttle_geometry::{Aabb, Pose, Shape};

use crate::services::Services;
use crate::systems::docking;

/// Physics body for a grid: mass from its tile count, centered on its tiles.
pub fn grid_body(grid: &Grid) -> Body {
    let mut body = Body::dynamic(grid.tile_count() as f32 * TILE_MASS, grid.center_of_mass());
    body.linear_damping = SHUTTLE_LINEAR_DAMPING;
    body.angular_damping = SHUTTLE_ANGULAR_DAMPING;
    body
}

/// Spawn a station grid on a map. Stations are valid FTL destinations.
pub fn spawn_station(world: &mut World, map: MapId, grid: Grid, pose: Pose) -> Entity {
    let body = grid_body(&grid);
    world.spawn((
        grid,
        Xform::on_map(map, pose),
        body,
        FtlDestination::new(true),
    ))
}

/// Spawn a flyable shuttle grid on a map.
pub fn spawn_shuttle(
    world: &mut World,
    map: MapId,
    grid: Grid,
    pose: Pose,
    class: ShuttleClass,
) -> Entity {
    let body = grid_body(&grid);
    world.spawn((
        grid,
        Xform::on_map(map, pose),
        body,
        Shuttle {
            class,
            ..Default::default()
        },
        FtlDestination::new(true),
    ))
}

/// Grid-local pose of a port on `tile`, facing out of the grid towards
/// `facing`.
pub fn port_pose(tile: (i32, i32), facing: Direction) -> Pose {
    let center = Grid::tile_box(tile).center();
    Pose::new(center, facing.port_rotation())
}

/// Spawn an airlock with a docking port on a grid tile and enable it.
pub fn spawn_docking_port(
    world: &mut World,
    svc: &mut Services,
    grid: Entity,
    tile: (i32, i32),
    facing: Direction,
    priority_tag: Option<&str>,
) -> Entity {
    let dock = match priority_tag {
        Some(tag) => DockingPort::with_tag(tag),
        None => DockingPort::new(),
    };
    let port = world.spawn((
        Xform::on_grid(grid, port_pose(tile, facing), true),
        dock,
        Door {
            state: DoorState::Closed,
            bolted: false,
            change_airtight: true,
        },
    ));
    docking::enable_port(world, svc, port);
    port
}

/// One thruster per direction on a grid.
pub fn spawn_thrusters(world: &mut World, grid: Entity) -> Vec<Entity> {
    Direction::ALL
        .iter()
        .map(|direction| {
            world.spawn((
                Xform::on_grid(grid, Pose::from_position(direction.vector()), true),
                Thruster {
                    direction: *direction,
                    firing: false,
                },
            ))
        })
        .collect()
}

pub fn spawn_console(world: &mut World, grid: Entity, local: Vec2) -> Entity {
    world.spawn((
        Xform::on_grid(grid, Pose::from_position(local), true),
        ShuttleConsole,
    ))
}

pub fn spawn_emergency_console(world: &mut World, grid: Entity, local: Vec2) -> Entity {
    world.spawn((
        Xform::on_grid(grid, Pose::from_position(local), true),
        EmergencyConsole::default(),
    ))
}

/// A crew member standing on a grid.
pub fn spawn_mob(world: &mut World, grid: Entity, local: Vec2, buckled: bool) -> Entity {
    world.spawn((
        Xform::on_grid(grid, Pose::from_position(local), false),
        Mob { alive: true },
        Buckle { buckled },
        StatusEffects::default(),
    ))
}

/// A crew member floating directly on a map.
pub fn spawn_mob_on_map(world: &mut World, map: MapId, position: Vec2) -> Entity {
    world.spawn((
        Xform::on_map(map, Pose::from_position(position)),
        Mob { alive: true },
        StatusEffects::default(),
    ))
}

/// A loose crate with a small hard fixture.
pub fn spawn_item(world: &mut World, map: MapId, position: Vec2) -> Entity {
    world.spawn((
        Xform::on_map(map, Pose::from_position(position)),
        Fixtures {
            list: vec![Fixture {
                id: "body".into(),
                shape: Shape::Rect(Aabb::from_center_size(Vec2::ZERO, Vec2::splat(0.5))),
                hard: true,
            }],
        },
        Name("crate".into()),
    ))
}

/// Wall or rock anchored directly to a map (an open-map grid).
pub fn spawn_anchored_obstacle(world: &mut World, map_entity: Entity, area: Aabb) -> Entity {
    world.spawn((
        Xform::on_grid(map_entity, Pose::from_position(area.center()), true),
        Fixtures {
            list: vec![Fixture {
                id: "body".into(),
                shape: Shape::Rect(Aabb::from_center_size(Vec2::ZERO, area.size())),
                hard: true,
            }],
        },
    ))
}

/// Someone who can swipe an ID card at a console.
pub fn spawn_card_holder(world: &mut World, name: &str, access: &[&str]) -> Entity {
    let tags: BTreeSet<String> = access.iter().map(|a| a.to_string()).collect();
    world.spawn((Name(name.into()), Access(tags)))
}

pub fn spawn_ghost(world: &mut World, map: MapId, position: Vec2) -> Entity {
    world.spawn((Xform::on_map(map, Pose::from_position(position)), Ghost))
}
