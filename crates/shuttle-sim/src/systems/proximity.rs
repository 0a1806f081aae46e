//! Fallback placement near a target when docking is not possible.

use std::f32::consts::TAU;

use glam::Vec2;
use hecs::{Entity, World};
use rand::Rng;

use shuttle_core::components::Body;
use shuttle_core::constants::PROXIMITY_SPAWN_ATTEMPTS;
use shuttle_core::types::MapId;
use shuttle_geometry::{Aabb, Pose};

use crate::lookup;
use crate::services::Services;

/// Move `shuttle` to a free spot next to `target` (a grid or a map entity).
/// Returns `false` if the target is not on any map.
pub fn place_near(world: &mut World, svc: &mut Services, shuttle: Entity, target: Entity) -> bool {
    let Some(map) = lookup::map_of(world, target) else {
        log::error!("proximity placement: target {target:?} is not on a map");
        return false;
    };
    let Some(target_pose) = lookup::world_pose(world, target) else {
        return false;
    };
    let target_open = lookup::is_open_map(world, target);
    let shuttle_local = lookup::grid_local_aabb(world, shuttle);
    let shuttle_diagonal = shuttle_local.diagonal();

    let mut area = if target_open {
        Aabb::point(target_pose.position)
    } else {
        lookup::grid_world_aabb(world, target).unwrap_or(Aabb::point(target_pose.position))
    }
    .enlarged(shuttle_diagonal);

    let others = |world: &World, area: &Aabb| -> Vec<Entity> {
        lookup::grids_intersecting(world, map, area)
            .into_iter()
            .filter(|g| *g != shuttle)
            .collect()
    };

    let iterations = svc.ftl.proximity_iterations.max(1);
    let mut nearby: Vec<Entity> = Vec::new();
    for iteration in 0..iterations {
        let before = nearby.len();
        for grid in others(world, &area) {
            if let Some(bounds) = lookup::grid_world_aabb(world, grid) {
                area = area.union(&bounds);
            }
            if !nearby.contains(&grid) {
                nearby.push(grid);
            }
        }
        if nearby.len() == before {
            break;
        }
        area = area.enlarged(shuttle_diagonal / 2.0);

        if iteration + 1 == iterations {
            for grid in lookup::grids_on_map(world, map) {
                if grid == shuttle {
                    continue;
                }
                if let Some(bounds) = lookup::grid_world_aabb(world, grid) {
                    area = area.union(&bounds);
                }
                if !nearby.contains(&grid) {
                    nearby.push(grid);
                }
            }
            break;
        }
    }

    if let Ok(mut body) = world.get::<&mut Body>(shuttle) {
        body.stop();
    }

    let pose = if target_open && nearby.is_empty() {
        let center = world
            .get::<&Body>(shuttle)
            .map(|b| b.local_center)
            .unwrap_or(Vec2::ZERO);
        Pose::new(target_pose.position - center, 0.0)
    } else {
        let rotation = if target_open {
            0.0
        } else {
            svc.rng.gen_range(0.0..TAU)
        };
        spawn_outside(world, svc, shuttle, map, &area, &shuttle_local, rotation)
    };

    log::debug!(
        "proximity placement of {shuttle:?} near {target:?} on {map} at {:?}",
        pose.position
    );
    lookup::set_world_pose(world, shuttle, map, pose);
    true
}

/// Random pose just outside `area`, retried until the shuttle box misses
/// every grid or the attempts run out.
fn spawn_outside(
    world: &World,
    svc: &mut Services,
    shuttle: Entity,
    map: MapId,
    area: &Aabb,
    shuttle_local: &Aabb,
    rotation: f32,
) -> Pose {
    let turned = shuttle_local.transformed(&Pose::new(Vec2::ZERO, rotation).matrix());
    let min_radius = (area.diagonal() + turned.diagonal()) / 2.0;
    let spread = svc.ftl.spawn_spread.max(0.0);

    let mut pose = Pose::new(area.center() - turned.center(), rotation);
    for _ in 0..PROXIMITY_SPAWN_ATTEMPTS {
        let direction = Vec2::from_angle(svc.rng.gen_range(0.0..TAU));
        let radius = min_radius + svc.rng.gen_range(0.0..=spread);
        let spawn = area.center() + direction * radius;
        pose = Pose::new(spawn - turned.center(), rotation);

        let footprint = turned.translated(pose.position);
        let blocked = lookup::grids_intersecting(world, map, &footprint)
            .into_iter()
            .any(|g| g != shuttle);
        if !blocked {
            break;
        }
    }
    pose
}
