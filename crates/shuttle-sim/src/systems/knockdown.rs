//! Knocks over unbuckled occupants when a shuttle jumps or lands.

use glam::Vec2;
use hecs::{Entity, World};

use shuttle_core::components::*;
use shuttle_core::constants::VENT_THROW_SPEED;

use crate::lookup;

/// Living mobs aboard `grid` that are not strapped in.
fn loose_occupants(world: &World, grid: Entity) -> Vec<Entity> {
    lookup::children_of(world, grid)
        .into_iter()
        .filter(|e| world.get::<&Mob>(*e).is_ok_and(|m| m.alive))
        .filter(|e| !world.get::<&Buckle>(*e).is_ok_and(|b| b.buckled))
        .collect()
}

/// Paralyze loose occupants for `secs`. With `vent`, occupants standing on
/// an exposed tile (or off the floor) are also thrown clear of the grid.
/// Returns how many were knocked down.
pub fn knock_over_occupants(world: &mut World, grid: Entity, secs: f32, vent: bool) -> usize {
    let occupants = loose_occupants(world, grid);
    let mut count = 0;
    for mob in &occupants {
        if let Ok(mut status) = world.get::<&mut StatusEffects>(*mob) {
            status.knock_down(secs);
            count += 1;
        }
    }
    if vent {
        for mob in occupants {
            if exposed(world, grid, mob) {
                throw_clear(world, grid, mob);
            }
        }
    }
    count
}

fn exposed(world: &World, grid: Entity, mob: Entity) -> bool {
    let Some(xf) = lookup::xform(world, mob) else {
        return false;
    };
    let Ok(g) = world.get::<&Grid>(grid) else {
        return false;
    };
    g.tile_at(xf.local.position).map_or(true, |t| t.is_exposed())
}

/// Detach a mob onto the map and send it away from the grid's center.
fn throw_clear(world: &mut World, grid: Entity, mob: Entity) {
    let (Some(map), Some(pose), Some(grid_pose)) = (
        lookup::map_of(world, grid),
        lookup::world_pose(world, mob),
        lookup::world_pose(world, grid),
    ) else {
        return;
    };
    let center = grid_pose.transform_point(lookup::grid_local_aabb(world, grid).center());
    let outward = (pose.position - center).try_normalize().unwrap_or(Vec2::Y);
    let velocity = outward * VENT_THROW_SPEED;

    lookup::set_world_pose(world, mob, map, pose);
    if lookup::has::<Body>(world, mob) {
        if let Ok(mut body) = world.get::<&mut Body>(mob) {
            body.linear_velocity = velocity;
        }
    } else {
        let mut body = Body::dynamic(0.0, Vec2::ZERO);
        body.linear_velocity = velocity;
        let _ = world.insert_one(mob, body);
    }
    log::debug!("vented {mob:?} off {grid:?}");
}
