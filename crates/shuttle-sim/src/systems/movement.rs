//! Kinematic integration system.
//!
//! Moves dynamic bodies rooted on unpaused maps: position += velocity * dt,
//! then damps velocity. Children follow their grid through `Xform`.

use std::collections::BTreeSet;

use hecs::World;

use shuttle_core::components::{Body, MapComponent, Parent, Xform};
use shuttle_core::enums::BodyType;
use shuttle_core::types::MapId;
use shuttle_geometry::angle;

/// Run kinematic integration for every dynamic map-rooted body.
pub fn run(world: &mut World, dt: f32) {
    let paused: BTreeSet<MapId> = world
        .query::<&MapComponent>()
        .iter()
        .filter(|(_, m)| m.paused)
        .map(|(_, m)| m.id)
        .collect();

    for (_entity, (xf, body)) in world.query_mut::<(&mut Xform, &mut Body)>() {
        let Parent::Map(map) = xf.parent else {
            continue;
        };
        if body.body_type != BodyType::Dynamic || paused.contains(&map) {
            continue;
        }
        xf.local.position += body.linear_velocity * dt;
        xf.local.rotation = angle::reduce(xf.local.rotation + body.angular_velocity * dt);
        body.linear_velocity *= 1.0 / (1.0 + dt * body.linear_damping);
        body.angular_velocity *= 1.0 / (1.0 + dt * body.angular_damping);
    }
}
