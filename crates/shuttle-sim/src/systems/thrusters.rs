//! Thruster locks applied while a shuttle is in transit.

use hecs::{Entity, World};

use shuttle_core::components::{Shuttle, Thruster};
use shuttle_core::enums::Direction;

use crate::lookup;

/// Stop all linear thrust.
pub fn disable_linear(world: &mut World, shuttle: Entity) {
    if let Ok(mut s) = world.get::<&mut Shuttle>(shuttle) {
        s.linear_thrust = 0;
    }
    refresh(world, shuttle);
}

/// Thrust in exactly one direction.
pub fn enable_linear_direction(world: &mut World, shuttle: Entity, direction: Direction) {
    if let Ok(mut s) = world.get::<&mut Shuttle>(shuttle) {
        s.linear_thrust = direction.flag();
    }
    refresh(world, shuttle);
}

pub fn set_angular(world: &mut World, shuttle: Entity, enabled: bool) {
    if let Ok(mut s) = world.get::<&mut Shuttle>(shuttle) {
        s.angular_thrust = enabled;
    }
}

/// Sync each thruster's firing state with the shuttle's thrust mask.
fn refresh(world: &mut World, shuttle: Entity) {
    let mask = world
        .get::<&Shuttle>(shuttle)
        .map(|s| s.linear_thrust)
        .unwrap_or(0);
    for thruster in lookup::children_of(world, shuttle) {
        if let Ok(mut t) = world.get::<&mut Thruster>(thruster) {
            t.firing = mask & t.direction.flag() != 0;
        }
    }
}
