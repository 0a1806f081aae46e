//! Clears the recently-docked marker once two ports have drifted apart.

use hecs::{Entity, World};

use shuttle_core::components::RecentlyDocked;

use crate::lookup;

pub fn run(world: &mut World) {
    let markers: Vec<(Entity, RecentlyDocked)> = world
        .query::<&RecentlyDocked>()
        .iter()
        .map(|(e, r)| (e, *r))
        .collect();

    for (port, marker) in markers {
        let partner = marker.last_docked;
        let separated = !world.contains(partner)
            || lookup::map_of(world, port) != lookup::map_of(world, partner)
            || match (
                lookup::world_position(world, port),
                lookup::world_position(world, partner),
            ) {
                (Some(a), Some(b)) => a.distance(b) > marker.radius,
                _ => true,
            };
        if separated {
            let _ = world.remove_one::<RecentlyDocked>(port);
        }
    }
}
