//! Auto-dock: ports marked by a console keep trying to dock every tick.

use hecs::{Entity, World};

use shuttle_core::components::{AutoDock, DockingPort, RecentlyDocked};
use shuttle_core::types::sort_entities;

use crate::lookup;
use crate::services::Services;
use crate::systems::docking;

/// Add `console` to the requesters of `port`.
pub fn request(world: &mut World, port: Entity, console: Entity) -> bool {
    if !lookup::has::<DockingPort>(world, port) {
        return false;
    }
    if lookup::has::<AutoDock>(world, port) {
        if let Ok(mut auto) = world.get::<&mut AutoDock>(port) {
            if !auto.requesters.contains(&console) {
                auto.requesters.push(console);
            }
        }
    } else {
        let _ = world.insert_one(
            port,
            AutoDock {
                requesters: vec![console],
            },
        );
    }
    true
}

/// Withdraw a console's request; the last one out removes the marker.
pub fn stop(world: &mut World, port: Entity, console: Entity) {
    let empty = match world.get::<&mut AutoDock>(port) {
        Ok(mut auto) => {
            auto.requesters.retain(|c| *c != console);
            auto.requesters.is_empty()
        }
        Err(_) => return,
    };
    if empty {
        let _ = world.remove_one::<AutoDock>(port);
    }
}

/// Try to dock every undocked auto-dock port with whatever it touches.
/// Returns how many docks were made.
pub fn run(world: &mut World, svc: &mut Services) -> usize {
    let mut ports: Vec<Entity> = world
        .query::<(&AutoDock, &DockingPort)>()
        .iter()
        .filter(|(_, (_, dock))| !dock.docked())
        .map(|(e, _)| e)
        .collect();
    sort_entities(&mut ports);

    let mut docked = 0;
    for port in ports {
        let Some(other) = docking::get_dockable(world, port) else {
            continue;
        };
        let recent = world
            .get::<&RecentlyDocked>(port)
            .is_ok_and(|r| r.last_docked == other);
        if recent {
            continue;
        }
        if docking::try_dock(world, svc, port, other) {
            log::debug!("auto-docked {port:?} with {other:?}");
            docked += 1;
        }
    }
    docked
}
