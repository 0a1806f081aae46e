//! Docking port manager: enable/disable, dock, undock and the per-port
//! checks used by consoles and auto-dock.
//!
//! A dock pairs two ports on different grids. Both sides of a pair are
//! always updated together, so a port never reports itself docked to a
//! partner that does not report it back.

use glam::Vec2;
use hecs::{Entity, World};

use shuttle_core::components::*;
use shuttle_core::constants::*;
use shuttle_core::enums::DoorState;
use shuttle_core::events::{AudioEvent, ShuttleEvent};
use shuttle_core::types::{entity_id, JointId};
use shuttle_geometry::alignment::PORT_ANCHOR_OFFSET;
use shuttle_geometry::{angle, Pose, Shape};

use crate::joints::{linear_stiffness, WeldJoint};
use crate::lookup;
use crate::portals::PortalEnd;
use crate::services::Services;

/// Docking ports anchored to a grid, in stable order.
pub fn ports_on(world: &World, grid: Entity) -> Vec<Entity> {
    lookup::children_of(world, grid)
        .into_iter()
        .filter(|e| lookup::has::<DockingPort>(world, *e))
        .collect()
}

fn docking_fixture(radius: f32) -> Fixture {
    Fixture {
        id: DOCKING_FIXTURE.into(),
        shape: Shape::Circle {
            center: Vec2::new(0.0, -PORT_ANCHOR_OFFSET),
            radius,
        },
        hard: false,
    }
}

fn refresh_grid_of(world: &World, svc: &mut Services, port: Entity) {
    if let Some(grid) = lookup::grid_of(world, port) {
        svc.refresh_consoles(entity_id(grid));
    }
}

/// Enable an anchored port and give it its docking fixture.
pub fn enable_port(world: &mut World, svc: &mut Services, port: Entity) -> bool {
    let Some(xf) = lookup::xform(world, port) else {
        return false;
    };
    if !xf.anchored || xf.grid().is_none() {
        return false;
    }
    let radius = match world.get::<&mut DockingPort>(port) {
        Ok(mut dock) => {
            if dock.enabled() {
                return true;
            }
            dock.set_enabled(true);
            dock.radius
        }
        Err(_) => return false,
    };

    let fixture = docking_fixture(radius);
    if lookup::has::<Fixtures>(world, port) {
        if let Ok(mut fixtures) = world.get::<&mut Fixtures>(port) {
            fixtures.insert(fixture);
        }
    } else {
        let _ = world.insert_one(
            port,
            Fixtures {
                list: vec![fixture],
            },
        );
    }
    refresh_grid_of(world, svc, port);
    true
}

/// Undock if needed, then disable the port and drop its fixture.
pub fn disable_port(world: &mut World, svc: &mut Services, port: Entity) {
    undock(world, svc, port);
    match world.get::<&mut DockingPort>(port) {
        Ok(mut dock) => dock.set_enabled(false),
        Err(_) => return,
    }
    if let Ok(mut fixtures) = world.get::<&mut Fixtures>(port) {
        fixtures.remove(DOCKING_FIXTURE);
    }
    refresh_grid_of(world, svc, port);
}

/// Anchoring enables a port; unanchoring disables it.
pub fn set_anchored(world: &mut World, svc: &mut Services, port: Entity, anchored: bool) {
    match world.get::<&mut Xform>(port) {
        Ok(mut xf) => xf.anchored = anchored,
        Err(_) => return,
    }
    if anchored {
        enable_port(world, svc, port);
    } else {
        disable_port(world, svc, port);
    }
}

/// Move an anchored port to a new grid position. A docked port is
/// re-docked with the same partner.
pub fn reanchor_port(
    world: &mut World,
    svc: &mut Services,
    port: Entity,
    grid: Entity,
    local: Pose,
) {
    match world.get::<&mut Xform>(port) {
        Ok(mut xf) => *xf = Xform::on_grid(grid, local, true),
        Err(_) => return,
    }
    let partner = world
        .get::<&DockingPort>(port)
        .ok()
        .and_then(|d| d.docked_with());
    if let Some(partner) = partner {
        undock(world, svc, port);
        dock(world, svc, port, partner);
    }
}

/// Undock and delete a port.
pub fn remove_port(world: &mut World, svc: &mut Services, port: Entity) {
    undock(world, svc, port);
    svc.bus.unsubscribe_entity(port);
    refresh_grid_of(world, svc, port);
    let _ = world.despawn(port);
}

/// Weld two ports together. Validity is the caller's job; a port that is
/// missing or already docked makes this a no-op.
pub fn dock(world: &mut World, svc: &mut Services, port_a: Entity, port_b: Entity) -> bool {
    if port_a == port_b {
        log::warn!("refusing to dock port {port_a:?} to itself");
        return false;
    }
    let (port_a, port_b) = if port_a.to_bits() <= port_b.to_bits() {
        (port_a, port_b)
    } else {
        (port_b, port_a)
    };

    let free = |port: Entity| {
        world
            .get::<&DockingPort>(port)
            .map(|d| !d.docked())
            .unwrap_or(false)
    };
    if !free(port_a) || !free(port_b) {
        log::debug!("dock {port_a:?} <-> {port_b:?} skipped: port missing or already docked");
        return false;
    }

    let (Some(xform_a), Some(xform_b)) = (lookup::xform(world, port_a), lookup::xform(world, port_b))
    else {
        log::error!("dock {port_a:?} <-> {port_b:?}: port has no transform");
        return false;
    };
    let (Some(grid_a), Some(grid_b)) = (xform_a.grid(), xform_b.grid()) else {
        log::error!("dock {port_a:?} <-> {port_b:?}: port is not on a grid");
        return false;
    };
    if grid_a == grid_b {
        log::warn!("dock {port_a:?} <-> {port_b:?}: both ports are on {grid_a:?}");
        return false;
    }

    let joint = weld_grids(world, svc, (port_a, grid_a, &xform_a), (port_b, grid_b, &xform_b));

    for port in [port_a, port_b] {
        if let Ok(mut door) = world.get::<&mut Door>(port) {
            door.state = DoorState::Open;
            door.bolted = true;
            door.change_airtight = false;
            svc.audio_events.push(AudioEvent::BoltsToggled {
                door: entity_id(port),
                bolted: true,
            });
        }
    }

    let portal = svc.portals.create(
        PortalEnd {
            grid: grid_a,
            local: xform_a.local.position,
        },
        PortalEnd {
            grid: grid_b,
            local: xform_b.local.position,
        },
    );

    if let Ok(mut dock) = world.get::<&mut DockingPort>(port_a) {
        dock.attach(port_b, joint.clone(), Some(portal));
    }
    if let Ok(mut dock) = world.get::<&mut DockingPort>(port_b) {
        dock.attach(port_a, joint, Some(portal));
    }

    log::debug!("docked {port_a:?} ({grid_a:?}) <-> {port_b:?} ({grid_b:?})");
    svc.bus.publish(ShuttleEvent::Docked {
        port_a,
        port_b,
        grid_a,
        grid_b,
    });
    svc.refresh_consoles(entity_id(grid_a));
    svc.refresh_consoles(entity_id(grid_b));
    true
}

/// Create the weld between two grids. Skipped when either grid has no
/// physics body.
fn weld_grids(
    world: &World,
    svc: &mut Services,
    (port_a, grid_a, xform_a): (Entity, Entity, &Xform),
    (port_b, grid_b, xform_b): (Entity, Entity, &Xform),
) -> Option<JointId> {
    let (Some(body_a), Some(body_b)) = (
        lookup::cloned::<Body>(world, grid_a),
        lookup::cloned::<Body>(world, grid_b),
    ) else {
        log::debug!("dock {port_a:?} <-> {port_b:?}: grid without a body, no weld");
        return None;
    };
    let rotation_a = lookup::world_pose(world, grid_a).map_or(0.0, |p| p.rotation);
    let rotation_b = lookup::world_pose(world, grid_b).map_or(0.0, |p| p.rotation);
    let (stiffness, damping) = linear_stiffness(
        DOCK_JOINT_FREQUENCY,
        DOCK_JOINT_DAMPING_RATIO,
        body_a.mass,
        body_b.mass,
    );
    let id = JointId(format!(
        "{DOCKING_JOINT}-{}-{}",
        entity_id(port_a),
        entity_id(port_b)
    ));
    svc.joints.create_weld(WeldJoint {
        id: id.clone(),
        body_a: grid_a,
        body_b: grid_b,
        local_anchor_a: xform_a.local.position,
        local_anchor_b: xform_b.local.position,
        reference_angle: angle::reduce(rotation_b - rotation_a),
        stiffness,
        damping,
    });
    Some(id)
}

fn close_door(world: &mut World, svc: &mut Services, port: Entity) {
    if let Ok(mut door) = world.get::<&mut Door>(port) {
        door.state = DoorState::Closed;
        door.bolted = false;
        door.change_airtight = true;
        svc.audio_events.push(AudioEvent::BoltsToggled {
            door: entity_id(port),
            bolted: false,
        });
    }
}

/// Tear down a dock from either side. Returns `false` if the port was not
/// docked.
pub fn undock(world: &mut World, svc: &mut Services, port: Entity) -> bool {
    let detached = match world.get::<&mut DockingPort>(port) {
        Ok(mut dock) => {
            let (partner, joint, portal) = dock.detach();
            partner.map(|p| (p, joint, portal))
        }
        Err(_) => None,
    };
    let Some((partner, joint, portal)) = detached else {
        return false;
    };
    if let Some(joint) = joint {
        svc.joints.remove(&joint);
    }
    if let Some(portal) = portal {
        svc.portals.remove(portal);
    }

    let consistent = match world.get::<&mut DockingPort>(partner) {
        Ok(mut other) if other.docked_with() == Some(port) => {
            let (_, joint, portal) = other.detach();
            if let Some(joint) = joint {
                svc.joints.remove(&joint);
            }
            if let Some(portal) = portal {
                svc.portals.remove(portal);
            }
            true
        }
        Ok(other) => {
            log::error!(
                "undock {port:?}: partner {partner:?} is docked with {:?}, clearing local side only",
                other.docked_with()
            );
            false
        }
        Err(_) => {
            log::error!("undock {port:?}: partner {partner:?} is gone, clearing local side only");
            false
        }
    };

    close_door(world, svc, port);
    refresh_grid_of(world, svc, port);
    if !consistent {
        return true;
    }
    close_door(world, svc, partner);
    refresh_grid_of(world, svc, partner);

    for (this, other) in [(port, partner), (partner, port)] {
        let _ = world.insert_one(
            this,
            RecentlyDocked {
                last_docked: other,
                radius: RECENTLY_DOCKED_RADIUS,
            },
        );
    }

    let (port_a, port_b) = if port.to_bits() <= partner.to_bits() {
        (port, partner)
    } else {
        (partner, port)
    };
    match (lookup::grid_of(world, port_a), lookup::grid_of(world, port_b)) {
        (Some(grid_a), Some(grid_b)) => {
            log::debug!("undocked {port_a:?} <-> {port_b:?}");
            svc.bus.publish(ShuttleEvent::Undocked {
                port_a,
                port_b,
                grid_a,
                grid_b,
            });
        }
        _ => log::warn!("undocked {port_a:?} <-> {port_b:?} without a grid on both sides"),
    }
    true
}

/// Both ports enabled and free, on the same map, with overlapping docking
/// fixtures. Box overlap stands in for exact shape overlap.
pub fn can_dock(world: &World, port_a: Entity, port_b: Entity) -> bool {
    let ready = |port: Entity| {
        world
            .get::<&DockingPort>(port)
            .map(|d| d.enabled() && !d.docked())
            .unwrap_or(false)
    };
    if port_a == port_b || !ready(port_a) || !ready(port_b) {
        return false;
    }
    if lookup::map_of(world, port_a) != lookup::map_of(world, port_b) {
        return false;
    }
    match (
        lookup::docking_fixture_aabb(world, port_a),
        lookup::docking_fixture_aabb(world, port_b),
    ) {
        (Some(a), Some(b)) => a.intersects(&b),
        _ => false,
    }
}

pub fn try_dock(world: &mut World, svc: &mut Services, port_a: Entity, port_b: Entity) -> bool {
    if !can_dock(world, port_a, port_b) {
        return false;
    }
    dock(world, svc, port_a, port_b)
}

/// An enabled port on another grid whose docking fixture overlaps this
/// port's fixture.
pub fn get_dockable(world: &World, port: Entity) -> Option<Entity> {
    let own = lookup::docking_fixture_aabb(world, port)?;
    let map = lookup::map_of(world, port)?;
    let own_grid = lookup::grid_of(world, port);
    let radius = world.get::<&DockingPort>(port).ok()?.radius;
    let search = own.enlarged(radius * 1.5);

    for grid in lookup::grids_intersecting(world, map, &search) {
        if Some(grid) == own_grid {
            continue;
        }
        for other in ports_on(world, grid) {
            let anchored = lookup::xform(world, other).is_some_and(|x| x.anchored);
            let enabled = world
                .get::<&DockingPort>(other)
                .map(|d| d.enabled())
                .unwrap_or(false);
            if !anchored || !enabled {
                continue;
            }
            if lookup::docking_fixture_aabb(world, other).is_some_and(|b| b.intersects(&own)) {
                return Some(other);
            }
        }
    }
    None
}

/// Enable or disable every port on a grid, undocking as needed.
pub fn set_docks(world: &mut World, svc: &mut Services, grid: Entity, enabled: bool) {
    for port in ports_on(world, grid) {
        let current = world
            .get::<&DockingPort>(port)
            .map(|d| d.enabled())
            .unwrap_or(enabled);
        if current == enabled {
            continue;
        }
        if enabled {
            enable_port(world, svc, port);
        } else {
            disable_port(world, svc, port);
        }
    }
}

/// Close and bolt (or unbolt) every docking airlock on a grid.
pub fn set_dock_bolts(world: &mut World, svc: &mut Services, grid: Entity, bolted: bool) {
    for port in ports_on(world, grid) {
        if let Ok(mut door) = world.get::<&mut Door>(port) {
            door.state = DoorState::Closed;
            if door.bolted != bolted {
                door.bolted = bolted;
                svc.audio_events.push(AudioEvent::BoltsToggled {
                    door: entity_id(port),
                    bolted,
                });
            }
        }
    }
}
