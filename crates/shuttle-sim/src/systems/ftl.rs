//! FTL transit system.
//!
//! `request` locks a shuttle down and starts its clock; `run` advances every
//! clock and applies the side effects of each phase change:
//!
//! - Travelling: knock occupants over, park the grid on the staging map and
//!   let it cruise with its airlocks bolted.
//! - Arriving: swap thrusters to braking.
//! - Cooldown: land at the destination (dock, proximity, coordinates or the
//!   fallback map), ground it on planets, flatten whatever was underneath.
//! - Expired: drop the transit.

use std::collections::HashMap;

use glam::Vec2;
use hecs::{Entity, World};

use shuttle_core::components::{Body, FtlDestination};
use shuttle_core::constants::*;
use shuttle_core::enums::{BodyType, Direction, FtlPhase, MapSurface};
use shuttle_core::events::{AudioEvent, Notice, ShuttleEvent};
use shuttle_core::types::{entity_id, sort_entities, MapId, TravelTarget};
use shuttle_geometry::Pose;
use shuttle_transit::fsm::{TransitStep, TransitTimings};

use crate::lookup;
use crate::services::Services;
use crate::systems::{dock_search, docking, flatten, knockdown, proximity, thrusters};
use crate::transit::{Transit, TravelRequest};

/// Positioned-sound range for a grid: its larger side plus padding.
pub fn sound_range(world: &World, entity: Entity) -> f32 {
    if !lookup::is_grid(world, entity) || lookup::is_open_map(world, entity) {
        return SOUND_RANGE_DEFAULT;
    }
    let bounds = lookup::grid_local_aabb(world, entity);
    bounds.width().max(bounds.height()) + SOUND_RANGE_PADDING
}

/// Start a transit. A shuttle already in transit is left alone.
pub fn request(
    world: &mut World,
    svc: &mut Services,
    transits: &mut HashMap<Entity, Transit>,
    shuttle: Entity,
    request: &TravelRequest,
) -> bool {
    if transits.contains_key(&shuttle) {
        log::debug!("{shuttle:?} is already in transit, ignoring travel request");
        return false;
    }
    if !lookup::is_grid(world, shuttle) || lookup::is_open_map(world, shuttle) {
        log::warn!("travel requested for {shuttle:?}, which is not a grid");
        return false;
    }

    if let Ok(mut destination) = world.get::<&mut FtlDestination>(shuttle) {
        destination.set_enabled(false);
    }
    thrusters::enable_linear_direction(world, shuttle, Direction::North);
    thrusters::set_angular(world, shuttle, false);
    docking::set_docks(world, svc, shuttle, false);

    let timings = TransitTimings::new(request.startup_secs, request.travel_secs, &svc.ftl);
    transits.insert(shuttle, Transit::new(shuttle, request, timings));

    svc.audio_events.push(AudioEvent::FtlStartup {
        shuttle: entity_id(shuttle),
        range: sound_range(world, shuttle),
    });
    svc.staging.ensure(world, &mut svc.maps);
    svc.refresh_consoles(entity_id(shuttle));
    log::debug!(
        "{shuttle:?} spooling FTL: {}s startup, {}s travel",
        timings.startup_secs,
        timings.travel_secs
    );
    true
}

/// Cut a shuttle's arrival cooldown short. Returns false when the shuttle
/// is not cooling down.
pub fn end_cooldown(
    svc: &mut Services,
    transits: &mut HashMap<Entity, Transit>,
    shuttle: Entity,
) -> bool {
    if transits.get(&shuttle).map(|t| t.phase()) != Some(FtlPhase::Cooldown) {
        return false;
    }
    transits.remove(&shuttle);
    svc.refresh_consoles(entity_id(shuttle));
    log::debug!("{shuttle:?} FTL cooldown cut short");
    true
}

/// Advance every transit by `dt`. Returns the shuttles that arrived this
/// tick.
pub fn run(
    world: &mut World,
    svc: &mut Services,
    transits: &mut HashMap<Entity, Transit>,
    dt: f32,
) -> Vec<Entity> {
    let mut shuttles: Vec<Entity> = transits.keys().copied().collect();
    sort_entities(&mut shuttles);

    let mut arrived = Vec::new();
    for shuttle in shuttles {
        if !world.contains(shuttle) {
            log::warn!("{shuttle:?} was deleted mid-transit, dropping its transit");
            transits.remove(&shuttle);
            continue;
        }
        let Some(transit) = transits.get_mut(&shuttle) else {
            continue;
        };
        match transit.clock.advance(dt) {
            TransitStep::Hold => {}
            TransitStep::Enter(FtlPhase::Starting) => {}
            TransitStep::Enter(FtlPhase::Travelling) => {
                log::debug!("{shuttle:?} entering FTL");
                depart(world, svc, shuttle, transit.target);
            }
            TransitStep::Enter(FtlPhase::Arriving) => {
                log::debug!("{shuttle:?} braking for arrival");
                thrusters::enable_linear_direction(world, shuttle, Direction::South);
            }
            TransitStep::Enter(FtlPhase::Cooldown) => {
                let transit = transit.clone();
                arrive(world, svc, &transit);
                arrived.push(shuttle);
            }
            TransitStep::Expired => {
                log::debug!("{shuttle:?} FTL drive cooled down");
                transits.remove(&shuttle);
                svc.refresh_consoles(entity_id(shuttle));
            }
        }
    }
    arrived
}

/// Starting → Travelling: move to the staging map and cruise.
fn depart(world: &mut World, svc: &mut Services, shuttle: Entity, target: TravelTarget) {
    knockdown::knock_over_occupants(world, shuttle, svc.ftl.knockdown_secs, true);

    let origin_map = lookup::map_of(world, shuttle);
    let origin = lookup::world_pose(world, shuttle).unwrap_or_default();

    let staging = svc.staging.ensure(world, &mut svc.maps);
    let bounds = lookup::grid_local_aabb(world, shuttle);
    let slot = svc.staging.reserve_slot(bounds.width(), svc.ftl.staging_buffer);
    lookup::set_world_pose(world, shuttle, staging, Pose::new(slot - bounds.center(), 0.0));

    if let Ok(mut body) = world.get::<&mut Body>(shuttle) {
        body.body_type = BodyType::Dynamic;
        body.linear_velocity = Vec2::new(0.0, svc.ftl.cruise_speed);
        body.angular_velocity = 0.0;
        body.linear_damping = 0.0;
        body.angular_damping = 0.0;
    }
    docking::set_dock_bolts(world, svc, shuttle, true);

    match origin_map {
        Some(origin_map) => svc.bus.publish(ShuttleEvent::TransitStarted {
            shuttle,
            origin_map,
            origin,
            target,
        }),
        None => log::error!("{shuttle:?} left for FTL without an origin map"),
    }
    svc.audio_events.push(AudioEvent::TravelAmbienceStart {
        shuttle: entity_id(shuttle),
    });
}

/// Arriving → Cooldown: place the shuttle at its destination.
fn arrive(world: &mut World, svc: &mut Services, transit: &Transit) {
    let shuttle = transit.shuttle;
    knockdown::knock_over_occupants(world, shuttle, svc.ftl.knockdown_secs, false);
    docking::set_dock_bolts(world, svc, shuttle, false);
    docking::set_docks(world, svc, shuttle, true);

    if let Ok(mut body) = world.get::<&mut Body>(shuttle) {
        body.stop();
        body.linear_damping = SHUTTLE_LINEAR_DAMPING;
        body.angular_damping = SHUTTLE_ANGULAR_DAMPING;
    }

    let map = resolve_destination(world, svc, transit);

    if let Some(map) = map {
        let grounded = svc.maps.surface(world, map) == Some(MapSurface::Planet);
        if let Ok(mut body) = world.get::<&mut Body>(shuttle) {
            body.body_type = if grounded {
                BodyType::Static
            } else {
                BodyType::Dynamic
            };
        }
    }

    thrusters::disable_linear(world, shuttle);
    thrusters::set_angular(world, shuttle, false);
    let range = sound_range(world, shuttle);
    svc.audio_events.push(AudioEvent::TravelAmbienceStop {
        shuttle: entity_id(shuttle),
    });
    svc.audio_events.push(AudioEvent::FtlArrival {
        shuttle: entity_id(shuttle),
        range,
    });
    if let Ok(mut destination) = world.get::<&mut FtlDestination>(shuttle) {
        destination.set_enabled(true);
    }

    let Some(map) = map else {
        log::error!("{shuttle:?} has nowhere to arrive, left on the staging map");
        return;
    };
    if svc.maps.set_paused(world, map, false) {
        log::debug!("unpaused {map} for arriving {shuttle:?}");
        svc.notices.push(Notice::MapUnpaused { map });
    }

    let mut ledger = flatten::FlattenLedger::new();
    flatten::run(world, shuttle, svc.ftl.flatten_margin, &mut ledger);

    log::debug!("{shuttle:?} arrived on {map}");
    svc.bus.publish(ShuttleEvent::TransitCompleted { shuttle, map });
    svc.refresh_consoles(entity_id(shuttle));
}

/// Put the shuttle where the transit was headed, falling back to the
/// lowest map when the target is gone.
fn resolve_destination(world: &mut World, svc: &mut Services, transit: &Transit) -> Option<MapId> {
    let shuttle = transit.shuttle;
    match transit.target {
        TravelTarget::Entity(target) if world.contains(target) => {
            let Some(map) = lookup::map_of(world, target) else {
                return fallback(world, svc, shuttle);
            };
            if transit.dock {
                if let Some(config) = dock_search::get_docking_config(
                    world,
                    shuttle,
                    target,
                    transit.priority_tag.as_deref(),
                ) {
                    lookup::set_world_pose(world, shuttle, config.map, config.pose());
                    for (port_a, port_b) in &config.docks {
                        docking::dock(world, svc, *port_a, *port_b);
                    }
                    return Some(config.map);
                }
                log::debug!("{shuttle:?} found no way to dock with {target:?}, landing nearby");
            }
            proximity::place_near(world, svc, shuttle, target);
            Some(map)
        }
        TravelTarget::Entity(target) => {
            log::warn!("FTL target {target:?} no longer exists");
            fallback(world, svc, shuttle)
        }
        TravelTarget::Coordinates { map, position } => {
            if !svc.maps.exists(map) {
                log::warn!("FTL target {map} no longer exists");
                return fallback(world, svc, shuttle);
            }
            lookup::set_world_pose(world, shuttle, map, Pose::new(position, 0.0));
            Some(map)
        }
    }
}

fn fallback(world: &mut World, svc: &mut Services, shuttle: Entity) -> Option<MapId> {
    let Some(map) = svc.maps.lowest(svc.staging.map()) else {
        log::error!("no map left for {shuttle:?} to arrive on");
        return None;
    };
    let map_entity = svc.maps.entity(map)?;
    proximity::place_near(world, svc, shuttle, map_entity);
    Some(map)
}
