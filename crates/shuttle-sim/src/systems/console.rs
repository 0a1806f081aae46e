//! Shuttle console façade: preflight checks and the actions a pilot can
//! take from a console aboard the shuttle.

use std::collections::HashMap;

use hecs::{Entity, World};

use shuttle_core::components::{FtlDestination, Shuttle, ShuttleConsole, ShuttleTags};
use shuttle_core::config::FtlConfig;
use shuttle_core::enums::FtlPhase;
use shuttle_core::error::TravelDenied;
use shuttle_core::types::TravelTarget;
use shuttle_transit::profiles::get_profile;

use crate::lookup;
use crate::services::Services;
use crate::systems::{autodock, docking, ftl};
use crate::transit::{Transit, TravelRequest};

/// Whether `shuttle` may start FTL right now.
///
/// Rejected while any transit phase is active, and while another grid of
/// at least `mass_threshold` sits within `range` of the shuttle's bounds.
pub fn can_travel(
    world: &World,
    transits: &HashMap<Entity, Transit>,
    config: &FtlConfig,
    shuttle: Entity,
) -> Result<(), TravelDenied> {
    if !lookup::has::<Shuttle>(world, shuttle) || !lookup::is_grid(world, shuttle) {
        return Err(TravelDenied::NotAShuttle);
    }
    if let Some(transit) = transits.get(&shuttle) {
        return Err(match transit.phase() {
            FtlPhase::Cooldown => TravelDenied::CoolingDown,
            _ => TravelDenied::InTransit,
        });
    }
    let (Some(map), Some(bounds)) = (
        lookup::map_of(world, shuttle),
        lookup::grid_world_aabb(world, shuttle),
    ) else {
        return Err(TravelDenied::NotAShuttle);
    };
    let blocked = lookup::grids_intersecting(world, map, &bounds.enlarged(config.range))
        .into_iter()
        .any(|grid| grid != shuttle && lookup::mass_of(world, grid) >= config.mass_threshold);
    if blocked {
        return Err(TravelDenied::Proximity);
    }
    Ok(())
}

/// Whether `shuttle` may pick `destination` as its FTL target.
pub fn can_target(world: &World, shuttle: Entity, destination: Entity) -> Result<(), TravelDenied> {
    if shuttle == destination {
        return Err(TravelDenied::SelfTarget);
    }
    let Ok(marker) = world.get::<&FtlDestination>(destination) else {
        return Err(TravelDenied::DestinationUnavailable);
    };
    if !marker.enabled() {
        return Err(TravelDenied::DestinationUnavailable);
    }
    let tags = world.get::<&ShuttleTags>(shuttle).ok();
    if !marker.allows(tags.as_deref()) {
        return Err(TravelDenied::NotWhitelisted);
    }
    Ok(())
}

/// The shuttle a console is mounted on.
fn console_shuttle(world: &World, console: Entity) -> Result<Entity, TravelDenied> {
    if !lookup::has::<ShuttleConsole>(world, console) {
        return Err(TravelDenied::NotAShuttle);
    }
    lookup::grid_of(world, console).ok_or(TravelDenied::NotAShuttle)
}

/// Pilot asks to jump to `destination`, optionally docking there.
pub fn request_ftl(
    world: &mut World,
    svc: &mut Services,
    transits: &mut HashMap<Entity, Transit>,
    console: Entity,
    destination: Entity,
    dock: bool,
) -> Result<(), TravelDenied> {
    let shuttle = console_shuttle(world, console)?;
    can_travel(world, transits, &svc.ftl, shuttle)?;
    can_target(world, shuttle, destination)?;

    let class = world
        .get::<&Shuttle>(shuttle)
        .map(|s| s.class)
        .map_err(|_| TravelDenied::NotAShuttle)?;
    let profile = get_profile(class, &svc.ftl);
    let mut request = TravelRequest::new(
        TravelTarget::Entity(destination),
        profile.startup_secs,
        profile.travel_secs,
    );
    if dock {
        request = request.docking(profile.priority_tag);
    }
    if !ftl::request(world, svc, transits, shuttle, &request) {
        return Err(TravelDenied::InTransit);
    }
    Ok(())
}

/// Undock one of the console's shuttle ports. Ports on other grids are
/// refused.
pub fn request_undock(world: &mut World, svc: &mut Services, console: Entity, port: Entity) -> bool {
    let Ok(shuttle) = console_shuttle(world, console) else {
        return false;
    };
    if lookup::grid_of(world, port) != Some(shuttle) {
        log::warn!("console {console:?} asked to undock {port:?}, which is not on its grid");
        return false;
    }
    docking::undock(world, svc, port)
}

pub fn request_autodock(world: &mut World, console: Entity, port: Entity) -> bool {
    let Ok(shuttle) = console_shuttle(world, console) else {
        return false;
    };
    if lookup::grid_of(world, port) != Some(shuttle) {
        log::warn!("console {console:?} asked to auto-dock {port:?}, which is not on its grid");
        return false;
    }
    autodock::request(world, port, console)
}

pub fn stop_autodock(world: &mut World, console: Entity, port: Entity) {
    autodock::stop(world, port, console);
}
