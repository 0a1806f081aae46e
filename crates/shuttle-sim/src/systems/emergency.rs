//! Emergency shuttle: call, station countdown, console authorizations and
//! early launch.

use std::collections::HashMap;

use hecs::{Entity, World};
use rand::Rng;

use shuttle_core::components::{Access, EmergencyConsole, Name, Shuttle};
use shuttle_core::constants::{ACCESS_COMMAND, ACCESS_REPEAL_ALL, DOCK_TAG_EMERGENCY};
use shuttle_core::enums::{AlertLevel, ShuttleClass};
use shuttle_core::types::{entity_id, sort_entities, TravelTarget};
use shuttle_transit::profiles::get_profile;

use crate::emergency::EmergencyShuttle;
use crate::lookup;
use crate::services::Services;
use crate::systems::ftl;
use crate::transit::{Transit, TravelRequest};

/// Send the emergency shuttle to the station, docking at its emergency
/// ports.
pub fn call(
    world: &mut World,
    svc: &mut Services,
    transits: &mut HashMap<Entity, Transit>,
    state: &mut EmergencyShuttle,
) -> bool {
    if state.called {
        log::debug!("emergency shuttle already called");
        return false;
    }
    let (Some(shuttle), Some(station)) = (state.shuttle, state.station) else {
        log::warn!("emergency shuttle called with no shuttle or station set up");
        return false;
    };
    let class = world
        .get::<&Shuttle>(shuttle)
        .map(|s| s.class)
        .unwrap_or(ShuttleClass::Emergency);
    let profile = get_profile(class, &svc.ftl);
    let request = TravelRequest::new(
        TravelTarget::Entity(station),
        profile.startup_secs,
        profile.travel_secs,
    )
    .docking(Some(profile.priority_tag.unwrap_or(DOCK_TAG_EMERGENCY)));
    if !ftl::request(world, svc, transits, shuttle, &request) {
        return false;
    }
    state.called = true;
    svc.announce(
        AlertLevel::Warning,
        format!(
            "An emergency shuttle has been sent. It will arrive in {} seconds.",
            (profile.startup_secs + profile.travel_secs).round()
        ),
    );
    true
}

/// Start the departure countdown when the shuttle reaches the station.
pub fn on_arrival(svc: &mut Services, state: &mut EmergencyShuttle, shuttle: Entity) {
    if state.shuttle != Some(shuttle) || !state.called || state.arrived || state.launched {
        return;
    }
    state.arrived = true;
    let docked_secs = svc.emergency.docked_secs;
    state.launch_remaining_secs = Some(docked_secs);
    svc.announce(
        AlertLevel::Warning,
        format!(
            "The emergency shuttle has docked with the station. It will leave in {} seconds.",
            docked_secs.round()
        ),
    );
}

/// Count down the station stay; launch at the startup window, depart at
/// zero. A launch the drive refuses is retried every tick and holds the
/// countdown at zero until it goes through.
pub fn update(
    world: &mut World,
    svc: &mut Services,
    transits: &mut HashMap<Entity, Transit>,
    state: &mut EmergencyShuttle,
    dt: f32,
) {
    if !state.arrived || state.departed {
        return;
    }
    let Some(remaining) = state.launch_remaining_secs.as_mut() else {
        return;
    };
    *remaining = (*remaining - dt).max(0.0);
    let remaining = *remaining;

    if !state.launched && remaining <= svc.ftl.startup_secs {
        state.launched = launch(world, svc, transits, state, remaining);
    }
    if state.launched && remaining <= 0.0 {
        state.departed = true;
        log::info!("emergency shuttle departed the station");
        svc.announce(AlertLevel::Info, "The emergency shuttle has left the station.");
    }
}

fn launch(
    world: &mut World,
    svc: &mut Services,
    transits: &mut HashMap<Entity, Transit>,
    state: &mut EmergencyShuttle,
    startup_secs: f32,
) -> bool {
    let first_attempt = state.transit_secs <= 0.0;
    if first_attempt {
        let (min, max) = (svc.emergency.min_transit_secs, svc.emergency.max_transit_secs);
        let rolled = if max > min {
            svc.rng.gen_range(min..=max)
        } else {
            min
        };
        state.transit_secs = (rolled / 10.0).round() * 10.0;
    }
    let (Some(shuttle), Some(centcomm)) = (state.shuttle, state.centcomm) else {
        if first_attempt {
            log::warn!("emergency shuttle has no central command target, staying put");
        }
        return false;
    };

    ftl::end_cooldown(svc, transits, shuttle);
    let request = TravelRequest::new(
        TravelTarget::Entity(centcomm),
        startup_secs,
        state.transit_secs,
    )
    .docking(Some(DOCK_TAG_EMERGENCY));
    if !ftl::request(world, svc, transits, shuttle, &request) {
        if first_attempt {
            log::warn!("emergency shuttle {shuttle:?} could not launch, retrying every tick");
        }
        return false;
    }
    svc.announce(
        AlertLevel::Warning,
        format!(
            "The emergency shuttle is leaving. Estimate {} seconds until it reaches central command.",
            state.transit_secs
        ),
    );
    true
}

/// Shorten the countdown to the authorize window.
pub fn early_launch(svc: &mut Services, state: &mut EmergencyShuttle) -> bool {
    if state.early_launch_authorized || !state.arrived || state.launched {
        return false;
    }
    let authorize_secs = svc.emergency.authorize_secs;
    match state.launch_remaining_secs {
        Some(remaining) if remaining > authorize_secs => {
            state.launch_remaining_secs = Some(authorize_secs);
        }
        _ => return false,
    }
    state.early_launch_authorized = true;
    if !state.early_launch_announced {
        state.early_launch_announced = true;
        svc.announce(
            AlertLevel::Critical,
            format!(
                "Early launch authorized. The emergency shuttle will leave in {} seconds.",
                authorize_secs.round()
            ),
        );
    }
    true
}

fn has_access(world: &World, user: Entity, tag: &str) -> bool {
    world.get::<&Access>(user).is_ok_and(|a| a.has(tag))
}

fn card_name(world: &World, user: Entity) -> String {
    world
        .get::<&Name>(user)
        .map(|n| n.0.clone())
        .unwrap_or_else(|_| format!("id-{}", entity_id(user)))
}

/// Why a console interaction did nothing; shown as a popup.
fn reject(svc: &mut Services, console: Entity, message: &str) -> bool {
    log::warn!("emergency console {console:?}: {message}");
    svc.popup(entity_id(console), message);
    false
}

fn console_ready(world: &World, svc: &mut Services, state: &EmergencyShuttle, console: Entity) -> bool {
    if !lookup::has::<EmergencyConsole>(world, console) {
        return reject(svc, console, "Not an emergency shuttle console.");
    }
    if !svc.emergency.early_launch_allowed {
        return reject(svc, console, "Early launch is not allowed.");
    }
    if state.early_launch_authorized || !state.arrived || state.launched {
        return reject(svc, console, "The emergency shuttle cannot be launched early now.");
    }
    true
}

fn remaining_announcement(svc: &mut Services, count: usize, prefix: &str) {
    let needed = svc.emergency.authorizations_required.saturating_sub(count);
    svc.announce(
        AlertLevel::Warning,
        format!("{prefix} {needed} authorizations needed until the shuttle is launched early."),
    );
}

/// Swipe a card. Enough distinct command authorizations launch early.
pub fn authorize(
    world: &mut World,
    svc: &mut Services,
    state: &mut EmergencyShuttle,
    console: Entity,
    user: Entity,
) -> bool {
    if !console_ready(world, svc, state, console) {
        return false;
    }
    if !has_access(world, user, ACCESS_COMMAND) {
        return reject(svc, console, "Access denied.");
    }
    let name = card_name(world, user);
    let count = {
        let Ok(mut panel) = world.get::<&mut EmergencyConsole>(console) else {
            return false;
        };
        if panel.authorized.contains(&name) {
            return false;
        }
        panel.authorized.push(name.clone());
        panel.authorized.len()
    };
    log::info!("{name} authorized early launch at {console:?}");
    remaining_announcement(svc, count, &format!("{name} has authorized early launch."));
    if let Some(grid) = lookup::grid_of(world, console) {
        svc.refresh_consoles(entity_id(grid));
    }
    if count >= svc.emergency.authorizations_required {
        early_launch(svc, state);
    }
    true
}

/// Withdraw one card holder's authorization.
pub fn repeal(
    world: &mut World,
    svc: &mut Services,
    state: &mut EmergencyShuttle,
    console: Entity,
    user: Entity,
) -> bool {
    if !console_ready(world, svc, state, console) {
        return false;
    }
    if !has_access(world, user, ACCESS_COMMAND) {
        return reject(svc, console, "Access denied.");
    }
    let name = card_name(world, user);
    let count = {
        let Ok(mut panel) = world.get::<&mut EmergencyConsole>(console) else {
            return false;
        };
        let before = panel.authorized.len();
        panel.authorized.retain(|n| *n != name);
        if panel.authorized.len() == before {
            return false;
        }
        panel.authorized.len()
    };
    remaining_announcement(svc, count, "Early launch authorization revoked.");
    if let Some(grid) = lookup::grid_of(world, console) {
        svc.refresh_consoles(entity_id(grid));
    }
    true
}

/// Clear every authorization on a console. Needs the repeal-all access.
pub fn repeal_all(
    world: &mut World,
    svc: &mut Services,
    state: &mut EmergencyShuttle,
    console: Entity,
    user: Entity,
) -> bool {
    if !console_ready(world, svc, state, console) {
        return false;
    }
    if !has_access(world, user, ACCESS_REPEAL_ALL) {
        return reject(svc, console, "Access denied.");
    }
    if let Ok(mut panel) = world.get::<&mut EmergencyConsole>(console) {
        panel.authorized.clear();
    }
    remaining_announcement(svc, 0, "All early launch authorizations revoked.");
    if let Some(grid) = lookup::grid_of(world, console) {
        svc.refresh_consoles(entity_id(grid));
    }
    true
}

/// Names authorized on every emergency console, in console order.
pub fn authorized_names(world: &World) -> Vec<String> {
    let mut consoles: Vec<Entity> = world
        .query::<&EmergencyConsole>()
        .iter()
        .map(|(e, _)| e)
        .collect();
    sort_entities(&mut consoles);
    let mut names: Vec<String> = Vec::new();
    for console in consoles {
        if let Ok(panel) = world.get::<&EmergencyConsole>(console) {
            for name in &panel.authorized {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
    }
    names
}
