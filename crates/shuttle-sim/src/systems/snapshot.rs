//! Snapshot system: queries the ECS world and builds a `ShuttleSnapshot`.
//!
//! This system is read-only; it never modifies the world.

use std::collections::HashMap;

use hecs::{Entity, World};

use shuttle_core::components::*;
use shuttle_core::config::EmergencyConfig;
use shuttle_core::events::{AudioEvent, EventView, Notice};
use shuttle_core::state::*;
use shuttle_core::types::{entity_id, sort_entities, SimTime, TravelTarget};

use crate::emergency::EmergencyShuttle;
use crate::lookup;
use crate::systems::emergency;
use crate::transit::Transit;

/// Build a complete snapshot from the current world state.
pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    transits: &HashMap<Entity, Transit>,
    state: &EmergencyShuttle,
    config: &EmergencyConfig,
    events: Vec<EventView>,
    audio_events: Vec<AudioEvent>,
    notices: Vec<Notice>,
) -> ShuttleSnapshot {
    ShuttleSnapshot {
        time: *time,
        transits: build_transits(transits),
        ports: build_ports(world),
        emergency: state.view(emergency::authorized_names(world), config),
        events,
        audio_events,
        notices,
    }
}

fn build_transits(transits: &HashMap<Entity, Transit>) -> Vec<TransitView> {
    let mut shuttles: Vec<Entity> = transits.keys().copied().collect();
    sort_entities(&mut shuttles);
    shuttles
        .into_iter()
        .filter_map(|shuttle| transits.get(&shuttle))
        .map(|transit| TransitView {
            shuttle: entity_id(transit.shuttle),
            phase: transit.phase(),
            remaining_secs: transit.remaining_secs(),
            target: match transit.target {
                TravelTarget::Coordinates { map, position } => {
                    TargetView::Coordinates { map, position }
                }
                TravelTarget::Entity(target) => TargetView::Entity {
                    id: entity_id(target),
                },
            },
            dock: transit.dock,
            priority_tag: transit.priority_tag.clone(),
        })
        .collect()
}

fn build_ports(world: &World) -> Vec<PortView> {
    let mut ports: Vec<PortView> = world
        .query::<&DockingPort>()
        .iter()
        .map(|(entity, dock)| PortView {
            port: entity_id(entity),
            grid: lookup::grid_of(world, entity).map(entity_id),
            enabled: dock.enabled(),
            docked_with: dock.docked_with().map(entity_id),
            priority_tag: dock.priority_tag.clone(),
            autodock: lookup::has::<AutoDock>(world, entity),
        })
        .collect();
    ports.sort_by_key(|p| p.port);
    ports
}
