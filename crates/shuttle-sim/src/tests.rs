//! Tests for the docking manager, dock search, placement, flatten and the
//! smaller per-tick systems.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::f32::consts::FRAC_PI_2;
use std::rc::Rc;

use glam::Vec2;
use hecs::{Entity, World};

use shuttle_core::components::*;
use shuttle_core::config::{EmergencyConfig, FtlConfig};
use shuttle_core::constants::*;
use shuttle_core::enums::*;
use shuttle_core::error::TravelDenied;
use shuttle_core::events::{EventKind, ShuttleEvent};
use shuttle_core::types::MapId;
use shuttle_geometry::{Aabb, Pose};

use crate::bus::EventBus;
use crate::joints::linear_stiffness;
use crate::lookup;
use crate::services::Services;
use crate::systems::flatten::{self, FlattenLedger};
use crate::systems::*;
use crate::world_setup;

fn services() -> Services {
    Services::new(7, FtlConfig::default(), EmergencyConfig::default())
}

fn approx(a: Vec2, b: Vec2) -> bool {
    (a - b).length() < 1e-3
}

/// A 10x10 station at the origin with a north-facing port on its top edge,
/// and a 5x3 shuttle far to the east with a south-facing port.
struct Scene {
    world: World,
    svc: Services,
    map: MapId,
    map_entity: Entity,
    station: Entity,
    station_port: Entity,
    shuttle: Entity,
    shuttle_port: Entity,
}

fn scene() -> Scene {
    let mut world = World::new();
    let mut svc = services();
    let (map, map_entity) = svc.maps.create(&mut world, MapSurface::Space);
    let station =
        world_setup::spawn_station(&mut world, map, Grid::rect((0, 0), (9, 9)), Pose::IDENTITY);
    let station_port = world_setup::spawn_docking_port(
        &mut world,
        &mut svc,
        station,
        (5, 9),
        Direction::North,
        None,
    );
    let shuttle = world_setup::spawn_shuttle(
        &mut world,
        map,
        Grid::rect((0, 0), (4, 2)),
        Pose::from_position(Vec2::new(300.0, 0.0)),
        ShuttleClass::Standard,
    );
    let shuttle_port = world_setup::spawn_docking_port(
        &mut world,
        &mut svc,
        shuttle,
        (2, 0),
        Direction::South,
        None,
    );
    Scene {
        world,
        svc,
        map,
        map_entity,
        station,
        station_port,
        shuttle,
        shuttle_port,
    }
}

/// Put the scene's shuttle where its port meets the station port.
fn park_adjacent(s: &mut Scene) {
    lookup::set_world_pose(
        &mut s.world,
        s.shuttle,
        s.map,
        Pose::from_position(Vec2::new(3.0, 10.0)),
    );
}

fn port(world: &World, entity: Entity) -> DockingPort {
    (*world.get::<&DockingPort>(entity).unwrap()).clone()
}

// ---- Event bus ----

#[test]
fn test_bus_runs_local_handlers_before_global() {
    let mut world = World::new();
    let a = world.spawn(());
    let b = world.spawn(());
    let grid = world.spawn(());
    let order = Rc::new(RefCell::new(Vec::new()));

    let mut bus = EventBus::new();
    let o = order.clone();
    bus.subscribe(EventKind::Docked, Box::new(move |_| o.borrow_mut().push("global")));
    let o = order.clone();
    bus.subscribe_local(a, EventKind::Docked, Box::new(move |_| o.borrow_mut().push("a")));
    let o = order.clone();
    bus.subscribe_local(a, EventKind::Undocked, Box::new(move |_| o.borrow_mut().push("a-undock")));

    bus.publish(ShuttleEvent::Docked {
        port_a: a,
        port_b: b,
        grid_a: grid,
        grid_b: grid,
    });
    assert_eq!(*order.borrow(), vec!["a", "global"]);
    assert_eq!(bus.pending().len(), 1);
    assert_eq!(bus.drain().len(), 1);
    assert!(bus.drain().is_empty());

    bus.unsubscribe_entity(a);
    bus.publish(ShuttleEvent::Docked {
        port_a: a,
        port_b: b,
        grid_a: grid,
        grid_b: grid,
    });
    assert_eq!(*order.borrow(), vec!["a", "global", "global"]);
}

// ---- Joints, staging, maps ----

#[test]
fn test_linear_stiffness_uses_reduced_mass() {
    let omega = std::f32::consts::TAU * 2.0;
    let (k, d) = linear_stiffness(2.0, 0.7, 100.0, 100.0);
    assert!((k - 50.0 * omega * omega).abs() < 1e-2);
    assert!((d - 2.0 * 50.0 * 0.7 * omega).abs() < 1e-3);

    // A static side contributes nothing.
    let (k_static, _) = linear_stiffness(2.0, 0.7, 100.0, 0.0);
    assert!((k_static - 100.0 * omega * omega).abs() < 1e-2);
    // Heavier pairs are stiffer.
    let (k_heavy, _) = linear_stiffness(2.0, 0.7, 1000.0, 1000.0);
    assert!(k_heavy > k);
}

#[test]
fn test_staging_slots_pack_side_by_side() {
    let mut svc = services();
    let first = svc.staging.reserve_slot(10.0, 5.0);
    let second = svc.staging.reserve_slot(4.0, 5.0);
    assert!(approx(first, Vec2::new(5.0, 0.0)));
    assert!(approx(second, Vec2::new(17.0, 0.0)));
    assert_eq!(svc.staging.next_offset(), 24.0);
}

#[test]
fn test_staging_map_is_lazy_and_reset_clears_it() {
    let mut world = World::new();
    let mut svc = services();
    assert!(svc.staging.map().is_none());
    let id = svc.staging.ensure(&mut world, &mut svc.maps);
    assert_eq!(svc.staging.ensure(&mut world, &mut svc.maps), id);

    let item = world_setup::spawn_item(&mut world, id, Vec2::ZERO);
    svc.staging.reserve_slot(10.0, 5.0);
    svc.staging.reset(&mut world, &mut svc.maps);

    assert!(svc.staging.map().is_none());
    assert!(!svc.maps.exists(id));
    assert!(!world.contains(item));
    assert_eq!(svc.staging.next_offset(), 0.0);
}

#[test]
fn test_map_delete_despawns_rooted_entities() {
    let mut s = scene();
    assert!(s.svc.maps.delete(&mut s.world, s.map));
    assert!(!s.world.contains(s.station));
    assert!(!s.world.contains(s.station_port));
    assert!(!s.world.contains(s.shuttle_port));
    assert!(!s.world.contains(s.map_entity));
}

#[test]
fn test_lowest_map_skips_excluded() {
    let mut world = World::new();
    let mut svc = services();
    let (first, _) = svc.maps.create(&mut world, MapSurface::Space);
    let (second, _) = svc.maps.create(&mut world, MapSurface::Planet);
    assert_eq!(svc.maps.lowest(None), Some(first));
    assert_eq!(svc.maps.lowest(Some(first)), Some(second));
    assert_eq!(svc.maps.surface(&world, second), Some(MapSurface::Planet));
}

// ---- Docking port manager ----

#[test]
fn test_enabled_port_has_docking_fixture() {
    let s = scene();
    assert!(port(&s.world, s.station_port).enabled());
    let fixtures = s.world.get::<&Fixtures>(s.station_port).unwrap();
    let fixture = fixtures.get(DOCKING_FIXTURE).unwrap();
    assert!(!fixture.hard);
    let bounds = lookup::docking_fixture_aabb(&s.world, s.station_port).unwrap();
    assert!(approx(bounds.center(), Vec2::new(5.5, 10.0)));
}

#[test]
fn test_dock_pairs_both_ports_with_one_joint() {
    let mut s = scene();
    park_adjacent(&mut s);
    assert!(docking::can_dock(&s.world, s.shuttle_port, s.station_port));
    assert!(docking::dock(&mut s.world, &mut s.svc, s.shuttle_port, s.station_port));

    assert_eq!(port(&s.world, s.shuttle_port).docked_with(), Some(s.station_port));
    assert_eq!(port(&s.world, s.station_port).docked_with(), Some(s.shuttle_port));
    assert_eq!(s.svc.joints.len(), 1);
    assert_eq!(s.svc.portals.len(), 1);

    let door = *s.world.get::<&Door>(s.shuttle_port).unwrap();
    assert_eq!(door.state, DoorState::Open);
    assert!(door.bolted);
    assert!(!door.change_airtight);

    // Second call in either order is a no-op.
    assert!(!docking::dock(&mut s.world, &mut s.svc, s.shuttle_port, s.station_port));
    assert!(!docking::dock(&mut s.world, &mut s.svc, s.station_port, s.shuttle_port));
    assert_eq!(s.svc.joints.len(), 1);

    let events = s.svc.bus.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind(), EventKind::Docked);
}

#[test]
fn test_dock_joint_uses_grid_masses_and_relative_angle() {
    let mut s = scene();
    park_adjacent(&mut s);
    docking::dock(&mut s.world, &mut s.svc, s.shuttle_port, s.station_port);
    let joint_id = port(&s.world, s.station_port).joint().cloned().unwrap();
    let joint = s.svc.joints.get(&joint_id).unwrap();
    let (k, _) = linear_stiffness(2.0, 0.7, 100.0 * TILE_MASS, 15.0 * TILE_MASS);
    assert!((joint.stiffness - k).abs() / k < 1e-4);
    assert!(joint.reference_angle.abs() < 1e-4);
    assert_eq!(s.svc.joints.joints_of(s.station).count(), 1);
}

#[test]
fn test_dock_without_bodies_skips_weld() {
    let mut s = scene();
    park_adjacent(&mut s);
    s.world.remove_one::<Body>(s.station).unwrap();
    assert!(docking::dock(&mut s.world, &mut s.svc, s.shuttle_port, s.station_port));
    assert!(s.svc.joints.is_empty());
    assert!(port(&s.world, s.shuttle_port).docked());
    assert!(port(&s.world, s.station_port).docked());
    assert_eq!(s.svc.portals.len(), 1);
}

#[test]
fn test_undock_clears_both_sides() {
    let mut s = scene();
    park_adjacent(&mut s);
    docking::dock(&mut s.world, &mut s.svc, s.shuttle_port, s.station_port);
    s.svc.bus.drain();

    assert!(docking::undock(&mut s.world, &mut s.svc, s.station_port));
    assert!(!port(&s.world, s.shuttle_port).docked());
    assert!(!port(&s.world, s.station_port).docked());
    assert!(s.svc.joints.is_empty());
    assert!(s.svc.portals.is_empty());

    let door = *s.world.get::<&Door>(s.station_port).unwrap();
    assert_eq!(door.state, DoorState::Closed);
    assert!(!door.bolted);
    assert!(door.change_airtight);

    let recent = *s.world.get::<&RecentlyDocked>(s.shuttle_port).unwrap();
    assert_eq!(recent.last_docked, s.station_port);
    assert_eq!(recent.radius, RECENTLY_DOCKED_RADIUS);
    assert!(lookup::has::<RecentlyDocked>(&s.world, s.station_port));

    let events = s.svc.bus.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind(), EventKind::Undocked);
    assert!(!docking::undock(&mut s.world, &mut s.svc, s.station_port));
}

#[test]
fn test_undock_with_one_sided_pairing_repairs_local_side() {
    let mut s = scene();
    s.world
        .get::<&mut DockingPort>(s.shuttle_port)
        .unwrap()
        .attach(s.station_port, None, None);

    assert!(docking::undock(&mut s.world, &mut s.svc, s.shuttle_port));
    assert!(!port(&s.world, s.shuttle_port).docked());
    assert!(!port(&s.world, s.station_port).docked());
    assert!(s.svc.bus.drain().is_empty());
}

#[test]
fn test_can_dock_requires_enabled_overlapping_ports() {
    let mut s = scene();
    assert!(!docking::can_dock(&s.world, s.shuttle_port, s.station_port));
    park_adjacent(&mut s);
    assert!(docking::can_dock(&s.world, s.shuttle_port, s.station_port));
    assert!(!docking::can_dock(&s.world, s.shuttle_port, s.shuttle_port));

    docking::disable_port(&mut s.world, &mut s.svc, s.station_port);
    assert!(!docking::can_dock(&s.world, s.shuttle_port, s.station_port));
    assert!(!docking::try_dock(&mut s.world, &mut s.svc, s.shuttle_port, s.station_port));
}

#[test]
fn test_unanchoring_port_undocks_and_drops_fixture() {
    let mut s = scene();
    park_adjacent(&mut s);
    docking::dock(&mut s.world, &mut s.svc, s.shuttle_port, s.station_port);

    docking::set_anchored(&mut s.world, &mut s.svc, s.shuttle_port, false);
    assert!(!port(&s.world, s.shuttle_port).enabled());
    assert!(!port(&s.world, s.station_port).docked());
    assert!(lookup::docking_fixture_aabb(&s.world, s.shuttle_port).is_none());

    docking::set_anchored(&mut s.world, &mut s.svc, s.shuttle_port, true);
    assert!(port(&s.world, s.shuttle_port).enabled());
    assert!(lookup::docking_fixture_aabb(&s.world, s.shuttle_port).is_some());
}

#[test]
fn test_reanchor_redocks_same_partner() {
    let mut s = scene();
    park_adjacent(&mut s);
    docking::dock(&mut s.world, &mut s.svc, s.shuttle_port, s.station_port);
    let local = world_setup::port_pose((2, 0), Direction::South);

    docking::reanchor_port(&mut s.world, &mut s.svc, s.shuttle_port, s.shuttle, local);
    assert_eq!(port(&s.world, s.shuttle_port).docked_with(), Some(s.station_port));
    assert_eq!(port(&s.world, s.station_port).docked_with(), Some(s.shuttle_port));
    assert_eq!(s.svc.joints.len(), 1);
}

#[test]
fn test_remove_docked_port_cleans_partner() {
    let mut s = scene();
    park_adjacent(&mut s);
    docking::dock(&mut s.world, &mut s.svc, s.shuttle_port, s.station_port);

    docking::remove_port(&mut s.world, &mut s.svc, s.shuttle_port);
    assert!(!s.world.contains(s.shuttle_port));
    assert!(!port(&s.world, s.station_port).docked());
    assert!(s.svc.joints.is_empty());
}

#[test]
fn test_set_docks_disables_every_port() {
    let mut s = scene();
    park_adjacent(&mut s);
    docking::dock(&mut s.world, &mut s.svc, s.shuttle_port, s.station_port);
    docking::set_docks(&mut s.world, &mut s.svc, s.shuttle, false);
    assert!(!port(&s.world, s.shuttle_port).enabled());
    assert!(!port(&s.world, s.station_port).docked());
    docking::set_docks(&mut s.world, &mut s.svc, s.shuttle, true);
    assert!(port(&s.world, s.shuttle_port).enabled());
}

// ---- Dock search ----

#[test]
fn test_docking_config_places_ports_face_to_face() {
    let s = scene();
    let config = dock_search::get_docking_config(&s.world, s.shuttle, s.station, None).unwrap();
    assert_eq!(config.docks, vec![(s.shuttle_port, s.station_port)]);
    assert_eq!(config.target, s.station);
    assert_eq!(config.map, s.map);
    assert!(approx(config.coordinates, Vec2::new(3.0, 10.0)));
    assert!(config.angle.abs() < 1e-4);
    assert!(config
        .area
        .approx_eq(&Aabb::new(Vec2::new(3.0, 10.0), Vec2::new(8.0, 13.0)), 2));
}

#[test]
fn test_docking_config_is_deterministic() {
    let s = scene();
    let first = dock_search::get_docking_config(&s.world, s.shuttle, s.station, None);
    for _ in 0..5 {
        assert_eq!(
            dock_search::get_docking_config(&s.world, s.shuttle, s.station, None),
            first
        );
    }
}

#[test]
fn test_docking_config_footprint_misses_other_grids() {
    let s = scene();
    let config = dock_search::get_docking_config(&s.world, s.shuttle, s.station, None).unwrap();
    let footprint = lookup::grid_local_aabb(&s.world, s.shuttle)
        .transformed(&config.pose().matrix())
        .enlarged(-GRID_OVERLAP_EPSILON);
    for grid in lookup::grids_on_map(&s.world, s.map) {
        if grid == s.shuttle {
            continue;
        }
        for tile in lookup::tile_world_boxes(&s.world, grid, 0.0) {
            assert!(!tile.intersects(&footprint));
        }
    }
}

#[test]
fn test_docking_config_rejects_third_grid_in_the_way() {
    let mut s = scene();
    world_setup::spawn_station(&mut s.world, s.map, Grid::rect((3, 11), (7, 12)), Pose::IDENTITY);
    assert!(dock_search::get_docking_config(&s.world, s.shuttle, s.station, None).is_none());
}

#[test]
fn test_docking_config_rejects_overlap_with_target() {
    let mut s = scene();
    docking::disable_port(&mut s.world, &mut s.svc, s.station_port);
    // Port buried in the middle of the station.
    world_setup::spawn_docking_port(&mut s.world, &mut s.svc, s.station, (5, 5), Direction::North, None);
    assert!(dock_search::get_docking_config(&s.world, s.shuttle, s.station, None).is_none());
}

#[test]
fn test_docking_config_skips_docked_and_disabled_ports() {
    let mut s = scene();
    docking::disable_port(&mut s.world, &mut s.svc, s.station_port);
    assert!(dock_search::get_docking_config(&s.world, s.shuttle, s.station, None).is_none());
}

#[test]
fn test_docking_config_finds_multi_port_dock() {
    let mut world = World::new();
    let mut svc = services();
    let (map, _) = svc.maps.create(&mut world, MapSurface::Space);
    let station =
        world_setup::spawn_station(&mut world, map, Grid::rect((0, 0), (9, 9)), Pose::IDENTITY);
    let t1 = world_setup::spawn_docking_port(&mut world, &mut svc, station, (4, 9), Direction::North, None);
    let t2 = world_setup::spawn_docking_port(&mut world, &mut svc, station, (6, 9), Direction::North, None);
    let shuttle = world_setup::spawn_shuttle(
        &mut world,
        map,
        Grid::rect((0, 0), (4, 2)),
        Pose::from_position(Vec2::new(300.0, 0.0)),
        ShuttleClass::Standard,
    );
    let s1 = world_setup::spawn_docking_port(&mut world, &mut svc, shuttle, (1, 0), Direction::South, None);
    let s2 = world_setup::spawn_docking_port(&mut world, &mut svc, shuttle, (3, 0), Direction::South, None);

    let config = dock_search::get_docking_config(&world, shuttle, station, None).unwrap();
    assert_eq!(config.docks.len(), 2);
    assert!(config.docks.contains(&(s1, t1)));
    assert!(config.docks.contains(&(s2, t2)));
    assert!(approx(config.coordinates, Vec2::new(3.0, 10.0)));
}

/// Station with two north ports two tiles apart and one tagged east port;
/// shuttle with two south ports two tiles apart.
fn ranking_world(tag: &str) -> (World, Entity, Entity, Entity) {
    let mut world = World::new();
    let mut svc = services();
    let (map, _) = svc.maps.create(&mut world, MapSurface::Space);
    let station =
        world_setup::spawn_station(&mut world, map, Grid::rect((0, 0), (9, 9)), Pose::IDENTITY);
    world_setup::spawn_docking_port(&mut world, &mut svc, station, (4, 9), Direction::North, None);
    world_setup::spawn_docking_port(&mut world, &mut svc, station, (6, 9), Direction::North, None);
    let tagged =
        world_setup::spawn_docking_port(&mut world, &mut svc, station, (9, 5), Direction::East, Some(tag));
    let shuttle = world_setup::spawn_shuttle(
        &mut world,
        map,
        Grid::rect((0, 0), (4, 2)),
        Pose::from_position(Vec2::new(300.0, 0.0)),
        ShuttleClass::Standard,
    );
    world_setup::spawn_docking_port(&mut world, &mut svc, shuttle, (1, 0), Direction::South, None);
    world_setup::spawn_docking_port(&mut world, &mut svc, shuttle, (3, 0), Direction::South, None);
    (world, station, shuttle, tagged)
}

#[test]
fn test_docking_config_prefers_more_ports_then_smaller_turn() {
    let (world, station, shuttle, tagged) = ranking_world(DOCK_TAG_EMERGENCY);
    let config = dock_search::get_docking_config(&world, shuttle, station, None).unwrap();
    assert_eq!(config.docks.len(), 2);
    assert!(config.angle.abs() < 1e-4);
    assert!(config.docks.iter().all(|(_, t)| *t != tagged));
}

// Tagged ports rank strictly before connection count.
#[test]
fn test_docking_config_tag_ranks_before_port_count() {
    let (world, station, shuttle, tagged) = ranking_world(DOCK_TAG_EMERGENCY);
    let config =
        dock_search::get_docking_config(&world, shuttle, station, Some(DOCK_TAG_EMERGENCY)).unwrap();
    assert_eq!(config.docks.len(), 1);
    assert_eq!(config.docks[0].1, tagged);
    assert!((config.angle + FRAC_PI_2).abs() < 1e-4);

    // An unrelated tag changes nothing.
    let other =
        dock_search::get_docking_config(&world, shuttle, station, Some(DOCK_TAG_ARRIVALS)).unwrap();
    assert_eq!(other.docks.len(), 2);
}

#[test]
fn test_docking_config_at_matches_exact_placement() {
    let s = scene();
    let found = dock_search::get_docking_config_at(
        &s.world,
        s.shuttle,
        s.station,
        Vec2::new(3.0, 10.0),
        0.0,
    );
    assert_eq!(found.unwrap().docks, vec![(s.shuttle_port, s.station_port)]);
    assert!(dock_search::get_docking_config_at(
        &s.world,
        s.shuttle,
        s.station,
        Vec2::new(4.0, 10.0),
        0.0
    )
    .is_none());
}

#[test]
fn test_docking_config_for_specific_ports() {
    let s = scene();
    let config =
        dock_search::get_docking_config_for_ports(&s.world, s.shuttle_port, s.station_port).unwrap();
    assert_eq!(config.docks[0], (s.shuttle_port, s.station_port));
    assert!(approx(config.coordinates, Vec2::new(3.0, 10.0)));
}

#[test]
fn test_get_dockable_finds_touching_port() {
    let mut s = scene();
    assert_eq!(docking::get_dockable(&s.world, s.shuttle_port), None);
    park_adjacent(&mut s);
    assert_eq!(docking::get_dockable(&s.world, s.shuttle_port), Some(s.station_port));
}

// ---- Auto-dock and recently docked ----

#[test]
fn test_autodock_docks_and_skips_recent_partner() {
    let mut s = scene();
    let console = world_setup::spawn_console(&mut s.world, s.shuttle, Vec2::new(2.5, 1.5));
    park_adjacent(&mut s);
    assert!(autodock::request(&mut s.world, s.shuttle_port, console));

    assert_eq!(autodock::run(&mut s.world, &mut s.svc), 1);
    assert!(port(&s.world, s.shuttle_port).docked());

    docking::undock(&mut s.world, &mut s.svc, s.shuttle_port);
    assert_eq!(autodock::run(&mut s.world, &mut s.svc), 0);
    assert!(!port(&s.world, s.shuttle_port).docked());

    // Still close: marker stays.
    recently_docked::run(&mut s.world);
    assert!(lookup::has::<RecentlyDocked>(&s.world, s.shuttle_port));

    lookup::set_world_pose(
        &mut s.world,
        s.shuttle,
        s.map,
        Pose::from_position(Vec2::new(3.0, 20.0)),
    );
    recently_docked::run(&mut s.world);
    assert!(!lookup::has::<RecentlyDocked>(&s.world, s.shuttle_port));
    assert!(!lookup::has::<RecentlyDocked>(&s.world, s.station_port));

    park_adjacent(&mut s);
    assert_eq!(autodock::run(&mut s.world, &mut s.svc), 1);
}

#[test]
fn test_recently_docked_cleared_when_partner_gone() {
    let mut s = scene();
    park_adjacent(&mut s);
    docking::dock(&mut s.world, &mut s.svc, s.shuttle_port, s.station_port);
    docking::undock(&mut s.world, &mut s.svc, s.shuttle_port);
    s.world.despawn(s.station_port).unwrap();
    recently_docked::run(&mut s.world);
    assert!(!lookup::has::<RecentlyDocked>(&s.world, s.shuttle_port));
}

#[test]
fn test_autodock_marker_removed_with_last_requester() {
    let mut s = scene();
    let a = world_setup::spawn_console(&mut s.world, s.shuttle, Vec2::new(1.5, 1.5));
    let b = world_setup::spawn_console(&mut s.world, s.shuttle, Vec2::new(3.5, 1.5));
    autodock::request(&mut s.world, s.shuttle_port, a);
    autodock::request(&mut s.world, s.shuttle_port, b);
    autodock::request(&mut s.world, s.shuttle_port, b);
    assert_eq!(s.world.get::<&AutoDock>(s.shuttle_port).unwrap().requesters.len(), 2);

    autodock::stop(&mut s.world, s.shuttle_port, a);
    assert!(lookup::has::<AutoDock>(&s.world, s.shuttle_port));
    autodock::stop(&mut s.world, s.shuttle_port, b);
    assert!(!lookup::has::<AutoDock>(&s.world, s.shuttle_port));
}

// ---- Proximity placement ----

#[test]
fn test_proximity_placement_clears_the_cluster() {
    let mut s = scene();
    world_setup::spawn_station(
        &mut s.world,
        s.map,
        Grid::rect((0, 0), (5, 5)),
        Pose::from_position(Vec2::new(14.0, 0.0)),
    );
    world_setup::spawn_station(
        &mut s.world,
        s.map,
        Grid::rect((0, 0), (3, 3)),
        Pose::from_position(Vec2::new(-8.0, 12.0)),
    );
    if let Ok(mut body) = s.world.get::<&mut Body>(s.shuttle) {
        body.linear_velocity = Vec2::new(4.0, 0.0);
    }

    assert!(proximity::place_near(&mut s.world, &mut s.svc, s.shuttle, s.station));
    let placed = lookup::grid_world_aabb(&s.world, s.shuttle).unwrap();
    for grid in lookup::grids_on_map(&s.world, s.map) {
        if grid == s.shuttle {
            continue;
        }
        let other = lookup::grid_world_aabb(&s.world, grid).unwrap();
        assert!(!placed.intersects(&other), "shuttle placed on top of {grid:?}");
    }
    let body = *s.world.get::<&Body>(s.shuttle).unwrap();
    assert_eq!(body.linear_velocity, Vec2::ZERO);
    // Not too far either.
    let distance = placed.center().distance(Vec2::new(5.0, 5.0));
    assert!(distance < 200.0);
}

#[test]
fn test_proximity_on_empty_open_map_lands_on_origin() {
    let mut world = World::new();
    let mut svc = services();
    let (start, _) = svc.maps.create(&mut world, MapSurface::Space);
    let (map, map_entity) = svc.maps.create(&mut world, MapSurface::Space);
    let shuttle = world_setup::spawn_shuttle(
        &mut world,
        start,
        Grid::rect((0, 0), (3, 1)),
        Pose::new(Vec2::new(50.0, 50.0), 1.0),
        ShuttleClass::Standard,
    );
    assert!(proximity::place_near(&mut world, &mut svc, shuttle, map_entity));
    let xf = lookup::xform(&world, shuttle).unwrap();
    assert_eq!(xf.parent, Parent::Map(map));
    assert_eq!(xf.local.rotation, 0.0);
    // Center of mass of a 4x2 grid sits at (2, 1).
    assert!(approx(xf.local.position, Vec2::new(-2.0, -1.0)));
}

// ---- Flatten ----

#[test]
fn test_flatten_clears_loose_entities_once() {
    let mut world = World::new();
    let mut svc = services();
    let (map, map_entity) = svc.maps.create(&mut world, MapSurface::Space);
    let shuttle = world_setup::spawn_shuttle(
        &mut world,
        map,
        Grid::rect((0, 0), (4, 4)),
        Pose::IDENTITY,
        ShuttleClass::Standard,
    );
    let aboard = world_setup::spawn_mob(&mut world, shuttle, Vec2::new(1.5, 1.5), false);
    let item = world_setup::spawn_item(&mut world, map, Vec2::new(1.0, 1.0));
    let mob = world_setup::spawn_mob_on_map(&mut world, map, Vec2::new(3.0, 2.0));
    let ghost = world_setup::spawn_ghost(&mut world, map, Vec2::new(2.0, 2.0));
    let far = world_setup::spawn_item(&mut world, map, Vec2::new(50.0, 50.0));
    let wall = world_setup::spawn_anchored_obstacle(
        &mut world,
        map_entity,
        Aabb::new(Vec2::new(4.0, 4.0), Vec2::new(6.0, 6.0)),
    );

    let mut ledger = FlattenLedger::new();
    let report = flatten::run(&mut world, shuttle, FLATTEN_MARGIN, &mut ledger);
    assert_eq!(report.deleted, vec![item]);
    assert_eq!(report.gibbed, vec![mob]);
    assert_eq!(report.remains.len(), GIB_REMAINS);
    assert!(!world.contains(item));
    assert!(!world.contains(mob));
    for entity in [shuttle, aboard, ghost, far, wall] {
        assert!(world.contains(entity));
    }

    let again = flatten::run(&mut world, shuttle, FLATTEN_MARGIN, &mut ledger);
    assert!(again.is_empty());
    for gib in &report.remains {
        assert!(world.contains(*gib));
    }
}

#[test]
fn test_flatten_reserves_planet_terrain() {
    let mut world = World::new();
    let mut svc = services();
    let (map, map_entity) = svc.maps.create(&mut world, MapSurface::Planet);
    let shuttle = world_setup::spawn_shuttle(
        &mut world,
        map,
        Grid::rect((0, 0), (1, 1)),
        Pose::IDENTITY,
        ShuttleClass::Standard,
    );
    let report = flatten::run(&mut world, shuttle, FLATTEN_MARGIN, &mut FlattenLedger::new());
    assert!(report.reserved_tiles >= 4);
    let terrain = world.get::<&ProceduralTerrain>(map_entity).unwrap();
    assert!(terrain.reserved.contains(&(0, 0)));
    assert!(terrain.reserved.contains(&(1, 1)));
}

// ---- Occupants, thrusters, movement ----

#[test]
fn test_knockdown_skips_buckled_and_vents_exposed() {
    let mut world = World::new();
    let mut svc = services();
    let (map, _) = svc.maps.create(&mut world, MapSurface::Space);
    let mut grid = Grid::rect((0, 0), (3, 3));
    grid.set_tile((3, 3), TileKind::Lattice);
    let shuttle = world_setup::spawn_shuttle(&mut world, map, grid, Pose::IDENTITY, ShuttleClass::Standard);
    let strapped = world_setup::spawn_mob(&mut world, shuttle, Vec2::new(0.5, 0.5), true);
    let standing = world_setup::spawn_mob(&mut world, shuttle, Vec2::new(1.5, 1.5), false);
    let exposed = world_setup::spawn_mob(&mut world, shuttle, Vec2::new(3.5, 3.5), false);

    let count = knockdown::knock_over_occupants(&mut world, shuttle, KNOCKDOWN_SECS, true);
    assert_eq!(count, 2);
    assert!(!world.get::<&StatusEffects>(strapped).unwrap().is_paralyzed());
    assert!(world.get::<&StatusEffects>(standing).unwrap().is_paralyzed());

    assert_eq!(lookup::grid_of(&world, standing), Some(shuttle));
    let thrown = lookup::xform(&world, exposed).unwrap();
    assert_eq!(thrown.parent, Parent::Map(map));
    let body = *world.get::<&Body>(exposed).unwrap();
    assert!((body.linear_velocity.length() - VENT_THROW_SPEED).abs() < 1e-3);
    assert!(body.linear_velocity.x > 0.0 && body.linear_velocity.y > 0.0);
}

#[test]
fn test_status_effects_wear_off() {
    let mut world = World::new();
    let mob = world.spawn((StatusEffects { paralyzed_secs: 0.05 },));
    status::run(&mut world, DT);
    assert!(world.get::<&StatusEffects>(mob).unwrap().is_paralyzed());
    status::run(&mut world, DT);
    assert!(!world.get::<&StatusEffects>(mob).unwrap().is_paralyzed());
}

#[test]
fn test_thrusters_follow_requested_direction() {
    let mut s = scene();
    let thrusters = world_setup::spawn_thrusters(&mut s.world, s.shuttle);
    thrusters::enable_linear_direction(&mut s.world, s.shuttle, Direction::North);
    let firing: Vec<Direction> = thrusters
        .iter()
        .map(|t| *s.world.get::<&Thruster>(*t).unwrap())
        .filter(|t| t.firing)
        .map(|t| t.direction)
        .collect();
    assert_eq!(firing, vec![Direction::North]);

    thrusters::set_angular(&mut s.world, s.shuttle, true);
    assert!(s.world.get::<&Shuttle>(s.shuttle).unwrap().angular_thrust);

    thrusters::disable_linear(&mut s.world, s.shuttle);
    assert!(thrusters
        .iter()
        .all(|t| !s.world.get::<&Thruster>(*t).unwrap().firing));
}

#[test]
fn test_movement_damps_and_skips_paused_maps() {
    let mut s = scene();
    {
        let mut body = s.world.get::<&mut Body>(s.shuttle).unwrap();
        body.linear_velocity = Vec2::new(0.0, 10.0);
        body.linear_damping = 0.0;
    }
    movement::run(&mut s.world, 1.0);
    let xf = lookup::xform(&s.world, s.shuttle).unwrap();
    assert!(approx(xf.local.position, Vec2::new(300.0, 10.0)));

    s.world.get::<&mut Body>(s.shuttle).unwrap().linear_damping = 1.0;
    movement::run(&mut s.world, 1.0);
    let body = *s.world.get::<&Body>(s.shuttle).unwrap();
    assert!(approx(body.linear_velocity, Vec2::new(0.0, 5.0)));

    s.svc.maps.set_paused(&mut s.world, s.map, true);
    movement::run(&mut s.world, 1.0);
    let paused = lookup::xform(&s.world, s.shuttle).unwrap();
    assert!(approx(paused.local.position, Vec2::new(300.0, 20.0)));
}

#[test]
fn test_sound_range_scales_with_grid() {
    let s = scene();
    assert_eq!(ftl::sound_range(&s.world, s.shuttle), 5.0 + SOUND_RANGE_PADDING);
    assert_eq!(ftl::sound_range(&s.world, s.shuttle_port), SOUND_RANGE_DEFAULT);
    assert_eq!(ftl::sound_range(&s.world, s.map_entity), SOUND_RANGE_DEFAULT);
}

// ---- Console checks ----

#[test]
fn test_can_target_rules() {
    let mut s = scene();
    assert_eq!(
        console::can_target(&s.world, s.shuttle, s.shuttle),
        Err(TravelDenied::SelfTarget)
    );
    assert_eq!(console::can_target(&s.world, s.shuttle, s.station), Ok(()));
    assert_eq!(
        console::can_target(&s.world, s.shuttle, s.map_entity),
        Err(TravelDenied::DestinationUnavailable)
    );

    let whitelist: BTreeSet<String> = ["Salvage".to_string()].into();
    s.world
        .get::<&mut FtlDestination>(s.station)
        .unwrap()
        .set_whitelist(Some(whitelist.clone()));
    assert_eq!(
        console::can_target(&s.world, s.shuttle, s.station),
        Err(TravelDenied::NotWhitelisted)
    );
    s.world.insert_one(s.shuttle, ShuttleTags(whitelist)).unwrap();
    assert_eq!(console::can_target(&s.world, s.shuttle, s.station), Ok(()));

    s.world
        .get::<&mut FtlDestination>(s.station)
        .unwrap()
        .set_enabled(false);
    assert_eq!(
        console::can_target(&s.world, s.shuttle, s.station),
        Err(TravelDenied::DestinationUnavailable)
    );
}

#[test]
fn test_can_travel_blocked_by_heavy_grid_nearby() {
    let mut s = scene();
    let transits = std::collections::HashMap::new();
    let config = FtlConfig::default();
    assert_eq!(console::can_travel(&s.world, &transits, &config, s.shuttle), Ok(()));
    assert_eq!(
        console::can_travel(&s.world, &transits, &config, s.station),
        Err(TravelDenied::NotAShuttle)
    );

    // A 2x2 grid weighs 100, under the threshold.
    world_setup::spawn_station(
        &mut s.world,
        s.map,
        Grid::rect((0, 0), (1, 1)),
        Pose::from_position(Vec2::new(280.0, 0.0)),
    );
    assert_eq!(console::can_travel(&s.world, &transits, &config, s.shuttle), Ok(()));

    lookup::set_world_pose(
        &mut s.world,
        s.shuttle,
        s.map,
        Pose::from_position(Vec2::new(60.0, 0.0)),
    );
    assert_eq!(
        console::can_travel(&s.world, &transits, &config, s.shuttle),
        Err(TravelDenied::Proximity)
    );
}
