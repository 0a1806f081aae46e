//! Simulation engine: the docking and FTL subsystem of one game session.
//!
//! `ShuttleSimulation` owns the hecs ECS world, the session services and
//! the per-shuttle transit map, processes console commands, runs all
//! systems and produces `ShuttleSnapshot`s. Completely headless, enabling
//! deterministic testing.

use std::collections::{BTreeSet, HashMap, VecDeque};

use glam::Vec2;
use hecs::{Entity, World};
use serde::{Deserialize, Serialize};

use shuttle_core::commands::ShuttleCommand;
use shuttle_core::components::{FtlDestination, Grid, Shuttle};
use shuttle_core::config::{EmergencyConfig, FtlConfig};
use shuttle_core::enums::{Direction, MapSurface, ShuttleClass};
use shuttle_core::error::{ConfigError, TravelDenied};
use shuttle_core::events::{EventKind, ShuttleEvent};
use shuttle_core::state::ShuttleSnapshot;
use shuttle_core::types::{MapId, SimTime, TravelTarget};
use shuttle_geometry::{Aabb, Pose};
use shuttle_transit::profiles::get_profile;

use crate::bus::Handler;
use crate::emergency::EmergencyShuttle;
use crate::services::Services;
use crate::systems;
use crate::systems::dock_search::{self, DockingConfig};
use crate::systems::flatten::{FlattenLedger, FlattenReport};
use crate::transit::{Transit, TravelRequest};
use crate::world_setup;

/// Configuration for starting a new simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    pub ftl: FtlConfig,
    pub emergency: EmergencyConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            ftl: FtlConfig::default(),
            emergency: EmergencyConfig::default(),
        }
    }
}

impl SimConfig {
    /// Parse a (possibly partial) JSON document and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ftl.validate()?;
        self.emergency.validate()
    }
}

/// The simulation engine. Owns the ECS world and all session state.
pub struct ShuttleSimulation {
    world: World,
    time: SimTime,
    services: Services,
    transits: HashMap<Entity, Transit>,
    emergency: EmergencyShuttle,
    command_queue: VecDeque<ShuttleCommand>,
}

impl ShuttleSimulation {
    pub fn new(config: SimConfig) -> Self {
        Self {
            world: World::new(),
            time: SimTime::default(),
            services: Services::new(config.seed, config.ftl, config.emergency),
            transits: HashMap::new(),
            emergency: EmergencyShuttle::new(),
            command_queue: VecDeque::new(),
        }
    }

    /// Queue a console command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: ShuttleCommand) {
        self.command_queue.push_back(command);
    }

    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = ShuttleCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> ShuttleSnapshot {
        self.services.tick = self.time.tick;
        self.process_commands();
        self.run_systems();
        self.time.advance();

        let events = self.services.bus.drain().iter().map(ShuttleEvent::view).collect();
        let audio_events = std::mem::take(&mut self.services.audio_events);
        let notices = std::mem::take(&mut self.services.notices);
        systems::snapshot::build_snapshot(
            &self.world,
            &self.time,
            &self.transits,
            &self.emergency,
            &self.services.emergency,
            events,
            audio_events,
            notices,
        )
    }

    /// Run `n` ticks, discarding the snapshots.
    pub fn run_ticks(&mut self, n: usize) {
        for _ in 0..n {
            self.tick();
        }
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn emergency(&self) -> &EmergencyShuttle {
        &self.emergency
    }

    // ---- Maps ----

    pub fn create_map(&mut self, surface: MapSurface) -> (MapId, Entity) {
        self.services.maps.create(&mut self.world, surface)
    }

    pub fn delete_map(&mut self, map: MapId) -> bool {
        self.services.maps.delete(&mut self.world, map)
    }

    pub fn set_map_paused(&mut self, map: MapId, paused: bool) -> bool {
        self.services.maps.set_paused(&mut self.world, map, paused)
    }

    /// Tear down the staging map between rounds. Refused while any shuttle
    /// is still in transit.
    pub fn reset_session(&mut self) -> bool {
        if !self.transits.is_empty() {
            log::warn!(
                "session reset refused: {} shuttle(s) still in transit",
                self.transits.len()
            );
            return false;
        }
        self.services
            .staging
            .reset(&mut self.world, &mut self.services.maps);
        self.emergency = EmergencyShuttle::new();
        true
    }

    // ---- Spawning ----

    pub fn spawn_station(&mut self, map: MapId, grid: Grid, pose: Pose) -> Entity {
        world_setup::spawn_station(&mut self.world, map, grid, pose)
    }

    pub fn spawn_shuttle(
        &mut self,
        map: MapId,
        grid: Grid,
        pose: Pose,
        class: ShuttleClass,
    ) -> Entity {
        world_setup::spawn_shuttle(&mut self.world, map, grid, pose, class)
    }

    pub fn spawn_docking_port(
        &mut self,
        grid: Entity,
        tile: (i32, i32),
        facing: Direction,
        priority_tag: Option<&str>,
    ) -> Entity {
        world_setup::spawn_docking_port(
            &mut self.world,
            &mut self.services,
            grid,
            tile,
            facing,
            priority_tag,
        )
    }

    pub fn spawn_console(&mut self, grid: Entity, local: Vec2) -> Entity {
        world_setup::spawn_console(&mut self.world, grid, local)
    }

    pub fn spawn_emergency_console(&mut self, grid: Entity, local: Vec2) -> Entity {
        world_setup::spawn_emergency_console(&mut self.world, grid, local)
    }

    pub fn spawn_thrusters(&mut self, grid: Entity) -> Vec<Entity> {
        world_setup::spawn_thrusters(&mut self.world, grid)
    }

    pub fn spawn_mob(&mut self, grid: Entity, local: Vec2, buckled: bool) -> Entity {
        world_setup::spawn_mob(&mut self.world, grid, local, buckled)
    }

    pub fn spawn_item(&mut self, map: MapId, position: Vec2) -> Entity {
        world_setup::spawn_item(&mut self.world, map, position)
    }

    pub fn spawn_anchored_obstacle(&mut self, map_entity: Entity, area: Aabb) -> Entity {
        world_setup::spawn_anchored_obstacle(&mut self.world, map_entity, area)
    }

    pub fn spawn_card_holder(&mut self, name: &str, access: &[&str]) -> Entity {
        world_setup::spawn_card_holder(&mut self.world, name, access)
    }

    // ---- FTL ----

    pub fn transit(&self, shuttle: Entity) -> Option<&Transit> {
        self.transits.get(&shuttle)
    }

    pub fn in_transit(&self, shuttle: Entity) -> bool {
        self.transits.contains_key(&shuttle)
    }

    /// Start a transit. Idempotent no-op while one is active.
    pub fn request_travel(&mut self, shuttle: Entity, request: TravelRequest) -> bool {
        systems::ftl::request(
            &mut self.world,
            &mut self.services,
            &mut self.transits,
            shuttle,
            &request,
        )
    }

    /// Travel with the durations and docking preference of the shuttle's
    /// class.
    pub fn travel_to(&mut self, shuttle: Entity, target: TravelTarget) -> bool {
        let class = self
            .world
            .get::<&Shuttle>(shuttle)
            .map(|s| s.class)
            .unwrap_or_default();
        let profile = get_profile(class, &self.services.ftl);
        let mut request = TravelRequest::new(target, profile.startup_secs, profile.travel_secs);
        if profile.dock {
            request = request.docking(profile.priority_tag);
        }
        self.request_travel(shuttle, request)
    }

    pub fn can_travel(&self, shuttle: Entity) -> Result<(), TravelDenied> {
        systems::console::can_travel(&self.world, &self.transits, &self.services.ftl, shuttle)
    }

    // ---- Docking ----

    pub fn get_docking_config(
        &self,
        shuttle: Entity,
        target: Entity,
        priority_tag: Option<&str>,
    ) -> Option<DockingConfig> {
        dock_search::get_docking_config(&self.world, shuttle, target, priority_tag)
    }

    pub fn get_docking_config_at(
        &self,
        shuttle: Entity,
        target: Entity,
        coordinates: Vec2,
        angle: f32,
    ) -> Option<DockingConfig> {
        dock_search::get_docking_config_at(&self.world, shuttle, target, coordinates, angle)
    }

    pub fn get_docking_config_for_ports(
        &self,
        shuttle_port: Entity,
        target_port: Entity,
    ) -> Option<DockingConfig> {
        dock_search::get_docking_config_for_ports(&self.world, shuttle_port, target_port)
    }

    pub fn dock(&mut self, port_a: Entity, port_b: Entity) -> bool {
        systems::docking::dock(&mut self.world, &mut self.services, port_a, port_b)
    }

    pub fn undock(&mut self, port: Entity) -> bool {
        systems::docking::undock(&mut self.world, &mut self.services, port)
    }

    pub fn can_dock(&self, port_a: Entity, port_b: Entity) -> bool {
        systems::docking::can_dock(&self.world, port_a, port_b)
    }

    pub fn try_dock(&mut self, port_a: Entity, port_b: Entity) -> bool {
        systems::docking::try_dock(&mut self.world, &mut self.services, port_a, port_b)
    }

    pub fn set_port_anchored(&mut self, port: Entity, anchored: bool) {
        systems::docking::set_anchored(&mut self.world, &mut self.services, port, anchored);
    }

    pub fn reanchor_port(&mut self, port: Entity, grid: Entity, local: Pose) {
        systems::docking::reanchor_port(&mut self.world, &mut self.services, port, grid, local);
    }

    pub fn remove_port(&mut self, port: Entity) {
        systems::docking::remove_port(&mut self.world, &mut self.services, port);
    }

    /// Move a shuttle next to a target without docking.
    pub fn place_near(&mut self, shuttle: Entity, target: Entity) -> bool {
        systems::proximity::place_near(&mut self.world, &mut self.services, shuttle, target)
    }

    /// Clear the area under a shuttle, sharing `ledger` across calls.
    pub fn flatten(&mut self, shuttle: Entity, ledger: &mut FlattenLedger) -> FlattenReport {
        let margin = self.services.ftl.flatten_margin;
        systems::flatten::run(&mut self.world, shuttle, margin, ledger)
    }

    // ---- Destinations ----

    /// Mark an entity as an FTL destination. Entities in transit stay
    /// disabled until they arrive.
    pub fn add_ftl_destination(&mut self, entity: Entity, enabled: bool) -> bool {
        let enabled = enabled && !self.transits.contains_key(&entity);
        if let Ok(mut destination) = self.world.get::<&mut FtlDestination>(entity) {
            destination.set_enabled(enabled);
            return true;
        }
        self.world
            .insert_one(entity, FtlDestination::new(enabled))
            .is_ok()
    }

    pub fn remove_ftl_destination(&mut self, entity: Entity) -> bool {
        self.world.remove_one::<FtlDestination>(entity).is_ok()
    }

    pub fn set_ftl_whitelist(&mut self, entity: Entity, tags: Option<BTreeSet<String>>) -> bool {
        match self.world.get::<&mut FtlDestination>(entity) {
            Ok(mut destination) => {
                destination.set_whitelist(tags);
                true
            }
            Err(_) => false,
        }
    }

    // ---- Events ----

    pub fn subscribe(&mut self, kind: EventKind, handler: Handler) {
        self.services.bus.subscribe(kind, handler);
    }

    pub fn subscribe_local(&mut self, entity: Entity, kind: EventKind, handler: Handler) {
        self.services.bus.subscribe_local(entity, kind, handler);
    }

    /// Lifecycle events published since the last tick, not yet handed out
    /// in a snapshot.
    pub fn pending_events(&self) -> &[ShuttleEvent] {
        self.services.bus.pending()
    }

    // ---- Emergency shuttle ----

    pub fn set_emergency_targets(
        &mut self,
        shuttle: Entity,
        station: Entity,
        centcomm: Option<Entity>,
    ) {
        self.emergency.shuttle = Some(shuttle);
        self.emergency.station = Some(station);
        self.emergency.centcomm = centcomm;
    }

    pub fn call_emergency_shuttle(&mut self) -> bool {
        systems::emergency::call(
            &mut self.world,
            &mut self.services,
            &mut self.transits,
            &mut self.emergency,
        )
    }

    pub fn early_launch(&mut self) -> bool {
        systems::emergency::early_launch(&mut self.services, &mut self.emergency)
    }

    // ---- Commands ----

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Resolve a numeric id from a command to a live entity.
    fn resolve(&self, id: u64) -> Option<Entity> {
        Entity::from_bits(id).filter(|e| self.world.contains(*e))
    }

    fn handle_command(&mut self, command: ShuttleCommand) {
        log::debug!("command {command:?}");
        match command {
            ShuttleCommand::RequestFtl {
                console,
                destination,
                dock,
            } => {
                let result = match (self.resolve(console), self.resolve(destination)) {
                    (Some(c), Some(d)) => systems::console::request_ftl(
                        &mut self.world,
                        &mut self.services,
                        &mut self.transits,
                        c,
                        d,
                        dock,
                    ),
                    (Some(_), None) => Err(TravelDenied::DestinationUnavailable),
                    (None, _) => Err(TravelDenied::NotAShuttle),
                };
                if let Err(reason) = result {
                    log::warn!("FTL request from console {console} denied: {reason}");
                    self.services.popup(console, reason.to_string());
                }
            }
            ShuttleCommand::RequestUndock { console, port } => {
                if let (Some(c), Some(p)) = (self.resolve(console), self.resolve(port)) {
                    systems::console::request_undock(&mut self.world, &mut self.services, c, p);
                }
            }
            ShuttleCommand::RequestAutodock { console, port } => {
                if let (Some(c), Some(p)) = (self.resolve(console), self.resolve(port)) {
                    systems::console::request_autodock(&mut self.world, c, p);
                }
            }
            ShuttleCommand::StopAutodock { console, port } => {
                if let (Some(c), Some(p)) = (self.resolve(console), self.resolve(port)) {
                    systems::console::stop_autodock(&mut self.world, c, p);
                }
            }
            ShuttleCommand::EmergencyAuthorize { console, user } => {
                if let (Some(c), Some(u)) = (self.resolve(console), self.resolve(user)) {
                    systems::emergency::authorize(
                        &mut self.world,
                        &mut self.services,
                        &mut self.emergency,
                        c,
                        u,
                    );
                }
            }
            ShuttleCommand::EmergencyRepeal { console, user } => {
                if let (Some(c), Some(u)) = (self.resolve(console), self.resolve(user)) {
                    systems::emergency::repeal(
                        &mut self.world,
                        &mut self.services,
                        &mut self.emergency,
                        c,
                        u,
                    );
                }
            }
            ShuttleCommand::EmergencyRepealAll { console, user } => {
                if let (Some(c), Some(u)) = (self.resolve(console), self.resolve(user)) {
                    systems::emergency::repeal_all(
                        &mut self.world,
                        &mut self.services,
                        &mut self.emergency,
                        c,
                        u,
                    );
                }
            }
            ShuttleCommand::CallEmergencyShuttle => {
                self.call_emergency_shuttle();
            }
        }
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        let dt = self.time.dt();
        // 1. FTL transits
        let arrived = systems::ftl::run(
            &mut self.world,
            &mut self.services,
            &mut self.transits,
            dt,
        );
        // 2. Emergency shuttle countdown
        for shuttle in arrived {
            systems::emergency::on_arrival(&mut self.services, &mut self.emergency, shuttle);
        }
        systems::emergency::update(
            &mut self.world,
            &mut self.services,
            &mut self.transits,
            &mut self.emergency,
            dt,
        );
        // 3. Auto-dock scan
        systems::autodock::run(&mut self.world, &mut self.services);
        // 4. Recently-docked expiry
        systems::recently_docked::run(&mut self.world);
        // 5. Movement integration
        systems::movement::run(&mut self.world, dt);
        // 6. Status effects
        systems::status::run(&mut self.world, dt);
    }
}
