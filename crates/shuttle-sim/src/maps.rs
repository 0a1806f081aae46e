//! Map service: create, delete, pause and enumerate maps.
//!
//! Each map is backed by an entity carrying `MapComponent`. Grids and loose
//! entities are rooted on a map through `Xform::parent`.

use std::collections::BTreeMap;

use hecs::{Entity, World};

use shuttle_core::components::{Grid, MapComponent, ProceduralTerrain, Xform};
use shuttle_core::enums::MapSurface;
use shuttle_core::types::MapId;

use crate::lookup;

#[derive(Debug, Default)]
pub struct MapManager {
    maps: BTreeMap<MapId, Entity>,
    next_id: u32,
}

impl MapManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty, unpaused map. Planet maps get ground terrain.
    pub fn create(&mut self, world: &mut World, surface: MapSurface) -> (MapId, Entity) {
        self.next_id += 1;
        let id = MapId(self.next_id);
        let component = MapComponent {
            id,
            surface,
            paused: false,
        };
        let entity = match surface {
            MapSurface::Space => world.spawn((component,)),
            MapSurface::Planet => {
                world.spawn((component, Grid::new(), ProceduralTerrain::default()))
            }
        };
        self.maps.insert(id, entity);
        log::debug!("created {id} ({surface:?})");
        (id, entity)
    }

    pub fn entity(&self, id: MapId) -> Option<Entity> {
        self.maps.get(&id).copied()
    }

    pub fn exists(&self, id: MapId) -> bool {
        self.maps.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = MapId> + '_ {
        self.maps.keys().copied()
    }

    /// Lowest live map id, skipping `exclude`.
    pub fn lowest(&self, exclude: Option<MapId>) -> Option<MapId> {
        self.maps.keys().copied().find(|id| Some(*id) != exclude)
    }

    pub fn surface(&self, world: &World, id: MapId) -> Option<MapSurface> {
        let entity = self.entity(id)?;
        world.get::<&MapComponent>(entity).ok().map(|m| m.surface)
    }

    pub fn is_paused(&self, world: &World, id: MapId) -> bool {
        self.entity(id)
            .and_then(|e| world.get::<&MapComponent>(e).ok().map(|m| m.paused))
            .unwrap_or(false)
    }

    /// Returns whether the paused flag changed.
    pub fn set_paused(&self, world: &mut World, id: MapId, paused: bool) -> bool {
        let Some(entity) = self.entity(id) else {
            return false;
        };
        match world.get::<&mut MapComponent>(entity) {
            Ok(mut map) if map.paused != paused => {
                map.paused = paused;
                true
            }
            _ => false,
        }
    }

    /// Delete a map and every entity rooted on it.
    pub fn delete(&mut self, world: &mut World, id: MapId) -> bool {
        let Some(map_entity) = self.maps.remove(&id) else {
            return false;
        };
        let doomed = rooted_on(world, id);
        for entity in doomed {
            let _ = world.despawn(entity);
        }
        let _ = world.despawn(map_entity);
        log::debug!("deleted {id}");
        true
    }
}

/// Every entity with a transform that resolves to `map`.
pub fn rooted_on(world: &World, map: MapId) -> Vec<Entity> {
    world
        .query::<&Xform>()
        .iter()
        .map(|(e, _)| e)
        .filter(|e| lookup::map_of(world, *e) == Some(map))
        .collect()
}
