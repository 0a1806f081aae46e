//! The FTL staging map: one scratch map per session where shuttles in
//! transit are parked side by side.

use glam::Vec2;
use hecs::World;

use shuttle_core::enums::MapSurface;
use shuttle_core::types::MapId;

use crate::maps::MapManager;

/// Lazily created staging map plus the packing offset along +X.
///
/// The offset only grows while the session lives; `reset` is the only
/// way back to zero and must not run while a transit is in flight.
#[derive(Debug, Default)]
pub struct StagingMap {
    map: Option<MapId>,
    next_offset: f32,
}

impl StagingMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map(&self) -> Option<MapId> {
        self.map
    }

    pub fn next_offset(&self) -> f32 {
        self.next_offset
    }

    /// The staging map, creating it on first use.
    pub fn ensure(&mut self, world: &mut World, maps: &mut MapManager) -> MapId {
        if let Some(id) = self.map.filter(|id| maps.exists(*id)) {
            return id;
        }
        let (id, _) = maps.create(world, MapSurface::Space);
        log::info!("set up FTL staging map at {id}");
        self.map = Some(id);
        id
    }

    /// Claim a slot `width` wide and return its center.
    pub fn reserve_slot(&mut self, width: f32, buffer: f32) -> Vec2 {
        let center = Vec2::new(self.next_offset + width / 2.0, 0.0);
        self.next_offset += width + buffer;
        center
    }

    /// Delete the staging map and everything on it.
    pub fn reset(&mut self, world: &mut World, maps: &mut MapManager) {
        self.next_offset = 0.0;
        if let Some(id) = self.map.take() {
            if maps.delete(world, id) {
                log::info!("cleaned up FTL staging map {id}");
            }
        }
    }
}
