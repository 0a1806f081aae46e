//! Pathfinding shortcuts between docked ports, so NPCs can walk across a
//! dock without the two grids sharing a navigation mesh.

use std::collections::BTreeMap;

use glam::Vec2;
use hecs::Entity;

use shuttle_core::types::PortalHandle;

/// One end of a portal: a grid and a point in its local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortalEnd {
    pub grid: Entity,
    pub local: Vec2,
}

#[derive(Debug, Default)]
pub struct PortalRegistry {
    portals: BTreeMap<u32, (PortalEnd, PortalEnd)>,
    next: u32,
}

impl PortalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, a: PortalEnd, b: PortalEnd) -> PortalHandle {
        self.next += 1;
        self.portals.insert(self.next, (a, b));
        PortalHandle(self.next)
    }

    pub fn remove(&mut self, handle: PortalHandle) -> bool {
        self.portals.remove(&handle.0).is_some()
    }

    pub fn get(&self, handle: PortalHandle) -> Option<&(PortalEnd, PortalEnd)> {
        self.portals.get(&handle.0)
    }

    pub fn len(&self) -> usize {
        self.portals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.portals.is_empty()
    }
}
