//! Clears the landing footprint of an arriving shuttle.
//!
//! Anything loose under the shuttle's hard fixtures is destroyed; mobs are
//! gibbed into remains. Entities anchored to another grid are left alone.

use std::collections::HashSet;

use hecs::{Entity, World};

use shuttle_core::components::*;
use shuttle_core::constants::GIB_REMAINS;
use shuttle_core::types::{entity_id, sort_entities, MapId};
use shuttle_geometry::{Aabb, Pose};

use crate::lookup;

/// Entities already handled during one arrival, including the remains
/// produced along the way.
#[derive(Debug, Default)]
pub struct FlattenLedger {
    processed: HashSet<Entity>,
}

impl FlattenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.processed.contains(&entity)
    }

    pub fn len(&self) -> usize {
        self.processed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct FlattenReport {
    pub deleted: Vec<Entity>,
    pub gibbed: Vec<Entity>,
    pub remains: Vec<Entity>,
    pub reserved_tiles: usize,
}

impl FlattenReport {
    pub fn is_empty(&self) -> bool {
        self.deleted.is_empty() && self.gibbed.is_empty()
    }
}

/// World boxes of the shuttle's hard collision footprint: its tiles and any
/// hard fixtures, each grown by `margin`.
pub fn hard_footprint(world: &World, shuttle: Entity, margin: f32) -> Vec<Aabb> {
    let mut boxes: Vec<Aabb> = lookup::tile_world_boxes(world, shuttle, 0.0)
        .into_iter()
        .map(|b| b.enlarged(margin))
        .collect();
    if let (Some(pose), Ok(fixtures)) = (
        lookup::world_pose(world, shuttle),
        world.get::<&Fixtures>(shuttle),
    ) {
        boxes.extend(fixtures.hard().map(|f| f.shape.compute_aabb(&pose).enlarged(margin)));
    }
    boxes
}

pub fn run(
    world: &mut World,
    shuttle: Entity,
    margin: f32,
    ledger: &mut FlattenLedger,
) -> FlattenReport {
    let mut report = FlattenReport::default();
    let Some(map) = lookup::map_of(world, shuttle) else {
        return report;
    };
    let footprint = hard_footprint(world, shuttle, margin);
    if footprint.is_empty() {
        return report;
    }

    if let Some(map_entity) = map_entity(world, map) {
        if let Ok(mut terrain) = world.get::<&mut ProceduralTerrain>(map_entity) {
            for area in &footprint {
                report.reserved_tiles += terrain.reserve_area(area);
            }
        }
    }

    let mut candidates: Vec<Entity> = world
        .query::<&Xform>()
        .iter()
        .map(|(e, _)| e)
        .filter(|e| *e != shuttle && !ledger.contains(*e))
        .collect();
    sort_entities(&mut candidates);

    for entity in candidates {
        if !crushable(world, shuttle, map, entity) {
            continue;
        }
        let Some(bounds) = lookup::entity_world_aabb(world, entity) else {
            continue;
        };
        if !footprint.iter().any(|b| b.intersects(&bounds) || b.contains_point(bounds.center())) {
            continue;
        }
        ledger.processed.insert(entity);

        if lookup::has::<Mob>(world, entity) {
            let at = lookup::world_position(world, entity).unwrap_or(bounds.center());
            for _ in 0..GIB_REMAINS {
                let gib = world.spawn((
                    Xform::on_map(map, Pose::from_position(at)),
                    Remains {
                        of: entity_id(entity),
                    },
                ));
                ledger.processed.insert(gib);
                report.remains.push(gib);
            }
            report.gibbed.push(entity);
        } else {
            report.deleted.push(entity);
        }
        let _ = world.despawn(entity);
    }

    if !report.is_empty() {
        log::debug!(
            "flattened under {shuttle:?}: {} deleted, {} gibbed",
            report.deleted.len(),
            report.gibbed.len()
        );
    }
    report
}

fn map_entity(world: &World, map: MapId) -> Option<Entity> {
    world
        .query::<&MapComponent>()
        .iter()
        .find(|(_, m)| m.id == map)
        .map(|(e, _)| e)
}

/// Loose entities on the shuttle's map that are not part of any grid.
fn crushable(world: &World, shuttle: Entity, map: MapId, entity: Entity) -> bool {
    if lookup::is_grid(world, entity)
        || lookup::is_open_map(world, entity)
        || lookup::has::<Ghost>(world, entity)
    {
        return false;
    }
    let Some(xf) = lookup::xform(world, entity) else {
        return false;
    };
    if let Some(grid) = xf.grid() {
        if grid == shuttle || xf.anchored || lookup::has::<DockingPort>(world, entity) {
            return false;
        }
    }
    lookup::map_of(world, entity) == Some(map)
}
