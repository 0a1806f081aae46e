//! Port-to-port alignment.
//!
//! A docking port faces "out" along its local -Y axis. Its anchor is the
//! tile edge half a unit out from the port's position, which is also where
//! the docking fixture sits. Two ports dock when their anchors coincide and
//! their outward directions are opposed.

use std::f32::consts::PI;

use glam::Vec2;

use crate::angle;
use crate::pose::Pose;

/// Distance from a port's position to its anchor along the outward axis.
pub const PORT_ANCHOR_OFFSET: f32 = 0.5;

/// Outward unit direction of a port with the given local rotation.
pub fn port_outward(rotation: f32) -> Vec2 {
    Vec2::from_angle(rotation).rotate(Vec2::NEG_Y)
}

/// Anchor point of a port, in the same frame as `port`.
pub fn port_anchor(port: &Pose) -> Vec2 {
    port.position + port_outward(port.rotation) * PORT_ANCHOR_OFFSET
}

/// Pose of the shuttle grid, expressed in the target grid's local frame,
/// that brings `shuttle_port` face to face with `target_port`.
///
/// Both port poses are grid-local (relative to their own grid).
pub fn dock_alignment(shuttle_port: &Pose, target_port: &Pose) -> Pose {
    let rotation = angle::reduce(target_port.rotation + PI - shuttle_port.rotation);
    let target_anchor = port_anchor(target_port);
    let shuttle_anchor = Vec2::from_angle(rotation).rotate(port_anchor(shuttle_port));
    Pose::new(target_anchor - shuttle_anchor, rotation)
}
