//! Weld joints between grid bodies.

use std::collections::BTreeMap;
use std::f32::consts::TAU;

use glam::Vec2;
use hecs::Entity;

use shuttle_core::types::JointId;

/// A soft weld holding two bodies at a fixed relative pose.
#[derive(Debug, Clone, PartialEq)]
pub struct WeldJoint {
    pub id: JointId,
    pub body_a: Entity,
    pub body_b: Entity,
    pub local_anchor_a: Vec2,
    pub local_anchor_b: Vec2,
    /// `angle_b - angle_a` when the joint was made.
    pub reference_angle: f32,
    pub stiffness: f32,
    pub damping: f32,
}

/// Welds made by docking, keyed by joint id.
///
/// The registry is bookkeeping only: `movement::run` integrates each body on
/// its own and never reads these welds, so a docked pair stays together
/// because arrival and docking leave the shuttle at rest.
#[derive(Debug, Default)]
pub struct JointRegistry {
    joints: BTreeMap<String, WeldJoint>,
}

impl JointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a weld, replacing any joint with the same id.
    /// Returns `true` if the id was new.
    pub fn create_weld(&mut self, joint: WeldJoint) -> bool {
        self.joints.insert(joint.id.0.clone(), joint).is_none()
    }

    pub fn remove(&mut self, id: &JointId) -> Option<WeldJoint> {
        self.joints.remove(&id.0)
    }

    pub fn get(&self, id: &JointId) -> Option<&WeldJoint> {
        self.joints.get(&id.0)
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Joints attached to a body.
    pub fn joints_of(&self, body: Entity) -> impl Iterator<Item = &WeldJoint> {
        self.joints
            .values()
            .filter(move |j| j.body_a == body || j.body_b == body)
    }
}

/// Spring stiffness and damping for a soft joint.
///
/// The effective mass is the reduced mass of the pair, or whichever mass
/// is non-zero when one side is static.
pub fn linear_stiffness(frequency: f32, damping_ratio: f32, mass_a: f32, mass_b: f32) -> (f32, f32) {
    let mass = if mass_a > 0.0 && mass_b > 0.0 {
        mass_a * mass_b / (mass_a + mass_b)
    } else if mass_a > 0.0 {
        mass_a
    } else {
        mass_b
    };
    let omega = TAU * frequency;
    let stiffness = mass * omega * omega;
    let damping = 2.0 * mass * damping_ratio * omega;
    (stiffness, damping)
}
