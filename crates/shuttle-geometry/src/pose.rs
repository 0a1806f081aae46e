//! Rigid 2D pose (translation + rotation).

use glam::{Affine2, Vec2};
use serde::{Deserialize, Serialize};

use crate::angle;

/// Position and rotation of a body relative to its parent frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec2,
    /// Radians, counter-clockwise.
    pub rotation: f32,
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec2::ZERO,
        rotation: 0.0,
    };

    pub fn new(position: Vec2, rotation: f32) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            rotation: 0.0,
        }
    }

    /// Local-to-parent matrix.
    pub fn matrix(&self) -> Affine2 {
        Affine2::from_angle_translation(self.rotation, self.position)
    }

    /// Parent-to-local matrix.
    pub fn inverse_matrix(&self) -> Affine2 {
        self.matrix().inverse()
    }

    pub fn rotate(&self, v: Vec2) -> Vec2 {
        Vec2::from_angle(self.rotation).rotate(v)
    }

    /// Map a point from this pose's local frame into the parent frame.
    pub fn transform_point(&self, local: Vec2) -> Vec2 {
        self.position + self.rotate(local)
    }

    /// Map a parent-frame point into this pose's local frame.
    pub fn inverse_transform_point(&self, point: Vec2) -> Vec2 {
        Vec2::from_angle(-self.rotation).rotate(point - self.position)
    }

    /// `self ∘ child`: the pose of `child` (expressed in this pose's frame)
    /// in this pose's parent frame.
    pub fn compose(&self, child: &Pose) -> Pose {
        Pose {
            position: self.transform_point(child.position),
            rotation: angle::reduce(self.rotation + child.rotation),
        }
    }

    /// Pose that undoes this one.
    pub fn inverse(&self) -> Pose {
        let rotation = -self.rotation;
        Pose {
            position: Vec2::from_angle(rotation).rotate(-self.position),
            rotation: angle::reduce(rotation),
        }
    }
}
