//! Collision shapes attached to bodies as fixtures.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::aabb::Aabb;
use crate::pose::Pose;

/// A fixture shape in its body's local frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle { center: Vec2, radius: f32 },
    /// Axis-aligned in the body frame; rotates with the body.
    Rect(Aabb),
}

impl Shape {
    /// World-space bounds of the shape when its body sits at `pose`.
    pub fn compute_aabb(&self, pose: &Pose) -> Aabb {
        match *self {
            Shape::Circle { center, radius } => {
                Aabb::from_center_size(pose.transform_point(center), Vec2::splat(radius * 2.0))
            }
            Shape::Rect(rect) => rect.transformed(&pose.matrix()),
        }
    }

    /// Bounds in the body frame.
    pub fn local_aabb(&self) -> Aabb {
        self.compute_aabb(&Pose::IDENTITY)
    }
}
