//! 2D geometry for grids and docking ports.
//!
//! Rigid poses, axis-aligned boxes, collision shapes, and the port
//! alignment math used by the dock search. Pure functions over `glam`
//! types; no ECS dependency.

pub mod aabb;
pub mod alignment;
pub mod angle;
pub mod pose;
pub mod shape;

// Re-export key types for convenience.
pub use aabb::Aabb;
pub use alignment::{dock_alignment, port_anchor, port_outward};
pub use pose::Pose;
pub use shape::Shape;

#[cfg(test)]
mod tests;
