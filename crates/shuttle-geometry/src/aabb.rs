//! Axis-aligned bounding boxes in grid-local or world space.

use glam::{Affine2, Vec2};
use serde::{Deserialize, Serialize};

use crate::angle::round_to;

/// Axis-aligned box. `min` is the bottom-left corner, `max` the top-right.
///
/// The default box is the zero-size box at the origin, which is what an
/// open map without a finite grid reports as its bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
        }
    }

    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size.abs() / 2.0;
        Self::new(center - half, center + half)
    }

    /// Zero-size box at a point.
    pub fn point(p: Vec2) -> Self {
        Self { min: p, max: p }
    }

    /// Smallest box containing every point, or `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(Self { min, max })
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Length of the diagonal.
    pub fn diagonal(&self) -> f32 {
        self.size().length()
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Grow (or shrink, for negative `amount`) every side by `amount`.
    /// Shrinking past zero size collapses onto the center.
    pub fn enlarged(&self, amount: f32) -> Aabb {
        let min = self.min - Vec2::splat(amount);
        let max = self.max + Vec2::splat(amount);
        let center = self.center();
        Aabb {
            min: min.min(center),
            max: max.max(center),
        }
    }

    /// Strict overlap: boxes that only share an edge do not intersect.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// Overlap including shared edges and corners.
    pub fn touches(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn translated(&self, offset: Vec2) -> Aabb {
        Aabb {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Bounds of this box after an affine transform (all four corners).
    pub fn transformed(&self, matrix: &Affine2) -> Aabb {
        let corners = [
            self.min,
            Vec2::new(self.max.x, self.min.y),
            self.max,
            Vec2::new(self.min.x, self.max.y),
        ];
        Aabb::from_points(corners.iter().map(|c| matrix.transform_point2(*c)))
            .unwrap_or_default()
    }

    /// Box with every coordinate rounded to `decimals` digits.
    pub fn rounded(&self, decimals: i32) -> Aabb {
        Aabb {
            min: Vec2::new(round_to(self.min.x, decimals), round_to(self.min.y, decimals)),
            max: Vec2::new(round_to(self.max.x, decimals), round_to(self.max.y, decimals)),
        }
    }

    /// Equality after rounding both boxes to `decimals` digits.
    pub fn approx_eq(&self, other: &Aabb, decimals: i32) -> bool {
        self.rounded(decimals) == other.rounded(decimals)
    }
}
