//! Axis-aligned bounding boxes.
//!
//! The rasterizer builds a 2D box per triangle, clamps it into the target's
//! bounds with [`Aabb::bound_into`], and skips the triangle when the result
//! has no area.

use std::ops::{Index, IndexMut};

use approx::abs_diff_eq;

use crate::math::{Vec2, Vec3};

/// Vector types an [`Aabb`] can be built from.
pub trait Corner: Copy + Index<usize, Output = f32> + IndexMut<usize> {
    const DIMENSIONS: usize;
}

impl Corner for Vec2 {
    const DIMENSIONS: usize = 2;
}

impl Corner for Vec3 {
    const DIMENSIONS: usize = 3;
}

/// A box spanning `min..=max` on every axis.
///
/// Nothing enforces `min <= max`; boxes built with [`Aabb::from_points`] or
/// [`Aabb::unite`] satisfy it, and [`Aabb::bound_into`] preserves it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb<V> {
    pub min: V,
    pub max: V,
}

pub type Aabb2 = Aabb<Vec2>;
pub type Aabb3 = Aabb<Vec3>;

impl<V: Corner> Aabb<V> {
    pub fn new(min: V, max: V) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point. Returns `None` for an empty slice.
    pub fn from_points(points: &[V]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut aabb = Self::new(*first, *first);
        for point in rest {
            for axis in 0..V::DIMENSIONS {
                aabb.min[axis] = aabb.min[axis].min(point[axis]);
                aabb.max[axis] = aabb.max[axis].max(point[axis]);
            }
        }
        Some(aabb)
    }

    /// Per-axis min/max merge of two boxes.
    pub fn unite(a: &Self, b: &Self) -> Self {
        let mut united = *a;
        for axis in 0..V::DIMENSIONS {
            united.min[axis] = a.min[axis].min(b.min[axis]);
            united.max[axis] = a.max[axis].max(b.max[axis]);
        }
        united
    }

    /// Clamps both corners into `other`'s extents.
    ///
    /// A box that does not overlap `other` collapses onto one of its faces,
    /// so callers check [`has_area`](Self::has_area) before iterating.
    pub fn bound_into(mut self, other: &Self) -> Self {
        for axis in 0..V::DIMENSIONS {
            let (lo, hi) = (other.min[axis], other.max[axis]);
            self.min[axis] = self.min[axis].max(lo).min(hi);
            self.max[axis] = self.max[axis].max(lo).min(hi);
        }
        self
    }

    /// True when the box is wider than epsilon on both the x and y axes.
    pub fn has_area(&self) -> bool {
        (0..2).all(|axis| self.max[axis] - self.min[axis] > f32::EPSILON)
    }

    /// True when the x and y extents both collapse to a single value.
    pub fn is_point(&self) -> bool {
        (0..2).all(|axis| abs_diff_eq!(self.min[axis], self.max[axis], epsilon = f32::EPSILON))
    }

    pub fn contains(&self, point: V) -> bool {
        (0..V::DIMENSIONS).all(|axis| self.min[axis] <= point[axis] && point[axis] <= self.max[axis])
    }
}
