//! Skeleton primitives that generate the scalar field.
//!
//! Each node has an influence `radius` and an axis-aligned box bounding the region where
//! it contributes potential. The box must cover every point with `distance_to(p) <= radius`,
//! otherwise the extracted surface is clipped at the grid boundary.

use crate::types::{Aabb, Point, Value, Vector};

/// A point primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Point,
    pub radius: Value,
}

impl Sphere {
    pub fn new(center: Point, radius: Value) -> Self {
        Self { center, radius }
    }

    #[inline]
    pub fn distance_to(&self, p: &Point) -> Value {
        (p - self.center).norm()
    }

    pub fn bounds(&self) -> Aabb {
        let r = Vector::repeat(self.radius);
        Aabb::new(self.center - r, self.center + r)
    }
}

/// A line segment primitive from `start` to `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    pub start: Point,
    pub end: Point,
    pub radius: Value,
}

impl Capsule {
    pub fn new(start: Point, end: Point, radius: Value) -> Self {
        Self { start, end, radius }
    }

    /// Distance from `p` to the closest point of the segment.
    #[inline]
    pub fn distance_to(&self, p: &Point) -> Value {
        let pa = p - self.start;
        let ba = self.end - self.start;
        let len_sq = ba.norm_squared();
        if len_sq == 0.0 {
            return pa.norm();
        }
        let h = (pa.dot(&ba) / len_sq).clamp(0.0, 1.0);
        (pa - ba * h).norm()
    }

    pub fn bounds(&self) -> Aabb {
        let r = Vector::repeat(self.radius);
        Aabb::new(self.start.inf(&self.end) - r, self.start.sup(&self.end) + r)
    }
}

/// A skeleton primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkeletonNode {
    Sphere(Sphere),
    Capsule(Capsule),
}

impl SkeletonNode {
    pub fn sphere(center: Point, radius: Value) -> Self {
        Self::Sphere(Sphere::new(center, radius))
    }

    pub fn capsule(start: Point, end: Point, radius: Value) -> Self {
        Self::Capsule(Capsule::new(start, end, radius))
    }

    /// Distance from `p` to the node's reference point or axis.
    #[inline]
    pub fn distance_to(&self, p: &Point) -> Value {
        match self {
            Self::Sphere(s) => s.distance_to(p),
            Self::Capsule(c) => c.distance_to(p),
        }
    }

    /// Influence radius.
    #[inline]
    pub fn radius(&self) -> Value {
        match self {
            Self::Sphere(s) => s.radius,
            Self::Capsule(c) => c.radius,
        }
    }

    pub fn bounds(&self) -> Aabb {
        match self {
            Self::Sphere(s) => s.bounds(),
            Self::Capsule(c) => c.bounds(),
        }
    }

    pub fn extends_from(&self) -> Point {
        self.bounds().min
    }

    pub fn extends_to(&self) -> Point {
        self.bounds().max
    }

    /// Returns a copy of the node moved by `offset`.
    pub fn translated(&self, offset: Vector) -> Self {
        match *self {
            Self::Sphere(s) => Self::sphere(s.center + offset, s.radius),
            Self::Capsule(c) => Self::capsule(c.start + offset, c.end + offset, c.radius),
        }
    }
}

impl From<Sphere> for SkeletonNode {
    fn from(s: Sphere) -> Self {
        Self::Sphere(s)
    }
}

impl From<Capsule> for SkeletonNode {
    fn from(c: Capsule) -> Self {
        Self::Capsule(c)
    }
}

/// Union of the bounds of every node, or `None` for an empty skeleton.
pub fn skeleton_bounds(skeleton: &[SkeletonNode]) -> Option<Aabb> {
    skeleton
        .iter()
        .map(SkeletonNode::bounds)
        .reduce(|acc, b| acc.union(&b))
}
