use crate::types::{Point, Value};

/// Placement of the surface crossing along a grid edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EdgeInterpolation {
    /// Linear interpolation of the threshold between the two corner values.
    #[default]
    Linear,
    /// `v0 / (v0 + v1)`, independent of the threshold. Kept for meshes that must match
    /// the historic output of this extractor.
    Ratio,
}

impl EdgeInterpolation {
    /// Interpolation factor from the corner with value `v0` toward the corner with `v1`.
    #[inline]
    pub fn factor(&self, v0: Value, v1: Value, iso_val: Value) -> Value {
        match self {
            Self::Linear => find_t(v0, v1, iso_val),
            Self::Ratio => {
                let sum = v0 + v1;
                if sum == 0.0 { 0.5 } else { v0 / sum }
            }
        }
    }
}

// Return the interpolation factor t corresponding to iso_val
#[inline]
pub fn find_t(v0: Value, v1: Value, iso_val: Value) -> Value {
    if v1 == v0 {
        return 0.5;
    }
    (iso_val - v0) / (v1 - v0)
}

// Linear interpolation
#[inline]
pub fn lerp(a: Value, b: Value, t: Value) -> Value {
    a + (b - a) * t
}

// Linearly interpolate between two points by factor t
#[inline]
pub fn interpolate_points(p0: &Point, p1: &Point, t: Value) -> Point {
    Point::new(
        lerp(p0.x, p1.x, t),
        lerp(p0.y, p1.y, t),
        lerp(p0.z, p1.z, t),
    )
}
