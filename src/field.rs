//! Scalar field generated by a skeleton.
//!
//! The potential at `p` is the sum of one falloff kernel per skeleton node. With the
//! [`Spore`](BlendingFunction::Spore) kernel, for `r = distance / radius` and
//! `d = 10 * radius`:
//!
//! ```text
//! k(r) = (r^4 - 2r^2 + 1) / (1 + d r^2)    r <= 1
//! k(r) = 0                                 r >  1
//! ```
//!
//! so each node contributes `1` at its reference point and fades to `0` at its radius.

use crate::{
    error::IsosurfaceError,
    skeleton::SkeletonNode,
    types::{Point, Value, Vector},
};

/// Per-node potential kernel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BlendingFunction {
    /// Wyvill "soft objects" falloff, clamped to the node radius.
    #[default]
    Spore = 0,
}

impl BlendingFunction {
    /// Number of kernels; the first invalid index.
    pub const NONE: u8 = 1;

    /// Kernel value for a node of `radius` at normalized distance `r`.
    #[inline]
    pub fn kernel(&self, r: Value, radius: Value) -> Value {
        match self {
            Self::Spore => {
                if r > 1.0 {
                    return 0.0;
                }
                let d = radius * 10.0;
                let r2 = r * r;
                (r2 * r2 - 2.0 * r2 + 1.0) / (1.0 + d * r2)
            }
        }
    }
}

impl TryFrom<u8> for BlendingFunction {
    type Error = IsosurfaceError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        match index {
            0 => Ok(Self::Spore),
            _ => Err(IsosurfaceError::InvalidBlend(index)),
        }
    }
}

/// Normal returned where the field gradient vanishes: `+Y`.
#[inline]
pub fn fallback_normal() -> Vector {
    Vector::y()
}

/// The blended potential of a borrowed skeleton.
#[derive(Debug, Clone, Copy)]
pub struct ScalarField<'a> {
    nodes: &'a [SkeletonNode],
    blend: BlendingFunction,
}

impl<'a> ScalarField<'a> {
    pub fn new(nodes: &'a [SkeletonNode], blend: BlendingFunction) -> Self {
        Self { nodes, blend }
    }

    /// Potential at `p`, summed over every node. Always `>= 0`.
    pub fn iso_value(&self, p: &Point) -> Value {
        self.nodes
            .iter()
            .map(|node| {
                let radius = node.radius();
                self.blend.kernel(node.distance_to(p) / radius, radius)
            })
            .sum()
    }

    /// Surface normal at `p`: the negated central-difference gradient with step `h`,
    /// normalized. Falls back to [`fallback_normal`] when the gradient vanishes.
    pub fn normal(&self, p: &Point, h: Value) -> Vector {
        let mut gradient = Vector::zeros();
        for axis in 0..3 {
            let mut step = Vector::zeros();
            step[axis] = h;
            gradient[axis] = self.iso_value(&(p - step)) - self.iso_value(&(p + step));
        }

        gradient
            .try_normalize(Value::EPSILON * Value::EPSILON)
            .filter(|n| n.iter().all(|c| c.is_finite()))
            .unwrap_or_else(fallback_normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_sphere() -> [SkeletonNode; 1] {
        [SkeletonNode::sphere(Point::origin(), 1.0)]
    }

    #[test]
    fn spore_kernel_endpoints() {
        let blend = BlendingFunction::Spore;

        assert_eq!(blend.kernel(0.0, 1.0), 1.0);
        assert_eq!(blend.kernel(1.0, 1.0), 0.0);
        assert_eq!(blend.kernel(1.5, 1.0), 0.0);
    }

    #[test]
    fn spore_kernel_midpoint() {
        // (1/16 - 1/2 + 1) / (1 + 10/4) = 0.5625 / 3.5
        let k = BlendingFunction::Spore.kernel(0.5, 1.0);
        assert!((k - 0.5625 / 3.5).abs() < 1e-6);
    }

    #[test]
    fn spore_kernel_stiffness_scales_with_radius() {
        let small = BlendingFunction::Spore.kernel(0.5, 1.0);
        let large = BlendingFunction::Spore.kernel(0.5, 10.0);
        assert!(large < small);
    }

    #[test]
    fn iso_value_sums_every_node() {
        let one = unit_sphere();
        let two = [one[0], one[0]];
        let p = Point::new(0.3, 0.1, -0.2);

        let single = ScalarField::new(&one, BlendingFunction::Spore).iso_value(&p);
        let double = ScalarField::new(&two, BlendingFunction::Spore).iso_value(&p);
        assert_eq!(double, 2.0 * single);
    }

    #[test]
    fn iso_value_counts_later_nodes() {
        // The point is outside the first node and inside the second.
        let skeleton = [
            SkeletonNode::sphere(Point::new(5.0, 0.0, 0.0), 1.0),
            SkeletonNode::sphere(Point::origin(), 1.0),
        ];
        let field = ScalarField::new(&skeleton, BlendingFunction::Spore);
        assert_eq!(field.iso_value(&Point::origin()), 1.0);
    }

    #[test]
    fn empty_skeleton_has_zero_potential() {
        let field = ScalarField::new(&[], BlendingFunction::Spore);
        assert_eq!(field.iso_value(&Point::new(1.0, 2.0, 3.0)), 0.0);
    }

    #[test]
    fn normal_points_away_from_center_on_every_axis() {
        let skeleton = unit_sphere();
        let field = ScalarField::new(&skeleton, BlendingFunction::Spore);

        for p in [
            Point::new(0.3, 0.0, 0.0),
            Point::new(0.0, -0.3, 0.0),
            Point::new(0.0, 0.0, 0.3),
        ] {
            let n = field.normal(&p, 0.05);
            let outward = p.coords.normalize();
            assert!(n.dot(&outward) > 0.999, "normal {n:?} at {p:?}");
            assert!((n.norm() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn flat_field_falls_back_to_up() {
        let skeleton = unit_sphere();
        let field = ScalarField::new(&skeleton, BlendingFunction::Spore);
        assert_eq!(field.normal(&Point::new(5.0, 5.0, 5.0), 0.1), fallback_normal());
    }

    #[test]
    fn blend_index_validation() {
        assert_eq!(BlendingFunction::try_from(0), Ok(BlendingFunction::Spore));
        assert_eq!(
            BlendingFunction::try_from(BlendingFunction::NONE),
            Err(IsosurfaceError::InvalidBlend(BlendingFunction::NONE))
        );
    }
}
