use nalgebra::{Point3, Vector3};

/// Scalar field value at a point in space.
pub type Value = f32;

/// A 3D point with [`Value`] components.
pub type Point = Point3<Value>;

/// A 3D vector with [`Value`] components.
pub type Vector = Vector3<Value>;

/// Three indices into a mesh's vertex array.
pub type IndexedTriangle = [u32; 3];

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point,
    pub max: Point,
}

impl Aabb {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Edge lengths of the box.
    pub fn extent(&self) -> Vector {
        self.max - self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_covers_both_boxes() {
        let a = Aabb::new(Point::new(-1.0, 0.0, 2.0), Point::new(1.0, 1.0, 3.0));
        let b = Aabb::new(Point::new(0.0, -2.0, 0.0), Point::new(4.0, 0.5, 2.5));
        let u = a.union(&b);

        assert_eq!(u.min, Point::new(-1.0, -2.0, 0.0));
        assert_eq!(u.max, Point::new(4.0, 1.0, 3.0));
        assert_eq!(u.extent(), Vector::new(5.0, 3.0, 3.0));
    }
}
