use ndarray::Array3;
use tracing::trace;

use crate::{
    field::ScalarField,
    tables::CUBE_OFFSETS,
    types::{Aabb, Point, Value, Vector},
};

/// A dense voxel grid holding the scalar field at every cube corner.
///
/// The grid has `size_x × size_y × size_z` cubes and
/// `(size_x + 1) × (size_y + 1) × (size_z + 1)` corners. Corner `(x, y, z)` sits at
/// `origin + cube_size * (x, y, z)`.
///
/// Values are stored as `values[[z, y, x]]`, so the flat offset of a corner is
/// `z * (size_x + 1) * (size_y + 1) + y * (size_x + 1) + x`.
#[derive(Debug, Clone)]
pub struct VoxelGrid {
    /// Number of cubes along X.
    pub size_x: usize,
    /// Number of cubes along Y.
    pub size_y: usize,
    /// Number of cubes along Z.
    pub size_z: usize,
    /// World-space position of corner `(0, 0, 0)`.
    pub origin: Point,
    /// World-space size of each cube edge.
    pub cube_size: Value,
    /// Scalar field values, indexed `[[z, y, x]]`.
    pub values: Array3<Value>,
}

impl VoxelGrid {
    /// Number of cubes along each axis needed to cover `bounds`, or `None` when any side
    /// is not longer than one cube.
    ///
    /// ```text
    /// n = floor(extent / cube_size) + 1
    /// ```
    pub fn dimensions(bounds: &Aabb, cube_size: Value) -> Option<[usize; 3]> {
        let extent = bounds.extent();
        if !extent.iter().all(|&e| e > cube_size) {
            return None;
        }
        Some([0, 1, 2].map(|i| (extent[i] / cube_size) as usize + 1))
    }

    /// Samples `field` at every corner of a grid covering `bounds`.
    ///
    /// Returns `None` for degenerate bounds (see [`dimensions`](VoxelGrid::dimensions)).
    pub fn sample(field: &ScalarField, bounds: &Aabb, cube_size: Value) -> Option<Self> {
        let [size_x, size_y, size_z] = Self::dimensions(bounds, cube_size)?;
        let origin = bounds.min;

        trace!(size_x, size_y, size_z, "sampling scalar field");

        // from_shape_fn visits every slot exactly once
        let values = Array3::from_shape_fn((size_z + 1, size_y + 1, size_x + 1), |(z, y, x)| {
            field.iso_value(&corner_position(&origin, cube_size, x, y, z))
        });

        Some(Self {
            size_x,
            size_y,
            size_z,
            origin,
            cube_size,
            values,
        })
    }

    /// Number of cubes in the grid.
    pub fn cube_count(&self) -> usize {
        self.size_x * self.size_y * self.size_z
    }

    /// Flat offset of corner `(x, y, z)`.
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        z * (self.size_x + 1) * (self.size_y + 1) + y * (self.size_x + 1) + x
    }

    /// Returns the scalar field value at corner `(x, y, z)`.
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> Value {
        self.values[[z, y, x]]
    }

    /// World-space position of corner `(x, y, z)`.
    #[inline]
    pub fn position(&self, x: usize, y: usize, z: usize) -> Point {
        corner_position(&self.origin, self.cube_size, x, y, z)
    }

    /// Returns the 8 corner indices `[x, y, z]` of the cube at `(x, y, z)`, in table order.
    #[inline]
    pub fn cube_corner_indices(&self, x: usize, y: usize, z: usize) -> [[usize; 3]; 8] {
        CUBE_OFFSETS.map(|[ox, oy, oz]| [x + ox, y + oy, z + oz])
    }
}

#[inline]
fn corner_position(origin: &Point, cube_size: Value, x: usize, y: usize, z: usize) -> Point {
    origin + Vector::new(x as Value, y as Value, z as Value) * cube_size
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{field::BlendingFunction, skeleton::SkeletonNode};

    fn unit_box() -> Aabb {
        Aabb::new(Point::new(-1.0, -1.0, -1.0), Point::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn dimensions_add_one_cube() {
        let bounds = Aabb::new(Point::origin(), Point::new(1.0, 2.0, 0.75));
        assert_eq!(VoxelGrid::dimensions(&bounds, 0.25), Some([5, 9, 4]));
    }

    #[test]
    fn degenerate_bounds_have_no_grid() {
        let thin = Aabb::new(Point::origin(), Point::new(1.0, 0.25, 1.0));
        assert_eq!(VoxelGrid::dimensions(&thin, 0.25), None);

        let tiny = Aabb::new(Point::origin(), Point::new(0.1, 0.1, 0.1));
        assert_eq!(VoxelGrid::dimensions(&tiny, 0.2), None);
    }

    #[test]
    fn sample_fills_every_corner() {
        let skeleton = [SkeletonNode::sphere(Point::origin(), 1.0)];
        let field = ScalarField::new(&skeleton, BlendingFunction::Spore);
        let grid = VoxelGrid::sample(&field, &unit_box(), 0.5).unwrap();

        assert_eq!((grid.size_x, grid.size_y, grid.size_z), (5, 5, 5));
        assert_eq!(grid.values.len(), 6 * 6 * 6);
        assert_eq!(grid.cube_count(), 125);

        for ((z, y, x), &v) in grid.values.indexed_iter() {
            assert_eq!(v, field.iso_value(&grid.position(x, y, z)));
        }
        // corner (2, 2, 2) is the sphere center
        assert_eq!(grid.get(2, 2, 2), 1.0);
    }

    #[test]
    fn flat_index_matches_storage_order() {
        let skeleton = [SkeletonNode::sphere(Point::new(0.2, -0.1, 0.3), 1.0)];
        let field = ScalarField::new(&skeleton, BlendingFunction::Spore);
        let grid = VoxelGrid::sample(&field, &unit_box(), 0.25).unwrap();
        let flat = grid.values.as_slice().unwrap();

        for (x, y, z) in [(0, 0, 0), (3, 1, 2), (8, 8, 8), (1, 7, 4)] {
            assert_eq!(flat[grid.index(x, y, z)], grid.get(x, y, z));
        }
    }

    #[test]
    fn corner_positions_follow_origin_and_scale() {
        let skeleton = [SkeletonNode::sphere(Point::origin(), 1.0)];
        let field = ScalarField::new(&skeleton, BlendingFunction::Spore);
        let grid = VoxelGrid::sample(&field, &unit_box(), 0.5).unwrap();

        assert_eq!(grid.position(0, 0, 0), Point::new(-1.0, -1.0, -1.0));
        assert_eq!(grid.position(5, 1, 4), Point::new(1.5, -0.5, 1.0));
    }

    #[test]
    fn cube_corners_use_table_order() {
        let skeleton = [SkeletonNode::sphere(Point::origin(), 1.0)];
        let field = ScalarField::new(&skeleton, BlendingFunction::Spore);
        let grid = VoxelGrid::sample(&field, &unit_box(), 0.5).unwrap();
        let corners = grid.cube_corner_indices(1, 2, 3);

        assert_eq!(corners[0], [1, 2, 3]);
        assert_eq!(corners[2], [2, 3, 3]);
        assert_eq!(corners[7], [1, 3, 4]);
    }
}
