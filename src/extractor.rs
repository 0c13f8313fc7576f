//! Marching cubes over a skeleton's scalar field.
//!
//! ```text
//! build(skeleton, settings)
//!   1. skeleton_bounds           →  union of node boxes
//!   2. VoxelGrid::sample         →  potential at every cube corner
//!   3. per cube:
//!        Cell::from_grid         →  8 corners, state, edge flags
//!        edge_intersections      →  up to 12 interpolated crossings
//!        triangles_from_state    →  up to 5 triangles from TRI_TABLE
//!   4. de-duplicate crossings by grid edge or corner, normal from the field gradient
//! ```

use std::collections::HashMap;

use tracing::debug;

use crate::{
    cell::{Cell, VertexKey, triangles_from_state},
    error::{IsosurfaceError, Result},
    field::ScalarField,
    grid::VoxelGrid,
    mesh::Mesh,
    settings::IsosurfaceSettings,
    skeleton::{SkeletonNode, skeleton_bounds},
    types::{IndexedTriangle, Point, Value, Vector},
};

/// Builds and rebuilds the mesh of one implicit surface.
///
/// The extractor keeps the settings of the last [`build`](Isosurface::build) so the surface
/// can be regenerated for a new skeleton with [`update`](Isosurface::update).
#[derive(Debug, Clone, Default)]
pub struct Isosurface {
    settings: Option<IsosurfaceSettings>,
    mesh: Mesh,
    vertex_index: HashMap<VertexKey, u32>,
}

impl Isosurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current mesh with the surface of `skeleton`.
    ///
    /// An empty skeleton, or one whose bounds are not longer than one cube on every axis,
    /// yields an empty mesh.
    pub fn build(
        &mut self,
        skeleton: &[SkeletonNode],
        settings: IsosurfaceSettings,
    ) -> Result<&Mesh> {
        settings.validate()?;
        self.settings = Some(settings);
        self.generate(skeleton, &settings);
        Ok(&self.mesh)
    }

    /// Rebuilds the mesh for a new `skeleton` with the settings of the last build.
    ///
    /// Returns [`IsosurfaceError::NotConfigured`] if [`build`](Isosurface::build) never
    /// succeeded.
    pub fn update(&mut self, skeleton: &[SkeletonNode]) -> Result<&Mesh> {
        let settings = self.settings.ok_or(IsosurfaceError::NotConfigured)?;
        self.generate(skeleton, &settings);
        Ok(&self.mesh)
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn into_mesh(self) -> Mesh {
        self.mesh
    }

    pub fn settings(&self) -> Option<&IsosurfaceSettings> {
        self.settings.as_ref()
    }

    pub fn vertices(&self) -> &[Point] {
        &self.mesh.vertices
    }

    pub fn normals(&self) -> &[Vector] {
        &self.mesh.normals
    }

    pub fn triangles(&self) -> &[IndexedTriangle] {
        &self.mesh.triangles
    }

    fn generate(&mut self, skeleton: &[SkeletonNode], settings: &IsosurfaceSettings) {
        self.mesh.clear();
        self.vertex_index.clear();

        let Some(bounds) = skeleton_bounds(skeleton) else {
            debug!("empty skeleton, nothing to extract");
            return;
        };

        let field = ScalarField::new(skeleton, settings.blend);
        let Some(grid) = VoxelGrid::sample(&field, &bounds, settings.cube_size) else {
            debug!(cube_size = settings.cube_size, "skeleton bounds smaller than one cube");
            return;
        };

        self.march(&grid, &field, settings);

        debug!(
            nodes = skeleton.len(),
            cubes = grid.cube_count(),
            vertices = self.mesh.vertex_count(),
            triangles = self.mesh.triangle_count(),
            "isosurface extracted"
        );
    }

    fn march(&mut self, grid: &VoxelGrid, field: &ScalarField, settings: &IsosurfaceSettings) {
        let threshold = settings.target_value;

        for z in 0..grid.size_z {
            for y in 0..grid.size_y {
                for x in 0..grid.size_x {
                    let cell = Cell::from_grid(grid, x, y, z, threshold);
                    if cell.is_empty() {
                        continue;
                    }

                    let crossings = cell.edge_intersections(threshold, settings.interpolation);

                    for edges in triangles_from_state(cell.flag_index) {
                        let hits = edges.map(|edge| match crossings[edge] {
                            Some(hit) => hit,
                            None => {
                                unreachable!("edge {edge} unflagged in state {}", cell.flag_index)
                            }
                        });

                        // crossings snapped onto a shared corner can collapse a triangle
                        let [(a, _), (b, _), (c, _)] = hits;
                        if a == b || b == c || c == a {
                            continue;
                        }

                        let triangle = hits.map(|(key, position)| {
                            self.vertex(key, position, field, settings.cube_size)
                        });
                        self.mesh.triangles.push(triangle);
                    }
                }
            }
        }
    }

    /// Index of the vertex for `key`, appending it with its normal on first use.
    fn vertex(&mut self, key: VertexKey, position: Point, field: &ScalarField, h: Value) -> u32 {
        if let Some(&index) = self.vertex_index.get(&key) {
            return index;
        }
        let index = self.mesh.push_vertex(position, field.normal(&position, h));
        self.vertex_index.insert(key, index);
        index
    }
}

/// Extracts the surface of `skeleton` in one call.
pub fn extract(skeleton: &[SkeletonNode], settings: IsosurfaceSettings) -> Result<Mesh> {
    let mut surface = Isosurface::new();
    surface.build(skeleton, settings)?;
    Ok(surface.into_mesh())
}
