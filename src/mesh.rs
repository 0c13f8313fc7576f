use crate::types::{Aabb, IndexedTriangle, Point, Vector};

/// Indexed triangle mesh produced by the extractor.
///
/// `vertices` and `normals` are parallel arrays; every index in `triangles` points into
/// them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions in world coordinates.
    pub vertices: Vec<Point>,

    /// Unit surface normal per vertex.
    pub normals: Vec<Vector>,

    /// Triangle index triples into `vertices`: `[[v0, v1, v2], ...]`
    pub triangles: Vec<IndexedTriangle>,
}

impl Mesh {
    /// Creates an empty mesh with no vertices, triangles, or normals.
    pub fn new_empty() -> Self {
        Self::default()
    }

    /// Removes every vertex, normal and triangle, keeping the allocations.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.normals.clear();
        self.triangles.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Appends a vertex with its normal and returns its index.
    pub fn push_vertex(&mut self, position: Point, normal: Vector) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        self.normals.push(normal);
        index
    }

    /// Returns the three vertex positions of triangle `tri`.
    pub fn tri_coords(&self, tri: usize) -> [Point; 3] {
        self.triangles[tri].map(|i| self.vertices[i as usize])
    }

    /// Computes the face normal for triangle `tri`.
    ///
    /// Returns the zero vector if the triangle is degenerate.
    pub fn tri_normal(&self, tri: usize) -> Vector {
        let [a, b, c] = self.tri_coords(tri);
        let cross = (b - a).cross(&(c - b));

        cross.try_normalize(0.0).unwrap_or_else(Vector::zeros)
    }

    /// Bounding box of the vertices, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<Aabb> {
        self.vertices
            .iter()
            .map(|&v| Aabb::new(v, v))
            .reduce(|acc, b| acc.union(&b))
    }

    /// Vertex positions as plain arrays, for render backends.
    pub fn positions_f32(&self) -> Vec<[f32; 3]> {
        self.vertices.iter().map(|v| [v.x, v.y, v.z]).collect()
    }

    /// Normals as plain arrays, for render backends.
    pub fn normals_f32(&self) -> Vec<[f32; 3]> {
        self.normals.iter().map(|n| [n.x, n.y, n.z]).collect()
    }

    /// Flattened triangle list.
    pub fn indices(&self) -> Vec<u32> {
        self.triangles.iter().flatten().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Mesh {
        let mut mesh = Mesh::new_empty();
        for p in [
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        ] {
            mesh.push_vertex(p, Vector::z());
        }
        mesh.triangles.extend([[0, 1, 2], [0, 2, 3]]);
        mesh
    }

    #[test]
    fn face_normal_follows_winding() {
        let mesh = quad();
        assert_eq!(mesh.tri_normal(0), Vector::z());
        assert_eq!(mesh.tri_normal(1), Vector::z());
    }

    #[test]
    fn degenerate_face_normal_is_zero() {
        let mut mesh = quad();
        mesh.triangles.push([0, 0, 1]);
        assert_eq!(mesh.tri_normal(2), Vector::zeros());
    }

    #[test]
    fn flattens_for_upload() {
        let mesh = quad();
        assert_eq!(mesh.indices(), [0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.positions_f32()[2], [1.0, 1.0, 0.0]);
        assert_eq!(mesh.normals_f32().len(), mesh.vertex_count());
    }

    #[test]
    fn bounds_and_clear() {
        let mut mesh = quad();
        let b = mesh.bounds().unwrap();
        assert_eq!(b.min, Point::origin());
        assert_eq!(b.max, Point::new(1.0, 1.0, 0.0));

        mesh.clear();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
        assert!(mesh.bounds().is_none());
    }
}
