use crate::{
    grid::VoxelGrid,
    interp::{EdgeInterpolation, interpolate_points},
    tables::{CUBE_EDGE_FLAGS, EDGE_CONNECTION, EDGE_DIRECTION, TRI_TABLE},
    types::{Point, Value},
};

/// Identifies where on the voxel grid a surface vertex lies.
///
/// Adjacent cubes that share an edge produce the same key for it, which is what lets the
/// extractor emit a single vertex per surface crossing. A crossing that lands exactly on a
/// grid corner is keyed by that corner, so every edge meeting there shares one vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VertexKey {
    /// Crossing strictly between the two endpoints of a grid edge.
    Edge {
        /// Flat grid index of the edge's lower endpoint.
        corner: usize,
        /// Axis the edge runs along: 0 = X, 1 = Y, 2 = Z.
        axis: u8,
    },
    /// Crossing on the grid corner with this flat index.
    Corner(usize),
}

/// One cube of the grid with everything needed to triangulate it.
///
/// Corners are ordered to match the lookup tables:
/// ```text
///     7----6
///    /|   /|          Z  Y
///   4----5 |          | /
///   | 3--|-2          *-- X
///   |/   |/
///   0----1
///
///  0 = (x,   y,   z  )    4 = (x,   y,   z+1)
///  1 = (x+1, y,   z  )    5 = (x+1, y,   z+1)
///  2 = (x+1, y+1, z  )    6 = (x+1, y+1, z+1)
///  3 = (x,   y+1, z  )    7 = (x,   y+1, z+1)
/// ```
#[derive(Debug, Clone)]
pub struct Cell {
    /// Flat grid index of each corner.
    pub corners: [usize; 8],
    /// World-space corner positions.
    pub positions: [Point; 8],
    /// Scalar field value at each corner.
    pub values: [Value; 8],
    /// Bit `i` is set when corner `i` is inside the surface.
    pub flag_index: usize,
    /// 12-bit mask of the edges crossed by the surface.
    pub edge_flags: u16,
}

impl Cell {
    /// Reads the cube at grid index `(x, y, z)` and classifies it against `threshold`.
    pub fn from_grid(grid: &VoxelGrid, x: usize, y: usize, z: usize, threshold: Value) -> Self {
        let indices = grid.cube_corner_indices(x, y, z);
        let corners = indices.map(|[cx, cy, cz]| grid.index(cx, cy, cz));
        let positions = indices.map(|[cx, cy, cz]| grid.position(cx, cy, cz));
        let values = indices.map(|[cx, cy, cz]| grid.get(cx, cy, cz));

        let flag_index = get_state(&values, threshold);

        Self {
            corners,
            positions,
            values,
            flag_index,
            edge_flags: CUBE_EDGE_FLAGS[flag_index],
        }
    }

    /// `true` when the cube is entirely inside or entirely outside the surface.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edge_flags == 0
    }

    /// Key of a crossing strictly inside `edge`.
    #[inline]
    pub fn edge_key(&self, edge: usize) -> VertexKey {
        let [a, b] = EDGE_CONNECTION[edge];
        VertexKey::Edge {
            corner: self.corners[a].min(self.corners[b]),
            axis: edge_axis(edge),
        }
    }

    /// Surface crossing on `edge` and the key of the vertex placed there.
    ///
    /// The factor is always taken from the edge's lower grid corner toward its upper one,
    /// so every cube sharing the edge computes the same point. A crossing that reaches
    /// either endpoint is snapped onto that corner and keyed by it.
    pub fn edge_intersection(
        &self,
        edge: usize,
        threshold: Value,
        interpolation: EdgeInterpolation,
    ) -> (VertexKey, Point) {
        let [a, b] = EDGE_CONNECTION[edge];
        let (lo, hi) = if self.corners[a] < self.corners[b] { (a, b) } else { (b, a) };
        let (p_lo, p_hi) = (self.positions[lo], self.positions[hi]);

        let t = interpolation.factor(self.values[lo], self.values[hi], threshold);
        let point = interpolate_points(&p_lo, &p_hi, t);

        if t <= 0.0 || point == p_lo {
            (VertexKey::Corner(self.corners[lo]), p_lo)
        } else if t >= 1.0 || point == p_hi {
            (VertexKey::Corner(self.corners[hi]), p_hi)
        } else {
            (self.edge_key(edge), point)
        }
    }

    /// Interpolates the crossing along each edge flagged in [`edge_flags`](Cell::edge_flags).
    pub fn edge_intersections(
        &self,
        threshold: Value,
        interpolation: EdgeInterpolation,
    ) -> [Option<(VertexKey, Point)>; 12] {
        std::array::from_fn(|edge| {
            (self.edge_flags & (1 << edge) != 0)
                .then(|| self.edge_intersection(edge, threshold, interpolation))
        })
    }
}

/// Computes the marching cubes state bitmask for a cube.
///
/// Each of the 8 corners maps to one bit. A bit is set when the corner's value
/// is **at or below** the threshold (i.e. "inside" the surface):
///
/// ```text
/// corner index:  7  6  5  4  3  2  1  0
/// state bits:   [_][_][_][_][_][_][_][_]
///                                      ^-- corner 0 inside?
/// ```
#[inline]
pub fn get_state(values: &[Value; 8], threshold: Value) -> usize {
    values
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v <= threshold)
        .fold(0, |state, (i, _)| state | 1 << i)
}

/// Axis index of `edge`, read from [`EDGE_DIRECTION`].
#[inline]
pub fn edge_axis(edge: usize) -> u8 {
    EDGE_DIRECTION[edge]
        .iter()
        .position(|&d| d != 0)
        .unwrap_or_default() as u8
}

/// Edge triples of the triangles for a given marching cubes `state`.
///
/// `TRI_TABLE[state]` contains edge indices in groups of three, terminated by `-1`:
/// ```text
/// TRI_TABLE[state] = [e0, e1, e2,  e3, e4, e5,  -1, ...]
///                     \___tri0__/   \___tri1__/
/// ```
#[inline]
pub fn triangles_from_state(state: usize) -> impl Iterator<Item = [usize; 3]> {
    TRI_TABLE[state]
        .chunks_exact(3)
        .take_while(|tri| tri[0] != -1)
        .map(|tri| [tri[0] as usize, tri[1] as usize, tri[2] as usize])
}
