use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Raw floats stored per triangle: three vertices of (x, y, z).
pub const FLOATS_PER_TRIANGLE: usize = 9;

/// Errors raised when a flat position buffer cannot describe a triangle list.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("mesh has no triangles")]
    Empty,

    #[error("position buffer length {len} is not a multiple of {FLOATS_PER_TRIANGLE}")]
    RaggedPositions { len: usize },

    #[error("triangle order has {given} entries, mesh has {expected} triangles")]
    OrderLength { given: usize, expected: usize },

    #[error("triangle order is not a permutation (index {index} repeated or out of range)")]
    NotAPermutation { index: usize },
}

/// One triangle of a mesh, widened to `f64` for accumulation.
///
/// Coordinates are millimeters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Vector3<f64>; 3],
}

impl Triangle {
    pub fn new(p1: Vector3<f64>, p2: Vector3<f64>, p3: Vector3<f64>) -> Self {
        Self {
            vertices: [p1, p2, p3],
        }
    }

    fn from_floats(chunk: &[f32]) -> Self {
        let vertex = |i: usize| {
            Vector3::new(
                f64::from(chunk[i]),
                f64::from(chunk[i + 1]),
                f64::from(chunk[i + 2]),
            )
        };
        Self::new(vertex(0), vertex(3), vertex(6))
    }
}

/// Triangle soup decoded from one upload.
///
/// Positions are stored flat: `[x1, y1, z1, x2, y2, z2, x3, y3, z3, ...]`,
/// nine floats per triangle, in file order. The length is always a positive
/// multiple of [`FLOATS_PER_TRIANGLE`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct MeshGeometry {
    positions: Vec<f32>,
}

impl MeshGeometry {
    /// Wrap a flat position buffer, rejecting empty or ragged input.
    pub fn from_positions(positions: Vec<f32>) -> Result<Self, GeometryError> {
        if positions.is_empty() {
            return Err(GeometryError::Empty);
        }
        if positions.len() % FLOATS_PER_TRIANGLE != 0 {
            return Err(GeometryError::RaggedPositions {
                len: positions.len(),
            });
        }
        Ok(Self { positions })
    }

    /// Build from per-triangle vertex arrays.
    pub fn from_triangles<I>(triangles: I) -> Result<Self, GeometryError>
    where
        I: IntoIterator<Item = [[f32; 3]; 3]>,
    {
        let positions: Vec<f32> = triangles
            .into_iter()
            .flat_map(|tri| tri.into_iter().flatten())
            .collect();
        Self::from_positions(positions)
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / FLOATS_PER_TRIANGLE
    }

    /// Iterate triangles in stored order.
    pub fn triangles(&self) -> impl ExactSizeIterator<Item = Triangle> + '_ {
        self.positions
            .chunks_exact(FLOATS_PER_TRIANGLE)
            .map(Triangle::from_floats)
    }

    /// Axis-aligned bounds as `(min, max)`.
    pub fn bounds(&self) -> ([f32; 3], [f32; 3]) {
        let mut min = [f32::INFINITY; 3];
        let mut max = [f32::NEG_INFINITY; 3];
        for vertex in self.positions.chunks_exact(3) {
            for axis in 0..3 {
                min[axis] = min[axis].min(vertex[axis]);
                max[axis] = max[axis].max(vertex[axis]);
            }
        }
        (min, max)
    }

    /// Copy of the mesh moved by `offset`.
    pub fn translated(&self, offset: [f64; 3]) -> Self {
        let positions = self
            .positions
            .chunks_exact(3)
            .flat_map(|v| {
                [
                    (f64::from(v[0]) + offset[0]) as f32,
                    (f64::from(v[1]) + offset[1]) as f32,
                    (f64::from(v[2]) + offset[2]) as f32,
                ]
            })
            .collect();
        Self { positions }
    }

    /// Copy of the mesh uniformly scaled about the origin.
    pub fn scaled(&self, factor: f64) -> Self {
        let positions = self
            .positions
            .iter()
            .map(|&c| (f64::from(c) * factor) as f32)
            .collect();
        Self { positions }
    }

    /// Copy of the mesh with triangles rearranged so that triangle `i` of
    /// the result is triangle `order[i]` of `self`.
    pub fn with_triangle_order(&self, order: &[usize]) -> Result<Self, GeometryError> {
        let count = self.triangle_count();
        if order.len() != count {
            return Err(GeometryError::OrderLength {
                given: order.len(),
                expected: count,
            });
        }

        let mut seen = vec![false; count];
        let mut positions = Vec::with_capacity(self.positions.len());
        for &index in order {
            if index >= count || seen[index] {
                return Err(GeometryError::NotAPermutation { index });
            }
            seen[index] = true;
            let start = index * FLOATS_PER_TRIANGLE;
            positions.extend_from_slice(&self.positions[start..start + FLOATS_PER_TRIANGLE]);
        }
        Ok(Self { positions })
    }
}

impl TryFrom<Vec<f32>> for MeshGeometry {
    type Error = GeometryError;

    fn try_from(positions: Vec<f32>) -> Result<Self, Self::Error> {
        Self::from_positions(positions)
    }
}

impl From<MeshGeometry> for Vec<f32> {
    fn from(mesh: MeshGeometry) -> Self {
        mesh.positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_triangle() -> Vec<f32> {
        vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]
    }

    #[test]
    fn empty_positions_rejected() {
        assert_eq!(
            MeshGeometry::from_positions(vec![]),
            Err(GeometryError::Empty)
        );
    }

    #[test]
    fn ragged_positions_rejected() {
        let mut positions = one_triangle();
        positions.push(4.0);
        assert_eq!(
            MeshGeometry::from_positions(positions),
            Err(GeometryError::RaggedPositions { len: 10 })
        );
    }

    #[test]
    fn triangles_widen_to_f64() {
        let mesh = MeshGeometry::from_positions(one_triangle()).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        let tri = mesh.triangles().next().unwrap();
        assert_eq!(tri.vertices[1], Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(tri.vertices[2], Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn from_triangles_flattens_in_order() {
        let mesh = MeshGeometry::from_triangles([
            [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            [[5.0, 5.0, 5.0], [6.0, 5.0, 5.0], [5.0, 6.0, 5.0]],
        ])
        .unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.positions()[9], 5.0);
    }

    #[test]
    fn reorder_rejects_duplicates() {
        let mesh = MeshGeometry::from_triangles([
            [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            [[5.0, 5.0, 5.0], [6.0, 5.0, 5.0], [5.0, 6.0, 5.0]],
        ])
        .unwrap();
        assert_eq!(
            mesh.with_triangle_order(&[1, 1]),
            Err(GeometryError::NotAPermutation { index: 1 })
        );
        let swapped = mesh.with_triangle_order(&[1, 0]).unwrap();
        assert_eq!(swapped.positions()[0], 5.0);
    }

    #[test]
    fn translate_moves_bounds() {
        let mesh = MeshGeometry::from_positions(one_triangle()).unwrap();
        let (min, max) = mesh.translated([10.0, -2.0, 3.0]).bounds();
        assert_eq!(min, [10.0, -2.0, 3.0]);
        assert_eq!(max, [11.0, -1.0, 3.0]);
    }
}
