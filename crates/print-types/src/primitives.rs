//! Closed, outward-wound reference solids with known volumes.

use crate::mesh::MeshGeometry;

/// Corner indices of the box triangles, two per face, counter-clockwise
/// when viewed from outside.
const BOX_TRIANGLES: [[usize; 3]; 12] = [
    [0, 2, 1], [0, 3, 2], // bottom (-z)
    [4, 5, 6], [4, 6, 7], // top (+z)
    [0, 1, 5], [0, 5, 4], // front (-y)
    [3, 7, 6], [3, 6, 2], // back (+y)
    [0, 4, 7], [0, 7, 3], // left (-x)
    [1, 2, 6], [1, 6, 5], // right (+x)
];

/// Axis-aligned box spanning `min..max`. Volume is the product of the extents.
pub fn axis_box(min: [f32; 3], max: [f32; 3]) -> MeshGeometry {
    let [x0, y0, z0] = min;
    let [x1, y1, z1] = max;
    let corners = [
        [x0, y0, z0],
        [x1, y0, z0],
        [x1, y1, z0],
        [x0, y1, z0],
        [x0, y0, z1],
        [x1, y0, z1],
        [x1, y1, z1],
        [x0, y1, z1],
    ];

    let positions = BOX_TRIANGLES
        .iter()
        .flat_map(|tri| tri.iter().flat_map(|&i| corners[i]))
        .collect();
    fixed_mesh(positions)
}

/// Cube with one corner at the origin.
pub fn cube(side: f32) -> MeshGeometry {
    axis_box([0.0; 3], [side; 3])
}

/// Right-corner tetrahedron on the three axes. Volume is `edge³ / 6`.
pub fn corner_tetrahedron(edge: f32) -> MeshGeometry {
    let o = [0.0, 0.0, 0.0];
    let a = [edge, 0.0, 0.0];
    let b = [0.0, edge, 0.0];
    let c = [0.0, 0.0, edge];
    fixed_mesh(
        [[o, b, a], [o, a, c], [o, c, b], [a, b, c]]
            .into_iter()
            .flat_map(|tri| tri.into_iter().flatten())
            .collect(),
    )
}

/// The same mesh with every triangle's winding reversed (normals inward).
pub fn inverted(mesh: &MeshGeometry) -> MeshGeometry {
    let positions = mesh
        .positions()
        .chunks_exact(9)
        .flat_map(|tri| {
            [
                tri[0], tri[1], tri[2], tri[6], tri[7], tri[8], tri[3], tri[4], tri[5],
            ]
        })
        .collect();
    fixed_mesh(positions)
}

/// Builders here only emit whole, non-empty triangle lists.
fn fixed_mesh(positions: Vec<f32>) -> MeshGeometry {
    MeshGeometry::from_positions(positions).expect("fixture positions form whole triangles")
}
