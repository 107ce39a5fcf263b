//! STL encoding from MeshGeometry, binary and ASCII.

use nalgebra::Vector3;
use print_types::{MeshGeometry, Triangle};

use crate::decode::{HEADER_LEN, PREAMBLE_LEN, RECORD_LEN};

/// Encode a mesh as binary STL.
///
/// The header carries `name`, truncated to 80 bytes and zero-padded.
/// Each record stores a unit face normal derived from the winding, the
/// three vertices, and a zero attribute count.
pub fn encode_binary_stl(mesh: &MeshGeometry, name: &str) -> Vec<u8> {
    let tri_count = mesh.triangle_count();
    let mut buf = Vec::with_capacity(PREAMBLE_LEN + tri_count * RECORD_LEN);

    let header = format!("binary STL: {}", name);
    let header_bytes = header.as_bytes();
    buf.extend_from_slice(&header_bytes[..header_bytes.len().min(HEADER_LEN)]);
    buf.resize(HEADER_LEN, 0u8);

    buf.extend_from_slice(&(tri_count as u32).to_le_bytes());

    for (tri, raw) in mesh.triangles().zip(mesh.positions().chunks_exact(9)) {
        for c in face_normal(&tri) {
            buf.extend_from_slice(&c.to_le_bytes());
        }
        // Vertices are written from the stored f32 values, not the widened copy.
        for c in raw {
            buf.extend_from_slice(&c.to_le_bytes());
        }
        buf.extend_from_slice(&0u16.to_le_bytes());
    }

    buf
}

/// Encode a mesh as an ASCII STL string.
pub fn encode_ascii_stl(mesh: &MeshGeometry, name: &str) -> String {
    let mut out = String::with_capacity(mesh.triangle_count() * 300);
    out.push_str(&format!("solid {}\n", name));

    for (tri, raw) in mesh.triangles().zip(mesh.positions().chunks_exact(9)) {
        let [nx, ny, nz] = face_normal(&tri);
        out.push_str(&format!("  facet normal {} {} {}\n", nx, ny, nz));
        out.push_str("    outer loop\n");
        for v in raw.chunks_exact(3) {
            out.push_str(&format!("      vertex {} {} {}\n", v[0], v[1], v[2]));
        }
        out.push_str("    endloop\n");
        out.push_str("  endfacet\n");
    }

    out.push_str(&format!("endsolid {}\n", name));
    out
}

fn face_normal(tri: &Triangle) -> [f32; 3] {
    let [p1, p2, p3] = tri.vertices;
    let n: Vector3<f64> = (p2 - p1).cross(&(p3 - p1));
    let len = n.norm();
    if len > 1e-12 {
        let n = n / len;
        [n.x as f32, n.y as f32, n.z as f32]
    } else {
        [0.0, 0.0, 0.0]
    }
}
