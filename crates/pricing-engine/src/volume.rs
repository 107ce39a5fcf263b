//! Enclosed volume of a closed triangle mesh by signed tetrahedra.
//!
//! Each triangle (p1, p2, p3) spans a tetrahedron with the origin whose
//! signed volume is `p1 · (p2 × p3) / 6`. Over a closed, consistently
//! wound surface the contributions outside the solid cancel, so the sum is
//! the enclosed volume wherever the origin lies. Open or inside-out meshes
//! give a wrong number, not an error.

use print_types::{MeshGeometry, Triangle};
use tracing::{debug, instrument};

/// Signed volume of the tetrahedron spanned by `tri` and the origin (mm³).
pub fn signed_tetrahedron_volume(tri: &Triangle) -> f64 {
    let [p1, p2, p3] = &tri.vertices;
    p1.dot(&p2.cross(p3)) / 6.0
}

/// Sum of signed tetrahedron volumes over every triangle (mm³).
///
/// Positive for outward winding. All triangles are visited.
pub fn signed_volume_mm3(mesh: &MeshGeometry) -> f64 {
    let mut sum = CompensatedSum::default();
    for tri in mesh.triangles() {
        sum.add(signed_tetrahedron_volume(&tri));
    }
    sum.total()
}

/// Enclosed volume in mm³, independent of winding direction.
#[instrument(skip_all, fields(triangles = mesh.triangle_count()))]
pub fn enclosed_volume_mm3(mesh: &MeshGeometry) -> f64 {
    let signed = signed_volume_mm3(mesh);
    debug!(signed, "integrated signed volume");
    signed.abs()
}

/// Neumaier summation. Terms from triangles far from the origin are large
/// and mostly cancel.
#[derive(Debug, Default, Clone, Copy)]
struct CompensatedSum {
    sum: f64,
    compensation: f64,
}

impl CompensatedSum {
    fn add(&mut self, value: f64) {
        let t = self.sum + value;
        if self.sum.abs() >= value.abs() {
            self.compensation += (self.sum - t) + value;
        } else {
            self.compensation += (value - t) + self.sum;
        }
        self.sum = t;
    }

    fn total(&self) -> f64 {
        self.sum + self.compensation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use print_types::primitives::{axis_box, corner_tetrahedron, cube, inverted};

    #[test]
    fn unit_tetrahedron_term() {
        let tri = Triangle::new(
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        );
        assert_relative_eq!(signed_tetrahedron_volume(&tri), 1.0 / 6.0);
    }

    #[test]
    fn cube_of_side_ten_is_one_thousand() {
        assert_relative_eq!(
            enclosed_volume_mm3(&cube(10.0)),
            1000.0,
            max_relative = 1e-6
        );
    }

    #[test]
    fn box_volume_is_product_of_extents() {
        let mesh = axis_box([-5.0, 2.0, 1.0], [15.0, 4.0, 4.0]);
        assert_relative_eq!(enclosed_volume_mm3(&mesh), 20.0 * 2.0 * 3.0, max_relative = 1e-9);
    }

    #[test]
    fn tetrahedron_volume_is_edge_cubed_over_six() {
        let mesh = corner_tetrahedron(6.0);
        assert_relative_eq!(enclosed_volume_mm3(&mesh), 36.0, max_relative = 1e-9);
    }

    #[test]
    fn inside_out_mesh_flips_sign_only() {
        let mesh = cube(4.0);
        let flipped = inverted(&mesh);
        assert_relative_eq!(signed_volume_mm3(&mesh), 64.0, max_relative = 1e-9);
        assert_relative_eq!(signed_volume_mm3(&flipped), -64.0, max_relative = 1e-9);
        assert_relative_eq!(enclosed_volume_mm3(&flipped), 64.0, max_relative = 1e-9);
    }

    #[test]
    fn integer_translation_is_exact() {
        let mesh = cube(10.0).translated([250.0, -130.0, 75.0]);
        assert_relative_eq!(enclosed_volume_mm3(&mesh), 1000.0, max_relative = 1e-9);
    }

    #[test]
    fn open_mesh_returns_a_number() {
        let mesh = print_types::MeshGeometry::from_positions(
            cube(2.0).positions()[..9 * 10].to_vec(),
        )
        .unwrap();
        assert!(enclosed_volume_mm3(&mesh).is_finite());
    }

    #[test]
    fn compensated_sum_recovers_small_residual() {
        let mut sum = CompensatedSum::default();
        for value in [1e16, 1.0, -1e16, 1.0] {
            sum.add(value);
        }
        assert_eq!(sum.total(), 2.0);
    }
}
