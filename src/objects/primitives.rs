//! Builders for the parametric primitives the viewer can show.
//!
//! All meshes are centered on the origin with `y` up. Texture coordinates
//! are laid out so that a camera on the `-z` axis sees the image upright
//! and unmirrored on the side facing it.

use crate::objects::Point;
use crate::objects::model3d::PrimitiveKind;
use crate::objects::triangle_mesh::TriangleMesh;
use nalgebra::{Vector2, Vector3};
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylinderOptions {
    pub height: f64,
    pub diameter_top: f64,
    pub diameter_bottom: f64,
    pub tessellation: usize,
}

/// Unit direction around the `y` axis; `φ = 3π/2` faces `-z` and `φ` grows
/// towards screen-right as seen from there. Builders start at `φ = π/2` so
/// the middle of the texture (`u = 0.5`) lands on the side facing `-z`.
fn around_y(phi: f64) -> Vector3<f64> {
    Vector3::new(-phi.cos(), 0.0, phi.sin())
}

pub struct MeshBuilder;

impl MeshBuilder {
    /// Cube with edge `size`, the full texture on every face.
    pub fn create_box(name: &str, size: f64) -> TriangleMesh {
        let mut mesh = TriangleMesh::new(name, PrimitiveKind::Box);
        let h = size / 2.0;

        // (наружная нормаль, направление "вверх" на грани)
        let faces = [
            (-Vector3::z(), Vector3::y()),
            (Vector3::z(), Vector3::y()),
            (Vector3::x(), Vector3::y()),
            (-Vector3::x(), Vector3::y()),
            (Vector3::y(), Vector3::z()),
            (-Vector3::y(), -Vector3::z()),
        ];

        for (normal, up) in faces {
            // Смотрим на грань снаружи: вперёд = -normal
            let right = (-normal).cross(&up);
            let center = Point::from(normal * h);
            let corner = |r: f64, u: f64| center + right * (r * h) + up * (u * h);

            let tl = mesh.push_vertex(corner(-1.0, 1.0), normal, Vector2::new(0.0, 0.0));
            let tr = mesh.push_vertex(corner(1.0, 1.0), normal, Vector2::new(1.0, 0.0));
            let br = mesh.push_vertex(corner(1.0, -1.0), normal, Vector2::new(1.0, 1.0));
            let bl = mesh.push_vertex(corner(-1.0, -1.0), normal, Vector2::new(0.0, 1.0));
            mesh.push_triangle(tl, tr, br);
            mesh.push_triangle(tl, br, bl);
        }
        mesh
    }

    /// UV sphere: `u` runs around the equator, `v` from the north pole down.
    pub fn create_sphere(name: &str, diameter: f64, segments: usize) -> TriangleMesh {
        let mut mesh = TriangleMesh::new(name, PrimitiveKind::Sphere);
        let radius = diameter / 2.0;
        let rings = segments.max(2);
        let slices = rings * 2;

        for i in 0..=rings {
            let v = i as f64 / rings as f64;
            let theta = v * PI;
            for j in 0..=slices {
                let u = j as f64 / slices as f64;
                let phi = PI / 2.0 + u * 2.0 * PI;
                let normal = around_y(phi) * theta.sin() + Vector3::y() * theta.cos();
                mesh.push_vertex(Point::from(normal * radius), normal, Vector2::new(u, v));
            }
        }

        let stride = slices + 1;
        for i in 0..rings {
            for j in 0..slices {
                let a = i * stride + j;
                let b = a + stride;
                if i != 0 {
                    mesh.push_triangle(a, b, a + 1);
                }
                if i != rings - 1 {
                    mesh.push_triangle(a + 1, b, b + 1);
                }
            }
        }
        mesh
    }

    /// Truncated cone; a zero diameter collapses that end to a point.
    pub fn create_cylinder(name: &str, options: CylinderOptions) -> TriangleMesh {
        let kind = if options.diameter_top == 0.0 || options.diameter_bottom == 0.0 {
            PrimitiveKind::Cone
        } else {
            PrimitiveKind::Cylinder
        };
        let mut mesh = TriangleMesh::new(name, kind);

        let slices = options.tessellation.max(3);
        let half = options.height / 2.0;
        let r_top = options.diameter_top / 2.0;
        let r_bottom = options.diameter_bottom / 2.0;

        // Боковая поверхность: верхнее и нижнее кольцо
        let stride = slices + 1;
        for (ring, (radius, y)) in [(r_top, half), (r_bottom, -half)].into_iter().enumerate() {
            for j in 0..=slices {
                let u = j as f64 / slices as f64;
                let radial = around_y(PI / 2.0 + u * 2.0 * PI);
                let normal = radial * options.height + Vector3::y() * (r_bottom - r_top);
                let pos = Point::from(radial * radius) + Vector3::y() * y;
                mesh.push_vertex(pos, normal, Vector2::new(u, ring as f64));
            }
        }
        for j in 0..slices {
            let top = j;
            let bottom = j + stride;
            mesh.push_triangle(top, bottom, top + 1);
            mesh.push_triangle(top + 1, bottom, bottom + 1);
        }

        for (radius, y, normal) in [(r_top, half, Vector3::y()), (r_bottom, -half, -Vector3::y())] {
            if radius <= 0.0 {
                continue;
            }
            let center = mesh.push_vertex(
                Point::new(0.0, y, 0.0),
                normal,
                Vector2::new(0.5, 0.5),
            );
            let first = center + 1;
            for j in 0..=slices {
                let radial = around_y(PI / 2.0 + j as f64 / slices as f64 * 2.0 * PI);
                let uv = Vector2::new(0.5 + radial.x * 0.5, 0.5 + radial.z * 0.5);
                mesh.push_vertex(Point::from(radial * radius) + Vector3::y() * y, normal, uv);
            }
            for j in 0..slices {
                mesh.push_triangle(center, first + j, first + j + 1);
            }
        }
        mesh
    }

    /// Ring of tube `thickness` whose centerline has diameter `diameter`.
    pub fn create_torus(
        name: &str,
        diameter: f64,
        thickness: f64,
        tessellation: usize,
    ) -> TriangleMesh {
        let mut mesh = TriangleMesh::new(name, PrimitiveKind::Torus);
        let major = diameter / 2.0;
        let minor = thickness / 2.0;
        let n = tessellation.max(3);

        for i in 0..=n {
            let u = i as f64 / n as f64;
            let radial = around_y(PI / 2.0 + u * 2.0 * PI);
            for j in 0..=n {
                let v = j as f64 / n as f64;
                let theta = v * 2.0 * PI;
                let normal = radial * theta.cos() + Vector3::y() * theta.sin();
                let pos = Point::from(radial * major + normal * minor);
                mesh.push_vertex(pos, normal, Vector2::new(u, v));
            }
        }

        let stride = n + 1;
        for i in 0..n {
            for j in 0..n {
                let a = i * stride + j;
                let b = a + stride;
                mesh.push_triangle(a, b, a + 1);
                mesh.push_triangle(a + 1, b, b + 1);
            }
        }
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::model3d::Model3D;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    fn radius_xz(p: &Point) -> f64 {
        (p.x * p.x + p.z * p.z).sqrt()
    }

    #[test]
    fn box_spans_its_size() {
        let mesh = MeshBuilder::create_box("box", 5.0);
        assert_eq!(mesh.vertices().len(), 24);
        assert_eq!(mesh.triangles().len(), 12);

        let (min, max) = mesh.bounds().unwrap();
        for axis in 0..3 {
            assert_close(min[axis], -2.5);
            assert_close(max[axis], 2.5);
        }
    }

    #[test]
    fn box_front_face_reads_left_to_right() {
        let mesh = MeshBuilder::create_box("box", 2.0);
        // Первая грань смотрит на камеру в -z
        let tl = mesh.vertices()[0];
        let tr = mesh.vertices()[1];
        assert_close(tl.z, -1.0);
        assert_close(tl.y, 1.0);
        // Camera on -z looking at +z has screen-right along world -x
        assert!(tr.x < tl.x);
        assert_eq!(mesh.normals()[0], -Vector3::z());
    }

    #[test]
    fn sphere_vertices_lie_on_surface() {
        let mesh = MeshBuilder::create_sphere("sphere", 7.0, 16);
        for (v, n) in mesh.vertices().iter().zip(mesh.normals()) {
            assert_close(v.coords.norm(), 3.5);
            assert_close(n.norm(), 1.0);
        }
        let unit = 0.0..=1.0;
        assert!(mesh.uvs().iter().all(|uv| unit.contains(&uv.x) && unit.contains(&uv.y)));
    }

    #[test]
    fn sphere_has_no_degenerate_triangles_at_poles() {
        let mesh = MeshBuilder::create_sphere("sphere", 2.0, 8);
        for &(a, b, c) in mesh.triangles() {
            let [pa, pb, pc] = [a, b, c].map(|i| mesh.vertices()[i]);
            assert!((pb - pa).cross(&(pc - pa)).norm() > 1e-12);
        }
    }

    #[test]
    fn cylinder_has_both_caps() {
        let options = CylinderOptions {
            height: 5.0,
            diameter_top: 5.0,
            diameter_bottom: 5.0,
            tessellation: 24,
        };
        let mesh = MeshBuilder::create_cylinder("cylinder", options);
        assert_eq!(mesh.kind(), PrimitiveKind::Cylinder);
        // side + two caps
        assert_eq!(mesh.triangles().len(), 24 * 2 + 24 * 2);

        let (min, max) = mesh.bounds().unwrap();
        assert_close(min.y, -2.5);
        assert_close(max.y, 2.5);
        assert!(mesh.vertices().iter().all(|v| radius_xz(v) < 2.5 + 1e-9));
    }

    #[test]
    fn cone_points_up() {
        let options = CylinderOptions {
            height: 5.0,
            diameter_top: 0.0,
            diameter_bottom: 5.0,
            tessellation: 24,
        };
        let mesh = MeshBuilder::create_cylinder("cone", options);
        assert_eq!(mesh.kind(), PrimitiveKind::Cone);
        // only the bottom cap exists
        assert_eq!(mesh.triangles().len(), 24 * 2 + 24);

        for v in mesh.vertices() {
            if (v.y - 2.5).abs() < 1e-9 {
                assert_close(radius_xz(v), 0.0);
            }
        }
        // Side normals lean upward
        let side_normal = mesh.normals()[0];
        assert!(side_normal.y > 0.0);
    }

    #[test]
    fn torus_fits_its_ring() {
        let mesh = MeshBuilder::create_torus("torus", 7.0, 2.0, 16);
        let (min, max) = mesh.bounds().unwrap();
        assert_close(max.x, 4.5);
        assert_close(min.y, -1.0);
        assert_close(max.y, 1.0);
        for v in mesh.vertices() {
            let r = radius_xz(v);
            assert!((2.5 - 1e-9..=4.5 + 1e-9).contains(&r));
        }
    }
}
