use crate::objects::Point;
use crate::objects::model3d::{Model3D, PrimitiveKind, StandardMaterial, Triangle};
use nalgebra::{Matrix4, Vector2, Vector3};

/// Indexed triangle mesh with per-vertex normals and texture coordinates.
#[derive(Clone)]
pub struct TriangleMesh {
    name: String,
    kind: PrimitiveKind,
    vertices: Vec<Point>,
    normals: Vec<Vector3<f64>>,
    uvs: Vec<Vector2<f64>>,
    triangles: Vec<Triangle>,
    pub material: Option<StandardMaterial>,

    model_matrix: Matrix4<f64>,
}

impl TriangleMesh {
    pub fn new(name: &str, kind: PrimitiveKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            vertices: Vec::new(),
            normals: Vec::new(),
            uvs: Vec::new(),
            triangles: Vec::new(),
            material: None,
            model_matrix: Matrix4::identity(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    /// Appends a vertex and returns its index.
    pub fn push_vertex(&mut self, pos: Point, normal: Vector3<f64>, uv: Vector2<f64>) -> usize {
        self.vertices.push(pos);
        self.normals
            .push(normal.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros));
        self.uvs.push(uv);
        self.vertices.len() - 1
    }

    pub fn push_triangle(&mut self, a: usize, b: usize, c: usize) {
        debug_assert!(a.max(b).max(c) < self.vertices.len());
        self.triangles.push((a, b, c));
    }

    /// Axis-aligned bounds of the untransformed vertices.
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(min, max), v| {
            (min.inf(v), max.sup(v))
        }))
    }
}

impl Model3D for TriangleMesh {
    fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    fn normals(&self) -> &[Vector3<f64>] {
        &self.normals
    }

    fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    fn uvs(&self) -> &[Vector2<f64>] {
        &self.uvs
    }

    fn material(&self) -> Option<&StandardMaterial> {
        self.material.as_ref()
    }

    fn model_matrix(&self) -> &Matrix4<f64> {
        &self.model_matrix
    }
}
