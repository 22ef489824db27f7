use crate::config::SPECULAR_POWER;
use crate::objects::Point;
use crate::objects::texture::Texture;
use image::Rgb;
use nalgebra::{Matrix4, Vector2, Vector3};
use std::sync::Arc;

pub type Triangle = (usize, usize, usize);

/// Which builder produced a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Box,
    Sphere,
    Cylinder,
    Cone,
    Torus,
}

pub trait Model3D {
    /// List of triangle faces
    fn triangles(&self) -> &[Triangle];

    /// Per-vertex unit normals in model space
    fn normals(&self) -> &[Vector3<f64>];

    /// List of vertices
    fn vertices(&self) -> &[Point];

    /// Per-vertex texture coordinates, `(0, 0)` at the image's top-left
    fn uvs(&self) -> &[Vector2<f64>];

    /// Return material, if one was assigned
    fn material(&self) -> Option<&StandardMaterial>;

    /// Get model's transformation matrix
    fn model_matrix(&self) -> &Matrix4<f64>;
}

/// Diffuse color or texture plus a specular highlight.
#[derive(Clone)]
pub struct StandardMaterial {
    pub diffuse_color: Rgb<u8>,
    /// Replaces `diffuse_color` when present.
    pub diffuse_texture: Option<Arc<Texture>>,
    pub specular_color: Rgb<u8>,
    pub specular_power: f64,
}

impl StandardMaterial {
    pub fn new() -> Self {
        Self {
            diffuse_color: Rgb([255, 255, 255]),
            diffuse_texture: None,
            specular_color: Rgb([255, 255, 255]),
            specular_power: SPECULAR_POWER,
        }
    }

    pub fn has_texture(&self) -> bool {
        self.diffuse_texture.is_some()
    }

    /// Base color at texture coordinate `uv`.
    pub fn diffuse_at(&self, uv: &Vector2<f64>) -> Rgb<u8> {
        match &self.diffuse_texture {
            Some(texture) => texture.sample(uv.x, uv.y),
            None => self.diffuse_color,
        }
    }
}
