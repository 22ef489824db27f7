use crate::config::{
    BACKGROUND_COLOR, BOX_SIZE, CAMERA_START, CYLINDER_DIAMETER, CYLINDER_HEIGHT, FAR_PLANE,
    FOV_RADIANS, LIGHT_DIRECTION, NEAR_PLANE, SPHERE_DIAMETER, TESSELLATION, TORUS_DIAMETER,
    TORUS_THICKNESS,
};
use crate::objects::camera::ArcRotateCamera;
use crate::objects::light::HemisphericLight;
use crate::objects::model3d::{PrimitiveKind, StandardMaterial};
use crate::objects::primitives::{CylinderOptions, MeshBuilder};
use crate::objects::texture::{Texture, TextureUrl};
use crate::objects::triangle_mesh::TriangleMesh;
use image::Rgb;
use nalgebra::{Point3, Vector3};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Primitive shown in the 3D panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Shape {
    #[default]
    Box,
    Sphere,
    Cylinder,
    Cone,
    Torus,
}

impl Shape {
    pub const ALL: [Shape; 5] = [
        Shape::Box,
        Shape::Sphere,
        Shape::Cylinder,
        Shape::Cone,
        Shape::Torus,
    ];

    /// Button caption.
    pub fn label(self) -> &'static str {
        match self {
            Shape::Box => "Cube",
            Shape::Sphere => "Sphere",
            Shape::Cylinder => "Cylinder",
            Shape::Cone => "Cone",
            Shape::Torus => "Torus",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Shape::Box => "box",
            Shape::Sphere => "sphere",
            Shape::Cylinder => "cylinder",
            Shape::Cone => "cone",
            Shape::Torus => "torus",
        }
    }

    /// Anything unrecognised is a box.
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|shape| shape.name().eq_ignore_ascii_case(name.trim()))
            .unwrap_or_default()
    }

    fn primitive_kind(self) -> PrimitiveKind {
        match self {
            Shape::Box => PrimitiveKind::Box,
            Shape::Sphere => PrimitiveKind::Sphere,
            Shape::Cylinder => PrimitiveKind::Cylinder,
            Shape::Cone => PrimitiveKind::Cone,
            Shape::Torus => PrimitiveKind::Torus,
        }
    }

    fn build_mesh(self) -> TriangleMesh {
        let mesh = match self {
            Shape::Box => MeshBuilder::create_box(self.name(), BOX_SIZE),
            Shape::Sphere => {
                MeshBuilder::create_sphere(self.name(), SPHERE_DIAMETER, TESSELLATION)
            }
            Shape::Cylinder => MeshBuilder::create_cylinder(
                self.name(),
                CylinderOptions {
                    height: CYLINDER_HEIGHT,
                    diameter_top: CYLINDER_DIAMETER,
                    diameter_bottom: CYLINDER_DIAMETER,
                    tessellation: TESSELLATION,
                },
            ),
            Shape::Cone => MeshBuilder::create_cylinder(
                self.name(),
                CylinderOptions {
                    height: CYLINDER_HEIGHT,
                    diameter_top: 0.0,
                    diameter_bottom: CYLINDER_DIAMETER,
                    tessellation: TESSELLATION,
                },
            ),
            Shape::Torus => MeshBuilder::create_torus(
                self.name(),
                TORUS_DIAMETER,
                TORUS_THICKNESS,
                TESSELLATION,
            ),
        };
        debug_assert_eq!(mesh.kind(), self.primitive_kind());
        mesh
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything the renderer draws for one `(texture, shape)` pair.
pub struct Scene {
    pub camera: ArcRotateCamera,
    pub light: HemisphericLight,
    pub clear_color: Rgb<u8>,
    meshes: Vec<TriangleMesh>,
    disposed: bool,
}

impl Scene {
    pub fn create(texture_url: Option<&TextureUrl>, shape: Shape, aspect_ratio: f64) -> Self {
        let mut camera = ArcRotateCamera::new(
            0.0,
            0.0,
            1.0,
            Point3::origin(),
            FOV_RADIANS,
            aspect_ratio,
            NEAR_PLANE,
            FAR_PLANE,
        );
        camera.set_position(Point3::from(CAMERA_START));

        let light = HemisphericLight::new(Vector3::from(LIGHT_DIRECTION));

        let mut material = StandardMaterial::new();
        material.diffuse_texture = texture_url.and_then(Self::load_texture).map(Arc::new);
        if !material.has_texture() {
            material.diffuse_color = Rgb([0, 0, 0]);
        }

        let mut mesh = shape.build_mesh();
        mesh.material = Some(material);
        let textured = mesh.material.as_ref().is_some_and(|m| m.has_texture());
        debug!(%shape, textured, "scene created");

        Scene {
            camera,
            light,
            clear_color: BACKGROUND_COLOR,
            meshes: vec![mesh],
            disposed: false,
        }
    }

    fn load_texture(url: &TextureUrl) -> Option<Texture> {
        Texture::from_url(url)
            .inspect_err(|err| warn!(%err, "texture decode failed, using flat material"))
            .ok()
    }

    pub fn meshes(&self) -> impl Iterator<Item = &TriangleMesh> {
        self.meshes.iter()
    }

    /// Releases meshes and materials.
    pub fn dispose(&mut self) {
        self.meshes.clear();
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}
