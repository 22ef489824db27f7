pub mod z_buffer;

use crate::objects::Point;
use crate::objects::light::HemisphericLight;
use crate::objects::model3d::StandardMaterial;
use crate::scene::Scene;
use crate::utils::math::lerp;
use image::{Rgb, RgbImage};
use nalgebra::Vector3;

/// Light arriving at a vertex, split so the texture can be applied per pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexLighting {
    /// Multiplier for the base color, per channel.
    pub diffuse: Vector3<f64>,
    /// Additive highlight, per channel, in `0..=255`.
    pub specular: Vector3<f64>,
}

fn channels(color: Rgb<u8>) -> Vector3<f64> {
    Vector3::new(color[0] as f64, color[1] as f64, color[2] as f64)
}

fn light_vertex(
    material: &StandardMaterial,
    normal: &Vector3<f64>,
    surface_point: &Point,
    light: &HemisphericLight,
    eye_pos: &Point,
) -> VertexLighting {
    let sky = channels(light.diffuse) / 255.0;
    let ground = channels(light.ground_color) / 255.0;
    let diffuse = lerp(ground, sky, light.sky_weight(normal)) * light.intensity;

    let highlight =
        light.specular_factor(normal, surface_point, eye_pos, material.specular_power);
    let specular = channels(material.specular_color)
        .component_mul(&(channels(light.specular) / 255.0))
        * highlight;

    VertexLighting { diffuse, specular }
}

fn shade(base: Rgb<u8>, lighting: &VertexLighting) -> Rgb<u8> {
    let color = channels(base).component_mul(&lighting.diffuse) + lighting.specular;
    Rgb([
        color.x.clamp(0., 255.).round() as u8,
        color.y.clamp(0., 255.).round() as u8,
        color.z.clamp(0., 255.).round() as u8,
    ])
}

pub trait Renderer {
    fn create_frame(&mut self, width: u32, height: u32, scene: &Scene) -> RgbImage {
        let mut image = RgbImage::new(width, height);
        self.create_frame_mut(&mut image, scene);
        image
    }
    fn create_frame_mut(&mut self, image: &mut RgbImage, scene: &Scene);
}
