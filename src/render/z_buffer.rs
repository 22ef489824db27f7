use crate::objects::camera::ArcRotateCamera;
use crate::objects::light::HemisphericLight;
use crate::objects::model3d::{Model3D, StandardMaterial};
use crate::render::{Renderer, VertexLighting, light_vertex, shade};
use crate::scene::Scene;
use image::RgbImage;
use nalgebra::{Matrix4, Point3, Vector2, Vector3};
use std::ops::{Add, Mul};

/// Vertex after projection, with attributes pre-divided by `w`.
#[derive(Clone, Copy)]
struct ScreenVertex {
    /// Pixel x, pixel y, NDC depth
    pos: Point3<f64>,
    inv_w: f64,
    uv_over_w: Vector2<f64>,
    diffuse_over_w: Vector3<f64>,
    specular_over_w: Vector3<f64>,
}

/// Barycentric blend of attributes pre-divided by `w`, scaled back by `w`.
fn interpolate<T>(bary: &[f64; 3], values: [T; 3], w: f64) -> T
where
    T: Mul<f64, Output = T> + Add<T, Output = T> + Copy,
{
    (values[0] * bary[0] + values[1] * bary[1] + values[2] * bary[2]) * w
}

#[derive(Default)]
pub struct ZBufferPerformer {
    width: u32,
    height: u32,
    z_buffer: Vec<f64>,
}

impl ZBufferPerformer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            z_buffer: vec![f64::INFINITY; (width * height) as usize],
        }
    }

    fn reset(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.z_buffer
            .resize((width * height) as usize, f64::INFINITY);
        self.z_buffer.fill(f64::INFINITY);
    }

    /// Устанавливает значение глубины в указанных координатах.
    fn set_depth(&mut self, x: u32, y: u32, depth: f64) {
        let index = (y * self.width + x) as usize;
        self.z_buffer[index] = depth;
    }

    /// Получает значение глубины в указанных координатах.
    fn get_depth(&self, x: u32, y: u32) -> f64 {
        let index = (y * self.width + x) as usize;
        self.z_buffer[index]
    }

    /// Вычисляет матрицу преобразования вьюпорта для заданных размеров изображения.
    ///
    /// Матрица преобразует нормализованные координаты устройства (NDC) в пространство экрана.
    fn calculate_viewport_matrix(width: u32, height: u32) -> Matrix4<f64> {
        Matrix4::new(
            width as f64 / 2.,
            0.,
            0.,
            width as f64 / 2.,
            0.,
            -(height as f64 / 2.),
            0.,
            height as f64 / 2.,
            0.,
            0.,
            1.,
            0.,
            0.,
            0.,
            0.,
            1.,
        )
    }

    /// Projects one vertex; `None` if it sits behind the eye.
    fn to_screen(
        clip_matrix: &Matrix4<f64>,
        viewport_matrix: &Matrix4<f64>,
        vertex: &Point3<f64>,
        uv: &Vector2<f64>,
        lighting: &VertexLighting,
    ) -> Option<ScreenVertex> {
        let clip = clip_matrix * vertex.to_homogeneous();
        if clip.w <= f64::EPSILON {
            return None;
        }
        let inv_w = 1.0 / clip.w;
        let ndc = Point3::new(clip.x * inv_w, clip.y * inv_w, clip.z * inv_w);
        let pos = Point3::from_homogeneous(viewport_matrix * ndc.to_homogeneous())?;

        Some(ScreenVertex {
            pos,
            inv_w,
            uv_over_w: uv * inv_w,
            diffuse_over_w: lighting.diffuse * inv_w,
            specular_over_w: lighting.specular * inv_w,
        })
    }

    fn draw_triangle(
        &mut self,
        image: &mut RgbImage,
        tri: &[ScreenVertex; 3],
        material: &StandardMaterial,
    ) {
        let [p1, p2, p3] = tri.map(|v| v.pos);

        // Предварительно вычисляем общие компоненты, чтобы избежать избыточных вычислений в цикле.
        let denom = (p2.x - p1.x) * (p3.y - p1.y) - (p2.y - p1.y) * (p3.x - p1.x);
        if denom.abs() < f64::EPSILON {
            return;
        }

        // Находим ограничивающий прямоугольник, ограничивая размерами изображения.
        let min_x = p1.x.min(p2.x).min(p3.x).floor().max(0.) as u32;
        let max_x = (p1.x.max(p2.x).max(p3.x).ceil().max(0.) as u32).min(self.width - 1);
        let min_y = p1.y.min(p2.y).min(p3.y).floor().max(0.) as u32;
        let max_y = (p1.y.max(p2.y).max(p3.y).ceil().max(0.) as u32).min(self.height - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let (px, py) = (x as f64 + 0.5, y as f64 + 0.5);

                // Вычисляем барицентрические координаты.
                let u = ((p3.x - p2.x) * (py - p2.y) - (p3.y - p2.y) * (px - p2.x)) / denom;
                let v = ((p1.x - p3.x) * (py - p3.y) - (p1.y - p3.y) * (px - p3.x)) / denom;
                let bary = [u, v, 1.0 - u - v];

                // Проверяем, находится ли пиксель внутри треугольника.
                if bary.iter().any(|b| *b < -f64::EPSILON) {
                    continue;
                }

                let z = p1.z * bary[0] + p2.z * bary[1] + p3.z * bary[2];
                if z < -1.0 || z >= self.get_depth(x, y) {
                    continue;
                }
                self.set_depth(x, y, z);

                // Перспективно-корректная интерполяция атрибутов
                let inv_w: f64 = (0..3).map(|i| bary[i] * tri[i].inv_w).sum();
                let w = 1.0 / inv_w;
                let uv = interpolate(&bary, tri.map(|v| v.uv_over_w), w);
                let lighting = VertexLighting {
                    diffuse: interpolate(&bary, tri.map(|v| v.diffuse_over_w), w),
                    specular: interpolate(&bary, tri.map(|v| v.specular_over_w), w),
                };

                image.put_pixel(x, y, shade(material.diffuse_at(&uv), &lighting));
            }
        }
    }

    fn draw_object(
        &mut self,
        image: &mut RgbImage,
        model: &dyn Model3D,
        camera: &ArcRotateCamera,
        light: &HemisphericLight,
    ) {
        // Без материала меш не рисуется
        let Some(material) = model.material() else {
            return;
        };

        let (width, height) = image.dimensions();
        let model_matrix = model.model_matrix();
        let clip_matrix = camera.camera_matrix() * model_matrix;
        let viewport_matrix = Self::calculate_viewport_matrix(width, height);
        let eye = camera.position();

        let screen_vertices: Vec<Option<ScreenVertex>> = model
            .vertices()
            .iter()
            .zip(model.normals())
            .zip(model.uvs())
            .map(|((vertex, normal), uv)| {
                let world = Point3::from_homogeneous(model_matrix * vertex.to_homogeneous())?;
                let world_normal = (model_matrix * normal.to_homogeneous()).xyz().normalize();
                let lighting = light_vertex(material, &world_normal, &world, light, &eye);
                Self::to_screen(&clip_matrix, &viewport_matrix, vertex, uv, &lighting)
            })
            .collect();

        for &(a, b, c) in model.triangles() {
            if let (Some(va), Some(vb), Some(vc)) =
                (screen_vertices[a], screen_vertices[b], screen_vertices[c])
            {
                self.draw_triangle(image, &[va, vb, vc], material);
            }
        }
    }
}

impl Renderer for ZBufferPerformer {
    fn create_frame_mut(&mut self, image: &mut RgbImage, scene: &Scene) {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return;
        }
        self.reset(width, height);
        image.pixels_mut().for_each(|px| *px = scene.clear_color);

        for mesh in scene.meshes() {
            self.draw_object(image, mesh, &scene.camera, &scene.light);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::texture::TextureUrl;
    use crate::scene::Shape;
    use image::{Rgb, Rgba, RgbaImage};

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    #[test]
    fn empty_texture_renders_dark_shape_on_white() {
        let scene = Scene::create(None, Shape::Box, 4.0 / 3.0);
        let mut renderer = ZBufferPerformer::default();
        let frame = renderer.create_frame(80, 60, &scene);

        assert_eq!(*frame.get_pixel(0, 0), WHITE);
        let center = frame.get_pixel(40, 30);
        assert!(center[0] < 60 && center[1] < 60 && center[2] < 60, "{center:?}");
    }

    #[test]
    fn texture_shows_on_front_face() {
        let texture = RgbaImage::from_pixel(8, 8, Rgba([0, 200, 0, 255]));
        let url = TextureUrl::encode_png(&texture).unwrap();
        let scene = Scene::create(Some(&url), Shape::Box, 1.0);

        let frame = ZBufferPerformer::default().create_frame(64, 64, &scene);
        let center = frame.get_pixel(32, 32);
        assert!(center[1] > center[0] && center[1] > center[2], "{center:?}");
    }

    #[test]
    fn texture_is_not_mirrored() {
        // Левая половина красная, правая синяя
        let texture = RgbaImage::from_fn(16, 16, |x, _| {
            if x < 8 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        let url = TextureUrl::encode_png(&texture).unwrap();
        let scene = Scene::create(Some(&url), Shape::Box, 1.0);

        let frame = ZBufferPerformer::default().create_frame(100, 100, &scene);
        let left = frame.get_pixel(40, 50);
        let right = frame.get_pixel(60, 50);
        assert!(left[0] > left[2], "{left:?}");
        assert!(right[2] > right[0], "{right:?}");
    }

    #[test]
    fn nearer_surface_wins() {
        let scene = Scene::create(None, Shape::Sphere, 1.0);
        let mut renderer = ZBufferPerformer::new(1, 1);
        let mut frame = RgbImage::new(50, 50);
        renderer.create_frame_mut(&mut frame, &scene);

        let depth = renderer.get_depth(25, 25);
        assert!(depth.is_finite());
        // Front of the sphere is closer than its center
        let center_clip = scene.camera.camera_matrix() * Point3::<f64>::origin().to_homogeneous();
        assert!(depth < center_clip.z / center_clip.w);
    }
}
