use nalgebra::Point3;

pub mod camera;
pub mod light;
pub mod model3d;
pub mod primitives;
pub mod texture;
pub mod triangle_mesh;

pub type Point = Point3<f64>;
