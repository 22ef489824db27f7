use crate::config::{CAMERA_MAX_RADIUS, CAMERA_MIN_RADIUS};
use nalgebra::{Matrix4, Point3, Vector3};
use std::f64::consts::PI;

const BETA_LIMIT: f64 = 0.01;

/// Orbit camera around a target, described by two angles and a distance.
///
/// Position is `target + radius * (cos α sin β, cos β, sin α sin β)`.
pub struct ArcRotateCamera {
    pub alpha: f64,
    pub beta: f64,
    pub radius: f64,
    pub target: Point3<f64>,
    up: Vector3<f64>,
    fov_radians: f64,
    aspect_ratio: f64,
    near_plane: f64,
    far_plane: f64,
}

impl ArcRotateCamera {
    pub fn new(
        alpha: f64,
        beta: f64,
        radius: f64,
        target: Point3<f64>,
        fov_radians: f64,
        aspect_ratio: f64,
        near_plane: f64,
        far_plane: f64,
    ) -> Self {
        let mut camera = ArcRotateCamera {
            alpha,
            beta,
            radius,
            target,
            up: Vector3::new(0.0, 1.0, 0.0),
            fov_radians,
            aspect_ratio,
            near_plane,
            far_plane,
        };
        camera.clamp();
        camera
    }

    /// Moves the camera to `pos`, recomputing the orbit parameters.
    pub fn set_position(&mut self, pos: Point3<f64>) {
        let offset = pos - self.target;
        self.radius = offset.norm();
        if self.radius > f64::EPSILON {
            self.alpha = offset.z.atan2(offset.x);
            self.beta = (offset.y / self.radius).clamp(-1.0, 1.0).acos();
        }
        self.clamp();
    }

    pub fn position(&self) -> Point3<f64> {
        let (sa, ca) = self.alpha.sin_cos();
        let (sb, cb) = self.beta.sin_cos();
        self.target + self.radius * Vector3::new(ca * sb, cb, sa * sb)
    }

    /// Drag orbit, angles in radians.
    pub fn orbit(&mut self, d_alpha: f64, d_beta: f64) {
        self.alpha += d_alpha;
        self.beta += d_beta;
        self.clamp();
    }

    pub fn zoom(&mut self, factor: f64) {
        self.radius *= factor;
        self.clamp();
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f64) {
        self.aspect_ratio = aspect_ratio;
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    fn clamp(&mut self) {
        self.beta = self.beta.clamp(BETA_LIMIT, PI - BETA_LIMIT);
        self.radius = self.radius.clamp(CAMERA_MIN_RADIUS, CAMERA_MAX_RADIUS);
        self.alpha = self.alpha.rem_euclid(2.0 * PI);
    }

    pub fn view_matrix(&self) -> Matrix4<f64> {
        Matrix4::look_at_rh(&self.position(), &self.target, &self.up)
    }

    pub fn perspective_matrix(&self) -> Matrix4<f64> {
        Matrix4::new_perspective(
            self.aspect_ratio,
            self.fov_radians,
            self.near_plane,
            self.far_plane,
        )
    }

    /// Projection * view.
    pub fn camera_matrix(&self) -> Matrix4<f64> {
        self.perspective_matrix() * self.view_matrix()
    }
}
