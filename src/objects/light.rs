use crate::objects::Point;
use image::Rgb;
use nalgebra::Vector3;

/// Sky/ground ambient light. Surfaces facing `direction` get `diffuse`,
/// surfaces facing away get `ground_color`, with a smooth blend in between.
pub struct HemisphericLight {
    pub direction: Vector3<f64>,
    pub intensity: f64,
    pub diffuse: Rgb<u8>,
    pub specular: Rgb<u8>,
    pub ground_color: Rgb<u8>,
}

impl HemisphericLight {
    pub fn new(direction: Vector3<f64>) -> Self {
        HemisphericLight {
            direction: direction.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros),
            intensity: 1.0,
            diffuse: Rgb([255, 255, 255]),
            specular: Rgb([255, 255, 255]),
            ground_color: Rgb([0, 0, 0]),
        }
    }

    /// Blend weight towards the sky color, in `[0, 1]`.
    ///
    /// A zero direction lights everything at half strength.
    pub fn sky_weight(&self, normal: &Vector3<f64>) -> f64 {
        (normal.dot(&self.direction) * 0.5 + 0.5).clamp(0.0, 1.0)
    }

    /// Blinn-Phong highlight factor seen from `eye_pos`.
    pub fn specular_factor(
        &self,
        normal: &Vector3<f64>,
        surface_point: &Point,
        eye_pos: &Point,
        power: f64,
    ) -> f64 {
        let Some(view_direction) = (eye_pos - surface_point).try_normalize(f64::EPSILON) else {
            return 0.0;
        };
        let Some(half) = (view_direction + self.direction).try_normalize(f64::EPSILON) else {
            return 0.0;
        };
        normal.dot(&half).max(0.0).powf(power) * self.intensity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sky_weight_spans_hemispheres() {
        let light = HemisphericLight::new(Vector3::new(0.0, 2.0, 0.0));
        assert_eq!(light.sky_weight(&Vector3::y()), 1.0);
        assert_eq!(light.sky_weight(&-Vector3::y()), 0.0);
        assert_eq!(light.sky_weight(&Vector3::x()), 0.5);
    }

    #[test]
    fn zero_direction_is_uniform() {
        let light = HemisphericLight::new(Vector3::zeros());
        assert_eq!(light.sky_weight(&Vector3::y()), 0.5);
        assert_eq!(light.sky_weight(&Vector3::z()), 0.5);
    }

    #[test]
    fn highlight_peaks_on_half_vector() {
        let light = HemisphericLight::new(Vector3::y());
        let eye = Point::new(0.0, 0.0, 10.0);
        let on_axis = light.specular_factor(
            &Vector3::new(0.0, 1.0, 1.0).normalize(),
            &Point::origin(),
            &eye,
            64.0,
        );
        let off_axis = light.specular_factor(&Vector3::x(), &Point::origin(), &eye, 64.0);
        assert!((on_axis - 1.0).abs() < 1e-9);
        assert!(off_axis < 1e-9);
    }
}
