use crate::error::{AppError, Result};
use crate::map::mercator::LngLat;
use image::Rgb;
use std::time::Duration;

pub const BACKGROUND_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

// Camera settings
pub const FOV_RADIANS: f64 = 0.8;
pub const NEAR_PLANE: f64 = 0.1;
pub const FAR_PLANE: f64 = 1000.0;
pub const CAMERA_START: [f64; 3] = [0.0, 0.0, -10.0];
pub const CAMERA_MIN_RADIUS: f64 = 6.0;
pub const CAMERA_MAX_RADIUS: f64 = 40.0;

// Light behavior settings
pub const LIGHT_DIRECTION: [f64; 3] = [0.0, 1.0, 0.0];
pub const SPECULAR_POWER: f64 = 64.0;

// User interaction settings
pub const SCALING_SENSITIVITY_FACTOR: f32 = 0.002;
pub const ROTATION_SENSITIVITY_FACTOR: f32 = 0.2;

// Primitive sizes
pub const BOX_SIZE: f64 = 5.0;
pub const SPHERE_DIAMETER: f64 = 7.0;
pub const CYLINDER_HEIGHT: f64 = 5.0;
pub const CYLINDER_DIAMETER: f64 = 5.0;
pub const TORUS_DIAMETER: f64 = 7.0;
pub const TORUS_THICKNESS: f64 = 2.0;
pub const TESSELLATION: usize = 32;

// 3D canvas
pub const SCENE_CANVAS_WIDTH: u32 = 400;
pub const SCENE_CANVAS_HEIGHT: u32 = 300;

// Map widget
pub const TILE_SIZE: u32 = 256;
pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 22.0;
pub const MAX_CACHED_TILES: usize = 512;

const DEFAULT_CENTER: LngLat = LngLat { lng: -74.5, lat: 40.0 };
const DEFAULT_ZOOM: f64 = 12.0;
const DEFAULT_CAPTURE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TILE_WORKERS: usize = 4;

/// Runtime settings injected from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub access_token: String,
    pub initial_center: LngLat,
    pub initial_zoom: f64,
    /// `None` waits for the map to settle forever.
    pub capture_timeout: Option<Duration>,
    pub tile_workers: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, `std::env::var` in production.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access_token = lookup("MAPBOX_ACCESS_TOKEN")
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or(AppError::MissingVar("MAPBOX_ACCESS_TOKEN"))?;

        let initial_center = match lookup("MAP_CENTER") {
            Some(raw) => parse_center(&raw)?,
            None => DEFAULT_CENTER,
        };

        let initial_zoom = match lookup("MAP_ZOOM") {
            Some(raw) => {
                let zoom = parse_var::<f64>("MAP_ZOOM", &raw)?;
                if !(MIN_ZOOM..=MAX_ZOOM).contains(&zoom) {
                    return Err(AppError::InvalidVar {
                        key: "MAP_ZOOM",
                        value: raw,
                        reason: format!("zoom must be within {MIN_ZOOM}..={MAX_ZOOM}"),
                    });
                }
                zoom
            }
            None => DEFAULT_ZOOM,
        };

        let timeout_secs = match lookup("CAPTURE_TIMEOUT_SECS") {
            Some(raw) => parse_var::<u64>("CAPTURE_TIMEOUT_SECS", &raw)?,
            None => DEFAULT_CAPTURE_TIMEOUT_SECS,
        };
        let capture_timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

        let tile_workers = match lookup("TILE_WORKERS") {
            Some(raw) => parse_var::<usize>("TILE_WORKERS", &raw)?.max(1),
            None => DEFAULT_TILE_WORKERS,
        };

        Ok(Self {
            access_token,
            initial_center,
            initial_zoom,
            capture_timeout,
            tile_workers,
        })
    }
}

fn parse_var<T>(key: &'static str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| AppError::InvalidVar {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Parses `lng,lat`.
fn parse_center(raw: &str) -> Result<LngLat> {
    let invalid = |reason: &str| AppError::InvalidVar {
        key: "MAP_CENTER",
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    let (lng, lat) = raw.split_once(',').ok_or_else(|| invalid("expected `lng,lat`"))?;
    let lng = parse_var::<f64>("MAP_CENTER", lng)?;
    let lat = parse_var::<f64>("MAP_CENTER", lat)?;

    if !(-180.0..=180.0).contains(&lng) || !(-90.0..=90.0).contains(&lat) {
        return Err(invalid("coordinate out of range"));
    }
    Ok(LngLat { lng, lat })
}
