//! Web Mercator projection and the tile pyramid.

use crate::config::{MAX_ZOOM, MIN_ZOOM, TILE_SIZE};
use itertools::iproduct;
use nalgebra::Vector2;
use std::f64::consts::PI;
use std::fmt;

/// Latitude limit of the square Web Mercator world.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Geographic position in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

/// `lat, lng`, six decimals.
impl fmt::Display for LngLat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

impl LngLat {
    /// Projects onto the pixel plane of a world `TILE_SIZE * 2^zoom` pixels wide.
    pub fn to_world(self, zoom: f64) -> Vector2<f64> {
        let size = world_size(zoom);
        let lat = self.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let x = (self.lng + 180.0) / 360.0 * size;
        let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
        Vector2::new(x, y)
    }

    pub fn from_world(point: Vector2<f64>, zoom: f64) -> Self {
        let size = world_size(zoom);
        let lng = point.x / size * 360.0 - 180.0;
        let n = PI - 2.0 * PI * point.y / size;
        let lat = n.sinh().atan().to_degrees();
        LngLat {
            lng: wrap_longitude(lng),
            lat: lat.clamp(-MAX_LATITUDE, MAX_LATITUDE),
        }
    }
}

pub fn world_size(zoom: f64) -> f64 {
    TILE_SIZE as f64 * 2f64.powf(zoom)
}

fn wrap_longitude(lng: f64) -> f64 {
    if (-180.0..=180.0).contains(&lng) {
        lng
    } else {
        (lng + 180.0).rem_euclid(360.0) - 180.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileId {
    /// Wraps `x` around the antimeridian; rows outside the pyramid have no tile.
    pub fn wrapped(z: u8, x: i64, y: i64) -> Option<Self> {
        let n = 1i64 << z;
        if !(0..n).contains(&y) {
            return None;
        }
        Some(TileId {
            z,
            x: x.rem_euclid(n) as u32,
            y: y as u32,
        })
    }
}

/// A tile placed in the viewport, with its unwrapped column for positioning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedTile {
    pub id: TileId,
    /// Top-left corner relative to the viewport's top-left, in screen pixels.
    pub offset: Vector2<f64>,
    /// Edge length on screen.
    pub size: f64,
}

/// Camera of the 2D map: what is in the middle of the viewport and how close.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub center: LngLat,
    pub zoom: f64,
}

impl MapView {
    pub fn new(center: LngLat, zoom: f64) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }

    /// Integer pyramid level the view draws from.
    pub fn tile_level(&self) -> u8 {
        self.zoom.floor().clamp(MIN_ZOOM, MAX_ZOOM) as u8
    }

    /// Screen pixels per level pixel.
    fn level_scale(&self) -> f64 {
        2f64.powf(self.zoom - self.tile_level() as f64)
    }

    /// Moves the map by a screen-space drag.
    pub fn pan(&mut self, delta: Vector2<f64>) {
        let world = self.center.to_world(self.zoom) - delta;
        self.center = LngLat::from_world(world, self.zoom);
    }

    /// Zooms by `dz` levels keeping the point under `anchor` fixed.
    ///
    /// `anchor` is relative to the viewport center, in screen pixels.
    pub fn zoom_around(&mut self, dz: f64, anchor: Vector2<f64>) {
        let new_zoom = (self.zoom + dz).clamp(MIN_ZOOM, MAX_ZOOM);
        let ratio = 2f64.powf(new_zoom - self.zoom);
        let anchor_world = self.center.to_world(self.zoom) + anchor;
        let center_world = anchor_world * ratio - anchor;
        self.zoom = new_zoom;
        self.center = LngLat::from_world(center_world, new_zoom);
    }

    /// Position of the viewport pixel `(x, y)` in level pixels.
    pub fn level_point(&self, viewport: [u32; 2], x: f64, y: f64) -> Vector2<f64> {
        let center = self.center.to_world(self.tile_level() as f64);
        let scale = self.level_scale();
        let half = Vector2::new(viewport[0] as f64, viewport[1] as f64) / 2.0;
        center + (Vector2::new(x, y) - half) / scale
    }

    /// Tiles that intersect a viewport of the given pixel size.
    pub fn visible_tiles(&self, viewport: [u32; 2]) -> Vec<PlacedTile> {
        let z = self.tile_level();
        let scale = self.level_scale();
        let tile = TILE_SIZE as f64;

        let top_left = self.level_point(viewport, 0.0, 0.0);
        let bottom_right = self.level_point(viewport, viewport[0] as f64, viewport[1] as f64);

        // Bottom-right edge is exclusive.
        let x_range = (top_left.x / tile).floor() as i64..(bottom_right.x / tile).ceil() as i64;
        let y_range = (top_left.y / tile).floor() as i64..(bottom_right.y / tile).ceil() as i64;

        iproduct!(y_range, x_range)
            .filter_map(|(ty, tx)| {
                let id = TileId::wrapped(z, tx, ty)?;
                let offset = Vector2::new(
                    (tx as f64 * tile - top_left.x) * scale,
                    (ty as f64 * tile - top_left.y) * scale,
                );
                Some(PlacedTile {
                    id,
                    offset,
                    size: tile * scale,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() < eps, "{a} != {b}");
    }

    #[test]
    fn world_projection_inverts() {
        let original = LngLat { lng: -74.5, lat: 40.0 };
        for zoom in [0.0, 3.5, 12.0, 18.0] {
            let back = LngLat::from_world(original.to_world(zoom), zoom);
            assert_close(back.lng, original.lng, 1e-9);
            assert_close(back.lat, original.lat, 1e-9);
        }
    }

    #[test]
    fn null_island_is_world_center() {
        let p = LngLat::default().to_world(0.0);
        assert_close(p.x, 128.0, 1e-9);
        assert_close(p.y, 128.0, 1e-9);
    }

    #[test]
    fn tile_columns_wrap_and_rows_do_not() {
        assert_eq!(TileId::wrapped(2, -1, 0), Some(TileId { z: 2, x: 3, y: 0 }));
        assert_eq!(TileId::wrapped(2, 4, 3), Some(TileId { z: 2, x: 0, y: 3 }));
        assert_eq!(TileId::wrapped(2, 0, 4), None);
        assert_eq!(TileId::wrapped(2, 0, -1), None);
    }

    #[test]
    fn whole_world_fits_at_zoom_zero() {
        let view = MapView::new(LngLat::default(), 0.0);
        let tiles = view.visible_tiles([256, 256]);
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0].id, TileId { z: 0, x: 0, y: 0 });
        assert_close(tiles[0].offset.x, 0.0, 1e-9);
        assert_close(tiles[0].size, 256.0, 1e-9);
    }

    #[test]
    fn fractional_zoom_scales_tiles() {
        let view = MapView::new(LngLat { lng: 10.0, lat: 10.0 }, 5.5);
        let tiles = view.visible_tiles([800, 600]);
        assert!(!tiles.is_empty());
        assert!(tiles.iter().all(|t| t.id.z == 5));
        assert_close(tiles[0].size, 256.0 * 2f64.sqrt(), 1e-9);
    }

    #[test]
    fn pan_moves_center_against_drag() {
        let mut view = MapView::new(LngLat::default(), 4.0);
        view.pan(Vector2::new(100.0, 0.0));
        assert!(view.center.lng < 0.0);
        assert_close(view.center.lat, 0.0, 1e-9);
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut view = MapView::new(LngLat { lng: 5.0, lat: 45.0 }, 8.0);
        let anchor = Vector2::new(120.0, -40.0);
        let before = LngLat::from_world(view.center.to_world(view.zoom) + anchor, view.zoom);

        view.zoom_around(1.25, anchor);
        let after = LngLat::from_world(view.center.to_world(view.zoom) + anchor, view.zoom);

        assert_close(view.zoom, 9.25, 1e-12);
        assert_close(before.lng, after.lng, 1e-9);
        assert_close(before.lat, after.lat, 1e-9);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut view = MapView::new(LngLat::default(), 21.5);
        view.zoom_around(3.0, Vector2::zeros());
        assert_eq!(view.zoom, MAX_ZOOM);
    }

    #[test]
    fn displays_lat_then_lng_without_labels() {
        let point = LngLat { lng: 37.617_635, lat: 55.755_814_4 };
        assert_eq!(point.to_string(), "55.755814, 37.617635");
        assert_eq!(LngLat::default().to_string(), "0.000000, 0.000000");
    }
}
