//! Raster slippy map drawn with egui.

use crate::config::{MAX_CACHED_TILES, TILE_SIZE};
use crate::map::idle::{IdleListeners, IdleWait};
use crate::map::mercator::{LngLat, MapView, TileId};
use crate::map::style::StyleUrl;
use crate::map::tiles::{TileFetcher, TileRequest, TileSource};
use crate::map::widget::{MapControl, MapWidget};
use egui::{Color32, ColorImage, Pos2, Rect, Sense, TextureHandle, TextureOptions, Vec2};
use image::{Rgba, RgbaImage};
use nalgebra::Vector2;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

const MAP_BACKGROUND: Rgba<u8> = Rgba([222, 222, 222, 255]);
const ZOOM_SENSITIVITY: f64 = 0.004;

enum TileState {
    Pending,
    Ready {
        pixels: Arc<RgbaImage>,
        texture: Option<TextureHandle>,
    },
    Failed,
}

struct TileEntry {
    state: TileState,
    last_used: u64,
}

pub struct TileMap<S = TileFetcher> {
    view: MapView,
    style: StyleUrl,
    generation: u64,
    source: S,
    tiles: HashMap<TileId, TileEntry>,
    canvas_size: [u32; 2],
    container_size: [u32; 2],
    controls: Vec<Box<dyn MapControl>>,
    idle: IdleListeners,
    loaded: bool,
    frame: u64,
}

impl<S: TileSource> TileMap<S> {
    pub fn new(source: S, style: StyleUrl, view: MapView) -> Self {
        Self {
            view,
            style,
            generation: 0,
            source,
            tiles: HashMap::new(),
            // Размер по умолчанию до первой раскладки
            canvas_size: [300, 150],
            container_size: [300, 150],
            controls: Vec::new(),
            idle: IdleListeners::default(),
            loaded: false,
            frame: 0,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Records the laid-out size; the canvas follows it like a tracked window resize.
    pub fn set_container_size(&mut self, size: [u32; 2]) {
        let size = [size[0].max(1), size[1].max(1)];
        if size != self.container_size {
            self.container_size = size;
            self.resize();
        }
    }

    /// Drains finished tiles, requests missing ones and reports idle if settled.
    pub fn update(&mut self) {
        self.frame += 1;

        while let Some(response) = self.source.poll() {
            if response.generation != self.generation {
                continue;
            }
            let state = match response.result {
                Ok(pixels) => TileState::Ready {
                    pixels: Arc::new(pixels),
                    texture: None,
                },
                Err(_) => TileState::Failed,
            };
            if let Some(entry) = self.tiles.get_mut(&response.id) {
                entry.state = state;
            }
        }

        let mut settled = true;
        for placed in self.view.visible_tiles(self.canvas_size) {
            let entry = self.tiles.entry(placed.id).or_insert_with(|| {
                self.source.request(TileRequest {
                    id: placed.id,
                    url: self.style.tile_url(placed.id.z, placed.id.x, placed.id.y, TILE_SIZE),
                    generation: self.generation,
                });
                TileEntry {
                    state: TileState::Pending,
                    last_used: 0,
                }
            });
            entry.last_used = self.frame;
            if matches!(entry.state, TileState::Pending) {
                settled = false;
            }
        }

        if settled {
            if !self.loaded {
                self.loaded = true;
                info!(style = %self.style, "map loaded");
            }
            let fired = self.idle.fire();
            if fired > 0 {
                debug!(fired, "map idle");
            }
        }

        self.evict();
    }

    /// Drops the least recently drawn tiles over the cache budget.
    fn evict(&mut self) {
        if self.tiles.len() <= MAX_CACHED_TILES {
            return;
        }
        let mut by_age: Vec<(u64, TileId)> = self
            .tiles
            .iter()
            .filter(|(_, entry)| entry.last_used < self.frame)
            .map(|(id, entry)| (entry.last_used, *id))
            .collect();
        by_age.sort_unstable();

        let excess = self.tiles.len() - MAX_CACHED_TILES;
        for (_, id) in by_age.into_iter().take(excess) {
            self.tiles.remove(&id);
        }
    }

    fn tile_texture(&mut self, ctx: &egui::Context, id: TileId) -> Option<TextureHandle> {
        let entry = self.tiles.get_mut(&id)?;
        let TileState::Ready { pixels, texture } = &mut entry.state else {
            return None;
        };
        let handle = texture.get_or_insert_with(|| {
            let image = ColorImage::from_rgba_unmultiplied(
                [pixels.width() as usize, pixels.height() as usize],
                pixels.as_raw(),
            );
            ctx.load_texture(
                format!("tile-{}-{}-{}", id.z, id.x, id.y),
                image,
                TextureOptions::LINEAR,
            )
        });
        Some(handle.clone())
    }

    /// Lays the map out in the remaining space, handles pan/zoom and draws it.
    pub fn show(&mut self, ui: &mut egui::Ui) -> egui::Response {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        self.set_container_size([rect.width().round() as u32, rect.height().round() as u32]);

        if response.dragged() {
            let delta = response.drag_delta();
            self.view.pan(Vector2::new(delta.x as f64, delta.y as f64));
        }

        if let Some(pointer) = response.hover_pos() {
            let anchor = pointer - rect.center();
            let anchor = Vector2::new(anchor.x as f64, anchor.y as f64);

            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                self.view.zoom_around(scroll as f64 * ZOOM_SENSITIVITY, anchor);
            }
            if response.double_clicked() {
                self.view.zoom_around(1.0, anchor);
            }
        }

        self.update();

        let painter = ui.painter_at(rect);
        let [r, g, b, a] = MAP_BACKGROUND.0;
        painter.rect_filled(rect, 0.0, Color32::from_rgba_unmultiplied(r, g, b, a));

        let full_uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
        for placed in self.view.visible_tiles(self.canvas_size) {
            if let Some(texture) = self.tile_texture(ui.ctx(), placed.id) {
                let min = rect.min + Vec2::new(placed.offset.x as f32, placed.offset.y as f32);
                let tile_rect = Rect::from_min_size(min, Vec2::splat(placed.size as f32));
                painter.image(texture.id(), tile_rect, full_uv, Color32::WHITE);
            }
        }

        let view = &mut self.view;
        for (idx, control) in self.controls.iter_mut().enumerate() {
            egui::Area::new(egui::Id::new(("map-control", idx)))
                .fixed_pos(rect.min + Vec2::new(10.0, 10.0 + 40.0 * idx as f32))
                .order(egui::Order::Foreground)
                .show(ui.ctx(), |ui| control.show(ui, view));
        }

        // Пока грузятся тайлы, кадры должны продолжаться
        if !self.idle.is_empty() || !self.loaded {
            ui.ctx().request_repaint();
        }

        response
    }
}

impl<S: TileSource> MapWidget for TileMap<S> {
    fn add_control(&mut self, control: Box<dyn MapControl>) {
        self.controls.push(control);
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn canvas_size(&self) -> [u32; 2] {
        self.canvas_size
    }

    fn set_canvas_size(&mut self, size: [u32; 2]) {
        self.canvas_size = [size[0].max(1), size[1].max(1)];
    }

    fn container_size(&self) -> [u32; 2] {
        self.container_size
    }

    fn once_idle(&mut self) -> IdleWait {
        self.idle.once()
    }

    fn read_canvas(&self) -> RgbaImage {
        let [width, height] = self.canvas_size;
        let tile = TILE_SIZE as f64;
        let z = self.view.tile_level();

        RgbaImage::from_fn(width, height, |x, y| {
            let p = self.view.level_point(self.canvas_size, x as f64 + 0.5, y as f64 + 0.5);
            let (tx, ty) = ((p.x / tile).floor(), (p.y / tile).floor());

            let pixels = TileId::wrapped(z, tx as i64, ty as i64)
                .and_then(|id| self.tiles.get(&id))
                .and_then(|entry| match &entry.state {
                    TileState::Ready { pixels, .. } => Some(pixels),
                    _ => None,
                });

            match pixels {
                Some(pixels) => {
                    let scale = pixels.width() as f64 / tile;
                    let px = (((p.x - tx * tile) * scale) as u32).min(pixels.width() - 1);
                    let py = (((p.y - ty * tile) * scale) as u32).min(pixels.height() - 1);
                    *pixels.get_pixel(px, py)
                }
                None => MAP_BACKGROUND,
            }
        })
    }

    fn center(&self) -> LngLat {
        self.view.center
    }

    fn set_style(&mut self, style: StyleUrl) {
        if style == self.style {
            return;
        }
        info!(from = %self.style, to = %style, "switching map style");
        self.style = style;
        self.generation += 1;
        self.source.set_generation(self.generation);
        self.tiles.clear();
    }
}
