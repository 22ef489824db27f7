use crate::map::idle::IdleWait;
use crate::map::mercator::{LngLat, MapView};
use crate::map::style::StyleUrl;
use image::RgbaImage;

/// Overlay drawn on top of the map that may move the camera.
pub trait MapControl {
    fn show(&mut self, ui: &mut egui::Ui, view: &mut MapView);
}

/// Everything the viewer needs from an interactive map.
pub trait MapWidget {
    fn add_control(&mut self, control: Box<dyn MapControl>);

    /// True once the style is resolved and the first view has settled.
    fn is_loaded(&self) -> bool;

    /// Matches the backing canvas to the container.
    fn resize(&mut self) {
        let size = self.container_size();
        self.set_canvas_size(size);
    }

    /// Backing canvas size in pixels.
    fn canvas_size(&self) -> [u32; 2];

    fn set_canvas_size(&mut self, size: [u32; 2]);

    /// Size of the area the widget was last laid out in.
    fn container_size(&self) -> [u32; 2];

    /// Resolves the next time all pending tile loads have finished.
    fn once_idle(&mut self) -> IdleWait;

    /// Current canvas contents.
    fn read_canvas(&self) -> RgbaImage;

    fn center(&self) -> LngLat;

    fn set_style(&mut self, style: StyleUrl);
}
