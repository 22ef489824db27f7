use crate::render::Renderer;
use crate::render::z_buffer::ZBufferPerformer;
use crate::scene::Scene;
use image::RgbImage;
use tracing::debug;

/// Rasterizer bound to an output canvas of a fixed size.
///
/// Draws nothing until [`Engine::run_render_loop`] is called and
/// nothing after [`Engine::dispose`].
pub struct Engine {
    renderer: ZBufferPerformer,
    frame: RgbImage,
    running: bool,
    disposed: bool,
}

impl Engine {
    pub fn new(canvas: [u32; 2]) -> Self {
        let [width, height] = canvas;
        Engine {
            renderer: ZBufferPerformer::new(width, height),
            frame: RgbImage::new(width, height),
            running: false,
            disposed: false,
        }
    }

    pub fn canvas_size(&self) -> [u32; 2] {
        [self.frame.width(), self.frame.height()]
    }

    pub fn aspect_ratio(&self) -> f64 {
        let [width, height] = self.canvas_size();
        if height == 0 {
            1.0
        } else {
            width as f64 / height as f64
        }
    }

    pub fn run_render_loop(&mut self) {
        if !self.disposed {
            self.running = true;
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Draws one frame of `scene`.
    pub fn render(&mut self, scene: &Scene) -> Option<&RgbImage> {
        if !self.running || self.disposed || scene.is_disposed() {
            return None;
        }
        self.renderer.create_frame_mut(&mut self.frame, scene);
        Some(&self.frame)
    }

    /// Returns `true` if the canvas size actually changed.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if self.disposed || self.canvas_size() == [width, height] {
            return false;
        }
        debug!(width, height, "engine resized");
        self.frame = RgbImage::new(width, height);
        true
    }

    /// Stops the render loop and releases the canvas.
    pub fn dispose(&mut self) {
        self.running = false;
        self.disposed = true;
        self.frame = RgbImage::new(0, 0);
    }
}
