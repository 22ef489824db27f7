use crate::engine::Engine;
use crate::objects::texture::TextureUrl;
use crate::scene::{Scene, Shape};
use image::RgbImage;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

/// What the 3D panel is asked to show.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneInputs {
    pub texture_url: Option<TextureUrl>,
    pub shape: Shape,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    Setup { shape: Shape, textured: bool },
    Teardown,
}

/// Setup/teardown history that outlives the scene that writes it.
pub type LifecycleLog = Rc<RefCell<Vec<LifecycleEvent>>>;

struct Live {
    engine: Engine,
    scene: Scene,
}

/// Owns the one live engine and scene of the 3D panel.
///
/// Any change of inputs tears the old pair down completely before the new
/// one is set up.
pub struct ShapeScene {
    canvas: [u32; 2],
    inputs: Option<SceneInputs>,
    live: Option<Live>,
    events: LifecycleLog,
}

impl ShapeScene {
    pub fn new(canvas: [u32; 2]) -> Self {
        ShapeScene {
            canvas,
            inputs: None,
            live: None,
            events: LifecycleLog::default(),
        }
    }

    /// Rebuilds the scene if `inputs` differ from what is shown.
    pub fn sync(&mut self, inputs: &SceneInputs) -> bool {
        if self.live.is_some() && self.inputs.as_ref() == Some(inputs) {
            return false;
        }
        self.teardown();
        self.setup(inputs.clone());
        true
    }

    fn setup(&mut self, inputs: SceneInputs) {
        let mut engine = Engine::new(self.canvas);
        let scene = Scene::create(inputs.texture_url.as_ref(), inputs.shape, engine.aspect_ratio());
        engine.run_render_loop();

        let event = LifecycleEvent::Setup {
            shape: inputs.shape,
            textured: scene
                .meshes()
                .any(|mesh| mesh.material.as_ref().is_some_and(|m| m.has_texture())),
        };
        debug!(?event, "shape scene");
        self.events.borrow_mut().push(event);
        self.live = Some(Live { engine, scene });
        self.inputs = Some(inputs);
    }

    fn teardown(&mut self) {
        let Some(Live { mut engine, mut scene }) = self.live.take() else {
            return;
        };
        // Сначала сцена, потом движок
        scene.dispose();
        engine.dispose();
        debug!("shape scene torn down");
        self.events.borrow_mut().push(LifecycleEvent::Teardown);
    }

    /// Follows the hosting canvas size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.canvas = [width, height];
        if let Some(Live { engine, scene }) = self.live.as_mut()
            && engine.resize(width, height)
        {
            scene.camera.set_aspect_ratio(engine.aspect_ratio());
        }
    }

    /// Renders the current frame, `None` before the first setup.
    pub fn frame(&mut self) -> Option<&RgbImage> {
        let Live { engine, scene } = self.live.as_mut()?;
        engine.render(scene)
    }

    pub fn orbit(&mut self, d_alpha: f64, d_beta: f64) {
        if let Some(live) = self.live.as_mut() {
            live.scene.camera.orbit(d_alpha, d_beta);
        }
    }

    pub fn zoom(&mut self, factor: f64) {
        if let Some(live) = self.live.as_mut() {
            live.scene.camera.zoom(factor);
        }
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.live.as_ref().map(|live| &live.scene)
    }

    /// Setup/teardown history, oldest first.
    pub fn lifecycle(&self) -> Vec<LifecycleEvent> {
        self.events.borrow().clone()
    }

    /// Shared handle to the history, still readable after the scene is dropped.
    pub fn lifecycle_log(&self) -> LifecycleLog {
        Rc::clone(&self.events)
    }
}

impl Drop for ShapeScene {
    fn drop(&mut self) {
        self.teardown();
    }
}
