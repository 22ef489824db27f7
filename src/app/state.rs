use crate::config::{AppConfig, SCENE_CANVAS_HEIGHT, SCENE_CANVAS_WIDTH};
use crate::map::geocoder::Geocoder;
use crate::map::{BasemapStyle, IdleWait, LngLat, MapWidget};
use crate::objects::texture::TextureUrl;
use crate::scene::Shape;
use crate::shape_scene::{SceneInputs, ShapeScene};
use futures::FutureExt;
use futures::channel::oneshot::Canceled;
use std::mem;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Map widget ownership. Each transition happens at most once.
pub enum MapLifecycle<M> {
    Uninitialized,
    Loading(M),
    Ready(M),
}

impl<M> MapLifecycle<M> {
    pub fn widget_mut(&mut self) -> Option<&mut M> {
        match self {
            MapLifecycle::Uninitialized => None,
            MapLifecycle::Loading(map) | MapLifecycle::Ready(map) => Some(map),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, MapLifecycle::Ready(_))
    }
}

struct PendingCapture {
    wait: IdleWait,
    started: Instant,
}

/// Viewer state shared by the map panel and the 3D panel.
pub struct ViewerState<M: MapWidget> {
    map: MapLifecycle<M>,
    /// Texture and shape the 3D panel shows
    inputs: SceneInputs,
    coordinates: LngLat,
    pending_capture: Option<PendingCapture>,
    capture_timeout: Option<Duration>,
    access_token: String,
    shape_scene: ShapeScene,
}

impl<M: MapWidget> ViewerState<M> {
    pub fn new(config: &AppConfig) -> Self {
        ViewerState {
            map: MapLifecycle::Uninitialized,
            inputs: SceneInputs::default(),
            coordinates: LngLat::default(),
            pending_capture: None,
            capture_timeout: config.capture_timeout,
            access_token: config.access_token.clone(),
            shape_scene: ShapeScene::new([SCENE_CANVAS_WIDTH, SCENE_CANVAS_HEIGHT]),
        }
    }

    /// Creates the map widget. Only the first call does anything.
    pub fn initialize(&mut self, create_map: impl FnOnce() -> M) -> bool {
        if !matches!(self.map, MapLifecycle::Uninitialized) {
            return false;
        }
        let mut map = create_map();
        map.add_control(Box::new(Geocoder::new(self.access_token.clone())));
        info!("map created, waiting for load");
        self.map = MapLifecycle::Loading(map);
        true
    }

    /// Advances the map lifecycle and a pending capture, then brings the
    /// 3D panel in line with the current texture and shape.
    ///
    /// Returns `true` if the 3D scene was rebuilt.
    pub fn update(&mut self) -> bool {
        self.map = match mem::replace(&mut self.map, MapLifecycle::Uninitialized) {
            MapLifecycle::Loading(mut map) if map.is_loaded() => {
                map.resize();
                info!("map ready");
                MapLifecycle::Ready(map)
            }
            other => other,
        };

        self.poll_capture();
        self.shape_scene.sync(&self.inputs)
    }

    fn poll_capture(&mut self) {
        let Some(pending) = self.pending_capture.as_mut() else {
            return;
        };

        match (&mut pending.wait).now_or_never() {
            None => {
                if let Some(timeout) = self.capture_timeout
                    && pending.started.elapsed() >= timeout
                {
                    warn!(?timeout, "map never went idle, capture abandoned");
                    self.pending_capture = None;
                }
                return;
            }
            Some(Err(Canceled)) => {
                warn!("map dropped the idle wait, capture abandoned");
                self.pending_capture = None;
                return;
            }
            Some(Ok(())) => {}
        }

        let started = pending.started;
        self.pending_capture = None;
        let MapLifecycle::Ready(map) = &self.map else {
            return;
        };

        let canvas = map.read_canvas();
        match TextureUrl::encode_png(&canvas) {
            Ok(texture_url) => {
                // Текстура и координаты меняются вместе
                self.inputs.texture_url = Some(texture_url);
                self.coordinates = map.center();
                info!(
                    lng = self.coordinates.lng,
                    lat = self.coordinates.lat,
                    width = canvas.width(),
                    height = canvas.height(),
                    elapsed = ?started.elapsed(),
                    "capture finished"
                );
            }
            Err(err) => warn!(%err, "capture encoding failed"),
        }
    }

    /// Screenshots the map once it next goes idle.
    pub fn capture(&mut self) {
        if self.pending_capture.is_some() {
            debug!("capture already pending");
            return;
        }
        let MapLifecycle::Ready(map) = &mut self.map else {
            debug!("capture ignored, map not ready");
            return;
        };

        let size = map.container_size();
        map.set_canvas_size(size);
        let wait = map.once_idle();
        info!(width = size[0], height = size[1], "capture started");
        self.pending_capture = Some(PendingCapture {
            wait,
            started: Instant::now(),
        });
    }

    pub fn set_shape(&mut self, shape: Shape) {
        self.inputs.shape = shape;
    }

    pub fn set_basemap_style(&mut self, style: BasemapStyle) {
        let MapLifecycle::Ready(map) = &mut self.map else {
            return;
        };
        let url = style.style_url();
        info!(%url, "basemap style changed");
        map.set_style(url);
    }

    pub fn map(&self) -> &MapLifecycle<M> {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut MapLifecycle<M> {
        &mut self.map
    }

    pub fn texture_url(&self) -> Option<&TextureUrl> {
        self.inputs.texture_url.as_ref()
    }

    pub fn shape(&self) -> Shape {
        self.inputs.shape
    }

    pub fn coordinates(&self) -> LngLat {
        self.coordinates
    }

    pub fn is_capturing(&self) -> bool {
        self.pending_capture.is_some()
    }

    pub fn shape_scene(&self) -> &ShapeScene {
        &self.shape_scene
    }

    pub fn shape_scene_mut(&mut self) -> &mut ShapeScene {
        &mut self.shape_scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::StyleUrl;
    use crate::map::widget::testing::FakeMap;
    use crate::objects::model3d::{Model3D, PrimitiveKind};
    use crate::shape_scene::LifecycleEvent;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    fn config() -> AppConfig {
        AppConfig::from_lookup(|key| (key == "MAPBOX_ACCESS_TOKEN").then(|| "pk.test".to_string()))
            .unwrap()
    }

    fn ready_state() -> ViewerState<FakeMap> {
        let mut state = ViewerState::new(&config());
        state.initialize(FakeMap::new);
        fake(&mut state).loaded = true;
        state.update();
        assert!(state.map().is_ready());
        state
    }

    fn fake(state: &mut ViewerState<FakeMap>) -> &mut FakeMap {
        state.map_mut().widget_mut().unwrap()
    }

    #[test]
    fn map_is_created_once() {
        let calls = Cell::new(0);
        let mut state = ViewerState::new(&config());
        let factory = || {
            calls.set(calls.get() + 1);
            FakeMap::new()
        };

        assert!(state.initialize(factory));
        assert!(!state.initialize(factory));
        assert_eq!(calls.get(), 1);
        assert_eq!(fake(&mut state).controls, 1);
    }

    #[test]
    fn becomes_ready_after_load() {
        let mut state = ViewerState::new(&config());
        state.initialize(FakeMap::new);
        state.update();
        assert!(matches!(state.map(), MapLifecycle::Loading(_)));

        fake(&mut state).loaded = true;
        state.update();
        state.update();
        assert!(state.map().is_ready());
        // resize выполняется один раз при переходе в Ready
        assert_eq!(fake(&mut state).resizes, 1);
    }

    #[test]
    fn capture_before_ready_does_nothing() {
        let mut state: ViewerState<FakeMap> = ViewerState::new(&config());
        state.capture();
        assert!(!state.is_capturing());

        state.update();
        assert!(state.texture_url().is_none());
        assert_eq!(state.coordinates(), LngLat::default());

        state.initialize(FakeMap::new);
        state.capture();
        assert!(!state.is_capturing());
        assert_eq!(fake(&mut state).canvas_at_wait, None);

        // Карта загрузилась и успокоилась, но захват не запрашивался повторно
        fake(&mut state).loaded = true;
        assert_eq!(fake(&mut state).settle(), 0);
        state.update();
        state.update();
        assert!(state.map().is_ready());
        assert!(!state.is_capturing());
        assert!(state.texture_url().is_none());
        assert_eq!(state.coordinates(), LngLat::default());
        assert!(!state.shape_scene().lifecycle().iter().any(|event| matches!(
            event,
            LifecycleEvent::Setup { textured: true, .. }
        )));
    }

    #[test]
    fn capture_reads_canvas_after_idle() {
        let mut state = ready_state();
        fake(&mut state).canvas = [100, 100];
        state.capture();
        assert!(state.is_capturing());
        assert_eq!(fake(&mut state).canvas_at_wait, Some([640, 480]));

        // Пока карта не успокоилась, ничего не меняется
        state.update();
        assert!(state.texture_url().is_none());
        assert_eq!(state.coordinates(), LngLat::default());

        assert_eq!(fake(&mut state).settle(), 1);
        state.update();
        assert!(!state.is_capturing());

        let url = state.texture_url().unwrap();
        assert!(url.as_str().starts_with("data:image/png;base64,"));
        assert_eq!(url.decode().unwrap().dimensions(), (640, 480));
        assert_eq!(state.coordinates(), LngLat { lng: -74.5, lat: 40.0 });
    }

    #[test]
    fn second_capture_waits_for_first() {
        let mut state = ready_state();
        state.capture();
        state.capture();
        assert_eq!(fake(&mut state).settle(), 1);
    }

    #[test]
    fn capture_gives_up_after_timeout() {
        let mut state = ready_state();
        state.capture_timeout = Some(Duration::ZERO);
        state.capture();
        state.update();

        assert!(!state.is_capturing());
        fake(&mut state).settle();
        state.update();
        assert!(state.texture_url().is_none());
    }

    #[test]
    fn basemap_style_goes_to_map() {
        let mut state = ready_state();
        state.set_basemap_style(BasemapStyle::Dark);
        assert_eq!(
            fake(&mut state).styles,
            vec![StyleUrl::parse("mapbox://styles/mapbox/dark-v12").unwrap()]
        );
        assert_eq!(
            fake(&mut state).styles[0].as_str(),
            "mapbox://styles/mapbox/dark-v12"
        );
    }

    #[test]
    fn basemap_style_ignored_while_loading() {
        let mut state = ViewerState::new(&config());
        state.set_basemap_style(BasemapStyle::Streets);
        state.initialize(FakeMap::new);
        state.set_basemap_style(BasemapStyle::Streets);
        assert!(fake(&mut state).styles.is_empty());
    }

    #[test]
    fn initial_scene_is_untextured_box() {
        let mut state: ViewerState<FakeMap> = ViewerState::new(&config());
        state.update();

        let scene = state.shape_scene().scene().unwrap();
        let mesh = scene.meshes().next().unwrap();
        assert_eq!(mesh.kind(), PrimitiveKind::Box);
        assert!(!mesh.material().unwrap().has_texture());
    }

    #[test]
    fn torus_with_capture() {
        let mut state = ready_state();
        state.set_shape(Shape::Torus);
        state.capture();
        fake(&mut state).settle();
        state.update();

        let scene = state.shape_scene().scene().unwrap();
        let mesh = scene.meshes().next().unwrap();
        assert_eq!(mesh.kind(), PrimitiveKind::Torus);
        let texture = mesh.material().unwrap().diffuse_texture.as_ref().unwrap();
        assert_eq!(texture.dimensions(), (640, 480));

        assert_eq!(
            state.shape_scene().lifecycle(),
            &[
                LifecycleEvent::Setup { shape: Shape::Box, textured: false },
                LifecycleEvent::Teardown,
                LifecycleEvent::Setup { shape: Shape::Torus, textured: true },
            ]
        );
    }
}
