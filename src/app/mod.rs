// Модуль графического приложения - объединяет состояние, UI и обработку ввода
pub mod input;
pub mod state;
pub mod ui;

use crate::config::AppConfig;
use crate::map::tiles::TileFetcher;
use crate::map::{BasemapStyle, MapView, TileMap};
use eframe::egui::{Context, TextureHandle};
use eframe::{App, CreationContext, Frame};

pub use state::{MapLifecycle, ViewerState};

pub struct TerracubeApp {
    pub state: ViewerState<TileMap>,
    /// Последний кадр 3D-панели
    pub texture: Option<TextureHandle>,
    // Флаг: курсор находится над окном просмотра
    pub viewport_has_pointer: bool,
}

impl TerracubeApp {
    pub fn new(cc: &CreationContext<'_>, config: &AppConfig) -> Self {
        let mut state = ViewerState::new(config);
        let ctx = cc.egui_ctx.clone();
        state.initialize(|| {
            let fetcher = TileFetcher::spawn(config.tile_workers, config.access_token.clone(), ctx);
            TileMap::new(
                fetcher,
                BasemapStyle::default().style_url(),
                MapView::new(config.initial_center, config.initial_zoom),
            )
        });

        Self {
            state,
            texture: None,
            viewport_has_pointer: false,
        }
    }
}

impl App for TerracubeApp {
    fn update(&mut self, ctx: &Context, _frame: &mut Frame) {
        self.mouse_wheel_scaling(ctx);
        self.mouse_drag_rotation(ctx);

        self.render_ui(ctx);

        // Карта уже отрисована в этом кадре, idle мог сработать
        let rebuilt = self.state.update();
        if rebuilt || self.state.is_capturing() {
            ctx.request_repaint();
        }
    }
}
