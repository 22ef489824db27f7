use super::TerracubeApp;
use crate::config::{ROTATION_SENSITIVITY_FACTOR, SCALING_SENSITIVITY_FACTOR};
use eframe::egui::Context;

impl TerracubeApp {
    pub fn mouse_wheel_scaling(&mut self, ctx: &Context) {
        // Масштабирование работает только если курсор над окном просмотра
        if !self.viewport_has_pointer {
            return;
        }
        let scroll_delta = ctx.input(|i| i.raw_scroll_delta);
        if scroll_delta.y == 0.0 {
            return;
        }
        // Прокрутка вверх приближает камеру
        let zoom_factor =
            (1. - scroll_delta.y.clamp(-200., 200.) * SCALING_SENSITIVITY_FACTOR).max(f32::EPSILON);

        self.state.shape_scene_mut().zoom(zoom_factor.into());
        ctx.request_repaint();
    }

    pub fn mouse_drag_rotation(&mut self, ctx: &Context) {
        // Вращение работает только если курсор над окном просмотра
        if !self.viewport_has_pointer {
            return;
        }
        if ctx.input(|i| i.pointer.primary_down()) {
            let delta = ctx.input(|i| i.pointer.delta());

            if delta.x == 0.0 && delta.y == 0.0 {
                return;
            }

            let d_alpha = delta.x * ROTATION_SENSITIVITY_FACTOR;
            let d_beta = -delta.y * ROTATION_SENSITIVITY_FACTOR;

            self.state
                .shape_scene_mut()
                .orbit(d_alpha.to_radians().into(), d_beta.to_radians().into());
            ctx.request_repaint();
        }
    }
}
