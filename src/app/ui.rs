use super::TerracubeApp;
use crate::map::BasemapStyle;
use crate::scene::Shape;
use eframe::egui::{CentralPanel, Context, SidePanel, TopBottomPanel, Ui, Vec2};

impl TerracubeApp {
    pub fn render_ui(&mut self, ctx: &Context) {
        // Настройка глобальных стилей
        self.setup_custom_styles(ctx);

        // Верхняя панель: захват, стиль карты, координаты
        TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal_wrapped(|ui| {
                self.render_capture_controls(ui);
                ui.separator();
                self.render_style_controls(ui);
                ui.separator();
                self.render_coordinates(ui);
            });
        });

        // Правая панель с 3D-сценой
        SidePanel::right("shape_panel")
            .resizable(true)
            .default_width(420.0)
            .show(ctx, |ui| {
                ui.heading("🧊 3D");
                ui.add_space(5.0);
                self.render_shape_controls(ui);
                ui.add_space(5.0);
                self.render_viewport(ui);
            });

        // Центральная панель с картой
        CentralPanel::default().show(ctx, |ui| match self.state.map_mut().widget_mut() {
            Some(map) => {
                map.show(ui);
            }
            None => {
                ui.centered_and_justified(|ui| ui.spinner());
            }
        });
    }

    fn setup_custom_styles(&self, ctx: &Context) {
        ctx.style_mut(|style| {
            style.text_styles.insert(
                egui::TextStyle::Heading,
                egui::FontId::new(20.0, egui::FontFamily::Proportional),
            );
            // Увеличиваем отступы в кнопках
            style.spacing.button_padding = Vec2::new(10.0, 6.0);
        });
    }

    fn render_capture_controls(&mut self, ui: &mut Ui) {
        let enabled = self.state.map().is_ready() && !self.state.is_capturing();
        if ui.add_enabled(enabled, egui::Button::new("📷 Capture")).clicked() {
            self.state.capture();
        }
        if self.state.is_capturing() {
            ui.spinner();
        }
    }

    fn render_style_controls(&mut self, ui: &mut Ui) {
        let ready = self.state.map().is_ready();
        for style in BasemapStyle::ALL {
            if ui.add_enabled(ready, egui::Button::new(style.label())).clicked() {
                self.state.set_basemap_style(style);
            }
        }
    }

    fn render_coordinates(&self, ui: &mut Ui) {
        ui.monospace(self.state.coordinates().to_string());
    }

    fn render_shape_controls(&mut self, ui: &mut Ui) {
        ui.horizontal_wrapped(|ui| {
            let current = self.state.shape();
            for shape in Shape::ALL {
                if ui.selectable_label(current == shape, shape.label()).clicked() {
                    self.state.set_shape(shape);
                }
            }
        });
    }

    fn render_viewport(&mut self, ui: &mut Ui) {
        let width = ui.available_width().max(1.0);
        let size = Vec2::new(width, (width * 0.75).min(ui.available_height().max(1.0)));

        let shapes = self.state.shape_scene_mut();
        shapes.resize(size.x.round() as u32, size.y.round() as u32);
        if let Some(frame) = shapes.frame() {
            let egui_image = egui::ColorImage::from_rgb(
                [frame.width() as usize, frame.height() as usize],
                frame.as_raw(),
            );
            match self.texture.as_mut() {
                Some(texture) => texture.set(egui_image, Default::default()),
                None => {
                    self.texture =
                        Some(ui.ctx().load_texture("shape_scene", egui_image, Default::default()))
                }
            }
        }

        // Отображение изображения
        if let Some(texture) = &self.texture {
            let resp = ui.image((texture.id(), size));
            self.viewport_has_pointer = resp.hovered();
        }
    }
}
