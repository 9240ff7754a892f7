use egui::{
    vec2, Align, Button, Color32, CornerRadius, Frame, Key, Layout, Margin, RichText, Sense,
    Stroke, TextEdit, Ui,
};

use crate::app::PlayerApp;
use crate::backend::MediaBackend;
use crate::controller::StatusKind;
use crate::render::VisualizationMode;

pub const DESKTOP_BLUE: Color32 = Color32::from_rgb(30, 58, 138);

const MAX_WINDOW_WIDTH: f32 = 896.0;
const TITLE_BLUE: Color32 = Color32::from_rgb(37, 99, 235);
const TITLE_BUTTON: Color32 = Color32::from_rgb(59, 130, 246);
const CLOSE_RED: Color32 = Color32::from_rgb(239, 68, 68);
const BODY_DARK: Color32 = Color32::from_rgb(17, 24, 39);
const CONTROL_GRAY: Color32 = Color32::from_rgb(31, 41, 55);
const BORDER_GRAY: Color32 = Color32::from_rgb(55, 65, 81);
const ACTIVE_BLUE: Color32 = Color32::from_rgb(37, 99, 235);
const LOAD_PURPLE: Color32 = Color32::from_rgb(147, 51, 234);
const MUTED_TEXT: Color32 = Color32::from_rgb(156, 163, 175);

pub fn status_color(kind: StatusKind) -> Color32 {
    match kind {
        StatusKind::Info => Color32::from_rgb(250, 204, 21),
        StatusKind::Success => Color32::from_rgb(74, 222, 128),
        StatusKind::Error => Color32::from_rgb(248, 113, 113),
    }
}

impl<B: MediaBackend> PlayerApp<B> {
    pub(crate) fn draw_window(&mut self, ui: &mut Ui) {
        let width = ui.available_width().min(MAX_WINDOW_WIDTH);
        ui.vertical_centered(|ui| {
            ui.add_space(16.0);
            ui.allocate_ui(vec2(width, ui.available_height()), |ui| {
                ui.set_width(width);
                self.draw_title_bar(ui);
                Frame::NONE
                    .fill(BODY_DARK)
                    .stroke(Stroke::new(4.0, BORDER_GRAY))
                    .corner_radius(CornerRadius {
                        nw: 0,
                        ne: 0,
                        sw: 8,
                        se: 8,
                    })
                    .show(ui, |ui| {
                        self.draw_canvas(ui);
                        self.draw_controls(ui);
                    });
            });
        });
    }

    fn draw_title_bar(&mut self, ui: &mut Ui) {
        Frame::NONE
            .fill(TITLE_BLUE)
            .inner_margin(Margin::symmetric(16, 8))
            .corner_radius(CornerRadius {
                nw: 8,
                ne: 8,
                sw: 0,
                se: 0,
            })
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new("Windows Media Player")
                            .strong()
                            .color(Color32::WHITE),
                    );
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        // Decorative, like the real chrome in a screenshot.
                        title_button(ui, "×", CLOSE_RED);
                        title_button(ui, "□", TITLE_BUTTON);
                        title_button(ui, "_", TITLE_BUTTON);
                    });
                });
            });
    }

    fn draw_canvas(&mut self, ui: &mut Ui) {
        let width = ui.available_width();
        let height = width / self.config.aspect_ratio();
        let (rect, _) = ui.allocate_exact_size(vec2(width, height), Sense::hover());
        self.paint_canvas(ui, rect);
    }

    fn draw_controls(&mut self, ui: &mut Ui) {
        Frame::NONE
            .fill(CONTROL_GRAY)
            .inner_margin(Margin::same(16))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    self.draw_transport(ui);
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        self.draw_volume(ui);
                    });
                });
                ui.add_space(12.0);
                self.draw_url_bar(ui);
                ui.add_space(12.0);
                self.draw_now_playing(ui);
            });
    }

    fn draw_transport(&mut self, ui: &mut Ui) {
        let label = if self.controller.is_playing() {
            "⏸ Pause"
        } else {
            "▶ Play"
        };
        let play = Button::new(RichText::new(label).color(Color32::WHITE))
            .fill(ACTIVE_BLUE)
            .min_size(vec2(72.0, 36.0));
        if ui.add(play).clicked() {
            self.controller.toggle_play();
        }

        ui.add_space(8.0);
        for mode in VisualizationMode::ALL {
            let selected = self.mode == mode;
            let fill = if selected { ACTIVE_BLUE } else { BORDER_GRAY };
            let text = RichText::new(mode.label()).color(if selected {
                Color32::WHITE
            } else {
                Color32::from_rgb(209, 213, 219)
            });
            if ui.add(Button::new(text).fill(fill)).clicked() {
                self.set_mode(mode);
            }
        }

        ui.add_space(8.0);
        if ui.button("📂 Open File...").clicked() {
            self.controller.open_file_picker();
        }
    }

    fn draw_volume(&mut self, ui: &mut Ui) {
        let mut volume = i32::from(self.controller.state().volume);
        ui.label(RichText::new(format!("{volume:>3}")).color(MUTED_TEXT));
        let slider = egui::Slider::new(&mut volume, 0..=100).show_value(false);
        if ui.add(slider).changed() {
            self.controller.set_volume(volume);
        }
        ui.label(RichText::new("🔊").color(MUTED_TEXT));
    }

    fn draw_url_bar(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            let field = TextEdit::singleline(&mut self.url_input)
                .hint_text("Paste MP3 URL here")
                .desired_width(ui.available_width() - 110.0);
            let response = ui.add(field);
            let entered = response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));

            let load = Button::new(RichText::new("Load Song").color(Color32::WHITE))
                .fill(LOAD_PURPLE)
                .min_size(vec2(100.0, 28.0));
            let clicked = ui.add(load).clicked();

            if entered || clicked {
                self.submit_url();
            }
        });

        if let Some(status) = self.controller.status() {
            ui.add_space(4.0);
            ui.label(
                RichText::new(&status.text)
                    .small()
                    .color(status_color(status.kind)),
            );
        }
    }

    fn draw_now_playing(&self, ui: &mut Ui) {
        let text = if self.controller.is_playing() {
            format!("♪ Now Playing: {}", self.controller.state().track_label)
        } else {
            "Click Play to start visualization".to_string()
        };
        ui.vertical_centered(|ui| {
            ui.label(RichText::new(text).small().color(MUTED_TEXT));
        });
    }
}

fn title_button(ui: &mut Ui, glyph: &str, fill: Color32) {
    let button = Button::new(RichText::new(glyph).color(Color32::WHITE).small())
        .fill(fill)
        .min_size(vec2(24.0, 24.0));
    ui.add(button);
}
