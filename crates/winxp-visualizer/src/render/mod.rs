//! Per-frame visualization renderer.
//!
//! Strategies compute geometry on a fixed logical surface (800x400 by
//! default) and [`Viewport`] maps it onto whatever screen rect the canvas got.

pub mod bars;
pub mod color;
pub mod idle;
pub mod particles;
pub mod wave;

use egui::emath::RectTransform;
use egui::{vec2, Color32, Painter, Pos2, Rect};

use crate::audio::FrequencySnapshot;
use crate::config::VisualizerConfig;
use color::vertical_gradient;
use particles::ParticleField;

const BACKGROUND_TOP: Color32 = Color32::from_rgb(0x00, 0x04, 0x28);
const BACKGROUND_BOTTOM: Color32 = Color32::from_rgb(0x00, 0x4e, 0x92);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VisualizationMode {
    #[default]
    Bars,
    Wave,
    Particles,
}

impl VisualizationMode {
    pub const ALL: [VisualizationMode; 3] = [Self::Bars, Self::Wave, Self::Particles];

    pub fn label(self) -> &'static str {
        match self {
            Self::Bars => "Bars",
            Self::Wave => "Wave",
            Self::Particles => "Particles",
        }
    }
}

/// Logical surface mapped onto a screen rect.
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    to_screen: RectTransform,
}

impl Viewport {
    pub fn new(width: f32, height: f32, screen: Rect) -> Self {
        let logical = Rect::from_min_size(Pos2::ZERO, vec2(width, height));
        Self {
            width,
            height,
            to_screen: RectTransform::from_to(logical, screen),
        }
    }

    pub fn screen_rect(&self) -> Rect {
        *self.to_screen.to()
    }

    pub fn pos(&self, logical: Pos2) -> Pos2 {
        self.to_screen.transform_pos(logical)
    }

    pub fn rect(&self, logical: Rect) -> Rect {
        self.to_screen.transform_rect(logical)
    }

    /// Screen pixels per logical unit (uniform for an aspect-correct rect).
    pub fn scale(&self) -> f32 {
        self.to_screen.scale().x
    }

    fn is_drawable(&self) -> bool {
        let screen = self.screen_rect();
        self.width > 0.0
            && self.height > 0.0
            && screen.is_finite()
            && screen.width() > 0.0
            && screen.height() > 0.0
    }
}

/// Owns the render-only state that lives across frames.
pub struct Renderer {
    config: VisualizerConfig,
    particles: ParticleField,
}

impl Renderer {
    pub fn new(config: &VisualizerConfig, seed: u64) -> Self {
        Self {
            config: config.clone(),
            particles: ParticleField::new(config.particle_count, seed),
        }
    }

    pub fn particles(&self) -> &ParticleField {
        &self.particles
    }

    /// Paint exactly one frame into `screen`.
    ///
    /// Without a snapshot (paused, or no analyser yet) the idle sine is drawn
    /// instead of frequency data. Malformed input degrades to less drawing;
    /// this never panics.
    pub fn render_frame(
        &mut self,
        painter: &Painter,
        screen: Rect,
        mode: VisualizationMode,
        snapshot: Option<FrequencySnapshot<'_>>,
        time: f64,
    ) {
        let viewport = Viewport::new(self.config.canvas_width, self.config.canvas_height, screen);
        if !viewport.is_drawable() {
            return;
        }

        painter.add(vertical_gradient(
            viewport.screen_rect(),
            BACKGROUND_TOP,
            BACKGROUND_BOTTOM,
        ));

        match snapshot {
            Some(snapshot) => match mode {
                VisualizationMode::Bars => bars::draw(painter, &viewport, snapshot, &self.config),
                VisualizationMode::Wave => wave::draw(painter, &viewport, snapshot, &self.config),
                VisualizationMode::Particles => {
                    self.particles.draw(painter, &viewport, snapshot, &self.config);
                }
            },
            None => idle::draw(painter, &viewport, time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Context, LayerId, RawInput};

    fn paint(mut f: impl FnMut(&Painter, Rect)) -> usize {
        let ctx = Context::default();
        let output = ctx.run(RawInput::default(), |ctx| {
            let rect = Rect::from_min_size(Pos2::ZERO, vec2(400.0, 200.0));
            let painter = Painter::new(ctx.clone(), LayerId::background(), rect);
            f(&painter, rect);
        });
        output.shapes.len()
    }

    #[test]
    fn viewport_scales_logical_units() {
        let screen = Rect::from_min_size(Pos2::new(10.0, 20.0), vec2(400.0, 200.0));
        let v = Viewport::new(800.0, 400.0, screen);
        assert_eq!(v.scale(), 0.5);
        assert_eq!(v.pos(Pos2::new(800.0, 400.0)), Pos2::new(410.0, 220.0));
    }

    #[test]
    fn every_mode_paints_without_panicking() {
        let cfg = VisualizerConfig::default();
        let mut renderer = Renderer::new(&cfg, 1);
        let odd: Vec<u8> = (0..37).map(|i| (i * 7) as u8).collect();

        for mode in VisualizationMode::ALL {
            for data in [&[][..], &odd[..], &[255u8; 1024][..]] {
                let shapes = paint(|painter, rect| {
                    let snapshot = Some(FrequencySnapshot::new(data));
                    renderer.render_frame(painter, rect, mode, snapshot, 3.0);
                });
                assert!(shapes >= 1);
            }
        }
        assert!(renderer.particles().is_allocated());
    }

    #[test]
    fn idle_frame_is_never_blank() {
        let cfg = VisualizerConfig::default();
        let mut renderer = Renderer::new(&cfg, 1);
        let shapes = paint(|painter, rect| {
            renderer.render_frame(painter, rect, VisualizationMode::Particles, None, 12.0);
        });
        // background plus the sine
        assert!(shapes >= 2);
        assert!(!renderer.particles().is_allocated());
    }

    #[test]
    fn zero_sized_surface_draws_nothing() {
        let cfg = VisualizerConfig::default();
        let mut renderer = Renderer::new(&cfg, 1);
        let shapes = paint(|painter, _| {
            renderer.render_frame(painter, Rect::NOTHING, VisualizationMode::Bars, None, 0.0);
        });
        assert_eq!(shapes, 0);
    }

    #[test]
    fn mode_labels() {
        let labels: Vec<_> = VisualizationMode::ALL.iter().map(|m| m.label()).collect();
        assert_eq!(labels, ["Bars", "Wave", "Particles"]);
        assert_eq!(VisualizationMode::default(), VisualizationMode::Bars);
    }
}
