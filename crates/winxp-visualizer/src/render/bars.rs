use egui::{pos2, vec2, Painter, Rect};

use super::color::{glow_rect, hsl, vertical_gradient};
use super::Viewport;
use crate::audio::FrequencySnapshot;
use crate::config::VisualizerConfig;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bar {
    /// Logical-unit rect, bottom aligned to the surface.
    pub rect: Rect,
    pub height: f32,
    pub hue: f32,
}

/// Pick every `floor(N / count)`-th bin (at least every bin) and turn it into
/// a bottom-aligned bar.
pub fn layout(
    snapshot: FrequencySnapshot<'_>,
    width: f32,
    height: f32,
    cfg: &VisualizerConfig,
) -> Vec<Bar> {
    let count = cfg.bar_count.max(1);
    let step = (snapshot.len() / count).max(1);
    let bar_width = width / count as f32;

    (0..count)
        .map(|i| {
            let value = snapshot.normalized(i * step);
            let bar_height = value * height * cfg.bar_height_ratio;
            let x = i as f32 * bar_width;
            let y = height - bar_height;
            Bar {
                rect: Rect::from_min_size(
                    pos2(x, y),
                    vec2((bar_width - cfg.bar_gap).max(0.0), bar_height),
                ),
                height: bar_height,
                hue: (i as f32 / count as f32) * 120.0 + 180.0,
            }
        })
        .collect()
}

pub fn draw(
    painter: &Painter,
    viewport: &Viewport,
    snapshot: FrequencySnapshot<'_>,
    cfg: &VisualizerConfig,
) {
    let blur = cfg.bar_glow_blur * viewport.scale();
    for bar in layout(snapshot, viewport.width, viewport.height, cfg) {
        if bar.height <= 0.0 {
            continue;
        }
        let rect = viewport.rect(bar.rect);
        glow_rect(painter, rect, hsl(bar.hue, 1.0, 0.5), blur);
        painter.add(vertical_gradient(
            rect,
            hsl(bar.hue, 1.0, 0.6),
            hsl(bar.hue, 1.0, 0.3),
        ));
    }
}
