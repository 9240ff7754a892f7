use egui::{pos2, Color32, Painter, Pos2, Shape, Stroke};

use super::color::glow_line;
use super::Viewport;
use crate::audio::FrequencySnapshot;
use crate::config::VisualizerConfig;

const WAVE_COLOR: Color32 = Color32::from_rgb(0, 255, 136);

/// Main polyline and its mirror across the horizontal center, in logical
/// units.
pub fn polylines(
    snapshot: FrequencySnapshot<'_>,
    width: f32,
    height: f32,
) -> (Vec<Pos2>, Vec<Pos2>) {
    if snapshot.is_empty() {
        return (Vec::new(), Vec::new());
    }
    let slice_width = width / snapshot.len() as f32;

    snapshot
        .as_slice()
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let x = i as f32 * slice_width;
            let offset = f32::from(v) / 255.0 * height * 0.6 + height * 0.2;
            (pos2(x, offset), pos2(x, height - offset))
        })
        .unzip()
}

pub fn draw(
    painter: &Painter,
    viewport: &Viewport,
    snapshot: FrequencySnapshot<'_>,
    cfg: &VisualizerConfig,
) {
    let (main, mirror) = polylines(snapshot, viewport.width, viewport.height);
    if main.len() < 2 {
        return;
    }
    let main: Vec<Pos2> = main.into_iter().map(|p| viewport.pos(p)).collect();
    let mirror: Vec<Pos2> = mirror.into_iter().map(|p| viewport.pos(p)).collect();

    let scale = viewport.scale();
    let width = cfg.wave_line_width * scale;
    let blur = cfg.wave_glow_blur * scale;

    glow_line(painter, &main, width, WAVE_COLOR, blur);
    painter.add(Shape::line(main, Stroke::new(width, WAVE_COLOR)));

    let faint = Color32::from_rgba_unmultiplied(0, 255, 136, 77);
    glow_line(painter, &mirror, width, faint, blur);
    painter.add(Shape::line(mirror, Stroke::new(width, faint)));
}
