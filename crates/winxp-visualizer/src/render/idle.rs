use egui::{pos2, Color32, Painter, Pos2, Shape, Stroke};

use super::Viewport;

const IDLE_COLOR: Color32 = Color32::from_rgba_premultiplied(30, 45, 60, 77);
const SAMPLE_SPACING: f32 = 5.0;
const AMPLITUDE: f64 = 20.0;

/// Sine curve across the surface, phase-shifted by `time` seconds.
pub fn curve(width: f32, height: f32, time: f64) -> Vec<Pos2> {
    if !(width > 0.0) || !time.is_finite() {
        return Vec::new();
    }
    let samples = (width / SAMPLE_SPACING).ceil() as usize;
    let mid = f64::from(height) / 2.0;
    (0..samples)
        .map(|i| {
            let x = i as f32 * SAMPLE_SPACING;
            let y = mid + (f64::from(x) * 0.02 + time).sin() * AMPLITUDE;
            pos2(x, y as f32)
        })
        .collect()
}

pub fn draw(painter: &Painter, viewport: &Viewport, time: f64) {
    let points: Vec<Pos2> = curve(viewport.width, viewport.height, time)
        .into_iter()
        .map(|p| viewport.pos(p))
        .collect();
    if points.len() < 2 {
        return;
    }
    painter.add(Shape::line(points, Stroke::new(2.0 * viewport.scale(), IDLE_COLOR)));
}
