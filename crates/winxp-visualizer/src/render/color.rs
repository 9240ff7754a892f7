use egui::{Color32, Mesh, Painter, Pos2, Rect, Shape, Stroke};

/// Layers used to fake a canvas shadow blur.
const GLOW_LAYERS: usize = 3;
const GLOW_ALPHA: f32 = 0.12;

/// `hsl(h, s, l)` with `h` in degrees, `s`/`l` in 0.0-1.0.
pub fn hsl(hue_deg: f32, s: f32, l: f32) -> Color32 {
    hsla(hue_deg, s, l, 1.0)
}

pub fn hsla(hue_deg: f32, s: f32, l: f32, alpha: f32) -> Color32 {
    let h = if hue_deg.is_finite() {
        hue_deg.rem_euclid(360.0) / 360.0
    } else {
        0.0
    };
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h * 6.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;
    let (r, g, b) = match (h * 6.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let alpha = if alpha.is_finite() { alpha.clamp(0.0, 1.0) } else { 1.0 };
    Color32::from_rgba_unmultiplied(
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
        (alpha * 255.0).round() as u8,
    )
}

/// Quad shaded from `top` to `bottom`.
pub fn vertical_gradient(rect: Rect, top: Color32, bottom: Color32) -> Shape {
    let mut mesh = Mesh::default();
    mesh.colored_vertex(rect.left_top(), top);
    mesh.colored_vertex(rect.right_top(), top);
    mesh.colored_vertex(rect.right_bottom(), bottom);
    mesh.colored_vertex(rect.left_bottom(), bottom);
    mesh.add_triangle(0, 1, 2);
    mesh.add_triangle(0, 2, 3);
    Shape::mesh(mesh)
}

pub fn glow_rect(painter: &Painter, rect: Rect, color: Color32, blur: f32) {
    for layer in 1..=GLOW_LAYERS {
        let spread = blur * layer as f32 / GLOW_LAYERS as f32;
        let glow = color.gamma_multiply(GLOW_ALPHA);
        painter.rect_filled(rect.expand(spread * 0.5), spread * 0.5, glow);
    }
}

pub fn glow_line(painter: &Painter, points: &[Pos2], width: f32, color: Color32, blur: f32) {
    if points.len() < 2 {
        return;
    }
    for layer in 1..=GLOW_LAYERS {
        let spread = blur * layer as f32 / GLOW_LAYERS as f32;
        painter.add(Shape::line(
            points.to_vec(),
            Stroke::new(width + spread, color.gamma_multiply(GLOW_ALPHA)),
        ));
    }
}

pub fn glow_circle(painter: &Painter, center: Pos2, radius: f32, color: Color32, blur: f32) {
    for layer in 1..=GLOW_LAYERS {
        let spread = blur * layer as f32 / GLOW_LAYERS as f32;
        painter.circle_filled(center, radius + spread * 0.5, color.gamma_multiply(GLOW_ALPHA));
    }
}
