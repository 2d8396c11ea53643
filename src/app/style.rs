use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use eframe::egui::ecolor::Hsva;
use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

const UNTYPED_NODE: Color32 = Color32::from_rgb(120, 140, 160);

/// Stable colour per node type; untyped nodes are grey-blue.
pub(super) fn kind_color(kind: Option<&str>) -> Color32 {
    let Some(kind) = kind else {
        return UNTYPED_NODE;
    };

    let mut hasher = DefaultHasher::new();
    kind.hash(&mut hasher);
    let hue = (hasher.finish() & 0xffff) as f32 / 65_535.0;
    Hsva::new(hue, 0.55, 0.88, 1.0).into()
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

/// Grid that pans and scales with the viewport. `origin` is the screen position of model (0, 0).
pub(super) fn draw_background(painter: &Painter, rect: Rect, origin: Pos2, scale: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * scale).max(20.0);
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    rect.expand(radius).contains(position)
}

/// Cheap bounding-box test; long edges crossing the view stay drawn.
pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    Rect::from_two_pos(start, end)
        .expand2(Vec2::splat(padding))
        .intersects(rect)
}

/// Stroke width for an edge of the given weight at the given zoom.
pub(super) fn edge_width(weight: f32, scale: f32) -> f32 {
    ((0.6 + weight.clamp(0.0, 4.0) * 0.5) * scale.sqrt()).clamp(0.4, 4.0)
}
