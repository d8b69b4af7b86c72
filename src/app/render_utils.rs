use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, StrokeKind};

pub(super) const INFECTED_COLOR: Color32 = Color32::from_rgb(255, 0, 0);
pub(super) const EDGE_OPACITY: f32 = 0.3;

const CATEGORY10: [Color32; 10] = [
    Color32::from_rgb(0x1f, 0x77, 0xb4),
    Color32::from_rgb(0xff, 0x7f, 0x0e),
    Color32::from_rgb(0x2c, 0xa0, 0x2c),
    Color32::from_rgb(0xd6, 0x27, 0x28),
    Color32::from_rgb(0x94, 0x67, 0xbd),
    Color32::from_rgb(0x8c, 0x56, 0x4b),
    Color32::from_rgb(0xe3, 0x77, 0xc2),
    Color32::from_rgb(0x7f, 0x7f, 0x7f),
    Color32::from_rgb(0xbc, 0xbd, 0x22),
    Color32::from_rgb(0x17, 0xbe, 0xcf),
];

pub(super) fn category_color(index: usize) -> Color32 {
    CATEGORY10[index % CATEGORY10.len()]
}

/// World-space radius; hubs read larger than leaves.
pub(super) fn node_radius(degree: usize, base_radius: u32) -> f32 {
    (degree as f32).sqrt() * 2.0 + base_radius as f32 * 0.6
}

pub(super) fn edge_width(base_width: u32, display_weight: u32) -> f32 {
    base_width as f32 * (display_weight.max(1) as f32).sqrt()
}

pub(super) fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    Color32::from_rgba_unmultiplied(
        color.r(),
        color.g(),
        color.b(),
        (255.0 * opacity.clamp(0.0, 1.0)).round() as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect) {
    painter.rect_filled(rect, 0.0, Color32::WHITE);
    painter.rect_stroke(
        rect,
        0.0,
        Stroke::new(1.0, Color32::from_gray(210)),
        StrokeKind::Inside,
    );
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

/// Bounding-box cull; long diagonal edges near a corner may still be drawn.
pub(super) fn segment_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let bounds = Rect::from_two_pos(start, end).expand(padding);
    bounds.intersects(rect)
}
