use std::f32::consts::FRAC_PI_6;

use eframe::egui::{
    Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, StrokeKind, Vec2, pos2, vec2,
};
use rand::Rng;

use crate::network::{NetworkNode, PortSample, pie_slices};

use super::render_utils::category_color;

pub(in crate::app) const PANEL_SIZE: Vec2 = vec2(200.0, 150.0);
const POINTER_OFFSET: Vec2 = vec2(-230.0, -140.0);
const PIE_RADIUS: f32 = 34.0;
const MAX_WEDGE_SWEEP: f32 = FRAC_PI_6;

pub(in crate::app) struct HoverState {
    pub(in crate::app) node: usize,
    pub(in crate::app) sample: PortSample,
    pub(in crate::app) pointer: Pos2,
}

#[derive(Default)]
pub(in crate::app) struct Inspector {
    hover: Option<HoverState>,
}

impl Inspector {
    /// Returns true when a fresh sample was drawn for `node`.
    pub(in crate::app) fn hover<R: Rng + ?Sized>(
        &mut self,
        node: usize,
        pointer: Pos2,
        rng: &mut R,
    ) -> bool {
        if let Some(state) = self.hover.as_mut()
            && state.node == node
        {
            state.pointer = pointer;
            return false;
        }

        self.hover = Some(HoverState {
            node,
            sample: PortSample::draw(rng),
            pointer,
        });
        true
    }

    pub(in crate::app) fn clear(&mut self) -> bool {
        self.hover.take().is_some()
    }

    pub(in crate::app) fn hovered(&self) -> Option<&HoverState> {
        self.hover.as_ref()
    }
}

/// Panel rect at the fixed pointer offset, pushed back inside `canvas`.
pub(in crate::app) fn panel_rect(canvas: Rect, pointer: Pos2) -> Rect {
    let wanted = pointer + POINTER_OFFSET;
    let max_x = (canvas.right() - PANEL_SIZE.x).max(canvas.left());
    let max_y = (canvas.bottom() - PANEL_SIZE.y).max(canvas.top());
    Rect::from_min_size(
        pos2(
            wanted.x.clamp(canvas.left(), max_x),
            wanted.y.clamp(canvas.top(), max_y),
        ),
        PANEL_SIZE,
    )
}

fn arc_point(center: Pos2, radius: f32, angle: f32) -> Pos2 {
    center + vec2(angle.sin(), -angle.cos()) * radius
}

fn wedge_points(center: Pos2, radius: f32, start: f32, end: f32) -> Vec<Vec<Pos2>> {
    let steps = ((end - start) / MAX_WEDGE_SWEEP - 1e-4).ceil().max(1.0) as usize;
    let step = (end - start) / steps as f32;
    (0..steps)
        .map(|part| {
            let from = start + step * part as f32;
            let to = from + step;
            let arc_steps = 6;
            let mut points = Vec::with_capacity(arc_steps + 2);
            points.push(center);
            for index in 0..=arc_steps {
                let angle = from + (to - from) * index as f32 / arc_steps as f32;
                points.push(arc_point(center, radius, angle));
            }
            points
        })
        .collect()
}

fn draw_pie(painter: &Painter, center: Pos2, sample: &PortSample) {
    let slices = pie_slices(&sample.ports);
    if slices.is_empty() {
        painter.text(
            center,
            Align2::CENTER_CENTER,
            "No active ports",
            FontId::proportional(10.0),
            Color32::from_gray(110),
        );
        return;
    }

    for slice in &slices {
        let color = category_color(slice.index);
        for points in wedge_points(center, PIE_RADIUS, slice.start_angle, slice.end_angle) {
            painter.add(Shape::convex_polygon(points, color, Stroke::NONE));
        }
    }

    for slice in &slices {
        if slice.sweep() < 0.35 {
            continue;
        }
        let label = format!("Port {}", sample.ports[slice.index].port);
        painter.text(
            arc_point(center, PIE_RADIUS * 0.62, slice.mid_angle()),
            Align2::CENTER_CENTER,
            label,
            FontId::proportional(8.0),
            Color32::WHITE,
        );
    }
}

pub(in crate::app) fn draw_panel(
    painter: &Painter,
    rect: Rect,
    node: &NetworkNode,
    sample: &PortSample,
) {
    painter.rect_filled(rect, 4.0, Color32::from_rgba_unmultiplied(255, 255, 255, 235));
    painter.rect_stroke(
        rect,
        4.0,
        Stroke::new(1.0, Color32::from_gray(160)),
        StrokeKind::Inside,
    );

    let open_ports = node
        .open_ports
        .iter()
        .map(|open| if *open { '1' } else { '0' })
        .collect::<String>();
    let lines = [
        format!("Node ID: {}", node.id),
        format!("Status: {}", if node.infected { "Infected" } else { "Normal" }),
        format!("Type: {}", sample.kind.label()),
        format!("Degree: {}", node.degree()),
        format!("Open ports: {open_ports} ({}/5)", node.open_port_count()),
    ];

    let text_color = Color32::from_gray(30);
    let mut cursor = rect.left_top() + vec2(8.0, 8.0);
    for line in lines {
        painter.text(
            cursor,
            Align2::LEFT_TOP,
            line,
            FontId::proportional(11.0),
            text_color,
        );
        cursor.y += 15.0;
    }

    let pie_center = pos2(
        rect.right() - PIE_RADIUS - 8.0,
        rect.bottom() - PIE_RADIUS - 8.0,
    );
    draw_pie(painter, pie_center, sample);
}
