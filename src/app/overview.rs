use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, StrokeKind, Vec2, pos2, vec2};

use super::render_utils::{EDGE_OPACITY, INFECTED_COLOR, with_opacity};
use super::{MAIN_CANVAS_SIZE, RunId, TickFrame};

pub(in crate::app) const THUMBNAIL_SIZE: Vec2 = vec2(300.0, 150.0);
const INSET_MARGIN: f32 = 10.0;

/// Scaled-down copy of the latest published frame.
#[derive(Default)]
pub(in crate::app) struct Overview {
    run: Option<RunId>,
    tick: u32,
    positions: Vec<Pos2>,
    radii: Vec<f32>,
    infected: Vec<bool>,
    links: Vec<(usize, usize)>,
}

impl Overview {
    pub(in crate::app) fn scale() -> Vec2 {
        vec2(
            THUMBNAIL_SIZE.x / MAIN_CANVAS_SIZE.x,
            THUMBNAIL_SIZE.y / MAIN_CANVAS_SIZE.y,
        )
    }

    pub(in crate::app) fn project(world: Pos2) -> Pos2 {
        let scale = Self::scale();
        pos2(world.x * scale.x, world.y * scale.y)
    }

    /// Replaces the node attributes that only change with the graph.
    pub(in crate::app) fn reset(
        &mut self,
        radii: Vec<f32>,
        infected: Vec<bool>,
        links: Vec<(usize, usize)>,
    ) {
        let scale = Self::scale().x;
        self.radii = radii.into_iter().map(|radius| radius * scale).collect();
        self.infected = infected;
        self.links = links;
        self.positions.clear();
        self.run = None;
        self.tick = 0;
    }

    pub(in crate::app) fn sync(&mut self, frame: &TickFrame) {
        self.run = frame.run;
        self.tick = frame.tick;
        self.positions.clear();
        self.positions
            .extend(frame.positions.iter().map(|&world| Self::project(world)));
    }

    #[cfg(test)]
    pub(in crate::app) fn synced_with(&self, frame: &TickFrame) -> bool {
        self.run == frame.run && self.tick == frame.tick
    }

    #[cfg(test)]
    pub(in crate::app) fn positions(&self) -> &[Pos2] {
        &self.positions
    }

    #[cfg(test)]
    pub(in crate::app) fn radii(&self) -> &[f32] {
        &self.radii
    }

    pub(in crate::app) fn inset_rect(canvas: Rect) -> Rect {
        Rect::from_min_size(
            pos2(
                canvas.right() - THUMBNAIL_SIZE.x - INSET_MARGIN,
                canvas.top() + INSET_MARGIN,
            ),
            THUMBNAIL_SIZE,
        )
    }

    pub(in crate::app) fn draw(&self, painter: &Painter, rect: Rect, node_color: Color32) {
        painter.rect_filled(rect, 0.0, Color32::WHITE);

        let origin = rect.min.to_vec2();
        let edge_stroke = Stroke::new(0.5, with_opacity(Color32::from_gray(153), EDGE_OPACITY));
        for &(source, target) in &self.links {
            let (Some(start), Some(end)) = (self.positions.get(source), self.positions.get(target))
            else {
                continue;
            };
            painter.line_segment([*start + origin, *end + origin], edge_stroke);
        }

        for (index, position) in self.positions.iter().enumerate() {
            let radius = self.radii.get(index).copied().unwrap_or(1.0).max(0.5);
            let color = if self.infected.get(index).copied().unwrap_or(false) {
                INFECTED_COLOR
            } else {
                node_color
            };
            painter.circle_filled(*position + origin, radius, color);
        }

        painter.rect_stroke(
            rect,
            0.0,
            Stroke::new(1.0, Color32::GRAY),
            StrokeKind::Inside,
        );
    }
}
