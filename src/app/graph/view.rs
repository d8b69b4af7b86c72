use eframe::egui::{self, Align2, Color32, FontId, Sense, Stroke, Ui, vec2};

use super::super::ViewModel;
use super::super::inspector::{draw_panel, panel_rect};
use super::super::overview::Overview;
use super::super::render_utils::{
    EDGE_OPACITY, INFECTED_COLOR, circle_visible, draw_background, edge_width, segment_visible,
    with_opacity,
};

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        draw_background(&painter, rect);

        if self.graph.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No nodes to display.",
                FontId::proportional(15.0),
                Color32::from_gray(90),
            );
            return;
        }

        let radii = self.node_radii();
        self.handle_canvas_zoom(ui, rect, &response);
        self.handle_canvas_drag(ui, rect, &response, &radii);
        let hovered = self.handle_canvas_hover(rect, &response, &radii);

        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = if self.viewport.dragged_node().is_some() {
                    egui::CursorIcon::Grabbing
                } else {
                    egui::CursorIcon::PointingHand
                };
            });
        }

        let transform = self.viewport.transform();
        let scale = transform.scale;
        let screen_positions = self
            .frame
            .positions
            .iter()
            .map(|&world| transform.apply(rect.min, world))
            .collect::<Vec<_>>();

        let edge_color = with_opacity(self.config.edge_color32(), EDGE_OPACITY);
        for edge in &self.graph.edges {
            if edge.source >= edge.target {
                continue;
            }
            let (Some(&start), Some(&end)) = (
                screen_positions.get(edge.source),
                screen_positions.get(edge.target),
            ) else {
                continue;
            };
            if !segment_visible(rect, start, end, 2.0) {
                continue;
            }

            let width = edge_width(self.config.edge_width, edge.display_weight()) * scale;
            painter.line_segment([start, end], Stroke::new(width, edge_color));
        }

        let node_color = self.config.node_color32();
        let outline = Stroke::new(1.5 * scale, Color32::WHITE);
        for (index, node) in self.graph.nodes.iter().enumerate() {
            let Some(&position) = screen_positions.get(index) else {
                continue;
            };
            let radius = radii[index] * scale;
            if !circle_visible(rect, position, radius) {
                continue;
            }

            let fill = if node.infected { INFECTED_COLOR } else { node_color };
            painter.circle_filled(position, radius, fill);
            painter.circle_stroke(position, radius, outline);
        }

        if let Some(index) = hovered
            && let (Some(node), Some(&position)) =
                (self.graph.nodes.get(index), screen_positions.get(index))
        {
            painter.text(
                position + vec2(radii[index] * scale + 4.0, 0.0),
                Align2::LEFT_CENTER,
                format!("Node {}\nDegree: {}", node.id, node.degree()),
                FontId::proportional(11.0),
                Color32::from_gray(40),
            );
        }

        let inset = Overview::inset_rect(rect);
        self.overview.draw(&painter, inset, node_color);

        if let Some(state) = self.inspector.hovered()
            && let Some(node) = self.graph.nodes.get(state.node)
        {
            let pointer = transform.apply(rect.min, state.pointer);
            draw_panel(&painter, panel_rect(rect, pointer), node, &state.sample);
        }
    }
}
