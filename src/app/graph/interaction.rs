use eframe::egui::{self, PointerButton, Pos2, Rect, Ui};

use super::super::ViewModel;
use super::super::viewport::{DragTarget, TransformDelta, Viewport, hit_test};

impl ViewModel {
    pub(in crate::app) fn handle_canvas_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = response.hover_pos().unwrap_or_else(|| rect.center());
        self.on_zoom(TransformDelta::Scale {
            factor: Viewport::wheel_factor(scroll),
            anchor: pointer - rect.min.to_vec2(),
        });
    }

    fn node_at(&self, rect: Rect, screen: Pos2, radii: &[f32]) -> Option<(usize, Pos2)> {
        let world = self.viewport.transform().invert(rect.min, screen);
        hit_test(&self.frame.positions, radii, world).map(|index| (index, world))
    }

    pub(in crate::app) fn handle_canvas_drag(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
        radii: &[f32],
    ) {
        if response.drag_started() {
            let press = if response.drag_started_by(PointerButton::Primary) {
                ui.input(|input| input.pointer.press_origin())
                    .or_else(|| response.interact_pointer_pos())
            } else {
                None
            };
            match press.and_then(|screen| self.node_at(rect, screen, radii)) {
                Some((id, world)) => self.on_drag_start(id, world),
                None => self.viewport.begin_drag(DragTarget::Pan),
            }
        }

        if response.dragged() {
            match self.viewport.drag() {
                Some(DragTarget::Node(id)) => {
                    if let Some(screen) = response.interact_pointer_pos() {
                        let world = self.viewport.transform().invert(rect.min, screen);
                        self.on_drag_move(id, world);
                    }
                }
                Some(DragTarget::Pan) => {
                    self.on_zoom(TransformDelta::Translate(response.drag_delta()));
                }
                None => {}
            }
        }

        if response.drag_stopped() {
            match self.viewport.drag() {
                Some(DragTarget::Node(id)) => self.on_drag_end(id),
                Some(DragTarget::Pan) => {
                    self.viewport.end_drag();
                }
                None => {}
            }
        }
    }

    /// Returns the hovered node id, if any.
    pub(in crate::app) fn handle_canvas_hover(
        &mut self,
        rect: Rect,
        response: &egui::Response,
        radii: &[f32],
    ) -> Option<usize> {
        if let Some(id) = self.viewport.dragged_node() {
            return Some(id);
        }

        let hovered = response
            .hover_pos()
            .and_then(|screen| self.node_at(rect, screen, radii));
        match hovered {
            Some((id, world)) => {
                self.on_node_hover(id, world);
                Some(id)
            }
            None => {
                self.on_node_hover_end();
                None
            }
        }
    }
}
