use eframe::egui::{self, Context};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn show(&mut self, ctx: &Context) {
        let ticked = self.advance();

        egui::SidePanel::left("stage_controls")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));

        if ticked || self.run.is_some() || self.viewport.drag().is_some() {
            ctx.request_repaint();
        }
    }
}
