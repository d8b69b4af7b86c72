use eframe::egui::{self, Color32, RichText, Sense, Ui, vec2};

use crate::util::format_alpha;

use super::super::ViewModel;
use super::super::render_utils::INFECTED_COLOR;

fn legend_row(ui: &mut Ui, color: Color32, label: &str) {
    ui.horizontal(|ui| {
        let (rect, _) = ui.allocate_exact_size(vec2(14.0, 14.0), Sense::hover());
        ui.painter().circle_filled(rect.center(), 6.0, color);
        ui.label(label);
    });
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Infection spread");
        ui.add_space(6.0);

        let stage = self.stage;
        ui.horizontal(|ui| {
            let previous =
                ui.add_enabled(stage.previous() != stage, egui::Button::new("Previous Stage"));
            if previous.clicked() {
                self.previous_stage();
            }
            let next = ui.add_enabled(stage.next() != stage, egui::Button::new("Next Stage"));
            if next.clicked() {
                self.next_stage();
            }
        });
        ui.label(RichText::new(format!("Current Stage: {}", self.stage.value())).strong());

        ui.separator();
        ui.label("Legend");
        legend_row(ui, self.config.node_color32(), "Normal Node");
        legend_row(ui, INFECTED_COLOR, "Infected Node");

        ui.separator();
        ui.label(format!("Nodes: {}", self.graph.node_count()));
        ui.label(format!("Links: {}", self.graph.links().len()));
        ui.label(format!("Infected: {}", self.graph.infected_count()));
        ui.label(format!("Isolated: {}", self.graph.isolated.len()));
        ui.label(format!(
            "Stored positions: {}/{}",
            self.positions.len(),
            self.graph.node_count()
        ));

        ui.separator();
        match &self.run {
            Some(run) => {
                ui.label(format!("Layout {} settling", run.id));
                ui.label(format!(
                    "tick {}  alpha {}",
                    self.frame.tick,
                    format_alpha(self.frame.alpha)
                ));
            }
            None if self.frame.settled => {
                ui.label("Layout settled");
            }
            None => {
                ui.label("Layout idle");
            }
        }
        ui.label(format!("Relayout: {}", self.config.relayout.as_str()));
        ui.label(format!("Zoom: {:.2}x", self.viewport.transform().scale));
        ui.label(format!("Seed: {}", self.seed));
    }
}
