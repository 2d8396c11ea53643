use std::path::Path;

use eframe::egui::{self, Align, Color32, Layout, Ui};
use knowledge_graph_view::ClockState;

use super::ViewerModel;

fn clock_label(state: ClockState) -> &'static str {
    match state {
        ClockState::Idle => "idle",
        ClockState::Running => "running",
        ClockState::Settling => "settling",
    }
}

impl ViewerModel {
    fn status_text(&self) -> String {
        let status = self.view.status();
        let (nodes, edges) = self
            .view
            .model()
            .map(|model| (model.node_count(), model.edge_count()))
            .unwrap_or_default();
        format!(
            "nodes {nodes}  edges {edges}  |  {}  alpha {:.3}  tick {}  |  zoom {:.2}",
            clock_label(status.state),
            status.alpha,
            status.ticks,
            self.view.viewport().scale
        )
    }

    pub(super) fn draw_top_bar(
        &mut self,
        ui: &mut Ui,
        graph_path: &Path,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        ui.horizontal(|ui| {
            ui.heading("knowledge-graph-view");
            ui.separator();
            ui.label(graph_path.display().to_string());
            ui.separator();

            ui.add(
                egui::TextEdit::singleline(&mut self.search)
                    .hint_text("search labels")
                    .desired_width(180.0),
            );

            if ui.button("Reheat").clicked() {
                self.view.restart();
            }
            if ui.button("Reset view").clicked() {
                self.view.reset_viewport();
            }
            let reload_button = ui.add_enabled(!is_reloading, egui::Button::new("Reload"));
            if reload_button.clicked() {
                *reload_requested = true;
            }
            if is_reloading {
                ui.spinner();
            }

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                ui.label(self.status_text());
                if let Some(error) = &self.reload_error {
                    ui.colored_label(Color32::from_rgb(235, 110, 96), format!("reload failed: {error}"));
                }
            });
        });
    }
}
