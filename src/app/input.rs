use eframe::egui::{self, PointerButton, Pos2, Rect, Ui, Vec2};
use knowledge_graph_view::GestureEvent;

use super::ViewerModel;

fn to_surface(rect: Rect, pointer: Pos2) -> Vec2 {
    pointer - rect.center()
}

/// Scroll wheel delta to a multiplicative zoom step.
pub(super) fn zoom_factor(scroll: f32) -> f32 {
    (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15)
}

impl ViewerModel {
    /// Translates this frame's egui pointer state into gestures and feeds them to the view.
    pub(super) fn handle_graph_input(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        for gesture in self.collect_gestures(ui, rect, response) {
            let outcome = self.view.handle_gesture(&gesture);
            tracing::trace!(?gesture, ?outcome, "gesture handled");
        }
    }

    fn collect_gestures(
        &self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) -> Vec<GestureEvent> {
        let mut gestures = Vec::new();

        if response.hovered() {
            let scroll = ui.input(|input| input.raw_scroll_delta.y);
            if scroll.abs() > f32::EPSILON {
                let pointer = response.hover_pos().unwrap_or_else(|| rect.center());
                gestures.push(GestureEvent::zoom(
                    to_surface(rect, pointer),
                    zoom_factor(scroll),
                ));
            }
        }

        if response.drag_started_by(PointerButton::Primary)
            && let Some(pointer) = response.interact_pointer_pos()
        {
            let pointer = to_surface(rect, pointer);
            if let Some(id) = self.view.hit_test(pointer) {
                gestures.push(GestureEvent::drag_start(id, pointer));
            }
        }

        let dragging_node = self.view.dragging().is_some()
            || gestures
                .iter()
                .any(|gesture| matches!(gesture, GestureEvent::DragStart { .. }));

        if dragging_node && response.dragged_by(PointerButton::Primary) {
            if let Some(pointer) = response.interact_pointer_pos() {
                gestures.push(GestureEvent::drag_move(to_surface(rect, pointer)));
            }
        } else if response.dragged_by(PointerButton::Primary)
            || response.dragged_by(PointerButton::Secondary)
            || response.dragged_by(PointerButton::Middle)
        {
            gestures.push(GestureEvent::pan(response.drag_delta()));
        }

        if dragging_node && response.drag_stopped() {
            gestures.push(GestureEvent::drag_end());
        }

        if !dragging_node {
            let under_pointer = response
                .hover_pos()
                .and_then(|pointer| self.view.hit_test(to_surface(rect, pointer)));
            let current = self.view.hovered();
            if current != under_pointer.as_deref() {
                if let Some(previous) = current {
                    gestures.push(GestureEvent::HoverExit {
                        node_id: previous.to_owned(),
                    });
                }
                if let Some(node_id) = under_pointer {
                    gestures.push(GestureEvent::HoverEnter { node_id });
                }
            }
        }

        gestures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_step_is_bounded() {
        assert_eq!(zoom_factor(0.0), 1.0);
        assert_eq!(zoom_factor(10_000.0), 1.15);
        assert_eq!(zoom_factor(-10_000.0), 0.85);
        assert!(zoom_factor(50.0) > 1.0);
    }
}
