use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{self, Align2, Color32, FontId, Sense, Stroke, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use knowledge_graph_view::NodeView;

use super::style::{
    blend_color, circle_visible, dim_color, draw_background, edge_visible, edge_width, kind_color,
};
use super::{SearchMatchCache, ViewerModel};

const HOVER_COLOR: Color32 = Color32::from_rgb(255, 164, 101);
const MATCH_COLOR: Color32 = Color32::from_rgb(103, 196, 255);
const PINNED_COLOR: Color32 = Color32::from_rgb(245, 206, 93);

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

fn matching_ids(nodes: &[NodeView], query: &str) -> HashSet<String> {
    let matcher = SkimMatcherV2::default();
    nodes
        .iter()
        .filter(|node| {
            fuzzy_match_score(&matcher, &node.label, query).is_some()
                || fuzzy_match_score(&matcher, &node.id, query).is_some()
        })
        .map(|node| node.id.clone())
        .collect()
}

impl ViewerModel {
    fn search_matches(&mut self) -> Option<Arc<HashSet<String>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.graph_revision == self.graph_revision
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let nodes = &self.view.sink()?.latest()?.nodes;
        let matches = Arc::new(matching_ids(nodes, query));
        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            graph_revision: self.graph_revision,
            matches: Arc::clone(&matches),
        });
        Some(matches)
    }

    pub(super) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        if let Some(sink) = self.view.sink_mut() {
            sink.set_available(rect.width() >= 1.0 && rect.height() >= 1.0);
        }

        self.handle_graph_input(ui, rect, &response);
        self.view.on_frame();
        if self.view.needs_frame() || self.view.dragging().is_some() {
            ui.ctx().request_repaint();
        }

        let matches = self.search_matches();
        let Some(buffer) = self.view.sink() else {
            return;
        };
        let Some(frame) = buffer.latest() else {
            painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));
            return;
        };

        let viewport = frame.viewport;
        let origin = rect.center() + viewport.translate();
        draw_background(&painter, rect, origin, viewport.scale);
        let to_screen = |x: f32, y: f32| rect.center() + viewport.to_screen(vec2(x, y));

        let hovered = buffer.hovered();
        let hovered_id = hovered.map(|node| node.id.as_str());
        let search_active = matches.as_ref().is_some_and(|matches| !matches.is_empty());

        for edge in &frame.edges {
            let start = to_screen(edge.x1, edge.y1);
            let end = to_screen(edge.x2, edge.y2);
            if !edge_visible(rect, start, end, 2.5) {
                continue;
            }

            let touches_hover =
                hovered_id.is_some_and(|id| id == edge.source_id || id == edge.target_id);
            let color = if touches_hover {
                Color32::from_rgb(241, 146, 94)
            } else if search_active {
                Color32::from_rgba_unmultiplied(72, 72, 72, 110)
            } else {
                Color32::from_rgba_unmultiplied(90, 98, 110, 190)
            };
            painter.line_segment(
                [start, end],
                Stroke::new(edge_width(edge.weight, viewport.scale), color),
            );
        }

        for node in &frame.nodes {
            let position = to_screen(node.x, node.y);
            let radius = (node.size * viewport.scale).max(2.0);
            if !circle_visible(rect, position, radius) {
                continue;
            }

            let is_hovered = hovered_id == Some(node.id.as_str());
            let is_match = matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&node.id));

            let base_color = kind_color(node.kind.as_deref());
            let color = if is_hovered {
                blend_color(base_color, HOVER_COLOR, 0.6)
            } else if is_match {
                blend_color(base_color, MATCH_COLOR, 0.68)
            } else if search_active {
                dim_color(base_color, 0.38)
            } else {
                base_color
            };

            painter.circle_filled(position, radius, color);
            let stroke = if node.pinned {
                Stroke::new(2.0, PINNED_COLOR)
            } else {
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190))
            };
            painter.circle_stroke(position, radius, stroke);

            let should_draw_label = is_hovered
                || node.pinned
                || (is_match && viewport.scale > 0.35)
                || viewport.scale > 1.35;
            if should_draw_label {
                painter.text(
                    position + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    &node.label,
                    FontId::proportional(12.0),
                    Color32::from_gray(238),
                );
            }
        }

        if let Some(node) = hovered {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);

            let mut panel_text = format!(
                "{}  |  {}  |  size {:.1}",
                node.label,
                node.kind.as_deref().unwrap_or("untyped"),
                node.size
            );
            if node.label != node.id {
                panel_text.push_str(&format!("  |  id {}", node.id));
            }
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                panel_text,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, label: &str) -> NodeView {
        NodeView {
            id: id.into(),
            label: label.into(),
            kind: None,
            size: 5.0,
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            pinned: false,
        }
    }

    #[test]
    fn search_matches_label_or_id_ignoring_case() {
        let nodes = [
            node("n1", "Barnes-Hut approximation"),
            node("n2", "Verlet integration"),
            node("quadtree", "Spatial index"),
        ];

        let matches = matching_ids(&nodes, "barnes");
        assert!(matches.contains("n1"));
        assert!(!matches.contains("n2"));

        let matches = matching_ids(&nodes, "QUAD");
        assert_eq!(matches.len(), 1);
        assert!(matches.contains("quadtree"));
    }
}
