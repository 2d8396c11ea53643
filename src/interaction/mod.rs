mod gesture;
mod viewport;

use eframe::egui::Vec2;

use crate::clock::SimulationClock;
use crate::graph::GraphModel;
use crate::render::HoverEvent;

pub use gesture::GestureEvent;
pub use viewport::{Viewport, ViewportConfig};

/// Pointer radius, in screen pixels, under which small nodes still count as hit.
const MIN_HIT_RADIUS: f32 = 6.0;

#[derive(Clone, Debug, PartialEq)]
pub enum GestureOutcome {
    Ignored,
    ViewportChanged,
    NodePinned,
    NodeReleased,
    Hover(HoverEvent),
}

#[derive(Clone, Debug)]
struct DragState {
    node_id: String,
    grab_offset: Vec2,
    /// Where the node was last pinned.
    target: Vec2,
}

/// Turns gestures into viewport changes or node pins.
#[derive(Clone, Debug)]
pub struct InteractionController {
    config: ViewportConfig,
    viewport: Viewport,
    drag: Option<DragState>,
    hovered: Option<String>,
    /// Pointer of the last pointer-only pan event.
    pan_anchor: Option<Vec2>,
}

impl InteractionController {
    pub fn new(config: ViewportConfig) -> Self {
        Self {
            config,
            viewport: Viewport::default(),
            drag: None,
            hovered: None,
            pan_anchor: None,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn reset_viewport(&mut self) {
        self.viewport = Viewport::default();
    }

    pub fn dragging(&self) -> Option<&str> {
        self.drag.as_ref().map(|drag| drag.node_id.as_str())
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub(crate) fn clear(&mut self) {
        self.drag = None;
        self.hovered = None;
        self.pan_anchor = None;
    }

    /// Carries an active drag over to a freshly loaded model: the node is pinned again
    /// where it was held and the clock is reheated. A drag on a node the new model lacks
    /// is dropped.
    pub(crate) fn rebind(&mut self, model: &mut GraphModel, clock: &mut SimulationClock) {
        let Some(drag) = &self.drag else {
            return;
        };
        if model.pin(&drag.node_id, drag.target) {
            clock.reheat(clock.config().drag_alpha);
            tracing::debug!(node = %drag.node_id, "drag carried over reload");
        } else {
            tracing::debug!(node = %drag.node_id, "dragged node gone after reload");
            self.drag = None;
        }
    }

    pub fn handle(
        &mut self,
        event: &GestureEvent,
        model: &mut GraphModel,
        clock: &mut SimulationClock,
    ) -> GestureOutcome {
        if !matches!(
            event,
            GestureEvent::Pan { .. }
                | GestureEvent::HoverEnter { .. }
                | GestureEvent::HoverExit { .. }
        ) {
            self.pan_anchor = None;
        }

        match event {
            GestureEvent::Pan { .. } => {
                let pointer = event.pointer();
                let delta = match (event.pan_delta(), pointer) {
                    (Some(delta), _) => delta,
                    (None, Some(pointer)) => self
                        .pan_anchor
                        .map_or(Vec2::ZERO, |anchor| pointer - anchor),
                    (None, None) => return GestureOutcome::Ignored,
                };
                if pointer.is_some() {
                    self.pan_anchor = pointer;
                }
                if delta == Vec2::ZERO {
                    return GestureOutcome::Ignored;
                }
                self.viewport.pan_by(delta);
                GestureOutcome::ViewportChanged
            }
            GestureEvent::Zoom { delta_scale, .. } => {
                let pointer = event.pointer().unwrap_or(Vec2::ZERO);
                self.viewport.zoom_at(pointer, *delta_scale, &self.config);
                GestureOutcome::ViewportChanged
            }
            GestureEvent::DragStart { node_id, .. } => {
                self.release(model, clock);

                let Some(position) = model.position(node_id) else {
                    return GestureOutcome::Ignored;
                };
                let pointer = event.pointer().unwrap_or(Vec2::ZERO);
                let grab_offset = position - self.viewport.to_model(pointer);

                model.pin(node_id, position);
                clock.reheat(clock.config().drag_alpha);
                self.drag = Some(DragState {
                    node_id: node_id.clone(),
                    grab_offset,
                    target: position,
                });
                tracing::debug!(node = %node_id, "drag started");
                GestureOutcome::NodePinned
            }
            GestureEvent::DragMove { node_id, .. } => {
                let Some(drag) = &mut self.drag else {
                    return GestureOutcome::Ignored;
                };
                if node_id.as_ref().is_some_and(|id| *id != drag.node_id) {
                    return GestureOutcome::Ignored;
                }

                let pointer = event.pointer().unwrap_or(Vec2::ZERO);
                let target = self.viewport.to_model(pointer) + drag.grab_offset;
                if model.pin(&drag.node_id, target) {
                    drag.target = target;
                    GestureOutcome::NodePinned
                } else {
                    GestureOutcome::Ignored
                }
            }
            GestureEvent::DragEnd { node_id } => {
                let matches = self.drag.as_ref().is_some_and(|drag| {
                    node_id.as_ref().is_none_or(|id| *id == drag.node_id)
                });
                if matches && self.release(model, clock) {
                    GestureOutcome::NodeReleased
                } else {
                    GestureOutcome::Ignored
                }
            }
            GestureEvent::HoverEnter { node_id } => {
                let Some(node) = model.node(node_id) else {
                    return GestureOutcome::Ignored;
                };
                self.hovered = Some(node_id.clone());
                GestureOutcome::Hover(HoverEvent::Enter(node))
            }
            GestureEvent::HoverExit { node_id } => {
                if self.hovered.as_deref() != Some(node_id.as_str()) {
                    return GestureOutcome::Ignored;
                }
                self.hovered = None;
                GestureOutcome::Hover(HoverEvent::Exit {
                    id: node_id.clone(),
                })
            }
        }
    }

    /// Ends the active drag, if any. The node may already be gone from the model.
    fn release(&mut self, model: &mut GraphModel, clock: &mut SimulationClock) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        model.unpin(&drag.node_id);
        clock.cool();
        tracing::debug!(node = %drag.node_id, "drag ended");
        true
    }

    /// Nearest node under a screen-space pointer.
    pub fn hit_test(&self, model: &GraphModel, pointer: Vec2) -> Option<String> {
        let point = self.viewport.to_model(pointer);
        let min_radius = MIN_HIT_RADIUS / self.viewport.scale;

        model
            .nodes
            .iter()
            .filter_map(|node| {
                let distance = (node.position - point).length();
                (distance <= node.size.max(min_radius)).then_some((node, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(node, _)| node.id.clone())
    }
}
