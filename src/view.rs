use eframe::egui::Vec2;

use crate::clock::SimulationClock;
use crate::config::LayoutConfig;
use crate::graph::{GraphData, GraphModel, GraphSnapshot, InvalidGraphError};
use crate::interaction::{GestureEvent, GestureOutcome, InteractionController, Viewport};
use crate::physics::ForceSolver;
use crate::render::{RenderBridge, RenderSink, SimulationStatus};

/// A running knowledge-graph layout bound to one render sink.
///
/// Created by [`GraphView::initialize`]; driven by the host calling [`GraphView::on_frame`]
/// once per display frame and feeding pointer gestures to [`GraphView::handle_gesture`].
/// [`GraphView::destroy`] stops the clock and drops the model and the sink.
pub struct GraphView<S> {
    config: LayoutConfig,
    model: Option<GraphModel>,
    solver: ForceSolver,
    clock: SimulationClock,
    controller: InteractionController,
    bridge: Option<RenderBridge<S>>,
    redraw: bool,
}

impl<S: RenderSink> GraphView<S> {
    pub fn initialize(
        data: &GraphData,
        config: LayoutConfig,
        sink: S,
    ) -> Result<Self, InvalidGraphError> {
        let model = GraphModel::from_data(data, &config.scatter)?;
        tracing::info!(
            nodes = model.node_count(),
            edges = model.edge_count(),
            "knowledge graph initialized"
        );

        let mut clock = SimulationClock::new(config.clock.clone());
        clock.start();

        Ok(Self {
            solver: ForceSolver::new(config.forces.clone()),
            controller: InteractionController::new(config.viewport.clone()),
            clock,
            model: Some(model),
            bridge: Some(RenderBridge::new(sink)),
            redraw: true,
            config,
        })
    }

    /// Replaces the graph while keeping the viewport and sink. A failed build leaves the
    /// current graph untouched. Does nothing after [`Self::destroy`].
    pub fn reload(&mut self, data: &GraphData) -> Result<(), InvalidGraphError> {
        if self.is_destroyed() {
            tracing::debug!("reload ignored on destroyed view");
            return Ok(());
        }

        let model = GraphModel::from_data(data, &self.config.scatter)?;
        tracing::info!(
            nodes = model.node_count(),
            edges = model.edge_count(),
            "knowledge graph reloaded"
        );
        let model = self.model.insert(model);
        self.clock.start();
        self.controller.rebind(model, &mut self.clock);
        self.redraw = true;
        Ok(())
    }

    /// Runs the scheduled tick, if any, then renders. Returns whether a tick ran.
    pub fn on_frame(&mut self) -> bool {
        let (Some(model), Some(bridge)) = (self.model.as_mut(), self.bridge.as_mut()) else {
            return false;
        };

        let ticked = self.clock.tick(&mut self.solver, model);
        if ticked || self.redraw {
            let status = SimulationStatus::from(&self.clock);
            self.redraw = !bridge.render(model, self.controller.viewport(), status);
        }
        ticked
    }

    pub fn handle_gesture(&mut self, event: &GestureEvent) -> GestureOutcome {
        let Some(model) = self.model.as_mut() else {
            return GestureOutcome::Ignored;
        };

        let outcome = self.controller.handle(event, model, &mut self.clock);
        match &outcome {
            GestureOutcome::ViewportChanged => self.redraw = true,
            GestureOutcome::Hover(hover) => {
                if let Some(bridge) = self.bridge.as_mut() {
                    bridge.hover(hover.clone());
                }
            }
            GestureOutcome::NodePinned | GestureOutcome::NodeReleased => self.redraw = true,
            GestureOutcome::Ignored => {}
        }
        outcome
    }

    /// Restarts the layout from the current positions at full temperature.
    pub fn restart(&mut self) {
        if self.model.is_some() {
            self.clock.start();
        }
    }

    pub fn reset_viewport(&mut self) {
        self.controller.reset_viewport();
        self.redraw = true;
    }

    /// Ticks until the clock goes idle or `max_ticks` run. Returns the ticks run.
    pub fn settle(&mut self, max_ticks: u64) -> u64 {
        let mut ran = 0;
        while ran < max_ticks && self.on_frame() {
            ran += 1;
        }
        ran
    }

    pub fn destroy(&mut self) {
        self.clock.stop();
        self.controller.clear();
        if self.model.take().is_some()
            && let Some(bridge) = self.bridge.take()
        {
            tracing::info!(
                presented = bridge.presented(),
                skipped = bridge.skipped(),
                "knowledge graph destroyed"
            );
        }
        self.redraw = false;
    }

    pub fn is_destroyed(&self) -> bool {
        self.model.is_none()
    }

    /// Whether the host should keep requesting frames.
    pub fn needs_frame(&self) -> bool {
        !self.is_destroyed() && (self.clock.is_scheduled() || self.redraw)
    }

    pub fn hit_test(&self, pointer: Vec2) -> Option<String> {
        self.model
            .as_ref()
            .and_then(|model| self.controller.hit_test(model, pointer))
    }

    pub fn dragging(&self) -> Option<&str> {
        self.controller.dragging()
    }

    pub fn hovered(&self) -> Option<&str> {
        self.controller.hovered()
    }

    pub fn snapshot(&self) -> Option<GraphSnapshot> {
        self.model.as_ref().map(GraphModel::snapshot)
    }

    pub fn model(&self) -> Option<&GraphModel> {
        self.model.as_ref()
    }

    pub fn viewport(&self) -> Viewport {
        self.controller.viewport()
    }

    pub fn status(&self) -> SimulationStatus {
        SimulationStatus::from(&self.clock)
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn sink(&self) -> Option<&S> {
        self.bridge.as_ref().map(RenderBridge::sink)
    }

    pub fn sink_mut(&mut self) -> Option<&mut S> {
        self.bridge.as_mut().map(RenderBridge::sink_mut)
    }
}

impl<S> Drop for GraphView<S> {
    fn drop(&mut self) {
        if self.model.is_some() {
            tracing::debug!("knowledge graph dropped without destroy");
        }
    }
}
