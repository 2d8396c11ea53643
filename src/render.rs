use serde::Serialize;

use crate::clock::{ClockState, SimulationClock};
use crate::graph::{EdgeView, GraphModel, NodeView};
use crate::interaction::Viewport;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationStatus {
    pub state: ClockState,
    pub alpha: f64,
    pub ticks: u64,
}

impl From<&SimulationClock> for SimulationStatus {
    fn from(clock: &SimulationClock) -> Self {
        Self {
            state: clock.state(),
            alpha: clock.alpha(),
            ticks: clock.ticks(),
        }
    }
}

/// Everything a display layer needs to draw one frame. Owned copies only.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderFrame {
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
    pub viewport: Viewport,
    pub status: SimulationStatus,
}

#[derive(Clone, Debug, PartialEq)]
pub enum HoverEvent {
    Enter(NodeView),
    Exit { id: String },
}

/// Display-side boundary of the engine.
pub trait RenderSink {
    /// `false` when the drawing surface is gone; the frame is skipped.
    fn surface_available(&self) -> bool {
        true
    }

    fn present(&mut self, frame: RenderFrame);

    fn hover(&mut self, _event: HoverEvent) {}
}

pub(crate) struct RenderBridge<S> {
    sink: S,
    presented: u64,
    skipped: u64,
}

impl<S: RenderSink> RenderBridge<S> {
    pub(crate) fn new(sink: S) -> Self {
        Self {
            sink,
            presented: 0,
            skipped: 0,
        }
    }

    pub(crate) fn sink(&self) -> &S {
        &self.sink
    }

    pub(crate) fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub(crate) fn presented(&self) -> u64 {
        self.presented
    }

    pub(crate) fn skipped(&self) -> u64 {
        self.skipped
    }

    pub(crate) fn render(
        &mut self,
        model: &GraphModel,
        viewport: Viewport,
        status: SimulationStatus,
    ) -> bool {
        if !self.sink.surface_available() {
            self.skipped += 1;
            tracing::trace!(skipped = self.skipped, "drawing surface unavailable, frame skipped");
            return false;
        }

        let snapshot = model.snapshot();
        self.sink.present(RenderFrame {
            nodes: snapshot.nodes,
            edges: snapshot.edges,
            viewport,
            status,
        });
        self.presented += 1;
        true
    }

    pub(crate) fn hover(&mut self, event: HoverEvent) {
        self.sink.hover(event);
    }
}

/// Sink that keeps the most recent frame and hovered node for a host to paint.
#[derive(Debug)]
pub struct FrameBuffer {
    latest: Option<RenderFrame>,
    hovered: Option<NodeView>,
    available: bool,
    frames: u64,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self {
            latest: None,
            hovered: None,
            available: true,
            frames: 0,
        }
    }
}

impl FrameBuffer {
    pub fn latest(&self) -> Option<&RenderFrame> {
        self.latest.as_ref()
    }

    pub fn hovered(&self) -> Option<&NodeView> {
        self.hovered.as_ref()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }
}

impl RenderSink for FrameBuffer {
    fn surface_available(&self) -> bool {
        self.available
    }

    fn present(&mut self, frame: RenderFrame) {
        self.latest = Some(frame);
        self.frames += 1;
    }

    fn hover(&mut self, event: HoverEvent) {
        match event {
            HoverEvent::Enter(node) => self.hovered = Some(node),
            HoverEvent::Exit { id } => {
                if self.hovered.as_ref().is_some_and(|node| node.id == id) {
                    self.hovered = None;
                }
            }
        }
    }
}
