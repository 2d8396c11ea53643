//! Force-directed layout and pointer interaction for a knowledge graph.
//!
//! [`GraphView`] ties the pieces together: a [`GraphModel`] of positioned nodes, a
//! [`ForceSolver`] stepping it, a [`SimulationClock`] deciding when to step, an
//! [`InteractionController`] for pan, zoom and drag, and a [`RenderSink`] that receives
//! a [`RenderFrame`] whenever something changed.

pub mod clock;
pub mod config;
pub mod graph;
pub mod interaction;
pub mod physics;
pub mod render;
pub mod view;

pub use clock::{ClockConfig, ClockState, SimulationClock};
pub use config::{ConfigError, LayoutConfig};
pub use graph::{
    EdgeData, EdgeView, GraphData, GraphModel, GraphSnapshot, InvalidGraphError, NodeData,
    NodeView,
};
pub use interaction::{GestureEvent, GestureOutcome, InteractionController, Viewport};
pub use physics::{ForceConfig, ForceSolver};
pub use render::{FrameBuffer, HoverEvent, RenderFrame, RenderSink, SimulationStatus};
pub use view::GraphView;
