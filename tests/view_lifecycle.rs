use std::cell::{Cell, RefCell};
use std::rc::Rc;

use eframe::egui::vec2;
use knowledge_graph_view::physics::CollisionForce;
use knowledge_graph_view::{
    ClockState, EdgeData, ForceConfig, FrameBuffer, GestureEvent, GestureOutcome, GraphData,
    GraphView, HoverEvent, InvalidGraphError, LayoutConfig, NodeData, RenderFrame, RenderSink,
};
use pretty_assertions::assert_eq;

#[derive(Default, Clone)]
struct Recorder {
    presented: Rc<Cell<u64>>,
    available: Rc<Cell<bool>>,
    hovers: Rc<RefCell<Vec<HoverEvent>>>,
}

struct RecordingSink(Recorder);

impl RenderSink for RecordingSink {
    fn surface_available(&self) -> bool {
        self.0.available.get()
    }

    fn present(&mut self, _frame: RenderFrame) {
        self.0.presented.set(self.0.presented.get() + 1);
    }

    fn hover(&mut self, event: HoverEvent) {
        self.0.hovers.borrow_mut().push(event);
    }
}

fn recorder() -> (Recorder, RecordingSink) {
    let recorder = Recorder::default();
    recorder.available.set(true);
    (recorder.clone(), RecordingSink(recorder))
}

fn pair_at_origin() -> GraphData {
    GraphData::from_json(
        r#"{
            "nodes": [{"id": "a", "x": 0, "y": 0}, {"id": "b", "x": 0, "y": 0}],
            "edges": [{"source": "a", "target": "b", "weight": 1}]
        }"#,
    )
    .unwrap()
}

fn distance<S: RenderSink>(view: &GraphView<S>, a: &str, b: &str) -> f32 {
    let model = view.model().unwrap();
    (model.position(a).unwrap() - model.position(b).unwrap()).length()
}

#[test]
fn linked_pair_converges_to_link_distance() {
    let mut view =
        GraphView::initialize(&pair_at_origin(), LayoutConfig::default(), FrameBuffer::default())
            .unwrap();

    for _ in 0..50 {
        assert!(view.on_frame());
    }
    let after_fifty = distance(&view, "a", "b");
    assert!((after_fifty - 100.0).abs() <= 5.0, "distance {after_fifty}");

    view.settle(10_000);
    assert_eq!(view.status().state, ClockState::Idle);
    let settled = distance(&view, "a", "b");
    assert!((settled - 100.0).abs() <= 5.0, "distance {settled}");
}

#[test]
fn overlapping_pair_separates_monotonically() {
    let config = LayoutConfig {
        forces: ForceConfig {
            collision: Some(CollisionForce::default()),
            ..ForceConfig::none()
        },
        ..LayoutConfig::default()
    };
    let data = GraphData {
        nodes: vec![NodeData::new("a").at(0.0, 0.0), NodeData::new("b").at(4.0, 0.0)],
        edges: vec![],
    };
    let mut view = GraphView::initialize(&data, config, FrameBuffer::default()).unwrap();
    let reach = 5.0 * 3.0 * 2.0;

    let mut previous = distance(&view, "a", "b");
    while previous < reach {
        assert!(view.on_frame(), "clock stopped at distance {previous}");
        let current = distance(&view, "a", "b");
        assert!(current > previous, "{current} <= {previous}");
        previous = current;
    }
}

#[test]
fn orphan_edge_is_rejected_and_self_loop_accepted() {
    let data = GraphData {
        nodes: vec![NodeData::new("a")],
        edges: vec![EdgeData::new("a", "a"), EdgeData::new("a", "b")],
    };
    let result = GraphView::initialize(&data, LayoutConfig::default(), FrameBuffer::default());
    assert!(matches!(result, Err(InvalidGraphError::UnknownEndpoint { ref id, .. }) if id == "b"));

    let data = GraphData {
        nodes: vec![NodeData::new("a")],
        edges: vec![EdgeData::new("a", "a")],
    };
    let view = GraphView::initialize(&data, LayoutConfig::default(), FrameBuffer::default()).unwrap();
    assert_eq!(view.model().unwrap().edge_count(), 1);
}

#[test]
fn destroy_twice_then_frames_do_nothing() {
    let (recorder, sink) = recorder();
    let mut view = GraphView::initialize(&pair_at_origin(), LayoutConfig::default(), sink).unwrap();
    view.on_frame();
    assert_eq!(recorder.presented.get(), 1);

    view.destroy();
    view.destroy();
    assert!(view.is_destroyed());
    assert!(!view.needs_frame());
    assert_eq!(Rc::strong_count(&recorder.presented), 1);

    assert!(!view.on_frame());
    assert_eq!(view.settle(100), 0);
    assert_eq!(recorder.presented.get(), 1);
    assert_eq!(view.status().state, ClockState::Idle);
    assert_eq!(
        view.handle_gesture(&GestureEvent::pan(vec2(10.0, 0.0))),
        GestureOutcome::Ignored
    );
    assert!(view.snapshot().is_none());

    view.reload(&pair_at_origin()).unwrap();
    assert!(view.is_destroyed());
}

#[test]
fn drag_of_node_removed_by_reload_leaves_model_alone() {
    let mut view =
        GraphView::initialize(&pair_at_origin(), LayoutConfig::default(), FrameBuffer::default())
            .unwrap();
    view.settle(10_000);

    let grab = view.viewport().to_screen(view.model().unwrap().position("a").unwrap());
    assert_eq!(
        view.handle_gesture(&GestureEvent::drag_start("a", grab)),
        GestureOutcome::NodePinned
    );

    let replacement = GraphData {
        nodes: vec![NodeData::new("c"), NodeData::new("d")],
        edges: vec![EdgeData::new("c", "d")],
    };
    view.reload(&replacement).unwrap();
    let before = view.snapshot();

    assert_eq!(
        view.handle_gesture(&GestureEvent::drag_move(grab + vec2(30.0, 0.0))),
        GestureOutcome::Ignored
    );
    view.handle_gesture(&GestureEvent::drag_end());
    assert_eq!(view.snapshot(), before);
    assert_eq!(view.dragging(), None);
}

#[test]
fn reload_keeps_drag_on_surviving_node_pinned_and_hot() {
    let mut view =
        GraphView::initialize(&pair_at_origin(), LayoutConfig::default(), FrameBuffer::default())
            .unwrap();
    view.settle(10_000);

    let grab = view.viewport().to_screen(view.model().unwrap().position("a").unwrap());
    view.handle_gesture(&GestureEvent::drag_start("a", grab));
    let target = grab + vec2(40.0, -25.0);
    view.handle_gesture(&GestureEvent::drag_move(target));
    let held = view.model().unwrap().position("a");

    view.reload(&pair_at_origin()).unwrap();
    assert_eq!(view.settle(500), 500);
    assert_eq!(view.status().state, ClockState::Running);
    assert_eq!(view.status().alpha, 0.3);
    assert_eq!(view.dragging(), Some("a"));
    assert_eq!(view.model().unwrap().position("a"), held);
    assert!(view.model().unwrap().node("a").unwrap().pinned);

    assert_eq!(
        view.handle_gesture(&GestureEvent::drag_end()),
        GestureOutcome::NodeReleased
    );
    assert!(view.settle(10_000) < 10_000);
    assert_eq!(view.status().state, ClockState::Idle);
}

#[test]
fn drag_reheats_and_release_lets_layout_settle() {
    let mut view =
        GraphView::initialize(&pair_at_origin(), LayoutConfig::default(), FrameBuffer::default())
            .unwrap();
    view.settle(10_000);
    assert!(!view.needs_frame());

    let grab = view.viewport().to_screen(view.model().unwrap().position("b").unwrap());
    view.handle_gesture(&GestureEvent::drag_start("b", grab));
    assert_eq!(view.status().state, ClockState::Running);

    let target = grab + vec2(0.0, 250.0);
    view.handle_gesture(&GestureEvent::drag_move(target));
    for _ in 0..20 {
        assert!(view.on_frame());
    }
    assert_eq!(view.model().unwrap().position("b"), Some(target));
    assert!(view.status().alpha >= 0.3);

    view.handle_gesture(&GestureEvent::drag_end());
    assert_eq!(view.status().state, ClockState::Settling);
    view.settle(10_000);
    assert_eq!(view.status().state, ClockState::Idle);
    assert!(!view.model().unwrap().node("b").unwrap().pinned);
}

#[test]
fn hover_is_forwarded_to_sink() {
    let (recorder, sink) = recorder();
    let mut view = GraphView::initialize(&pair_at_origin(), LayoutConfig::default(), sink).unwrap();

    view.handle_gesture(&GestureEvent::HoverEnter {
        node_id: "a".into(),
    });
    view.handle_gesture(&GestureEvent::HoverExit {
        node_id: "a".into(),
    });

    let hovers = recorder.hovers.borrow();
    assert_eq!(hovers.len(), 2);
    assert!(matches!(&hovers[0], HoverEvent::Enter(node) if node.id == "a"));
    assert_eq!(hovers[1], HoverEvent::Exit { id: "a".into() });
}

#[test]
fn unavailable_surface_skips_frames_but_keeps_ticking() {
    let (recorder, sink) = recorder();
    recorder.available.set(false);
    let mut view = GraphView::initialize(&pair_at_origin(), LayoutConfig::default(), sink).unwrap();

    assert!(view.on_frame());
    assert!(view.on_frame());
    assert_eq!(recorder.presented.get(), 0);
    assert_eq!(view.status().ticks, 2);

    recorder.available.set(true);
    view.on_frame();
    assert_eq!(recorder.presented.get(), 1);
}
