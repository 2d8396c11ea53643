use eframe::egui::{Vec2, vec2};
use serde::{Deserialize, Serialize};

/// Normalized pointer gesture. Pointer coordinates are screen space relative to the
/// center of the drawing surface, the same frame as [`super::Viewport`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum GestureEvent {
    /// Either an explicit screen delta, or a pointer position whose delta is taken
    /// from the previous pan event.
    Pan {
        #[serde(default)]
        delta_x: Option<f32>,
        #[serde(default)]
        delta_y: Option<f32>,
        #[serde(default)]
        pointer_x: Option<f32>,
        #[serde(default)]
        pointer_y: Option<f32>,
    },
    Zoom {
        pointer_x: f32,
        pointer_y: f32,
        delta_scale: f32,
    },
    DragStart {
        node_id: String,
        pointer_x: f32,
        pointer_y: f32,
    },
    DragMove {
        #[serde(default)]
        node_id: Option<String>,
        pointer_x: f32,
        pointer_y: f32,
    },
    DragEnd {
        #[serde(default)]
        node_id: Option<String>,
    },
    HoverEnter {
        node_id: String,
    },
    HoverExit {
        node_id: String,
    },
}

impl GestureEvent {
    pub fn pan(delta: Vec2) -> Self {
        Self::Pan {
            delta_x: Some(delta.x),
            delta_y: Some(delta.y),
            pointer_x: None,
            pointer_y: None,
        }
    }

    pub fn pan_to(pointer: Vec2) -> Self {
        Self::Pan {
            delta_x: None,
            delta_y: None,
            pointer_x: Some(pointer.x),
            pointer_y: Some(pointer.y),
        }
    }

    /// Explicit pan delta. Missing axes count as zero when the other axis is given.
    pub fn pan_delta(&self) -> Option<Vec2> {
        match self {
            Self::Pan {
                delta_x, delta_y, ..
            } if delta_x.is_some() || delta_y.is_some() => Some(vec2(
                delta_x.unwrap_or_default(),
                delta_y.unwrap_or_default(),
            )),
            _ => None,
        }
    }

    pub fn zoom(pointer: Vec2, delta_scale: f32) -> Self {
        Self::Zoom {
            pointer_x: pointer.x,
            pointer_y: pointer.y,
            delta_scale,
        }
    }

    pub fn drag_start(node_id: impl Into<String>, pointer: Vec2) -> Self {
        Self::DragStart {
            node_id: node_id.into(),
            pointer_x: pointer.x,
            pointer_y: pointer.y,
        }
    }

    pub fn drag_move(pointer: Vec2) -> Self {
        Self::DragMove {
            node_id: None,
            pointer_x: pointer.x,
            pointer_y: pointer.y,
        }
    }

    pub fn drag_end() -> Self {
        Self::DragEnd { node_id: None }
    }

    pub fn pointer(&self) -> Option<Vec2> {
        match self {
            Self::Zoom {
                pointer_x,
                pointer_y,
                ..
            }
            | Self::DragStart {
                pointer_x,
                pointer_y,
                ..
            }
            | Self::DragMove {
                pointer_x,
                pointer_y,
                ..
            } => Some(vec2(*pointer_x, *pointer_y)),
            Self::Pan {
                pointer_x: Some(x),
                pointer_y: Some(y),
                ..
            } => Some(vec2(*x, *y)),
            Self::Pan { .. }
            | Self::DragEnd { .. }
            | Self::HoverEnter { .. }
            | Self::HoverExit { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_camel_case_wire_shape() {
        let events: Vec<GestureEvent> = serde_json::from_str(
            r#"[
                {"kind": "dragStart", "nodeId": "n1", "pointerX": 4, "pointerY": -2},
                {"kind": "dragMove", "pointerX": 6, "pointerY": -2},
                {"kind": "dragEnd", "nodeId": "n1", "pointerX": 6, "pointerY": -2},
                {"kind": "zoom", "pointerX": 0, "pointerY": 0, "deltaScale": 1.1},
                {"kind": "hoverExit", "nodeId": "n1"}
            ]"#,
        )
        .unwrap();

        assert_eq!(events[0], GestureEvent::drag_start("n1", vec2(4.0, -2.0)));
        assert_eq!(events[1], GestureEvent::drag_move(vec2(6.0, -2.0)));
        assert_eq!(
            events[2],
            GestureEvent::DragEnd {
                node_id: Some("n1".into())
            }
        );
        assert_eq!(events[3], GestureEvent::zoom(Vec2::ZERO, 1.1));
        assert_eq!(events[3].pointer(), Some(Vec2::ZERO));
        assert_eq!(events[4].pointer(), None);
    }

    #[test]
    fn pan_accepts_delta_or_pointer() {
        let events: Vec<GestureEvent> = serde_json::from_str(
            r#"[
                {"kind": "pan", "deltaX": 3, "deltaY": -1},
                {"kind": "pan", "pointerX": 10, "pointerY": 5},
                {"kind": "pan", "deltaX": 2}
            ]"#,
        )
        .unwrap();

        assert_eq!(events[0], GestureEvent::pan(vec2(3.0, -1.0)));
        assert_eq!(events[0].pan_delta(), Some(vec2(3.0, -1.0)));
        assert_eq!(events[0].pointer(), None);

        assert_eq!(events[1], GestureEvent::pan_to(vec2(10.0, 5.0)));
        assert_eq!(events[1].pan_delta(), None);
        assert_eq!(events[1].pointer(), Some(vec2(10.0, 5.0)));

        assert_eq!(events[2].pan_delta(), Some(vec2(2.0, 0.0)));
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let parsed = serde_json::from_str::<GestureEvent>(r#"{"kind": "pinch"}"#);
        assert!(parsed.is_err());
    }
}
