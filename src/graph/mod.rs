mod data;
mod error;
mod placement;

use std::collections::HashMap;

use eframe::egui::Vec2;
use serde::Serialize;

pub use data::{EdgeData, GraphData, NodeData};
pub use error::{Endpoint, InvalidGraphError};
pub use placement::ScatterConfig;

pub const DEFAULT_NODE_SIZE: f32 = 5.0;
pub const DEFAULT_EDGE_WEIGHT: f32 = 1.0;

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) id: String,
    pub(crate) label: String,
    pub(crate) kind: Option<String>,
    pub(crate) size: f32,
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) pin: Option<Vec2>,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Edge {
    pub(crate) source: usize,
    pub(crate) target: usize,
    pub(crate) weight: f32,
}

/// Nodes, edges and all kinematic state of one loaded graph.
///
/// Edges hold node indices resolved once in [`GraphModel::build`].
#[derive(Clone, Debug)]
pub struct GraphModel {
    pub(crate) nodes: Vec<Node>,
    pub(crate) edges: Vec<Edge>,
    /// Non-loop edge count per node, used to bias the link force.
    pub(crate) degree: Vec<usize>,
    index_by_id: HashMap<String, usize>,
}

/// Read-only copy of a node handed to renderers and hover collaborators.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeView {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub size: f32,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub pinned: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeView {
    pub source_id: String,
    pub target_id: String,
    pub weight: f32,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
}

impl GraphModel {
    pub fn build(
        nodes: &[NodeData],
        edges: &[EdgeData],
        scatter: &ScatterConfig,
    ) -> Result<Self, InvalidGraphError> {
        let mut index_by_id = HashMap::with_capacity(nodes.len());
        for (index, node) in nodes.iter().enumerate() {
            if index_by_id.insert(node.id.clone(), index).is_some() {
                return Err(InvalidGraphError::DuplicateNode {
                    id: node.id.clone(),
                });
            }

            if let Some(size) = node.size
                && !(size.is_finite() && size >= 0.0)
            {
                return Err(InvalidGraphError::InvalidSize {
                    id: node.id.clone(),
                    size,
                });
            }

            if node.x.is_some_and(|x| !x.is_finite()) || node.y.is_some_and(|y| !y.is_finite()) {
                return Err(InvalidGraphError::NonFinitePosition {
                    id: node.id.clone(),
                });
            }
        }

        let mut resolved = Vec::with_capacity(edges.len());
        let mut degree = vec![0usize; nodes.len()];
        for (edge_index, edge) in edges.iter().enumerate() {
            let resolve = |id: &str, endpoint| {
                index_by_id
                    .get(id)
                    .copied()
                    .ok_or_else(|| InvalidGraphError::UnknownEndpoint {
                        edge: edge_index,
                        endpoint,
                        id: id.to_owned(),
                    })
            };
            let source = resolve(&edge.source, Endpoint::Source)?;
            let target = resolve(&edge.target, Endpoint::Target)?;

            let weight = edge.weight.unwrap_or(DEFAULT_EDGE_WEIGHT);
            if !(weight.is_finite() && weight >= 0.0) {
                return Err(InvalidGraphError::InvalidWeight {
                    edge: edge_index,
                    weight,
                });
            }

            if source != target {
                degree[source] += 1;
                degree[target] += 1;
            }
            resolved.push(Edge {
                source,
                target,
                weight,
            });
        }

        let positions = placement::initial_positions(nodes, scatter);
        let nodes = nodes
            .iter()
            .zip(positions)
            .map(|(node, position)| Node {
                id: node.id.clone(),
                label: node.label.clone().unwrap_or_else(|| node.id.clone()),
                kind: node.kind.clone(),
                size: node.size.unwrap_or(DEFAULT_NODE_SIZE),
                position,
                velocity: Vec2::ZERO,
                pin: None,
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            nodes = nodes.len(),
            edges = resolved.len(),
            "graph model built"
        );

        Ok(Self {
            nodes,
            edges: resolved,
            degree,
            index_by_id,
        })
    }

    pub fn from_data(data: &GraphData, scatter: &ScatterConfig) -> Result<Self, InvalidGraphError> {
        Self::build(&data.nodes, &data.edges, scatter)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_by_id.contains_key(id)
    }

    pub(crate) fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn position(&self, id: &str) -> Option<Vec2> {
        self.index_of(id).map(|index| self.nodes[index].position)
    }

    pub fn pin_of(&self, id: &str) -> Option<Vec2> {
        self.index_of(id).and_then(|index| self.nodes[index].pin)
    }

    /// Fixes a node at `position`. Unknown ids are ignored; returns whether a node was pinned.
    pub fn pin(&mut self, id: &str, position: Vec2) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let node = &mut self.nodes[index];
        node.pin = Some(position);
        node.position = position;
        node.velocity = Vec2::ZERO;
        true
    }

    pub fn unpin(&mut self, id: &str) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.nodes[index].pin.take().is_some()
    }

    pub fn node(&self, id: &str) -> Option<NodeView> {
        self.index_of(id).map(|index| Self::view_of(&self.nodes[index]))
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        let nodes = self.nodes.iter().map(Self::view_of).collect();
        let edges = self
            .edges
            .iter()
            .map(|edge| {
                let from = &self.nodes[edge.source];
                let to = &self.nodes[edge.target];
                EdgeView {
                    source_id: from.id.clone(),
                    target_id: to.id.clone(),
                    weight: edge.weight,
                    x1: from.position.x,
                    y1: from.position.y,
                    x2: to.position.x,
                    y2: to.position.y,
                }
            })
            .collect();

        GraphSnapshot { nodes, edges }
    }

    fn view_of(node: &Node) -> NodeView {
        NodeView {
            id: node.id.clone(),
            label: node.label.clone(),
            kind: node.kind.clone(),
            size: node.size,
            x: node.position.x,
            y: node.position.y,
            vx: node.velocity.x,
            vy: node.velocity.y,
            pinned: node.pin.is_some(),
        }
    }
}
