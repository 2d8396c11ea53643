mod forces;
mod quadtree;

use eframe::egui::Vec2;
use serde::{Deserialize, Serialize};

use crate::graph::GraphModel;
use forces::{
    ChargeParams, CollisionParams, accumulate_center, accumulate_charge_for_node,
    accumulate_charge_pairs, accumulate_collision_direct, accumulate_collision_pairs,
    accumulate_links,
};
use quadtree::QuadNode;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LinkForce {
    /// Rest length of every edge.
    pub distance: f32,
    /// Scale each edge's strength by `weight / max_weight`.
    pub scale_by_weight: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChargeForce {
    /// Negative values repel.
    pub strength: f32,
    pub min_distance: f32,
    pub theta: f32,
    /// Graphs above this many nodes use the quadtree approximation.
    pub barnes_hut_threshold: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CenterForce {
    pub x: f32,
    pub y: f32,
    pub strength: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CollisionForce {
    pub radius_factor: f32,
    pub strength: f32,
}

/// Which forces run and how strong they are. `None` disables a force.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForceConfig {
    pub link: Option<LinkForce>,
    pub charge: Option<ChargeForce>,
    pub center: Option<CenterForce>,
    pub collision: Option<CollisionForce>,
    /// Fraction of velocity lost per step.
    pub velocity_decay: f32,
    /// Upper bound on a free node's displacement per step. `None` leaves it unbounded.
    pub max_velocity: Option<f32>,
}

impl Default for LinkForce {
    fn default() -> Self {
        Self {
            distance: 100.0,
            scale_by_weight: false,
        }
    }
}

impl Default for ChargeForce {
    fn default() -> Self {
        Self {
            strength: -400.0,
            min_distance: 1.0,
            theta: 0.9,
            barnes_hut_threshold: 256,
        }
    }
}

impl Default for CenterForce {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            strength: 0.1,
        }
    }
}

impl Default for CollisionForce {
    fn default() -> Self {
        Self {
            radius_factor: 3.0,
            strength: 1.0,
        }
    }
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            link: Some(LinkForce::default()),
            charge: Some(ChargeForce::default()),
            center: Some(CenterForce::default()),
            collision: Some(CollisionForce::default()),
            velocity_decay: 0.4,
            max_velocity: Some(40.0),
        }
    }
}

impl ForceConfig {
    pub fn none() -> Self {
        Self {
            link: None,
            charge: None,
            center: None,
            collision: None,
            velocity_decay: 0.4,
            max_velocity: Some(40.0),
        }
    }
}

#[derive(Default)]
struct PhysicsScratch {
    forces: Vec<Vec2>,
    positions: Vec<Vec2>,
    radii: Vec<f32>,
}

/// Advances a [`GraphModel`] by one integration step.
pub struct ForceSolver {
    config: ForceConfig,
    scratch: PhysicsScratch,
}

impl ForceSolver {
    pub fn new(config: ForceConfig) -> Self {
        Self {
            config,
            scratch: PhysicsScratch::default(),
        }
    }

    pub fn config(&self) -> &ForceConfig {
        &self.config
    }

    /// Forces run as link, charge, center, collision, then every free node integrates
    /// `v = (v + f) * (1 - velocity_decay); p += v`, with `|v|` clamped to `max_velocity`.
    /// Pinned nodes snap to their pin.
    pub fn step(&mut self, model: &mut GraphModel, alpha: f32) {
        let node_count = model.nodes.len();
        if node_count == 0 {
            return;
        }

        let scratch = &mut self.scratch;
        scratch.forces.clear();
        scratch.forces.resize(node_count, Vec2::ZERO);
        scratch.positions.clear();
        scratch.radii.clear();
        let radius_factor = self
            .config
            .collision
            .as_ref()
            .map_or(0.0, |collision| collision.radius_factor);
        let mut max_radius = 0.0_f32;
        for node in &model.nodes {
            scratch.positions.push(node.position);
            let radius = node.size * radius_factor;
            scratch.radii.push(radius);
            max_radius = max_radius.max(radius);
        }

        let forces = &mut scratch.forces;
        let positions = &scratch.positions;
        let radii = &scratch.radii;

        let use_tree = self
            .config
            .charge
            .as_ref()
            .is_some_and(|charge| node_count > charge.barnes_hut_threshold);
        let quadtree = if use_tree {
            QuadNode::build(positions)
        } else {
            None
        };

        if let Some(link) = &self.config.link {
            accumulate_links(&model.edges, &model.degree, positions, link, alpha, forces);
        }

        if let Some(charge) = &self.config.charge {
            let params = ChargeParams {
                strength: charge.strength * alpha,
                min_distance: charge.min_distance,
                theta: charge.theta,
            };
            if let Some(tree) = &quadtree {
                for (index, force) in forces.iter_mut().enumerate() {
                    accumulate_charge_for_node(tree, index, positions, params, force);
                }
            } else {
                accumulate_charge_pairs(positions, params, forces);
            }
        }

        if let Some(center) = &self.config.center {
            accumulate_center(positions, center, alpha, forces);
        }

        if let Some(collision) = &self.config.collision
            && max_radius > 0.0
        {
            let reach = max_radius * 2.0;
            let params = CollisionParams {
                strength: collision.strength * alpha,
                max_reach_sq: reach * reach,
            };
            if let Some(tree) = &quadtree {
                accumulate_collision_pairs(tree, tree, true, positions, radii, params, forces);
            } else {
                accumulate_collision_direct(positions, radii, params, forces);
            }
        }

        let retain = (1.0 - self.config.velocity_decay).clamp(0.0, 1.0);
        for (node, force) in model.nodes.iter_mut().zip(forces.iter()) {
            if let Some(pin) = node.pin {
                node.position = pin;
                node.velocity = Vec2::ZERO;
                continue;
            }

            node.velocity = (node.velocity + *force) * retain;
            if let Some(max_velocity) = self.config.max_velocity {
                let speed = node.velocity.length();
                if speed > max_velocity {
                    node.velocity *= max_velocity / speed;
                }
            }
            node.position += node.velocity;
        }
    }
}
