use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;
use super::{CenterForce, LinkForce};
use crate::graph::Edge;

const COINCIDENT_EPSILON: f32 = 0.0001;

/// Unit vector pointing from `to` toward `from`, plus the distance between them.
///
/// Coincident pairs get an axis derived from their indices, negated when the pair is
/// swapped, so both sides of the pair are pushed apart consistently.
pub(super) fn separation(delta: Vec2, from: usize, to: usize) -> (Vec2, f32) {
    let distance = delta.length();
    if distance > COINCIDENT_EPSILON {
        return (delta / distance, distance);
    }

    let (low, high) = if from < to { (from, to) } else { (to, from) };
    let angle = ((low as f32) * 0.618_034 + (high as f32) * 0.414_214) * TAU;
    let axis = vec2(angle.cos(), angle.sin());
    (if from < to { axis } else { -axis }, distance)
}

#[derive(Clone, Copy)]
pub(super) struct ChargeParams {
    /// Configured strength already multiplied by alpha.
    pub(super) strength: f32,
    pub(super) min_distance: f32,
    pub(super) theta: f32,
}

impl ChargeParams {
    fn magnitude(self, distance: f32, mass: f32) -> f32 {
        let distance = distance.max(self.min_distance);
        -self.strength * mass / (distance * distance)
    }
}

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    /// Configured strength already multiplied by alpha.
    pub(super) strength: f32,
    pub(super) max_reach_sq: f32,
}

pub(super) fn accumulate_links(
    edges: &[Edge],
    degree: &[usize],
    positions: &[Vec2],
    link: &LinkForce,
    alpha: f32,
    forces: &mut [Vec2],
) {
    let max_weight = if link.scale_by_weight {
        edges
            .iter()
            .map(|edge| edge.weight)
            .fold(0.0_f32, f32::max)
    } else {
        0.0
    };

    for edge in edges {
        if edge.source == edge.target {
            continue;
        }

        let (direction, distance) = separation(
            positions[edge.target] - positions[edge.source],
            edge.target,
            edge.source,
        );

        let source_degree = degree[edge.source].max(1) as f32;
        let target_degree = degree[edge.target].max(1) as f32;
        let mut strength = 1.0 / source_degree.min(target_degree);
        if link.scale_by_weight && max_weight > 0.0 {
            strength *= edge.weight / max_weight;
        }
        let bias = source_degree / (source_degree + target_degree);

        let stretch = direction * ((distance - link.distance) * alpha * strength);
        forces[edge.target] -= stretch * bias;
        forces[edge.source] += stretch * (1.0 - bias);
    }
}

pub(super) fn accumulate_charge_pairs(
    positions: &[Vec2],
    params: ChargeParams,
    forces: &mut [Vec2],
) {
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            let (direction, distance) = separation(positions[i] - positions[j], i, j);
            let push = direction * params.magnitude(distance, 1.0);
            forces[i] += push;
            forces[j] -= push;
        }
    }
}

pub(super) fn accumulate_charge_for_node(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    params: ChargeParams,
    force: &mut Vec2,
) {
    if node.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other_index in &node.indices {
            if other_index == index {
                continue;
            }
            let (direction, distance) =
                separation(point - positions[other_index], index, other_index);
            *force += direction * params.magnitude(distance, 1.0);
        }
        return;
    }

    let delta = point - node.center_of_mass;
    let distance = delta.length().max(COINCIDENT_EPSILON);
    let can_approximate = !node.bounds.contains(point)
        && ((node.bounds.side_length() / distance) < params.theta)
        && node.mass > 1.0;

    if can_approximate {
        *force += (delta / distance) * params.magnitude(distance, node.mass);
        return;
    }

    for child in node.children.iter().flatten() {
        accumulate_charge_for_node(child, index, positions, params, force);
    }
}

pub(super) fn accumulate_center(
    positions: &[Vec2],
    center: &CenterForce,
    alpha: f32,
    forces: &mut [Vec2],
) {
    if positions.is_empty() {
        return;
    }

    let centroid = positions.iter().fold(Vec2::ZERO, |sum, point| sum + *point)
        / positions.len() as f32;
    let pull = (vec2(center.x, center.y) - centroid) * (center.strength * alpha);
    for force in forces.iter_mut() {
        *force += pull;
    }
}

fn collide(
    from: usize,
    to: usize,
    positions: &[Vec2],
    radii: &[f32],
    strength: f32,
    forces: &mut [Vec2],
) {
    let reach = radii[from] + radii[to];
    let delta = positions[from] - positions[to];
    if delta.length_sq() >= reach * reach {
        return;
    }

    let (direction, distance) = separation(delta, from, to);
    let push = direction * ((reach - distance) * 0.5 * strength);
    forces[from] += push;
    forces[to] -= push;
}

pub(super) fn accumulate_collision_direct(
    positions: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    forces: &mut [Vec2],
) {
    for from in 0..positions.len() {
        for to in (from + 1)..positions.len() {
            collide(from, to, positions, radii, params.strength, forces);
        }
    }
}

pub(super) fn accumulate_collision_pairs(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    positions: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    forces: &mut [Vec2],
) {
    if node_a.bounds.distance_sq_to(node_b.bounds) > params.max_reach_sq {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for (offset, &from) in node_a.indices.iter().enumerate() {
                for &to in &node_a.indices[offset + 1..] {
                    collide(from, to, positions, radii, params.strength, forces);
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    collide(from, to, positions, radii, params.strength, forces);
                }
            }
        }
        return;
    }

    if same_node {
        for first in 0..4 {
            let Some(child_a) = node_a.children[first].as_ref() else {
                continue;
            };

            accumulate_collision_pairs(child_a, child_a, true, positions, radii, params, forces);

            for second in (first + 1)..4 {
                let Some(child_b) = node_a.children[second].as_ref() else {
                    continue;
                };
                accumulate_collision_pairs(
                    child_a, child_b, false, positions, radii, params, forces,
                );
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.half_extent >= node_b.bounds.half_extent
    };

    if split_a {
        for child in node_a.children.iter().flatten() {
            accumulate_collision_pairs(child, node_b, false, positions, radii, params, forces);
        }
    } else {
        for child in node_b.children.iter().flatten() {
            accumulate_collision_pairs(node_a, child, false, positions, radii, params, forces);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coincident_axis_is_antisymmetric() {
        let (forward, distance) = separation(Vec2::ZERO, 2, 7);
        let (backward, _) = separation(Vec2::ZERO, 7, 2);
        assert_eq!(distance, 0.0);
        assert!((forward + backward).length() < 1e-6);
        assert!((forward.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn charge_floor_bounds_the_push() {
        let params = ChargeParams {
            strength: -400.0,
            min_distance: 1.0,
            theta: 0.9,
        };
        assert_eq!(params.magnitude(0.0, 1.0), 400.0);
        assert_eq!(params.magnitude(10.0, 1.0), 4.0);
        assert_eq!(params.magnitude(10.0, 3.0), 12.0);
    }

    #[test]
    fn barnes_hut_matches_pairwise_for_small_clusters() {
        let positions = (0..60)
            .map(|index| {
                let angle = index as f32 * 0.9;
                vec2(angle.cos(), angle.sin()) * (20.0 + index as f32 * 3.0)
            })
            .collect::<Vec<_>>();
        let params = ChargeParams {
            strength: -400.0,
            min_distance: 1.0,
            theta: 0.0,
        };

        let mut exact = vec![Vec2::ZERO; positions.len()];
        accumulate_charge_pairs(&positions, params, &mut exact);

        let tree = QuadNode::build(&positions).unwrap();
        for (index, expected) in exact.iter().enumerate() {
            let mut force = Vec2::ZERO;
            accumulate_charge_for_node(&tree, index, &positions, params, &mut force);
            assert!((force - *expected).length() < 1e-3 * (1.0 + expected.length()));
        }
    }

    #[test]
    fn tree_collision_matches_direct() {
        let positions = (0..80)
            .map(|index| vec2((index % 9) as f32 * 7.0, (index / 9) as f32 * 7.0))
            .collect::<Vec<_>>();
        let radii = vec![5.0; positions.len()];
        let params = CollisionParams {
            strength: 1.0,
            max_reach_sq: 100.0,
        };

        let mut direct = vec![Vec2::ZERO; positions.len()];
        accumulate_collision_direct(&positions, &radii, params, &mut direct);

        let mut tree_forces = vec![Vec2::ZERO; positions.len()];
        let tree = QuadNode::build(&positions).unwrap();
        accumulate_collision_pairs(&tree, &tree, true, &positions, &radii, params, &mut tree_forces);

        for (a, b) in direct.iter().zip(&tree_forces) {
            assert!((*a - *b).length() < 1e-3);
        }
    }
}
