use eframe::egui::{Vec2, vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::NodeData;

// pi * (3 - sqrt(5))
const SPIRAL_ANGLE: f32 = 2.399_963_2;

/// Initial placement for nodes that arrive without coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScatterConfig {
    pub seed: u64,
    /// Spiral spacing; the n-th node sits at `radius * sqrt(n + 0.5)`.
    pub radius: f32,
    pub jitter: f32,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            radius: 10.0,
            jitter: 2.0,
        }
    }
}

pub(super) fn initial_positions(nodes: &[NodeData], config: &ScatterConfig) -> Vec<Vec2> {
    let mut rng = StdRng::seed_from_u64(config.seed);

    nodes
        .iter()
        .enumerate()
        .map(|(index, node)| {
            // Drawn for every node so a fixed coordinate never shifts the sequence.
            let jitter = vec2(rng.random_range(-1.0..=1.0), rng.random_range(-1.0..=1.0))
                * config.jitter.max(0.0);

            let angle = index as f32 * SPIRAL_ANGLE;
            let radius = config.radius * (index as f32 + 0.5).sqrt();
            let spiral = vec2(angle.cos(), angle.sin()) * radius + jitter;

            match (node.x, node.y) {
                (Some(x), Some(y)) => vec2(x, y),
                (x, y) => vec2(x.unwrap_or(spiral.x), y.unwrap_or(spiral.y)),
            }
        })
        .collect()
}
