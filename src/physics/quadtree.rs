use eframe::egui::{Vec2, vec2};

const QUADTREE_LEAF_CAPACITY: usize = 8;
const QUADTREE_MAX_DEPTH: usize = 12;

#[derive(Clone, Copy, Debug)]
pub(super) struct QuadBounds {
    pub(super) center: Vec2,
    pub(super) half_extent: f32,
}

impl QuadBounds {
    fn from_points(points: &[Vec2]) -> Option<Self> {
        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);

        for point in points {
            min = min.min(*point);
            max = max.max(*point);
        }

        if !min.x.is_finite() || !min.y.is_finite() || !max.x.is_finite() || !max.y.is_finite() {
            return None;
        }

        let span = (max - min).max(vec2(1.0, 1.0));
        Some(Self {
            center: (min + max) * 0.5,
            half_extent: (span.max_elem() * 0.5) + 1.0,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        let offset = (point - self.center).abs();
        offset.x <= self.half_extent && offset.y <= self.half_extent
    }

    fn child(self, quadrant: usize) -> Self {
        let quarter = self.half_extent * 0.5;
        let offset = match quadrant {
            0 => vec2(-quarter, -quarter),
            1 => vec2(quarter, -quarter),
            2 => vec2(-quarter, quarter),
            _ => vec2(quarter, quarter),
        };

        Self {
            center: self.center + offset,
            half_extent: quarter,
        }
    }

    fn quadrant_for(self, point: Vec2) -> usize {
        match (point.x >= self.center.x, point.y >= self.center.y) {
            (false, false) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (true, true) => 3,
        }
    }

    pub(super) fn side_length(self) -> f32 {
        self.half_extent * 2.0
    }

    pub(super) fn distance_sq_to(self, other: Self) -> f32 {
        let reach = self.half_extent + other.half_extent;
        let gap = ((self.center - other.center).abs() - vec2(reach, reach)).max(Vec2::ZERO);
        gap.length_sq()
    }
}

/// Barnes–Hut cell; `mass` is the number of nodes below it.
pub(super) struct QuadNode {
    pub(super) bounds: QuadBounds,
    pub(super) center_of_mass: Vec2,
    pub(super) mass: f32,
    pub(super) indices: Vec<usize>,
    pub(super) children: [Option<Box<QuadNode>>; 4],
}

impl QuadNode {
    pub(super) fn build(positions: &[Vec2]) -> Option<Self> {
        let bounds = QuadBounds::from_points(positions)?;
        let indices = (0..positions.len()).collect::<Vec<_>>();
        Some(Self::build_node(bounds, indices, positions, 0))
    }

    fn build_node(
        bounds: QuadBounds,
        indices: Vec<usize>,
        positions: &[Vec2],
        depth: usize,
    ) -> Self {
        let mut center_of_mass = Vec2::ZERO;
        for &index in &indices {
            center_of_mass += positions[index];
        }

        let mass = indices.len() as f32;
        if mass > 0.0 {
            center_of_mass /= mass;
        }

        let mut node = Self {
            bounds,
            center_of_mass,
            mass,
            indices,
            children: std::array::from_fn(|_| None),
        };

        if depth >= QUADTREE_MAX_DEPTH || node.indices.len() <= QUADTREE_LEAF_CAPACITY {
            return node;
        }

        let mut buckets = std::array::from_fn::<_, 4, _>(|_| Vec::new());
        for &index in &node.indices {
            buckets[bounds.quadrant_for(positions[index])].push(index);
        }

        // Coincident points would otherwise recurse to max depth.
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() <= 1 {
            return node;
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }

            node.children[quadrant] = Some(Box::new(Self::build_node(
                bounds.child(quadrant),
                bucket,
                positions,
                depth + 1,
            )));
        }
        node.indices.clear();
        node
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_indices(node: &QuadNode, out: &mut Vec<usize>) {
        out.extend_from_slice(&node.indices);
        for child in node.children.iter().flatten() {
            leaf_indices(child, out);
        }
    }

    #[test]
    fn every_point_lands_in_exactly_one_leaf() {
        let positions = (0..200)
            .map(|index| {
                let angle = index as f32 * 0.37;
                vec2(angle.cos(), angle.sin()) * (index as f32)
            })
            .collect::<Vec<_>>();

        let tree = QuadNode::build(&positions).unwrap();
        assert_eq!(tree.mass, 200.0);
        assert!(!tree.is_leaf());

        let mut seen = Vec::new();
        leaf_indices(&tree, &mut seen);
        seen.sort_unstable();
        assert_eq!(seen, (0..200).collect::<Vec<_>>());
    }

    #[test]
    fn coincident_points_stay_in_one_leaf() {
        let positions = vec![Vec2::ZERO; 40];
        let tree = QuadNode::build(&positions).unwrap();
        assert!(tree.is_leaf());
        assert_eq!(tree.indices.len(), 40);
    }

    #[test]
    fn empty_input_builds_nothing() {
        assert!(QuadNode::build(&[]).is_none());
    }

    #[test]
    fn bounds_distance_is_zero_when_touching() {
        let a = QuadBounds {
            center: vec2(0.0, 0.0),
            half_extent: 1.0,
        };
        let b = QuadBounds {
            center: vec2(2.0, 0.0),
            half_extent: 1.0,
        };
        let c = QuadBounds {
            center: vec2(5.0, 0.0),
            half_extent: 1.0,
        };
        assert_eq!(a.distance_sq_to(b), 0.0);
        assert_eq!(a.distance_sq_to(c), 9.0);
        assert!(a.contains(vec2(1.0, -1.0)));
        assert!(!a.contains(vec2(1.5, 0.0)));
    }
}
