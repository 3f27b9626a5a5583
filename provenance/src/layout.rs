use std::collections::{BTreeMap, HashSet};

use nalgebra::Vector2;

use crate::tree::{NodeId, Registry};

/// Spacing for the provenance graph. Generations are laid out left to right,
/// siblings top to bottom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    pub generation_spacing: f64,
    /// Vertical space shared by the children of the root. Every node hands its
    /// own slot down to its children, so subtrees never overlap.
    pub band_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            generation_spacing: 300.0,
            band_height: 600.0,
        }
    }
}

/// Computes graph coordinates for every node reachable from `root`. The root
/// sits at the origin and a node's `x` is its depth times the generation
/// spacing. Children split their parent's band into equal slots and sit in
/// the middle of theirs.
///
/// Missing nodes are skipped and each node is visited at most once.
pub fn compute_layout(
    registry: &Registry,
    root: NodeId,
    config: &LayoutConfig,
) -> BTreeMap<NodeId, Vector2<f64>> {
    let mut out = BTreeMap::new();
    let mut seen = HashSet::new();
    let mut stack = vec![(root, 0_usize, 0.0, config.band_height)];

    while let Some((id, depth, y, band)) = stack.pop() {
        let Some(node) = registry.get(id) else {
            continue;
        };
        if !seen.insert(id) {
            continue;
        }

        out.insert(id, Vector2::new(depth as f64 * config.generation_spacing, y));

        let children = node.children();
        let slot = band / children.len().max(1) as f64;
        let top = y - band / 2.0;

        for (i, child) in children.iter().enumerate().rev() {
            let child_y = top + slot * (i as f64 + 0.5);
            stack.push((*child, depth + 1, child_y, slot));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use common::plane::SplitPlane;
    use nalgebra::Vector3;

    use super::*;
    use crate::tree::PartDescriptor;

    fn split(registry: &mut Registry, id: NodeId) -> (NodeId, NodeId) {
        let part = |x: &str| PartDescriptor {
            external_ref: x.into(),
            url: None,
            volume: 1.0,
        };
        let plane = SplitPlane::new(Vector3::zeros(), Vector3::x(), "x");
        registry.propose_split_plane(id, plane).unwrap();
        registry.commit_split(id, part("a"), part("b")).unwrap()
    }

    #[test]
    fn single_root() {
        let mut registry = Registry::new();
        let root = registry.create_root("a", 1.0, "ender3");
        let layout = compute_layout(&registry, root, &LayoutConfig::default());

        assert_eq!(layout.len(), 1);
        assert_eq!(layout[&root], Vector2::zeros());
    }

    #[test]
    fn two_generations() {
        let mut registry = Registry::new();
        let root = registry.create_root("a", 1.0, "ender3");
        let (a, b) = split(&mut registry, root);
        let (aa, ab) = split(&mut registry, a);

        let config = LayoutConfig::default();
        let layout = compute_layout(&registry, root, &config);

        assert_eq!(layout.len(), 5);
        assert_eq!(layout[&a], Vector2::new(300.0, -150.0));
        assert_eq!(layout[&b], Vector2::new(300.0, 150.0));
        assert_eq!(layout[&aa], Vector2::new(600.0, -225.0));
        assert_eq!(layout[&ab], Vector2::new(600.0, -75.0));
    }

    #[test]
    fn deterministic_and_non_overlapping() {
        let mut registry = Registry::new();
        let root = registry.create_root("a", 1.0, "ender3");
        let (a, b) = split(&mut registry, root);
        split(&mut registry, a);
        split(&mut registry, b);

        let config = LayoutConfig::default();
        let first = compute_layout(&registry, root, &config);
        assert_eq!(first, compute_layout(&registry, root, &config));

        let mut ys = first
            .iter()
            .filter(|(_, pos)| pos.x == 600.0)
            .map(|(_, pos)| pos.y)
            .collect::<Vec<_>>();
        ys.sort_by(f64::total_cmp);
        assert_eq!(ys, vec![-225.0, -75.0, 75.0, 225.0]);
    }

    #[test]
    fn missing_root() {
        let mut registry = Registry::new();
        let old = registry.create_root("a", 1.0, "ender3");
        registry.create_root("b", 1.0, "ender3");

        assert!(compute_layout(&registry, old, &LayoutConfig::default()).is_empty());
    }
}
