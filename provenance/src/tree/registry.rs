use std::collections::{BTreeMap, HashSet};

use common::{catalog::BASELINE_MATERIAL, plane::SplitPlane, report::FailureReport};
use tracing::{debug, info};

use crate::{
    error::TreeError,
    tree::{MeshNode, NodeId, NodeKind, PartDescriptor},
};

pub const DEFAULT_INFILL: u8 = 20;

/// Owns every node of one provenance tree. All mutation goes through the
/// methods here so the parent / child links can not drift apart.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    nodes: BTreeMap<NodeId, MeshNode>,
    root: Option<NodeId>,
    next_id: u32,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new tree from a freshly loaded model. A registry only ever
    /// holds one tree, so any previous history is dropped.
    pub fn create_root(&mut self, name: impl Into<String>, volume: f64, printer: &str) -> NodeId {
        if let Some(old) = self.root {
            info!("Replacing tree rooted at {old} ({} nodes)", self.nodes.len());
            self.nodes.clear();
        }

        let id = self.allocate_id();
        let node = MeshNode {
            id,
            kind: NodeKind::Origin,
            children: None,

            name: name.into(),
            external_ref: String::new(),
            geometry_url: None,
            volume: sanitize_volume(volume),

            printer_id: printer.into(),
            material_id: BASELINE_MATERIAL.into(),
            infill: DEFAULT_INFILL,

            split_plane: None,
            failure_report: None,
        };

        self.nodes.insert(id, node);
        self.root = Some(id);
        id
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&MeshNode> {
        self.nodes.get(&id)
    }

    pub fn node(&self, id: NodeId) -> Result<&MeshNode, TreeError> {
        self.nodes.get(&id).ok_or(TreeError::NotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut MeshNode, TreeError> {
        self.nodes.get_mut(&id).ok_or(TreeError::NotFound(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates nodes in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &MeshNode> {
        self.nodes.values()
    }

    pub fn set_material(&mut self, id: NodeId, material: &str) -> Result<(), TreeError> {
        self.node_mut(id)?.material_id = material.into();
        Ok(())
    }

    /// Sets the infill percentage, clamping it into `0..=100`.
    pub fn set_infill(&mut self, id: NodeId, percent: i32) -> Result<(), TreeError> {
        self.node_mut(id)?.infill = percent.clamp(0, 100) as u8;
        Ok(())
    }

    /// Changes the assigned printer. A pending split plane was computed for the
    /// old bed and is always dropped.
    pub fn set_printer(&mut self, id: NodeId, printer: &str) -> Result<(), TreeError> {
        let node = self.node_mut(id)?;
        node.printer_id = printer.into();
        if node.split_plane.take().is_some() {
            debug!("Cleared split plane of {id} after printer change");
        }
        Ok(())
    }

    /// Records the identifier the split service knows this node's geometry by.
    pub fn set_external_ref(&mut self, id: NodeId, external: &str) -> Result<(), TreeError> {
        self.node_mut(id)?.external_ref = external.into();
        Ok(())
    }

    pub fn set_geometry_url(&mut self, id: NodeId, url: Option<String>) -> Result<(), TreeError> {
        self.node_mut(id)?.geometry_url = url;
        Ok(())
    }

    pub fn propose_split_plane(&mut self, id: NodeId, plane: SplitPlane) -> Result<(), TreeError> {
        let node = self.node_mut(id)?;
        if node.is_closed() {
            return Err(TreeError::Conflict {
                node: id,
                reason: "node has already been split",
            });
        }

        node.split_plane = Some(plane);
        Ok(())
    }

    pub fn clear_split_plane(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.node_mut(id)?.split_plane = None;
        Ok(())
    }

    pub fn set_failure_report(
        &mut self,
        id: NodeId,
        report: Option<FailureReport>,
    ) -> Result<(), TreeError> {
        self.node_mut(id)?.failure_report = report;
        Ok(())
    }

    /// Splits a node with a pending plane into two parts. Every check happens
    /// before anything is written, so the commit either applies entirely or
    /// not at all.
    pub fn commit_split(
        &mut self,
        id: NodeId,
        part_a: PartDescriptor,
        part_b: PartDescriptor,
    ) -> Result<(NodeId, NodeId), TreeError> {
        let parent = self.node(id)?;
        if parent.is_closed() {
            return Err(TreeError::Precondition {
                node: id,
                reason: "node has already been split",
            });
        }
        if parent.split_plane.is_none() {
            return Err(TreeError::Precondition {
                node: id,
                reason: "no split plane has been proposed",
            });
        }

        let template = parent.clone();
        let (a, b) = (self.allocate_id(), self.allocate_id());
        let part = |id: NodeId, suffix: char, desc: PartDescriptor| MeshNode {
            id,
            kind: NodeKind::Part { parent: template.id },
            children: None,

            name: format!("{} {suffix}", template.name),
            external_ref: desc.external_ref,
            geometry_url: desc.url,
            volume: sanitize_volume(desc.volume),

            printer_id: template.printer_id.clone(),
            material_id: template.material_id.clone(),
            infill: template.infill,

            split_plane: None,
            failure_report: None,
        };

        let (node_a, node_b) = (part(a, 'A', part_a), part(b, 'B', part_b));
        self.nodes.insert(a, node_a);
        self.nodes.insert(b, node_b);

        let parent = self.node_mut(id)?;
        parent.children = Some([a, b]);
        parent.split_plane = None;

        info!("Split {id} into {a} and {b}");
        debug_assert!(self.is_consistent());
        Ok((a, b))
    }

    /// Depth of a node below the root, or None if it is unreachable.
    pub fn depth(&self, id: NodeId) -> Option<usize> {
        self.contains(id).then(|| self.ancestors(id).len())
    }

    /// Walks up from a node to the root, nearest ancestor first. Stops early on
    /// a missing parent or a repeated node.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut seen = HashSet::from([id]);

        let mut current = self.get(id).and_then(|x| x.parent());
        while let Some(parent) = current {
            if !seen.insert(parent) || !self.contains(parent) {
                break;
            }

            out.push(parent);
            current = self.get(parent).and_then(|x| x.parent());
        }

        out
    }

    /// All nodes without children below `from`, in depth first order. These
    /// are the parts that actually get printed.
    pub fn leaves(&self, from: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![from];

        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else { continue };
            if !seen.insert(id) {
                continue;
            }

            if node.children().is_empty() {
                out.push(id);
            }
            stack.extend(node.children().iter().rev());
        }

        out
    }

    /// Checks the structural invariants: a single origin that is the root,
    /// and parent / child links that agree in both directions.
    pub fn is_consistent(&self) -> bool {
        let origins = self
            .iter()
            .filter(|x| x.kind == NodeKind::Origin)
            .map(|x| x.id)
            .collect::<Vec<_>>();
        if !self.is_empty() && origins != self.root.into_iter().collect::<Vec<_>>() {
            return false;
        }

        self.iter().all(|node| {
            let parent_ok = match node.parent() {
                None => true,
                Some(parent) => self
                    .get(parent)
                    .is_some_and(|x| x.children().contains(&node.id)),
            };
            let children_ok = node.children().iter().all(|child| {
                self.get(*child)
                    .is_some_and(|x| x.parent() == Some(node.id))
            });
            let exclusive = !(node.is_closed() && node.split_plane.is_some());

            parent_ok && children_ok && exclusive
        })
    }

    fn allocate_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }
}

fn sanitize_volume(volume: f64) -> f64 {
    if volume.is_finite() {
        volume.abs()
    } else {
        0.0
    }
}
