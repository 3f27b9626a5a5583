use std::fmt;

use common::{plane::SplitPlane, report::FailureReport};

/// Opaque identifier of a node, unique within its [`super::Registry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// The model as it was originally loaded.
    Origin,
    /// One half of a committed split of `parent`.
    Part { parent: NodeId },
}

/// Where a node is in its split lifecycle.
///
/// `Unanalyzed -> PlaneSuggested -> Split`, with `PlaneSuggested` falling back
/// to `Unanalyzed` when the plane is cleared or the printer changes. `Split`
/// is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitState {
    Unanalyzed,
    PlaneSuggested,
    Split,
}

/// One version of a physical model at some point in the split history.
#[derive(Clone, Debug)]
pub struct MeshNode {
    pub(super) id: NodeId,
    pub(super) kind: NodeKind,
    pub(super) children: Option<[NodeId; 2]>,

    pub(super) name: String,
    pub(super) external_ref: String,
    pub(super) geometry_url: Option<String>,
    pub(super) volume: f64,

    pub(super) printer_id: String,
    pub(super) material_id: String,
    pub(super) infill: u8,

    pub(super) split_plane: Option<SplitPlane>,
    pub(super) failure_report: Option<FailureReport>,
}

/// What the split service reported for one of the two halves of a cut.
#[derive(Clone, Debug, PartialEq)]
pub struct PartDescriptor {
    pub external_ref: String,
    pub url: Option<String>,
    pub volume: f64,
}

impl MeshNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        match self.kind {
            NodeKind::Origin => None,
            NodeKind::Part { parent } => Some(parent),
        }
    }

    pub fn children(&self) -> &[NodeId] {
        match &self.children {
            Some(children) => children,
            None => &[],
        }
    }

    /// A closed node has been split and can not be split again.
    pub fn is_closed(&self) -> bool {
        self.children.is_some()
    }

    pub fn split_state(&self) -> SplitState {
        if self.is_closed() {
            SplitState::Split
        } else if self.split_plane.is_some() {
            SplitState::PlaneSuggested
        } else {
            SplitState::Unanalyzed
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identifier of this node's geometry on the split service. Empty until the
    /// node has been synchronized, which may never happen.
    pub fn external_ref(&self) -> &str {
        &self.external_ref
    }

    pub fn is_synchronized(&self) -> bool {
        !self.external_ref.is_empty()
    }

    pub fn geometry_url(&self) -> Option<&str> {
        self.geometry_url.as_deref()
    }

    /// Volume in cubic units of the source geometry, fixed at creation.
    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn printer_id(&self) -> &str {
        &self.printer_id
    }

    pub fn material_id(&self) -> &str {
        &self.material_id
    }

    pub fn infill(&self) -> u8 {
        self.infill
    }

    pub fn split_plane(&self) -> Option<&SplitPlane> {
        self.split_plane.as_ref()
    }

    pub fn failure_report(&self) -> Option<&FailureReport> {
        self.failure_report.as_ref()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for SplitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SplitState::Unanalyzed => "unanalyzed",
            SplitState::PlaneSuggested => "plane suggested",
            SplitState::Split => "split",
        })
    }
}
