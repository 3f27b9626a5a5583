//! Display normalization.
//!
//! Models arrive in whatever frame they were authored in. For display they are
//! centered on the horizontal X / Z axes and rest on Y = 0. This is done with a
//! single offset that wraps the model *and* its split plane, since the split
//! service reports planes in the original frame. The print bed has its own
//! fixed frame and is never offset.

use common::{catalog::BedSize, plane::SplitPlane};
use nalgebra::{Matrix4, Vector3};

use crate::{geometry::BoundingBox, mesh::Mesh, tree::NodeId, Pos};

/// Offset that centers a model horizontally and drops it onto the ground
/// plane: `(-center.x, -min.y, -center.z)`.
pub fn compute_display_offset(bounds: &BoundingBox) -> Pos {
    let center = bounds.center();
    Vector3::new(-center.x, -bounds.min.y, -center.z)
}

/// The display transform of one node. Frames are computed from scratch for
/// every node that gets displayed, they are never adjusted incrementally.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayFrame {
    node: NodeId,
    bounds: BoundingBox,
    offset: Pos,
}

impl DisplayFrame {
    pub fn from_bounds(node: NodeId, bounds: BoundingBox) -> Self {
        Self {
            node,
            bounds,
            offset: compute_display_offset(&bounds),
        }
    }

    /// Returns None for a mesh without any vertices.
    pub fn for_mesh(node: NodeId, mesh: &Mesh) -> Option<Self> {
        mesh.bounds().map(|bounds| Self::from_bounds(node, bounds))
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn offset(&self) -> Pos {
        self.offset
    }

    /// Bounds of the raw geometry, in its original frame.
    pub fn raw_bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// Bounds of the geometry once the offset is applied.
    pub fn displayed_bounds(&self) -> BoundingBox {
        BoundingBox::new(self.bounds.min + self.offset, self.bounds.max + self.offset)
    }

    /// Transform for the group holding both the model and its split plane.
    pub fn model_transform(&self) -> Matrix4<f64> {
        Matrix4::new_translation(&self.offset)
    }

    /// Transform for the print bed. Always identity, the bed does not move
    /// with the model.
    pub fn bed_transform(&self) -> Matrix4<f64> {
        Matrix4::identity()
    }

    /// Moves a plane reported in the model's original frame into display
    /// space, keeping it coincident with the displayed model.
    pub fn place_plane(&self, plane: &SplitPlane) -> SplitPlane {
        plane.translated(&self.offset)
    }

    /// Checks the displayed model against a bed volume centered on the origin.
    pub fn fits_bed(&self, bed: &BedSize) -> bool {
        let bed = bed_bounds(bed);
        let model = self.displayed_bounds();
        let eps = 1e-9;

        (0..3).all(|i| model.min[i] >= bed.min[i] - eps && model.max[i] <= bed.max[i] + eps)
    }
}

/// Printable volume of a bed in display space (Y up). The bed's X / Y map to
/// display X / Z and its Z (height) maps to display Y.
pub fn bed_bounds(bed: &BedSize) -> BoundingBox {
    let size = Vector3::new(bed.x as f64, bed.z as f64, bed.y as f64);
    BoundingBox::new(
        Vector3::new(-size.x / 2.0, 0.0, -size.z / 2.0),
        Vector3::new(size.x / 2.0, size.y, size.z / 2.0),
    )
}
