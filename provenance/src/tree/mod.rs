mod node;
mod registry;

pub use node::{MeshNode, NodeId, NodeKind, PartDescriptor, SplitState};
pub use registry::{Registry, DEFAULT_INFILL};
