//! Split history of a printable model: the [`tree::Registry`] of origin and
//! part nodes along with the geometry derived from raw triangle data
//! (volume, mass, display normalization) and the graph layout of the tree.

use nalgebra::Vector3;

pub mod error;
pub mod frame;
pub mod geometry;
pub mod layout;
pub mod mesh;
pub mod tree;

pub type Pos = Vector3<f64>;
pub type Triangle = [Pos; 3];

pub use error::TreeError;
