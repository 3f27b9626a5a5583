use nalgebra::Vector3;

/// A proposed cut through a model. Position and normal are expressed in the
/// model's original (un-normalized) coordinate frame.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitPlane {
    pub position: Vector3<f64>,
    pub normal: Vector3<f64>,
    pub axis: String,
    pub visualization: Option<PlaneMesh>,
}

/// Triangulated cross-section of the model at the plane, used only for display.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaneMesh {
    pub vertices: Vec<Vector3<f64>>,
    pub faces: Vec<[u32; 3]>,
}

impl SplitPlane {
    pub fn new(position: Vector3<f64>, normal: Vector3<f64>, axis: impl Into<String>) -> Self {
        Self {
            position,
            normal,
            axis: axis.into(),
            visualization: None,
        }
    }

    pub fn with_visualization(mut self, mesh: PlaneMesh) -> Self {
        self.visualization = Some(mesh);
        self
    }

    /// Returns a copy moved by `offset`. Only the position and visualization
    /// move, the normal is a direction.
    pub fn translated(&self, offset: &Vector3<f64>) -> Self {
        Self {
            position: self.position + offset,
            normal: self.normal,
            axis: self.axis.clone(),
            visualization: self.visualization.as_ref().map(|mesh| PlaneMesh {
                vertices: mesh.vertices.iter().map(|v| v + offset).collect(),
                faces: mesh.faces.clone(),
            }),
        }
    }
}

/// Parses an axis label (`x`, `y` or `z`) into its index.
pub fn axis_index(axis: &str) -> Option<usize> {
    match axis.to_ascii_lowercase().as_str() {
        "x" => Some(0),
        "y" => Some(1),
        "z" => Some(2),
        _ => None,
    }
}

pub fn axis_name(idx: usize) -> &'static str {
    ["x", "y", "z"].get(idx).copied().unwrap_or("auto")
}
