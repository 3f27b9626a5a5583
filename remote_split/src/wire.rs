use common::{
    plane::{PlaneMesh, SplitPlane},
    report::{FailureReport, Issue},
};
use nalgebra::Vector3;
use provenance::tree::PartDescriptor;
use serde::{Deserialize, Serialize};

use crate::{SplitResult, UploadedFile};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_id: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestSplit<'a> {
    pub file_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaneResponse {
    pub position: [f64; 3],
    pub normal: [f64; 3],
    #[serde(default)]
    pub axis: String,
    #[serde(default)]
    pub visualization_mesh: Option<VisualizationMesh>,
}

#[derive(Debug, Deserialize)]
pub struct VisualizationMesh {
    pub vertices: Vec<[f64; 3]>,
    pub faces: Vec<[u32; 3]>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformSplit<'a> {
    pub file_id: &'a str,
    pub origin: [f64; 3],
    pub normal: [f64; 3],
    pub add_keys: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitResponse {
    pub part_a: PartResponse,
    pub part_b: PartResponse,
}

#[derive(Debug, Deserialize)]
pub struct PartResponse {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub volume: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureResponse {
    #[serde(default)]
    pub risk_score: f64,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRequest<'a> {
    pub file_id: &'a str,
}

impl From<UploadResponse> for UploadedFile {
    fn from(value: UploadResponse) -> Self {
        Self {
            file_id: value.file_id,
            url: value.url,
        }
    }
}

impl From<PlaneResponse> for SplitPlane {
    fn from(value: PlaneResponse) -> Self {
        let plane = SplitPlane::new(
            Vector3::from(value.position),
            Vector3::from(value.normal),
            value.axis,
        );

        match value.visualization_mesh {
            Some(mesh) => plane.with_visualization(PlaneMesh {
                vertices: mesh.vertices.into_iter().map(Vector3::from).collect(),
                faces: mesh.faces,
            }),
            None => plane,
        }
    }
}

impl From<PartResponse> for PartDescriptor {
    fn from(value: PartResponse) -> Self {
        Self {
            external_ref: value.id,
            url: value.url,
            volume: value.volume,
        }
    }
}

impl From<FailureResponse> for FailureReport {
    fn from(value: FailureResponse) -> Self {
        FailureReport::new(value.risk_score, value.issues)
    }
}

impl From<SplitResponse> for SplitResult {
    fn from(value: SplitResponse) -> Self {
        Self {
            part_a: value.part_a.into(),
            part_b: value.part_b.into(),
        }
    }
}
