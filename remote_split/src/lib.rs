//! Client side of the split service: uploading models, asking for split
//! plane suggestions, performing the cut and running failure analysis.
//!
//! Every call is blocking and fallible. Callers are expected to run them off
//! the main thread and treat any [`SyncError`] as non-fatal.

use common::{catalog::Printer, plane::SplitPlane, report::FailureReport};
use nalgebra::Vector3;
use provenance::tree::PartDescriptor;
use thiserror::Error;

pub mod http;
pub mod offline;
mod wire;

pub use http::HttpService;
pub use offline::OfflineService;

/// File registered with the split service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_id: String,
    pub url: String,
}

/// The two halves of a performed split.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitResult {
    pub part_a: PartDescriptor,
    pub part_b: PartDescriptor,
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server responded with {status}: {body}")]
    Http { status: u16, body: String },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid url `{0}`")]
    InvalidUrl(String),

    #[error("could not read model: {0}")]
    InvalidModel(String),

    #[error("unknown file `{0}`")]
    UnknownFile(String),

    #[error("{0} is not available offline")]
    Offline(&'static str),
}

pub trait SplitService: Send + Sync {
    /// Registers a model file. `name` should carry the file extension.
    fn upload_file(&self, name: &str, data: &[u8]) -> Result<UploadedFile, SyncError>;

    fn printers(&self) -> Result<Vec<Printer>, SyncError>;

    /// Suggests where to cut a file. The plane is in the file's own coordinate
    /// frame. `axis` optionally forces the cut to be perpendicular to `x`, `y`
    /// or `z`.
    fn suggest_split_plane(
        &self,
        file_id: &str,
        axis: Option<&str>,
    ) -> Result<SplitPlane, SyncError>;

    fn perform_split(
        &self,
        file_id: &str,
        origin: &Vector3<f64>,
        normal: &Vector3<f64>,
        add_keys: bool,
    ) -> Result<SplitResult, SyncError>;

    fn analyze_failure(&self, file_id: &str) -> Result<FailureReport, SyncError>;

    /// Fetches the raw bytes behind a url returned by an earlier call.
    fn download(&self, url: &str) -> Result<Vec<u8>, SyncError>;
}
