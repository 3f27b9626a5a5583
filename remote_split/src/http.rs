//! Blocking client for the split service's JSON api.

use std::time::Duration;

use common::{catalog::Printer, plane::SplitPlane, report::FailureReport};
use nalgebra::Vector3;
use reqwest::{
    blocking::{
        multipart::{Form, Part},
        Client, RequestBuilder,
    },
    Url,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, trace};

use crate::{
    wire::{
        FailureResponse, FileRequest, PerformSplit, PlaneResponse, SplitResponse, SuggestSplit,
        UploadResponse,
    },
    SplitResult, SplitService, SyncError, UploadedFile,
};

pub struct HttpService {
    client: Client,
    base: Url,
}

impl HttpService {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SyncError> {
        let mut base = Url::parse(base_url).map_err(|_| SyncError::InvalidUrl(base_url.into()))?;
        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(SyncError::InvalidUrl(base_url.into()));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Resolves an api path or a url handed out by the server. Absolute paths
    /// like `/uploads/x.stl` are resolved against the server's host.
    fn url(&self, path: &str) -> Result<Url, SyncError> {
        self.base
            .join(path)
            .map_err(|_| SyncError::InvalidUrl(path.into()))
    }

    fn post_json<Req: Serialize, Res: DeserializeOwned>(
        &self,
        path: &str,
        body: &Req,
    ) -> Result<Res, SyncError> {
        let request = self.client.post(self.url(path)?).json(body);
        Ok(serde_json::from_slice(&send(request)?)?)
    }

    fn get_json<Res: DeserializeOwned>(&self, path: &str) -> Result<Res, SyncError> {
        let request = self.client.get(self.url(path)?);
        Ok(serde_json::from_slice(&send(request)?)?)
    }
}

/// Sends a request and returns the body of a successful response. Any other
/// status becomes [`SyncError::Http`].
fn send(request: RequestBuilder) -> Result<Vec<u8>, SyncError> {
    let response = request.send()?;
    let (status, url) = (response.status(), response.url().clone());
    let body = response.bytes()?;
    debug!("{url} -> {status} ({} bytes)", body.len());

    if !status.is_success() {
        return Err(SyncError::Http {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    }

    Ok(body.to_vec())
}

impl SplitService for HttpService {
    fn upload_file(&self, name: &str, data: &[u8]) -> Result<UploadedFile, SyncError> {
        trace!("Uploading `{name}` ({} bytes)", data.len());
        let part = Part::bytes(data.to_vec()).file_name(name.to_owned());
        let request = self
            .client
            .post(self.url("upload")?)
            .multipart(Form::new().part("file", part));

        let response = serde_json::from_slice::<UploadResponse>(&send(request)?)?;
        Ok(response.into())
    }

    fn printers(&self) -> Result<Vec<Printer>, SyncError> {
        self.get_json("printers")
    }

    fn suggest_split_plane(
        &self,
        file_id: &str,
        axis: Option<&str>,
    ) -> Result<SplitPlane, SyncError> {
        let request = SuggestSplit { file_id, axis };
        let response = self.post_json::<_, PlaneResponse>("suggest_split", &request)?;
        Ok(response.into())
    }

    fn perform_split(
        &self,
        file_id: &str,
        origin: &Vector3<f64>,
        normal: &Vector3<f64>,
        add_keys: bool,
    ) -> Result<SplitResult, SyncError> {
        let request = PerformSplit {
            file_id,
            origin: (*origin).into(),
            normal: (*normal).into(),
            add_keys,
        };
        let response = self.post_json::<_, SplitResponse>("perform_split", &request)?;
        Ok(response.into())
    }

    fn analyze_failure(&self, file_id: &str) -> Result<FailureReport, SyncError> {
        let response =
            self.post_json::<_, FailureResponse>("analyze_failure", &FileRequest { file_id })?;
        Ok(response.into())
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, SyncError> {
        send(self.client.get(self.url(url)?))
    }
}
