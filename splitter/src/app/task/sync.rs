use std::{io::Cursor, path::Path, sync::Arc};

use clone_macro::clone;
use common::catalog::Printer;
use provenance::{
    mesh::{load_mesh, Mesh},
    tree::NodeId,
};
use remote_split::{SplitService, SyncError, UploadedFile};
use tracing::{debug, info, warn};

use super::{thread::TaskThread, Task};
use crate::app::Session;

/// Registers a freshly loaded model with the split service.
pub struct Upload {
    node: NodeId,
    thread: TaskThread<Result<UploadedFile, SyncError>>,
}

/// Downloads and parses the geometry of a part produced by a split.
pub struct FetchGeometry {
    node: NodeId,
    url: String,
    thread: TaskThread<Result<Mesh, SyncError>>,
}

pub struct FetchPrinters {
    thread: TaskThread<Result<Vec<Printer>, SyncError>>,
}

impl Upload {
    pub fn new(service: &Arc<dyn SplitService>, node: NodeId, name: String, data: Vec<u8>) -> Self {
        let thread = TaskThread::spawn(
            "upload",
            clone!([{ Arc::clone(service) } as service], move || {
                service.upload_file(&name, &data)
            }),
        );
        Self { node, thread }
    }
}

impl Task for Upload {
    fn poll(&mut self, session: &mut Session) -> bool {
        let Some(result) = self.thread.poll_result() else {
            return false;
        };

        if session.is_stale(self.node, "upload") {
            return true;
        }

        let file = match result {
            Ok(file) => file,
            Err(err) => {
                session.sync_failed(Some(self.node), "upload", err);
                return true;
            }
        };

        info!("Uploaded {} as `{}`", self.node, file.file_id);
        let recorded = session
            .registry
            .set_external_ref(self.node, &file.file_id)
            .and_then(|()| session.registry.set_geometry_url(self.node, Some(file.url)));
        if let Err(err) = recorded {
            warn!("Failed to record upload of {}: {err}", self.node);
        }
        true
    }
}

impl FetchGeometry {
    pub fn new(service: &Arc<dyn SplitService>, node: NodeId, url: String) -> Self {
        let format = Path::new(&url)
            .extension()
            .map(|x| x.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_else(|| "stl".into());

        let thread = TaskThread::spawn(
            "fetch geometry",
            clone!([{ Arc::clone(service) } as service, url], move || -> Result<Mesh, SyncError> {
                let data = service.download(&url)?;
                load_mesh(Cursor::new(data), &format)
                    .map_err(|err| SyncError::InvalidModel(format!("{err:#}")))
            }),
        );

        Self { node, url, thread }
    }
}

impl Task for FetchGeometry {
    fn poll(&mut self, session: &mut Session) -> bool {
        let Some(result) = self.thread.poll_result() else {
            return false;
        };

        if session.is_stale(self.node, "geometry download") {
            return true;
        }

        match result {
            Ok(mesh) => {
                debug!(
                    "Fetched {} faces for {} from {}",
                    mesh.face_count(),
                    self.node,
                    self.url
                );
                session.set_geometry(self.node, mesh);
            }
            Err(err) => session.sync_failed(Some(self.node), "geometry download", err),
        }

        true
    }
}

impl FetchPrinters {
    pub fn new(service: &Arc<dyn SplitService>) -> Self {
        let thread = TaskThread::spawn(
            "printers",
            clone!([{ Arc::clone(service) } as service], move || service.printers()),
        );
        Self { thread }
    }
}

impl Task for FetchPrinters {
    fn poll(&mut self, session: &mut Session) -> bool {
        let Some(result) = self.thread.poll_result() else {
            return false;
        };

        match result {
            Ok(printers) if printers.is_empty() => {
                debug!("Service has no printers, keeping the configured catalog")
            }
            Ok(printers) => {
                info!("Loaded {} printers from the split service", printers.len());
                session.printers = printers;
            }
            Err(err) => session.sync_failed(None, "printer refresh", err),
        }

        true
    }
}
