//! Stand-in used when no split server is configured. Uploaded models are kept
//! in memory so split planes can still be suggested locally, anything that
//! needs the server's geometry engine fails with [`SyncError::Offline`].

use std::{collections::HashMap, io::Cursor, path::Path};

use common::{
    catalog::{default_printers, Printer},
    misc::random_string,
    plane::{axis_index, axis_name, SplitPlane},
    report::FailureReport,
};
use nalgebra::Vector3;
use parking_lot::Mutex;
use provenance::mesh::{load_mesh, Mesh};
use tracing::debug;

use crate::{SplitResult, SplitService, SyncError, UploadedFile};

pub struct OfflineService {
    files: Mutex<HashMap<String, Mesh>>,
    printers: Vec<Printer>,
}

impl OfflineService {
    pub fn new(printers: Vec<Printer>) -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            printers,
        }
    }

    fn mesh(&self, file_id: &str) -> Result<Mesh, SyncError> {
        self.files
            .lock()
            .get(file_id)
            .cloned()
            .ok_or_else(|| SyncError::UnknownFile(file_id.into()))
    }
}

impl Default for OfflineService {
    fn default() -> Self {
        Self::new(default_printers())
    }
}

impl SplitService for OfflineService {
    fn upload_file(&self, name: &str, data: &[u8]) -> Result<UploadedFile, SyncError> {
        let format = Path::new(name)
            .extension()
            .map(|x| x.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mesh = load_mesh(Cursor::new(data), &format)
            .map_err(|err| SyncError::InvalidModel(format!("{err:#}")))?;

        let file_id = random_string(16);
        debug!("Registered `{name}` as offline file {file_id}");
        self.files.lock().insert(file_id.clone(), mesh);

        Ok(UploadedFile {
            url: format!("offline://{file_id}"),
            file_id,
        })
    }

    fn printers(&self) -> Result<Vec<Printer>, SyncError> {
        Ok(self.printers.clone())
    }

    /// Cuts through the middle of the longest (or requested) axis. The plane
    /// passes through the area weighted surface centroid on the other two
    /// axes.
    fn suggest_split_plane(
        &self,
        file_id: &str,
        axis: Option<&str>,
    ) -> Result<SplitPlane, SyncError> {
        let mesh = self.mesh(file_id)?;
        let (Some(bounds), Some(centroid)) = (mesh.bounds(), mesh.centroid()) else {
            return Err(SyncError::InvalidModel("model has no vertices".into()));
        };

        let axis = axis
            .and_then(axis_index)
            .unwrap_or_else(|| bounds.longest_axis());

        let mut position = centroid;
        position[axis] = bounds.center()[axis];

        let mut normal = Vector3::zeros();
        normal[axis] = 1.0;

        Ok(SplitPlane::new(position, normal, axis_name(axis)))
    }

    fn perform_split(
        &self,
        _file_id: &str,
        _origin: &Vector3<f64>,
        _normal: &Vector3<f64>,
        _add_keys: bool,
    ) -> Result<SplitResult, SyncError> {
        Err(SyncError::Offline("splitting"))
    }

    fn analyze_failure(&self, _file_id: &str) -> Result<FailureReport, SyncError> {
        Err(SyncError::Offline("failure analysis"))
    }

    fn download(&self, _url: &str) -> Result<Vec<u8>, SyncError> {
        Err(SyncError::Offline("downloading parts"))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    // Wedge that is longest along x, with most of its surface near x = 0.
    const WEDGE_OBJ: &str = "\
v 0 0 0
v 0 4 0
v 0 0 2
v 0 4 2
v 40 0 0
f 1 2 4
f 1 4 3
f 1 5 2
f 1 3 5
f 2 5 4
f 3 4 5
";

    #[test]
    fn suggests_middle_of_longest_axis() {
        let service = OfflineService::default();
        let file = service.upload_file("wedge.obj", WEDGE_OBJ.as_bytes()).unwrap();
        let plane = service.suggest_split_plane(&file.file_id, None).unwrap();

        assert_eq!(plane.axis, "x");
        assert_eq!(plane.normal, Vector3::x());
        assert_relative_eq!(
            plane.position,
            Vector3::new(20.0, 1.355884075471813, 0.6776747129110757),
            max_relative = 1e-9
        );
    }

    #[test]
    fn axis_hint() {
        let service = OfflineService::default();
        let file = service.upload_file("wedge.obj", WEDGE_OBJ.as_bytes()).unwrap();
        let plane = service.suggest_split_plane(&file.file_id, Some("Z")).unwrap();

        assert_eq!(plane.axis, "z");
        assert_eq!(plane.normal, Vector3::z());
        assert_relative_eq!(
            plane.position,
            Vector3::new(12.903744500431323, 1.355884075471813, 1.0),
            max_relative = 1e-9
        );
    }

    #[test]
    fn server_only_operations_fail() {
        let service = OfflineService::default();
        let file = service.upload_file("wedge.obj", WEDGE_OBJ.as_bytes()).unwrap();

        let split = service.perform_split(&file.file_id, &Vector3::zeros(), &Vector3::x(), false);
        assert!(matches!(split, Err(SyncError::Offline(_))));
        assert!(matches!(
            service.analyze_failure(&file.file_id),
            Err(SyncError::Offline(_))
        ));
        assert!(matches!(
            service.suggest_split_plane("nope", None),
            Err(SyncError::UnknownFile(_))
        ));
        assert!(matches!(
            service.upload_file("model.step", b"ISO-10303-21;"),
            Err(SyncError::InvalidModel(_))
        ));
    }
}
