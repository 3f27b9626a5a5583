//! The session owns everything the user works on: the provenance tree, the
//! current selection and the printer / material catalogs. All edits go through
//! its methods so the tree invariants are enforced in one place.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    io::Cursor,
    mem,
    path::Path,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use common::{
    catalog::{find_material, find_printer, Material, Printer},
    plane::SplitPlane,
    report::Severity,
    units::format_volume,
};
use nalgebra::Vector2;
use provenance::{
    frame::DisplayFrame,
    geometry::compute_mass,
    layout::compute_layout,
    mesh::{load_mesh, Mesh},
    tree::{MeshNode, NodeId, NodeKind, Registry, SplitState},
    TreeError,
};
use remote_split::{HttpService, OfflineService, SplitService};
use thiserror::Error;
use tracing::{debug, info, warn};

use self::{
    config::Config,
    notice::Notice,
    task::{AnalyzeFailure, CommitSplit, FetchPrinters, SuggestPlane, TaskManager, Upload},
};

pub mod config;
pub mod notice;
pub mod task;

/// Oldest notices are dropped once this many are kept.
const MAX_NOTICES: usize = 64;

pub struct Session {
    pub config: Config,
    service: Arc<dyn SplitService>,

    registry: Registry,
    selected: Option<NodeId>,
    frame: Option<DisplayFrame>,
    geometry: HashMap<NodeId, Mesh>,

    printers: Vec<Printer>,
    materials: Vec<Material>,

    busy: Option<(NodeId, Operation)>,
    tasks: TaskManager,
    notices: Vec<Notice>,
}

/// Server side actions that change a node's split state. Only one of them can
/// be outstanding at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    SuggestPlane,
    CommitSplit,
    AnalyzeFailure,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("waiting for {1} on {0} to finish")]
    Busy(NodeId, Operation),

    #[error("{0} has not been uploaded to the split service")]
    Unsynchronized(NodeId),
}

/// Everything shown about a node in the details panel.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeSummary {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    pub state: SplitState,
    pub synchronized: bool,

    pub volume: f64,
    pub volume_display: String,
    /// Estimated mass in grams, None if the material is not in the catalog.
    pub mass: Option<f64>,

    pub printer: String,
    pub material: String,
    pub infill: u8,
    /// None without local geometry or an unknown printer.
    pub fits_bed: Option<bool>,
    pub risk_score: Option<u8>,
    pub worst_severity: Option<Severity>,
}

impl Session {
    pub fn new(config: Config, service: Arc<dyn SplitService>) -> Self {
        Self {
            printers: config.printers.clone(),
            materials: config.materials.clone(),
            config,
            service,

            registry: Registry::new(),
            selected: None,
            frame: None,
            geometry: HashMap::new(),

            busy: None,
            tasks: TaskManager::default(),
            notices: Vec::new(),
        }
    }

    /// Connects to the configured server, or works offline without one.
    pub fn from_config(config: Config) -> Result<Self> {
        let service: Arc<dyn SplitService> = match &config.server {
            Some(server) => {
                info!("Using split service at {server}");
                Arc::new(
                    HttpService::new(server, config.timeout())
                        .with_context(|| format!("Invalid server url `{server}`"))?,
                )
            }
            None => {
                info!("No split service configured, working offline");
                Arc::new(OfflineService::new(config.printers.clone()))
            }
        };

        Ok(Self::new(config, service))
    }

    /// Parses a model, replaces the current tree with it and starts uploading
    /// it. The volume is computed locally, so the node is usable right away
    /// even if the upload fails.
    pub fn load_model(&mut self, name: &str, data: Vec<u8>) -> Result<NodeId> {
        let format = Path::new(name)
            .extension()
            .map(|x| x.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        let mesh = load_mesh(Cursor::new(&data), &format)
            .with_context(|| format!("Failed to load `{name}`"))?;

        let volume = mesh.volume();
        info!(
            "Loaded `{name}` with {} faces and a volume of {volume:.2}mm³",
            mesh.face_count()
        );

        let root = self
            .registry
            .create_root(name, volume, &self.config.default_printer);
        self.geometry.clear();
        self.geometry.insert(root, mesh);
        self.busy = None;
        self.select_unchecked(root);

        let task = Upload::new(&self.service, root, name.to_owned(), data);
        self.tasks.add(task);
        Ok(root)
    }

    pub fn refresh_printers(&mut self) {
        let task = FetchPrinters::new(&self.service);
        self.tasks.add(task);
    }

    pub fn select(&mut self, id: NodeId) -> Result<(), SessionError> {
        self.lookup(id)?;
        self.select_unchecked(id);
        Ok(())
    }

    fn select_unchecked(&mut self, id: NodeId) {
        self.selected = Some(id);
        self.frame = self
            .geometry
            .get(&id)
            .and_then(|mesh| DisplayFrame::for_mesh(id, mesh));
    }

    pub fn set_printer(&mut self, id: NodeId, printer: &str) -> Result<(), SessionError> {
        let node = self.lookup(id)?;
        match find_printer(&self.printers, printer) {
            Some(entry) if !entry.supports(node.material_id()) => warn!(
                "{} does not support {}, used by {id}",
                entry.name,
                node.material_id()
            ),
            None => warn!("Printer `{printer}` is not in the catalog"),
            _ => {}
        }

        self.registry.set_printer(id, printer)?;
        Ok(())
    }

    /// Always applies. Warns when the node's printer can not print the
    /// material.
    pub fn set_material(&mut self, id: NodeId, material: &str) -> Result<(), SessionError> {
        let node = self.lookup(id)?;
        if find_material(&self.materials, material).is_none() {
            warn!("Material `{material}` is not in the catalog");
        }
        if let Some(printer) = find_printer(&self.printers, node.printer_id()) {
            if !printer.supports(material) {
                warn!("{} does not support {material}, assigned to {id}", printer.name);
            }
        }

        self.registry.set_material(id, material)?;
        Ok(())
    }

    pub fn set_infill(&mut self, id: NodeId, percent: i32) -> Result<(), SessionError> {
        self.lookup(id)?;
        self.registry.set_infill(id, percent)?;
        Ok(())
    }

    pub fn clear_split_plane(&mut self, id: NodeId) -> Result<(), SessionError> {
        self.lookup(id)?;
        self.registry.clear_split_plane(id)?;
        Ok(())
    }

    /// Asks the split service where to cut a node. `axis` optionally forces
    /// the cut to be perpendicular to `x`, `y` or `z`.
    pub fn request_split_plane(
        &mut self,
        id: NodeId,
        axis: Option<&str>,
    ) -> Result<(), SessionError> {
        self.check_busy()?;
        let node = self.lookup(id)?;
        if node.is_closed() {
            return Err(TreeError::Conflict {
                node: id,
                reason: "node has already been split",
            }
            .into());
        }
        let file_id = synchronized(node)?;

        let task = SuggestPlane::new(&self.service, id, file_id, axis.map(str::to_owned));
        self.start(id, Operation::SuggestPlane, task);
        Ok(())
    }

    /// Cuts a node along its pending split plane.
    pub fn commit_split(&mut self, id: NodeId) -> Result<(), SessionError> {
        self.check_busy()?;
        let node = self.lookup(id)?;
        if node.is_closed() {
            return Err(TreeError::Precondition {
                node: id,
                reason: "node has already been split",
            }
            .into());
        }
        let Some(plane) = node.split_plane().cloned() else {
            return Err(TreeError::Precondition {
                node: id,
                reason: "no split plane has been proposed",
            }
            .into());
        };
        let file_id = synchronized(node)?;

        let task = CommitSplit::new(&self.service, id, file_id, plane, self.config.add_keys);
        self.start(id, Operation::CommitSplit, task);
        Ok(())
    }

    pub fn analyze_failure(&mut self, id: NodeId) -> Result<(), SessionError> {
        self.check_busy()?;
        let file_id = synchronized(self.lookup(id)?)?;

        let task = AnalyzeFailure::new(&self.service, id, file_id);
        self.start(id, Operation::AnalyzeFailure, task);
        Ok(())
    }

    /// Polls background tasks and merges finished ones into the tree.
    pub fn tick(&mut self) {
        let mut tasks = mem::take(&mut self.tasks);
        tasks.poll(self);
        tasks.append(mem::take(&mut self.tasks));
        self.tasks = tasks;
    }

    /// Ticks until every background task is done. Returns false if the
    /// timeout ran out first.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let start = Instant::now();
        loop {
            self.tick();
            if self.tasks.is_empty() {
                return true;
            }
            if start.elapsed() >= timeout {
                return false;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_some()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// Display transform of the selected node, None without local geometry.
    pub fn display_frame(&self) -> Option<&DisplayFrame> {
        self.frame.as_ref()
    }

    pub fn geometry(&self, id: NodeId) -> Option<&Mesh> {
        self.geometry.get(&id)
    }

    /// A node's pending split plane moved into the node's display frame, so it
    /// lines up with the model as it is drawn.
    pub fn displayed_split_plane(&self, id: NodeId) -> Option<SplitPlane> {
        let plane = self.registry.get(id)?.split_plane()?;
        let frame = DisplayFrame::for_mesh(id, self.geometry.get(&id)?)?;
        Some(frame.place_plane(plane))
    }

    pub fn printers(&self) -> &[Printer] {
        &self.printers
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn layout(&self) -> BTreeMap<NodeId, Vector2<f64>> {
        match self.registry.root() {
            Some(root) => compute_layout(&self.registry, root, &self.config.layout()),
            None => BTreeMap::new(),
        }
    }

    pub fn node_summary(&self, id: NodeId) -> Result<NodeSummary, SessionError> {
        let node = self.lookup(id)?;
        let unit = self.config.volume_unit;

        let mass = find_material(&self.materials, node.material_id())
            .map(|material| compute_mass(node.volume(), material.density, node.infill()));
        let fits_bed = find_printer(&self.printers, node.printer_id()).and_then(|printer| {
            let bounds = self.geometry.get(&id)?.bounds()?;
            Some(printer.fits(&bounds.extent()))
        });

        Ok(NodeSummary {
            id,
            name: node.name().to_owned(),
            kind: node.kind(),
            state: node.split_state(),
            synchronized: node.is_synchronized(),

            volume: node.volume(),
            volume_display: format!("{} {}", format_volume(node.volume(), unit), unit.suffix()),
            mass,

            printer: node.printer_id().to_owned(),
            material: node.material_id().to_owned(),
            infill: node.infill(),
            fits_bed,
            risk_score: node.failure_report().map(|x| x.risk_score),
            worst_severity: node.failure_report().and_then(|x| x.worst_severity()),
        })
    }

    fn lookup(&self, id: NodeId) -> Result<&MeshNode, SessionError> {
        self.registry.node(id).map_err(|err| {
            warn!("{err}");
            err.into()
        })
    }

    fn check_busy(&self) -> Result<(), SessionError> {
        match self.busy {
            Some((node, operation)) => Err(SessionError::Busy(node, operation)),
            None => Ok(()),
        }
    }

    fn start(&mut self, id: NodeId, operation: Operation, task: impl task::Task + 'static) {
        debug!("Starting {operation} on {id}");
        self.busy = Some((id, operation));
        self.tasks.add(task);
    }

    /// Clears the busy flag if it still belongs to this operation.
    fn finish(&mut self, id: NodeId, operation: Operation) {
        if self.busy == Some((id, operation)) {
            self.busy = None;
        }
    }

    fn set_geometry(&mut self, id: NodeId, mesh: Mesh) {
        self.geometry.insert(id, mesh);
        if self.selected == Some(id) {
            self.select_unchecked(id);
        }
    }

    /// True if the node was removed while a request for it was in flight.
    fn is_stale(&self, id: NodeId, action: &str) -> bool {
        let stale = !self.registry.contains(id);
        if stale {
            debug!("Discarding {action} result for removed node {id}");
        }
        stale
    }

    fn notify(&mut self, notice: Notice) {
        if self.notices.len() >= MAX_NOTICES {
            self.notices.remove(0);
        }
        self.notices.push(notice);
    }

    fn sync_failed(&mut self, id: Option<NodeId>, action: &str, err: impl fmt::Display) {
        match id {
            Some(id) => warn!("{action} failed for {id}: {err}"),
            None => warn!("{action} failed: {err}"),
        }
        self.notify(Notice::warning(id, format!("{action} failed: {err}")));
    }
}

fn synchronized(node: &MeshNode) -> Result<String, SessionError> {
    if node.is_synchronized() {
        Ok(node.external_ref().to_owned())
    } else {
        Err(SessionError::Unsynchronized(node.id()))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::SuggestPlane => "split suggestion",
            Operation::CommitSplit => "split",
            Operation::AnalyzeFailure => "failure analysis",
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use approx::assert_relative_eq;
    use common::{
        catalog::default_printers,
        plane::SplitPlane,
        report::{FailureReport, Issue, Severity},
    };
    use nalgebra::Vector3;
    use provenance::tree::PartDescriptor;
    use remote_split::{SplitResult, SyncError, UploadedFile};

    use super::*;

    const CUBE_OBJ: &str = "\
v 0 0 0
v 10 0 0
v 10 10 0
v 0 10 0
v 0 0 10
v 10 0 10
v 10 10 10
v 0 10 10
f 1 4 3
f 1 3 2
f 5 6 7
f 5 7 8
f 1 2 6
f 1 6 5
f 4 8 7
f 4 7 3
f 1 5 8
f 1 8 4
f 2 3 7
f 2 7 6
";

    // The same cube moved by (20, 5, 0).
    const SHIFTED_CUBE_OBJ: &str = "\
v 20 5 0
v 30 5 0
v 30 15 0
v 20 15 0
v 20 5 10
v 30 5 10
v 30 15 10
v 20 15 10
f 1 4 3
f 1 3 2
f 5 6 7
f 5 7 8
f 1 2 6
f 1 6 5
f 4 8 7
f 4 7 3
f 1 5 8
f 1 8 4
f 2 3 7
f 2 7 6
";

    const WAIT: Duration = Duration::from_secs(5);

    #[derive(Default)]
    struct MockService {
        offline: bool,
        uploads: Mutex<u32>,
    }

    impl MockService {
        fn offline() -> Self {
            Self {
                offline: true,
                ..Default::default()
            }
        }

        fn check(&self) -> Result<(), SyncError> {
            if self.offline {
                return Err(SyncError::Offline("mock"));
            }
            Ok(())
        }
    }

    impl SplitService for MockService {
        fn upload_file(&self, _name: &str, _data: &[u8]) -> Result<UploadedFile, SyncError> {
            self.check()?;
            let mut uploads = self.uploads.lock().unwrap();
            *uploads += 1;
            Ok(UploadedFile {
                file_id: format!("file-{uploads}"),
                url: format!("/files/file-{uploads}.obj"),
            })
        }

        fn printers(&self) -> Result<Vec<Printer>, SyncError> {
            self.check()?;
            Ok(default_printers().into_iter().take(1).collect())
        }

        fn suggest_split_plane(
            &self,
            _file_id: &str,
            axis: Option<&str>,
        ) -> Result<SplitPlane, SyncError> {
            self.check()?;
            Ok(SplitPlane::new(
                Vector3::new(5.0, 5.0, 5.0),
                Vector3::x(),
                axis.unwrap_or("auto"),
            ))
        }

        fn perform_split(
            &self,
            file_id: &str,
            _origin: &Vector3<f64>,
            _normal: &Vector3<f64>,
            _add_keys: bool,
        ) -> Result<SplitResult, SyncError> {
            self.check()?;
            let part = |suffix: &str, volume: f64| PartDescriptor {
                external_ref: format!("{file_id}-{suffix}"),
                url: Some(format!("/parts/{file_id}-{suffix}.obj")),
                volume,
            };
            Ok(SplitResult {
                part_a: part("a", 400.0),
                part_b: part("b", 600.0),
            })
        }

        fn analyze_failure(&self, _file_id: &str) -> Result<FailureReport, SyncError> {
            self.check()?;
            let issue = Issue {
                id: "overhang".into(),
                severity: Severity::Medium,
                title: "Overhang".into(),
                description: String::new(),
            };
            Ok(FailureReport::new(42.0, vec![issue]))
        }

        fn download(&self, url: &str) -> Result<Vec<u8>, SyncError> {
            self.check()?;
            let model = match url.contains("-b") {
                true => SHIFTED_CUBE_OBJ,
                false => CUBE_OBJ,
            };
            Ok(model.as_bytes().to_vec())
        }
    }

    fn session(service: MockService) -> Session {
        Session::new(Config::default(), Arc::new(service))
    }

    fn loaded(service: MockService) -> (Session, NodeId) {
        let mut session = session(service);
        let root = session
            .load_model("cube.obj", CUBE_OBJ.as_bytes().to_vec())
            .unwrap();
        assert!(session.wait_idle(WAIT));
        (session, root)
    }

    #[test]
    fn load_computes_volume_and_uploads() {
        let (session, root) = loaded(MockService::default());

        let node = session.registry().get(root).unwrap();
        assert_relative_eq!(node.volume(), 1000.0, max_relative = 1e-9);
        assert_eq!(node.external_ref(), "file-1");
        assert_eq!(node.infill(), 20);
        assert_eq!(node.material_id(), "pla");
        assert_eq!(session.selected(), Some(root));

        let frame = session.display_frame().unwrap();
        assert_relative_eq!(frame.offset(), Vector3::new(-5.0, 0.0, -5.0));
    }

    #[test]
    fn upload_failure_keeps_node_usable() {
        let (mut session, root) = loaded(MockService::offline());

        let node = session.registry().get(root).unwrap();
        assert!(!node.is_synchronized());
        assert_relative_eq!(node.volume(), 1000.0, max_relative = 1e-9);
        assert_eq!(session.notices().len(), 1);
        assert!(session.display_frame().is_some());

        assert_eq!(
            session.request_split_plane(root, None),
            Err(SessionError::Unsynchronized(root))
        );
        session.set_material(root, "petg").unwrap();
        session.set_infill(root, 150).unwrap();

        let summary = session.node_summary(root).unwrap();
        assert_eq!(summary.material, "petg");
        assert_eq!(summary.infill, 100);
        assert_eq!(summary.volume_display, "1.00 cm³");
        assert_relative_eq!(summary.mass.unwrap(), 1.27, max_relative = 1e-9);
    }

    #[test]
    fn busy_blocks_destructive_actions_only() {
        let (mut session, root) = loaded(MockService::default());

        session.request_split_plane(root, Some("x")).unwrap();
        assert!(session.is_busy());
        assert_eq!(
            session.analyze_failure(root),
            Err(SessionError::Busy(root, Operation::SuggestPlane))
        );
        assert!(matches!(
            session.request_split_plane(root, None),
            Err(SessionError::Busy(..))
        ));

        session.set_material(root, "abs").unwrap();
        session.select(root).unwrap();

        assert!(session.wait_idle(WAIT));
        assert!(!session.is_busy());

        let node = session.registry().get(root).unwrap();
        assert_eq!(node.split_state(), SplitState::PlaneSuggested);
        assert_eq!(node.split_plane().unwrap().axis, "x");
        assert_eq!(node.material_id(), "abs");
    }

    #[test]
    fn stale_completion_is_discarded() {
        let (mut session, old_root) = loaded(MockService::default());
        session.request_split_plane(old_root, None).unwrap();

        // Replace the tree before the suggestion is merged.
        let root = session
            .load_model("other.obj", CUBE_OBJ.as_bytes().to_vec())
            .unwrap();
        assert!(session.wait_idle(WAIT));

        assert!(session.registry().get(old_root).is_none());
        assert_eq!(session.registry().len(), 1);

        let node = session.registry().get(root).unwrap();
        assert_eq!(node.split_state(), SplitState::Unanalyzed);
        assert_eq!(node.external_ref(), "file-2");
        assert!(session.notices().is_empty());
    }

    #[test]
    fn commit_creates_children() {
        let (mut session, root) = loaded(MockService::default());

        assert_eq!(
            session.commit_split(root),
            Err(SessionError::Tree(TreeError::Precondition {
                node: root,
                reason: "no split plane has been proposed",
            }))
        );

        session.request_split_plane(root, None).unwrap();
        assert!(session.wait_idle(WAIT));
        session.commit_split(root).unwrap();
        assert!(session.wait_idle(WAIT));

        let registry = session.registry();
        let parent = registry.get(root).unwrap();
        assert!(parent.is_closed());
        assert!(parent.split_plane().is_none());

        let [a_id, b_id] = [parent.children()[0], parent.children()[1]];
        let (a, b) = (registry.get(a_id).unwrap(), registry.get(b_id).unwrap());
        assert_eq!(a.name(), "cube.obj A");
        assert_eq!(b.external_ref(), "file-1-b");
        assert_relative_eq!(a.volume(), 400.0);
        assert_relative_eq!(b.volume(), 600.0);
        assert!(session.geometry(a_id).is_some());

        assert!(matches!(
            session.request_split_plane(root, None),
            Err(SessionError::Tree(TreeError::Conflict { .. }))
        ));

        let layout = session.layout();
        assert_eq!(layout.len(), 3);
        assert_eq!(layout[&a_id], Vector2::new(300.0, -150.0));
    }

    #[test]
    fn stale_failure_is_discarded() {
        let mut session = session(MockService::offline());
        session
            .load_model("a.obj", CUBE_OBJ.as_bytes().to_vec())
            .unwrap();
        let root = session
            .load_model("b.obj", CUBE_OBJ.as_bytes().to_vec())
            .unwrap();
        assert!(session.wait_idle(WAIT));

        // Only the upload of the current tree reports its failure.
        assert_eq!(session.notices().len(), 1);
        assert_eq!(session.notices()[0].node, Some(root));
        assert_eq!(session.registry().len(), 1);
    }

    #[test]
    fn notices_are_capped() {
        let mut session = session(MockService::default());
        for i in 0..MAX_NOTICES + 6 {
            session.notify(Notice::info(None, format!("notice {i}")));
        }

        assert_eq!(session.notices().len(), MAX_NOTICES);
        assert_eq!(session.notices()[0].message, "notice 6");
    }

    #[test]
    fn changed_plane_discards_split() {
        let (mut session, root) = loaded(MockService::default());
        session.request_split_plane(root, None).unwrap();
        assert!(session.wait_idle(WAIT));

        session.commit_split(root).unwrap();
        session.clear_split_plane(root).unwrap();
        assert!(session.wait_idle(WAIT));

        let node = session.registry().get(root).unwrap();
        assert!(!node.is_closed());
        assert_eq!(session.registry().len(), 1);
        assert!(!session.is_busy());
    }

    #[test]
    fn printer_change_clears_plane() {
        let (mut session, root) = loaded(MockService::default());
        session.request_split_plane(root, None).unwrap();
        assert!(session.wait_idle(WAIT));

        session.set_printer(root, "ender3").unwrap();
        let node = session.registry().get(root).unwrap();
        assert_eq!(node.split_state(), SplitState::Unanalyzed);
        assert_eq!(node.printer_id(), "ender3");
    }

    #[test]
    fn frame_follows_selection() {
        let (mut session, root) = loaded(MockService::default());
        session.request_split_plane(root, None).unwrap();
        assert!(session.wait_idle(WAIT));
        session.commit_split(root).unwrap();
        assert!(session.wait_idle(WAIT));

        let children = session.registry().get(root).unwrap().children().to_vec();
        session.select(children[0]).unwrap();
        let frame = session.display_frame().unwrap();
        assert_eq!(frame.node(), children[0]);
        assert_eq!(frame.offset(), Vector3::new(-5.0, 0.0, -5.0));

        session.select(children[1]).unwrap();
        let frame = session.display_frame().unwrap();
        assert_eq!(frame.node(), children[1]);
        assert_eq!(frame.offset(), Vector3::new(-25.0, -5.0, -5.0));
        assert_eq!(frame.displayed_bounds().min, Vector3::new(-5.0, 0.0, -5.0));

        session.select(root).unwrap();
        assert_eq!(session.display_frame().unwrap().node(), root);
    }

    #[test]
    fn split_plane_is_displayed_with_model() {
        let (mut session, root) = loaded(MockService::default());
        assert!(session.displayed_split_plane(root).is_none());

        session.request_split_plane(root, Some("x")).unwrap();
        assert!(session.wait_idle(WAIT));

        let plane = session.displayed_split_plane(root).unwrap();
        assert_eq!(plane.position, Vector3::new(0.0, 5.0, 0.0));
        assert_eq!(plane.normal, Vector3::x());
        assert_eq!(plane.axis, "x");
    }

    #[test]
    fn failure_report_is_merged() {
        let (mut session, root) = loaded(MockService::default());
        session.analyze_failure(root).unwrap();
        assert!(session.wait_idle(WAIT));

        let summary = session.node_summary(root).unwrap();
        assert_eq!(summary.risk_score, Some(42));
        assert_eq!(summary.worst_severity, Some(Severity::Medium));
        assert_eq!(summary.fits_bed, Some(true));
    }

    #[test]
    fn printers_are_refreshed() {
        let mut session = session(MockService::default());
        assert_eq!(session.printers().len(), 4);

        session.refresh_printers();
        assert!(session.wait_idle(WAIT));
        assert_eq!(session.printers().len(), 1);
    }
}
