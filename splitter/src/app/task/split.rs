use std::sync::Arc;

use clone_macro::clone;
use common::plane::SplitPlane;
use provenance::tree::NodeId;
use remote_split::{SplitResult, SplitService, SyncError};
use tracing::{debug, info, warn};

use super::{sync::FetchGeometry, thread::TaskThread, Task};
use crate::app::{notice::Notice, Operation, Session};

pub struct SuggestPlane {
    node: NodeId,
    thread: TaskThread<Result<SplitPlane, SyncError>>,
}

/// Performs a split on the server. Keeps the plane that was sent so the result
/// can be dropped if the node's plane changed in the meantime.
pub struct CommitSplit {
    node: NodeId,
    plane: SplitPlane,
    thread: TaskThread<Result<SplitResult, SyncError>>,
}

impl SuggestPlane {
    pub fn new(
        service: &Arc<dyn SplitService>,
        node: NodeId,
        file_id: String,
        axis: Option<String>,
    ) -> Self {
        let thread = TaskThread::spawn(
            "suggest plane",
            clone!([{ Arc::clone(service) } as service], move || {
                service.suggest_split_plane(&file_id, axis.as_deref())
            }),
        );
        Self { node, thread }
    }
}

impl Task for SuggestPlane {
    fn poll(&mut self, session: &mut Session) -> bool {
        let Some(result) = self.thread.poll_result() else {
            return false;
        };
        session.finish(self.node, Operation::SuggestPlane);
        if session.is_stale(self.node, "split suggestion") {
            return true;
        }

        let plane = match result {
            Ok(plane) => plane,
            Err(err) => {
                session.sync_failed(Some(self.node), "split suggestion", err);
                return true;
            }
        };

        match session.registry.propose_split_plane(self.node, plane) {
            Ok(()) => info!("Suggested a split plane for {}", self.node),
            Err(err) => debug!("Discarding split suggestion: {err}"),
        }

        true
    }
}

impl CommitSplit {
    pub fn new(
        service: &Arc<dyn SplitService>,
        node: NodeId,
        file_id: String,
        plane: SplitPlane,
        add_keys: bool,
    ) -> Self {
        let thread = TaskThread::spawn(
            "commit split",
            clone!(
                [
                    { Arc::clone(service) } as service,
                    { plane.position } as origin,
                    { plane.normal } as normal
                ],
                move || service.perform_split(&file_id, &origin, &normal, add_keys)
            ),
        );
        Self {
            node,
            plane,
            thread,
        }
    }
}

impl Task for CommitSplit {
    fn poll(&mut self, session: &mut Session) -> bool {
        let Some(result) = self.thread.poll_result() else {
            return false;
        };
        session.finish(self.node, Operation::CommitSplit);
        if session.is_stale(self.node, "split") {
            return true;
        }

        let split = match result {
            Ok(split) => split,
            Err(err) => {
                session.sync_failed(Some(self.node), "split", err);
                return true;
            }
        };

        let plane = session.registry.get(self.node).and_then(|x| x.split_plane());
        if plane != Some(&self.plane) {
            warn!(
                "Split plane of {} changed while splitting, discarding result",
                self.node
            );
            return true;
        }

        let urls = [split.part_a.url.clone(), split.part_b.url.clone()];
        let (a, b) = match session
            .registry
            .commit_split(self.node, split.part_a, split.part_b)
        {
            Ok(children) => children,
            Err(err) => {
                debug!("Discarding split result: {err}");
                return true;
            }
        };

        session.notify(Notice::info(
            Some(self.node),
            format!("split into {a} and {b}"),
        ));
        for (child, url) in [a, b].into_iter().zip(urls) {
            if let Some(url) = url {
                let task = FetchGeometry::new(&session.service, child, url);
                session.tasks.add(task);
            }
        }

        true
    }
}
