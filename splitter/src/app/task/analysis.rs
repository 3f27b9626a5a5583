use std::sync::Arc;

use clone_macro::clone;
use common::report::FailureReport;
use provenance::tree::NodeId;
use remote_split::{SplitService, SyncError};
use tracing::{debug, info};

use super::{thread::TaskThread, Task};
use crate::app::{Operation, Session};

pub struct AnalyzeFailure {
    node: NodeId,
    thread: TaskThread<Result<FailureReport, SyncError>>,
}

impl AnalyzeFailure {
    pub fn new(service: &Arc<dyn SplitService>, node: NodeId, file_id: String) -> Self {
        let thread = TaskThread::spawn(
            "analyze failure",
            clone!([{ Arc::clone(service) } as service], move || {
                service.analyze_failure(&file_id)
            }),
        );
        Self { node, thread }
    }
}

impl Task for AnalyzeFailure {
    fn poll(&mut self, session: &mut Session) -> bool {
        let Some(result) = self.thread.poll_result() else {
            return false;
        };
        session.finish(self.node, Operation::AnalyzeFailure);
        if session.is_stale(self.node, "failure analysis") {
            return true;
        }

        match result {
            Ok(report) => {
                let (risk, issues) = (report.risk_score, report.issues.len());
                match session.registry.set_failure_report(self.node, Some(report)) {
                    Ok(()) => info!("{} has a risk score of {risk} with {issues} issues", self.node),
                    Err(err) => debug!("Discarding failure report: {err}"),
                }
            }
            Err(err) => session.sync_failed(Some(self.node), "failure analysis", err),
        }

        true
    }
}
