use crate::app::Session;

mod analysis;
mod split;
mod sync;
pub mod thread;

pub use self::{
    analysis::AnalyzeFailure,
    split::{CommitSplit, SuggestPlane},
    sync::{FetchGeometry, FetchPrinters, Upload},
};

// Background operation that is polled on every session tick.
pub trait Task {
    /// Returns true if the task has completed.
    fn poll(&mut self, session: &mut Session) -> bool;
}

#[derive(Default)]
pub struct TaskManager {
    tasks: Vec<Box<dyn Task>>,
}

impl TaskManager {
    pub fn add(&mut self, task: impl Task + 'static) {
        self.tasks.push(Box::new(task));
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub(super) fn poll(&mut self, session: &mut Session) {
        let mut i = 0;
        while i < self.tasks.len() {
            if self.tasks[i].poll(session) {
                self.tasks.remove(i);
            } else {
                i += 1;
            }
        }
    }

    pub(super) fn append(&mut self, other: TaskManager) {
        self.tasks.extend(other.tasks);
    }
}
