use std::{
    any::Any,
    fmt::Display,
    thread::{self, JoinHandle},
};

use tracing::error;

/// Runs a closure on its own thread so the session can keep handling edits
/// while it blocks on the network.
pub struct TaskThread<T> {
    handle: Option<JoinHandle<T>>,
}

pub enum TaskResult<T> {
    Completed(T),
    /// The thread panicked, carries the panic message.
    Failed(String),
    Pending,
}

impl<T: Send + 'static> TaskThread<T> {
    pub fn spawn(name: &str, f: impl FnOnce() -> T + Send + 'static) -> Self {
        let handle = thread::Builder::new().name(name.into()).spawn(f);
        if let Err(err) = &handle {
            error!("Failed to spawn task thread `{name}`: {err}");
        }

        Self {
            handle: handle.ok(),
        }
    }

    pub fn poll(&mut self) -> TaskResult<T> {
        let Some(handle) = &self.handle else {
            return TaskResult::Failed("task thread could not be started".into());
        };

        if !handle.is_finished() {
            return TaskResult::Pending;
        }

        match self.handle.take().map(JoinHandle::join) {
            Some(Ok(value)) => TaskResult::Completed(value),
            Some(Err(err)) => TaskResult::Failed(panic_message(err)),
            None => TaskResult::Failed("task already joined".into()),
        }
    }
}

impl<T: Send + 'static, E: Display + Send + 'static> TaskThread<Result<T, E>> {
    /// Flattens errors returned by the closure and panics into one message.
    /// Returns None while the thread is still running.
    pub fn poll_result(&mut self) -> Option<Result<T, String>> {
        match self.poll() {
            TaskResult::Completed(result) => Some(result.map_err(|err| err.to_string())),
            TaskResult::Failed(panic) => Some(Err(format!("task panicked: {panic}"))),
            TaskResult::Pending => None,
        }
    }
}

fn panic_message(err: Box<dyn Any + Send>) -> String {
    if let Some(err) = err.downcast_ref::<String>() {
        err.clone()
    } else if let Some(err) = err.downcast_ref::<&str>() {
        err.to_string()
    } else {
        format!("{err:?}")
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    fn wait<T: Send + 'static>(thread: &mut TaskThread<T>) -> TaskResult<T> {
        let start = Instant::now();
        loop {
            match thread.poll() {
                TaskResult::Pending if start.elapsed() < Duration::from_secs(5) => {
                    thread::sleep(Duration::from_millis(5))
                }
                result => return result,
            }
        }
    }

    #[test]
    fn completes() {
        let mut thread = TaskThread::spawn("test", || 7);
        assert!(matches!(wait(&mut thread), TaskResult::Completed(7)));
    }

    #[test]
    fn panic_is_reported() {
        let mut thread = TaskThread::spawn("test", || -> u32 { panic!("boom") });
        match wait(&mut thread) {
            TaskResult::Failed(msg) => assert_eq!(msg, "boom"),
            _ => panic!("expected a failure"),
        }
    }

    #[test]
    fn errors_are_flattened() {
        let mut thread = TaskThread::spawn("test", || Err::<(), _>("offline"));
        let start = Instant::now();
        let result = loop {
            if let Some(result) = thread.poll_result() {
                break result;
            }
            assert!(start.elapsed() < Duration::from_secs(5));
            thread::sleep(Duration::from_millis(5));
        };
        assert_eq!(result, Err("offline".to_string()));
    }
}
