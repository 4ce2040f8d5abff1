//! A single auxiliary background job, isolated from the canvas.
//!
//! The job runs on its own thread and shares nothing with the drawing core.
//! Its outcome comes back exactly once through a oneshot channel that the UI
//! thread polls every frame.

use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use futures::channel::oneshot;
use thiserror::Error;

/// Terminal notification from a background job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    Finished,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkerError {
    #[error("a background job is already running")]
    AlreadyRunning,

    #[error("failed to spawn worker thread: {0}")]
    Spawn(String),
}

#[derive(Debug, Default)]
pub struct BackgroundWorker {
    receiver: Option<oneshot::Receiver<WorkerEvent>>,
    handle: Option<JoinHandle<()>>,
}

impl BackgroundWorker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a job has been started and its outcome not yet collected
    pub fn is_running(&self) -> bool {
        self.receiver.is_some()
    }

    /// Run `job` on a new thread. Errors and panics inside the job are both
    /// reported as `WorkerEvent::Failed`.
    pub fn start<F, E>(&mut self, name: &str, job: F) -> Result<(), WorkerError>
    where
        F: FnOnce() -> Result<(), E> + Send + 'static,
        E: Display,
    {
        if self.is_running() {
            log::warn!("Worker is already running");
            return Err(WorkerError::AlreadyRunning);
        }

        let (sender, receiver) = oneshot::channel();
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let event = match panic::catch_unwind(AssertUnwindSafe(job)) {
                    Ok(Ok(())) => WorkerEvent::Finished,
                    Ok(Err(err)) => WorkerEvent::Failed(err.to_string()),
                    Err(payload) => WorkerEvent::Failed(panic_message(payload.as_ref())),
                };
                // the receiving side may have been dropped; nobody is listening then
                let _ = sender.send(event);
            })
            .map_err(|err| WorkerError::Spawn(err.to_string()))?;

        log::info!("Started background task '{name}'");
        self.receiver = Some(receiver);
        self.handle = Some(handle);
        Ok(())
    }

    /// Non-blocking check for the job's outcome. Yields it exactly once.
    pub fn poll(&mut self) -> Option<WorkerEvent> {
        let receiver = self.receiver.as_mut()?;
        let event = match receiver.try_recv() {
            Ok(Some(event)) => event,
            Ok(None) => return None,
            Err(oneshot::Canceled) => WorkerEvent::Failed("worker exited without reporting".into()),
        };
        self.finish(event)
    }

    /// Block until the running job reports. Returns `None` when no job is
    /// running.
    pub fn wait(&mut self) -> Option<WorkerEvent> {
        let receiver = self.receiver.take()?;
        let event = futures::executor::block_on(receiver)
            .unwrap_or_else(|_| WorkerEvent::Failed("worker exited without reporting".into()));
        self.finish(event)
    }

    fn finish(&mut self, event: WorkerEvent) -> Option<WorkerEvent> {
        self.receiver = None;
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        match &event {
            WorkerEvent::Finished => log::info!("Background task finished"),
            WorkerEvent::Failed(message) => log::error!("Background task failed: {message}"),
        }
        Some(event)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
