//! Worker runtimes
//!
//! A runtime decides what isolation unit a worker runs in. Every runtime must
//! guarantee that each successfully spawned worker delivers exactly one report
//! on the sender it was given, whatever way the worker exits.

use super::{ReportSlot, WorkItem, WorkerId, WorkerReport};
use crate::error::DispatchError;
use crossbeam::channel::Sender;
use std::thread::{self, JoinHandle};

/// Abstraction over the execution unit of a worker (thread, process)
pub trait WorkerRuntime {
    /// Handle kept by the dispatcher until the worker is reaped
    type Handle: Send;

    /// Start one worker for `item`
    ///
    /// Fails only when the execution unit itself cannot be created.
    fn spawn(
        &self,
        item: WorkItem,
        reports: Sender<WorkerReport>,
    ) -> Result<Self::Handle, DispatchError>;

    /// Wait for a worker to finish after its report was received
    fn join(&self, handle: Self::Handle);

    /// Tear down a worker after fan-out failed part way
    fn abort(&self, handle: Self::Handle);
}

/// One OS thread per worker
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRuntime;

impl WorkerRuntime for ThreadRuntime {
    type Handle = JoinHandle<()>;

    fn spawn(
        &self,
        item: WorkItem,
        reports: Sender<WorkerReport>,
    ) -> Result<Self::Handle, DispatchError> {
        let path = item.path().to_path_buf();

        thread::Builder::new()
            .name("wordpulse-worker".to_string())
            .spawn(move || {
                let slot = ReportSlot::new(
                    WorkerId::current_thread(),
                    item.path().to_path_buf(),
                    reports,
                );
                let outcome = super::run(&item);
                slot.submit(outcome);
            })
            .map_err(|source| DispatchError::Spawn { path, source })
    }

    fn join(&self, handle: Self::Handle) {
        if handle.join().is_err() {
            // The report slot already recorded the failure
            log::warn!("worker thread panicked");
        }
    }

    fn abort(&self, handle: Self::Handle) {
        // Threads cannot be cancelled; file IO is bounded so waiting is enough
        self.join(handle);
    }
}
