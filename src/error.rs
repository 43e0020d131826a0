//! Error types
//!
//! Per-file problems are never errors at the dispatch level: a missing file is an
//! [`Outcome`](crate::worker::Outcome) and a read failure is folded into one.
//! Only the errors below cross component boundaries.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure while counting words in an already opened stream
#[derive(Debug, Error)]
pub enum CountError {
    /// Reading from the stream failed
    #[error("read failed: {0}")]
    Io(#[from] io::Error),

    /// The line buffer could not grow to hold the current line
    #[error("could not grow line buffer to {requested} bytes")]
    AllocationFailure { requested: usize },
}

/// Failure of the dispatcher itself
///
/// Any of these aborts the whole run; no summary is produced.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The runtime could not create a worker (thread or process table full,
    /// missing executable, ...)
    #[error("failed to spawn worker for {}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The collection point closed before every worker reported
    #[error("expected {expected} worker reports, received {received}")]
    WorkerLost { expected: usize, received: usize },
}
