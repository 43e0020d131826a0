//! Worker implementation
//!
//! A worker is the unit of execution that handles exactly one input file. It
//! opens the file, counts its words and produces exactly one [`WorkerReport`].
//! Where the worker runs (a thread, a child process) is decided by a
//! [`WorkerRuntime`](runtime::WorkerRuntime).
//!
//! # Lifecycle
//!
//! 1. **Dispatch**: the dispatcher hands the runtime a [`WorkItem`] and a report sender
//! 2. **Execution**: [`run`] opens the file and counts words
//! 3. **Report**: a [`ReportSlot`] delivers the [`Outcome`] exactly once
//!
//! # Example
//!
//! ```no_run
//! use wordpulse::worker::{self, Outcome, WorkItem};
//!
//! let item = WorkItem::new("notes.txt");
//! match worker::run(&item) {
//!     Outcome::Counted(words) => println!("{} words", words),
//!     Outcome::FileNotFound => println!("missing"),
//!     Outcome::Failed(reason) => println!("failed: {}", reason),
//! }
//! ```

pub mod process;
pub mod runtime;

pub use process::ProcessRuntime;
pub use runtime::{ThreadRuntime, WorkerRuntime};

use crate::counter;
use crossbeam::channel::Sender;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Reason recorded for a worker that exits without reporting
pub const ABNORMAL_EXIT: &str = "worker terminated abnormally";

/// One input file, owned by its worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    path: PathBuf,
}

impl WorkItem {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

/// Diagnostic identity of the thread or process that ran a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(u64);

impl WorkerId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Identity of a child process
    pub fn from_pid(pid: u32) -> Self {
        Self(pid as u64)
    }

    /// OS thread id of the calling thread
    #[cfg(target_os = "linux")]
    pub fn current_thread() -> Self {
        // SAFETY: gettid takes no arguments and cannot fail
        let tid = unsafe { libc::syscall(libc::SYS_gettid) };
        Self(tid as u64)
    }

    /// Process-unique id of the calling thread
    #[cfg(not(target_os = "linux"))]
    pub fn current_thread() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};

        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        thread_local! {
            static THREAD_ID: u64 = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        }
        Self(THREAD_ID.with(|id| *id))
    }

}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of counting one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The file was read to the end
    Counted(u64),
    /// The file could not be opened
    FileNotFound,
    /// The file was opened but counting did not finish
    Failed(String),
}

impl Outcome {
    /// Whether this outcome counts toward the succeeded total
    pub fn is_counted(&self) -> bool {
        matches!(self, Outcome::Counted(_))
    }
}

/// The single terminal message of one worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker_id: WorkerId,
    pub path: PathBuf,
    pub outcome: Outcome,
}

/// Count the words of one work item
///
/// The file handle lives only inside this call and is closed on every exit
/// path. Any open failure is reported as [`Outcome::FileNotFound`].
pub fn run(item: &WorkItem) -> Outcome {
    run_with_line_limit(item, usize::MAX)
}

/// [`run`] with the line buffer capped at `max_line_bytes`
pub(crate) fn run_with_line_limit(item: &WorkItem, max_line_bytes: usize) -> Outcome {
    let file = match File::open(item.path()) {
        Ok(file) => file,
        Err(e) => {
            log::debug!("open {} failed: {}", item.path().display(), e);
            return Outcome::FileNotFound;
        }
    };

    match counter::count_words_with_limit(BufReader::new(file), max_line_bytes) {
        Ok(words) => {
            log::debug!("{}: {} words", item.path().display(), words);
            Outcome::Counted(words)
        }
        Err(e) => {
            log::warn!("counting {} failed: {}", item.path().display(), e);
            Outcome::Failed(e.to_string())
        }
    }
}

/// Exactly-once delivery of a worker's report
///
/// Submitting consumes the slot. A slot dropped without a submission (for
/// example while a worker thread unwinds from a panic) delivers
/// `Failed(ABNORMAL_EXIT)` instead, so the collector always receives one
/// report per worker.
pub struct ReportSlot {
    worker_id: WorkerId,
    path: Option<PathBuf>,
    reports: Sender<WorkerReport>,
}

impl ReportSlot {
    pub fn new(worker_id: WorkerId, path: PathBuf, reports: Sender<WorkerReport>) -> Self {
        Self {
            worker_id,
            path: Some(path),
            reports,
        }
    }

    /// Deliver the outcome
    pub fn submit(mut self, outcome: Outcome) {
        self.deliver(outcome);
    }

    fn deliver(&mut self, outcome: Outcome) {
        let Some(path) = self.path.take() else {
            return;
        };

        let report = WorkerReport {
            worker_id: self.worker_id,
            path,
            outcome,
        };

        if let Err(e) = self.reports.send(report) {
            log::warn!("report collector closed, dropping report for {}", e.0.path.display());
        }
    }
}

impl Drop for ReportSlot {
    fn drop(&mut self) {
        if self.path.is_some() {
            self.deliver(Outcome::Failed(ABNORMAL_EXIT.to_string()));
        }
    }
}
