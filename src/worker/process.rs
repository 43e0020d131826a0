//! Process-per-worker runtime
//!
//! Each worker runs in a child process: the current executable relaunched with
//! `--worker-child=<path>` (see [`worker_child_arg`]). The child counts the file, prints its
//! [`Outcome`] as a single JSON line on stdout and exits with status 0 for a
//! counted file or 1 otherwise. A reaper thread in the parent waits for the
//! child, parses the line and delivers the report under the child's PID.

use super::{ReportSlot, WorkItem, WorkerId, WorkerReport, Outcome};
use super::runtime::WorkerRuntime;
use crate::error::DispatchError;
use crate::Result;
use anyhow::Context;
use crossbeam::channel::Sender;
use std::ffi::OsString;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

/// Hidden CLI flag that switches the executable into worker-child mode
pub const WORKER_CHILD_FLAG: &str = "--worker-child";

/// One child process per worker
#[derive(Debug, Clone)]
pub struct ProcessRuntime {
    executable: PathBuf,
}

/// Parent-side handle of a worker process
///
/// The `Child` is shared with the reaper thread. Waiting and killing both go
/// through the mutex, and `Child::kill` does nothing once the child was reaped,
/// so a teardown can never signal a recycled pid.
pub struct ProcessHandle {
    pid: u32,
    child: Arc<Mutex<Child>>,
    reaper: JoinHandle<()>,
}

impl ProcessRuntime {
    /// Runtime launching `executable` as the worker binary
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Runtime relaunching the running executable
    pub fn current_exe() -> Result<Self> {
        let executable = std::env::current_exe()
            .context("Failed to get current executable path")?;
        Ok(Self::new(executable))
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

/// Single `--worker-child=<path>` argument
///
/// Flag and value travel as one argument so a path starting with `-` is never
/// parsed as an option by the child. Built from the `OsStr` so non-UTF-8 paths
/// survive.
pub fn worker_child_arg(path: &Path) -> OsString {
    let mut arg = OsString::from(WORKER_CHILD_FLAG);
    arg.push("=");
    arg.push(path.as_os_str());
    arg
}

impl WorkerRuntime for ProcessRuntime {
    type Handle = ProcessHandle;

    fn spawn(
        &self,
        item: WorkItem,
        reports: Sender<WorkerReport>,
    ) -> std::result::Result<Self::Handle, DispatchError> {
        let path = item.into_path();

        let mut child = Command::new(&self.executable)
            .arg(worker_child_arg(&path))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| DispatchError::Spawn {
                path: path.clone(),
                source,
            })?;

        let pid = child.id();
        log::debug!("worker process {} started for {}", pid, path.display());

        let stdout = child.stdout.take();
        let child = Arc::new(Mutex::new(child));
        let reaper_child = Arc::clone(&child);

        let slot = ReportSlot::new(WorkerId::from_pid(pid), path.clone(), reports);
        let reaper = thread::Builder::new()
            .name(format!("wordpulse-reaper-{}", pid))
            .spawn(move || {
                let outcome = reap(&reaper_child, stdout);
                slot.submit(outcome);
            });

        match reaper {
            Ok(reaper) => Ok(ProcessHandle { pid, child, reaper }),
            Err(source) => {
                terminate(&child);
                Err(DispatchError::Spawn { path, source })
            }
        }
    }

    fn join(&self, handle: Self::Handle) {
        if handle.reaper.join().is_err() {
            log::warn!("reaper for worker process {} panicked", handle.pid);
        }
    }

    fn abort(&self, handle: Self::Handle) {
        terminate(&handle.child);
        self.join(handle);
    }
}

fn lock_child(child: &Mutex<Child>) -> MutexGuard<'_, Child> {
    child.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Kill a worker process unless it was already reaped, then reap it
fn terminate(child: &Mutex<Child>) {
    let mut child = lock_child(child);
    if let Err(e) = child.kill() {
        log::debug!("kill of worker process {} skipped: {}", child.id(), e);
    }
    if let Err(e) = child.wait() {
        log::warn!("waiting for worker process {} failed: {}", child.id(), e);
    }
}

/// Wait for a worker process and turn what it printed into an outcome
fn reap(child: &Mutex<Child>, stdout: Option<ChildStdout>) -> Outcome {
    // Read without the lock; EOF arrives when the child exits or is killed
    let mut captured = Vec::new();
    if let Some(mut stdout) = stdout {
        if let Err(e) = stdout.read_to_end(&mut captured) {
            log::warn!("reading worker process output failed: {}", e);
        }
    }

    let (pid, status) = {
        let mut child = lock_child(child);
        let pid = child.id();
        match child.wait() {
            Ok(status) => (pid, status),
            Err(e) => return Outcome::Failed(format!("waiting for worker process failed: {}", e)),
        }
    };

    match parse_report_line(&captured) {
        Some(outcome) => {
            if status.success() != outcome.is_counted() {
                log::warn!(
                    "worker process {} exit status {} disagrees with its report",
                    pid,
                    status
                );
            }
            outcome
        }
        None => Outcome::Failed(format!(
            "worker process exited with {} without a report",
            status
        )),
    }
}

/// Parse the last non-empty stdout line of a worker process
pub fn parse_report_line(stdout: &[u8]) -> Option<Outcome> {
    let text = std::str::from_utf8(stdout).ok()?;
    let line = text.lines().rev().find(|line| !line.trim().is_empty())?;
    serde_json::from_str(line.trim()).ok()
}

/// Worker-child entry point: count `path` and write the report line to `out`
pub fn run_child<W: Write>(path: &Path, out: &mut W) -> Result<Outcome> {
    let outcome = super::run(&WorkItem::new(path));

    serde_json::to_writer(&mut *out, &outcome).context("Failed to encode worker report")?;
    writeln!(out).context("Failed to write worker report")?;
    out.flush().context("Failed to flush worker report")?;

    Ok(outcome)
}

/// Exit status a worker child uses for `outcome`
pub fn exit_code(outcome: &Outcome) -> i32 {
    if outcome.is_counted() {
        0
    } else {
        1
    }
}
