//! Worker dispatch and report collection
//!
//! The dispatcher launches one worker per input path on a [`WorkerRuntime`],
//! launching all of them before waiting on any. Reports funnel into a single
//! multi-producer channel; every worker owns a sender clone and the dispatcher
//! drains the receiver until the last sender is gone, which happens only once
//! every worker has reported. Reports are kept in arrival order.
//!
//! A spawn failure aborts the run: workers already launched are torn down and
//! the error is returned without a summary.

use crate::error::DispatchError;
use crate::stats::{ReportAggregator, Summary};
use crate::worker::{WorkItem, WorkerReport, WorkerRuntime};
use crossbeam::channel::unbounded;
use std::path::PathBuf;

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct DispatchResult {
    /// Reports in arrival order
    pub reports: Vec<WorkerReport>,
    pub summary: Summary,
}

/// Fans out one worker per path and aggregates their reports
pub struct Dispatcher<R> {
    runtime: R,
}

impl<R: WorkerRuntime> Dispatcher<R> {
    pub fn new(runtime: R) -> Self {
        Self { runtime }
    }

    /// Count every path concurrently and block until all workers reported
    pub fn dispatch<I, P>(&self, paths: I) -> Result<DispatchResult, DispatchError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let (tx, rx) = unbounded();
        let mut handles = Vec::new();

        // Fan out
        for path in paths {
            match self.runtime.spawn(WorkItem::new(path), tx.clone()) {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    drop(tx);
                    log::debug!("fan-out failed after {} workers, tearing down", handles.len());
                    for handle in handles {
                        self.runtime.abort(handle);
                    }
                    return Err(e);
                }
            }
        }
        drop(tx);

        let spawned = handles.len();
        log::debug!("spawned {} workers", spawned);

        // Drain until every worker's sender is gone
        let mut aggregator = ReportAggregator::with_capacity(spawned);
        for report in rx.iter() {
            log::debug!(
                "report {}/{} from worker {}",
                aggregator.num_reports() + 1,
                spawned,
                report.worker_id
            );
            aggregator.add_report(report);
        }

        for handle in handles {
            self.runtime.join(handle);
        }

        if aggregator.num_reports() != spawned {
            return Err(DispatchError::WorkerLost {
                expected: spawned,
                received: aggregator.num_reports(),
            });
        }

        let summary = aggregator.summary();
        Ok(DispatchResult {
            reports: aggregator.into_reports(),
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::{Outcome, ProcessRuntime, ReportSlot, ThreadRuntime, WorkerId};
    use crossbeam::channel::Sender;
    use std::collections::{HashMap, HashSet};
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread::{self, JoinHandle};
    use tempfile::TempDir;

    fn dispatch_threads(paths: Vec<PathBuf>) -> DispatchResult {
        Dispatcher::new(ThreadRuntime).dispatch(paths).unwrap()
    }

    fn counts_by_path(result: &DispatchResult) -> HashMap<PathBuf, Outcome> {
        result
            .reports
            .iter()
            .map(|r| (r.path.clone(), r.outcome.clone()))
            .collect()
    }

    #[test]
    fn test_empty_path_list() {
        let result = dispatch_threads(Vec::new());
        assert!(result.reports.is_empty());
        assert_eq!(result.summary, Summary { total: 0, succeeded: 0, failed: 0 });
    }

    #[test]
    fn test_existing_and_missing() {
        let temp_dir = TempDir::new().unwrap();
        let exists = temp_dir.path().join("exists.txt");
        let missing = temp_dir.path().join("missing.txt");
        std::fs::write(&exists, "a b c").unwrap();

        let result = dispatch_threads(vec![exists.clone(), missing.clone()]);
        let by_path = counts_by_path(&result);

        assert_eq!(result.reports.len(), 2);
        assert_eq!(by_path[&exists], Outcome::Counted(3));
        assert_eq!(by_path[&missing], Outcome::FileNotFound);
        assert_eq!(result.summary, Summary { total: 2, succeeded: 1, failed: 1 });
    }

    #[test]
    fn test_some_missing() {
        let temp_dir = TempDir::new().unwrap();
        let mut paths = Vec::new();
        for i in 0..7 {
            let path = temp_dir.path().join(format!("file{}.txt", i));
            if i % 3 != 0 {
                std::fs::write(&path, "word ".repeat(i)).unwrap();
            }
            paths.push(path);
        }

        let result = dispatch_threads(paths);
        // i = 0, 3, 6 are missing
        assert_eq!(result.summary, Summary { total: 7, succeeded: 4, failed: 3 });
    }

    #[test]
    fn test_counts_match_independent_split() {
        let temp_dir = TempDir::new().unwrap();
        let contents = ["", "   \n\t \n", "hello world\n", "one\ttwo  three\nfour"];
        let paths: Vec<_> = contents
            .iter()
            .enumerate()
            .map(|(i, content)| {
                let path = temp_dir.path().join(format!("{}.txt", i));
                std::fs::write(&path, content).unwrap();
                path
            })
            .collect();

        let result = dispatch_threads(paths.clone());
        let by_path = counts_by_path(&result);

        for (path, content) in paths.iter().zip(contents.iter()) {
            let expected = content
                .split(|c| c == ' ' || c == '\t' || c == '\n')
                .filter(|s| !s.is_empty())
                .count() as u64;
            assert_eq!(by_path[path], Outcome::Counted(expected));
        }
        assert_eq!(result.summary.succeeded, contents.len());
    }

    #[test]
    fn test_duplicate_paths_each_get_a_worker() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dup.txt");
        std::fs::write(&path, "x y").unwrap();

        let result = dispatch_threads(vec![path.clone(), path.clone(), path]);
        assert_eq!(result.reports.len(), 3);
        assert!(result.reports.iter().all(|r| r.outcome == Outcome::Counted(2)));
    }

    #[test]
    fn test_hundred_workers_no_lost_reports() {
        let temp_dir = TempDir::new().unwrap();
        let paths: Vec<_> = (0..100)
            .map(|i| {
                let path = temp_dir.path().join(format!("f{:03}.txt", i));
                std::fs::write(&path, "w ".repeat(i)).unwrap();
                path
            })
            .collect();

        let result = dispatch_threads(paths.clone());

        assert_eq!(result.reports.len(), 100);
        let seen: HashSet<_> = result.reports.iter().map(|r| r.path.clone()).collect();
        assert_eq!(seen, paths.iter().cloned().collect::<HashSet<_>>());

        let by_path = counts_by_path(&result);
        for (i, path) in paths.iter().enumerate() {
            assert_eq!(by_path[path], Outcome::Counted(i as u64));
        }
        assert_eq!(result.summary, Summary { total: 100, succeeded: 100, failed: 0 });
    }

    #[test]
    fn test_rerun_is_stable() {
        let temp_dir = TempDir::new().unwrap();
        let mut paths = vec![temp_dir.path().join("gone.txt")];
        for i in 0..5 {
            let path = temp_dir.path().join(format!("{}.txt", i));
            std::fs::write(&path, "a\tb\nc ".repeat(i + 1)).unwrap();
            paths.push(path);
        }

        let first = dispatch_threads(paths.clone());
        let second = dispatch_threads(paths);

        assert_eq!(counts_by_path(&first), counts_by_path(&second));
        assert_eq!(first.summary, second.summary);
    }

    #[test]
    fn test_process_spawn_failure_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let dispatcher = Dispatcher::new(ProcessRuntime::new(temp_dir.path().join("nope")));

        let err = dispatcher.dispatch(vec!["a.txt", "b.txt"]).unwrap_err();
        assert!(matches!(err, DispatchError::Spawn { .. }));
    }

    /// Thread runtime that refuses to spawn past a limit and counts teardowns
    struct LimitedRuntime {
        limit: usize,
        spawned: Arc<AtomicUsize>,
        aborted: Arc<AtomicUsize>,
    }

    impl WorkerRuntime for LimitedRuntime {
        type Handle = JoinHandle<()>;

        fn spawn(
            &self,
            item: WorkItem,
            reports: Sender<WorkerReport>,
        ) -> Result<Self::Handle, DispatchError> {
            if self.spawned.fetch_add(1, Ordering::SeqCst) >= self.limit {
                return Err(DispatchError::Spawn {
                    path: item.into_path(),
                    source: io::Error::new(io::ErrorKind::WouldBlock, "thread table full"),
                });
            }
            ThreadRuntime.spawn(item, reports)
        }

        fn join(&self, handle: Self::Handle) {
            ThreadRuntime.join(handle);
        }

        fn abort(&self, handle: Self::Handle) {
            self.aborted.fetch_add(1, Ordering::SeqCst);
            ThreadRuntime.abort(handle);
        }
    }

    #[test]
    fn test_spawn_failure_tears_down_launched_workers() {
        let spawned = Arc::new(AtomicUsize::new(0));
        let aborted = Arc::new(AtomicUsize::new(0));
        let dispatcher = Dispatcher::new(LimitedRuntime {
            limit: 2,
            spawned: Arc::clone(&spawned),
            aborted: Arc::clone(&aborted),
        });

        let err = dispatcher
            .dispatch(vec!["a.txt", "b.txt", "c.txt", "d.txt"])
            .unwrap_err();

        match err {
            DispatchError::Spawn { path, .. } => assert_eq!(path, PathBuf::from("c.txt")),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(aborted.load(Ordering::SeqCst), 2);
        // d.txt was never attempted
        assert_eq!(spawned.load(Ordering::SeqCst), 3);
    }

    /// Runtime whose workers panic before reporting
    struct PanickingRuntime;

    impl WorkerRuntime for PanickingRuntime {
        type Handle = JoinHandle<()>;

        fn spawn(
            &self,
            item: WorkItem,
            reports: Sender<WorkerReport>,
        ) -> Result<Self::Handle, DispatchError> {
            let path = item.path().to_path_buf();
            thread::Builder::new()
                .spawn(move || {
                    let _slot = ReportSlot::new(WorkerId::current_thread(), item.into_path(), reports);
                    panic!("worker crashed mid-read");
                })
                .map_err(|source| DispatchError::Spawn { path, source })
        }

        fn join(&self, handle: Self::Handle) {
            let _ = handle.join();
        }

        fn abort(&self, handle: Self::Handle) {
            self.join(handle);
        }
    }

    #[test]
    fn test_panicking_workers_still_report() {
        let result = Dispatcher::new(PanickingRuntime)
            .dispatch(vec!["a.txt", "b.txt"])
            .unwrap();

        assert_eq!(result.reports.len(), 2);
        assert_eq!(result.summary, Summary { total: 2, succeeded: 0, failed: 2 });
    }
}
