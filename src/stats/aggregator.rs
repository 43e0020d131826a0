//! Report aggregation
//!
//! Collects worker reports in arrival order and provides the aggregate
//! [`Summary`] over them.
//!
//! # Example
//!
//! ```
//! use wordpulse::stats::ReportAggregator;
//! use wordpulse::worker::{Outcome, WorkerId, WorkerReport};
//! use std::path::PathBuf;
//!
//! let mut aggregator = ReportAggregator::new();
//! aggregator.add_report(WorkerReport {
//!     worker_id: WorkerId::new(100),
//!     path: PathBuf::from("a.txt"),
//!     outcome: Outcome::Counted(3),
//! });
//! aggregator.add_report(WorkerReport {
//!     worker_id: WorkerId::new(101),
//!     path: PathBuf::from("b.txt"),
//!     outcome: Outcome::FileNotFound,
//! });
//!
//! let summary = aggregator.summary();
//! assert_eq!(summary.total, 2);
//! assert_eq!(summary.succeeded, 1);
//! assert_eq!(summary.failed, 1);
//! ```

use super::Summary;
use crate::worker::WorkerReport;

/// Arrival-ordered collection of worker reports
#[derive(Debug, Default)]
pub struct ReportAggregator {
    reports: Vec<WorkerReport>,
}

impl ReportAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregator with room for `expected` reports
    pub fn with_capacity(expected: usize) -> Self {
        Self {
            reports: Vec::with_capacity(expected),
        }
    }

    /// Record one report
    pub fn add_report(&mut self, report: WorkerReport) {
        self.reports.push(report);
    }

    /// Number of reports received so far
    pub fn num_reports(&self) -> usize {
        self.reports.len()
    }

    /// Aggregate totals across all reports
    pub fn summary(&self) -> Summary {
        Summary::from_reports(&self.reports)
    }

    /// Reports in arrival order
    pub fn into_reports(self) -> Vec<WorkerReport> {
        self.reports
    }
}
