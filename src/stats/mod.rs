//! Run statistics
//!
//! The [`Summary`] is derived data: it is always recomputed from the full
//! report set and does not depend on the order reports arrived in.

pub mod aggregator;

pub use aggregator::ReportAggregator;

use crate::worker::WorkerReport;

/// Totals over all worker reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Workers spawned
    pub total: usize,
    /// Files counted to the end
    pub succeeded: usize,
    /// Files missing or not readable
    pub failed: usize,
}

impl Summary {
    pub fn from_reports(reports: &[WorkerReport]) -> Self {
        let succeeded = reports.iter().filter(|r| r.outcome.is_counted()).count();
        Self {
            total: reports.len(),
            succeeded,
            failed: reports.len() - succeeded,
        }
    }
}
