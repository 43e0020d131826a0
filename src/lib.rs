//! wordpulse - concurrent per-file word counter
//!
//! wordpulse counts whitespace-delimited words in a list of files, running one
//! isolated worker per file and aggregating the per-file reports into a summary.
//!
//! # Architecture
//!
//! - **Counter**: line-by-line word counting over any buffered stream
//! - **Workers**: one per input file, isolated in a thread or a child process
//! - **Dispatcher**: fans workers out, collects every report, builds the summary
//! - **Output**: the per-file lines and the three summary lines

pub mod config;
pub mod counter;
pub mod dispatcher;
pub mod error;
pub mod output;
pub mod stats;
pub mod worker;

// Re-export commonly used types
pub use config::Config;
pub use dispatcher::{DispatchResult, Dispatcher};
pub use stats::Summary;
pub use worker::{Outcome, WorkItem, WorkerId, WorkerReport};

/// Result type used throughout wordpulse
pub type Result<T> = anyhow::Result<T>;
