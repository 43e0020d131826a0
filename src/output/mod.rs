//! Output formatting
//!
//! Plain text on stdout: one line per worker report, then the summary.

pub mod text;
