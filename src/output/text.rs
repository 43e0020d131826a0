//! Human-readable text output

use crate::dispatcher::DispatchResult;
use crate::stats::Summary;
use crate::worker::{Outcome, WorkerReport};
use std::io::{self, Write};

/// Render the line for one worker report
pub fn format_report(report: &WorkerReport) -> String {
    let prefix = format!(
        "Child process {} for file {}",
        report.worker_id,
        report.path.display()
    );

    match &report.outcome {
        Outcome::Counted(words) => format!("{}: number of words is {}", prefix, words),
        Outcome::FileNotFound => format!("{}: does not exist", prefix),
        Outcome::Failed(reason) => format!("{}: could not be counted ({})", prefix, reason),
    }
}

/// Write one line per report, in the order given
pub fn write_reports<W: Write>(out: &mut W, reports: &[WorkerReport]) -> io::Result<()> {
    for report in reports {
        writeln!(out, "{}", format_report(report))?;
    }
    Ok(())
}

/// Write the three summary lines
pub fn write_summary<W: Write>(out: &mut W, summary: &Summary) -> io::Result<()> {
    writeln!(
        out,
        "Main process created {} child process(es) to count words in {} file(s).",
        summary.total, summary.succeeded
    )?;
    writeln!(out, "{} file(s) have been counted successfully!", summary.succeeded)?;
    writeln!(out, "{} file(s) did not exist.", summary.failed)?;
    Ok(())
}

/// Write a finished run: report lines, then the summary
pub fn write_results<W: Write>(out: &mut W, result: &DispatchResult) -> io::Result<()> {
    write_reports(out, &result.reports)?;
    write_summary(out, &result.summary)?;
    out.flush()
}

/// Print a finished run to stdout
pub fn print_results(result: &DispatchResult) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_results(&mut out, result)
}
