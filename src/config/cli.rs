//! CLI argument parsing using clap

use clap::{Parser, ValueEnum};
use std::fmt;
use std::path::PathBuf;

/// Isolation unit workers run in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RuntimeKind {
    /// One OS thread per file (default)
    #[default]
    Thread,
    /// One child process per file
    Process,
}

impl fmt::Display for RuntimeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RuntimeKind::Thread => write!(f, "thread"),
            RuntimeKind::Process => write!(f, "process"),
        }
    }
}

/// wordpulse - count words in many files at once, one worker per file
#[derive(Parser, Debug)]
#[command(name = "wordpulse")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Files to count
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Worker isolation unit: thread or process
    #[arg(long, value_enum, default_value = "thread")]
    pub runtime: RuntimeKind,

    /// Print debug diagnostics to stderr
    #[arg(long)]
    pub debug: bool,

    /// Run a single worker for PATH and print its report (used by the process runtime)
    #[arg(long = "worker-child", value_name = "PATH", hide = true, allow_hyphen_values = true)]
    pub worker_child: Option<PathBuf>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate CLI arguments
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.worker_child.is_some() && !self.files.is_empty() {
            anyhow::bail!("--worker-child takes exactly one path and no positional files");
        }

        Ok(())
    }
}
