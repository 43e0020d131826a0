//! Configuration module
//!
//! Turns parsed CLI arguments into the run configuration. There are no
//! configuration files and no environment variables.

pub mod cli;

pub use cli::{Cli, RuntimeKind};

use crate::Result;
use anyhow::Context;
use std::path::PathBuf;

/// Complete run configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Input files, in command-line order
    pub files: Vec<PathBuf>,
    /// Isolation unit for workers
    pub runtime: RuntimeKind,
    /// Debug diagnostics on stderr
    pub debug: bool,
    /// Set when this process is itself a worker child
    pub worker_child: Option<PathBuf>,
}

impl Config {
    /// Build configuration from CLI arguments
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        cli.validate().context("Invalid command line")?;

        Ok(Self {
            files: cli.files.clone(),
            runtime: cli.runtime,
            debug: cli.debug,
            worker_child: cli.worker_child.clone(),
        })
    }

    /// Log level implied by the configuration
    pub fn log_level(&self) -> log::LevelFilter {
        if self.debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        }
    }
}
