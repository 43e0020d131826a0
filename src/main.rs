//! wordpulse CLI entry point

use anyhow::{Context, Result};
use wordpulse::config::{Cli, Config, RuntimeKind};
use wordpulse::output::text::print_results;
use wordpulse::worker::{process, ProcessRuntime, ThreadRuntime};
use wordpulse::Dispatcher;
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    let config = Config::from_cli(&cli)?;

    init_logging(&config);

    match config.worker_child {
        Some(ref path) => run_worker_child(path),
        None => run_dispatch(&config),
    }
}

/// Route `log` output to stderr so stdout carries only the report lines
fn init_logging(config: &Config) {
    env_logger::Builder::new()
        .filter_level(config.log_level())
        .target(env_logger::Target::Stderr)
        .init();
}

/// Count all configured files and print reports plus summary
fn run_dispatch(config: &Config) -> Result<()> {
    log::debug!(
        "dispatching {} file(s) on the {} runtime",
        config.files.len(),
        config.runtime
    );

    let result = match config.runtime {
        RuntimeKind::Thread => Dispatcher::new(ThreadRuntime).dispatch(config.files.iter().cloned()),
        RuntimeKind::Process => {
            let runtime = ProcessRuntime::current_exe()?;
            log::debug!("worker executable: {}", runtime.executable().display());
            Dispatcher::new(runtime).dispatch(config.files.iter().cloned())
        }
    }
    .context("Failed to dispatch workers")?;

    print_results(&result).context("Failed to write results")?;

    Ok(())
}

/// Worker-child mode: count one file, print the report line, exit with its status
fn run_worker_child(path: &Path) -> Result<()> {
    let stdout = std::io::stdout();
    let outcome = process::run_child(path, &mut stdout.lock())?;
    std::process::exit(process::exit_code(&outcome));
}
