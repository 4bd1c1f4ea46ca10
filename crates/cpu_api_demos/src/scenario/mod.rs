//! The demonstrations. Each one forks at least once and prints what every
//! process observes to standard output.
//!
//! A scenario returns in every process that reaches its end (parent and, for
//! some scenarios, children too); the binary then exits that process.

use std::{io, path::PathBuf};

use cpu_api_lib::{
    error::CpuApiError,
    process::{self, JoinHandle},
};

use crate::config::{Config, ManualWaitMode, Scenario};

pub mod close_stdout;
pub mod exec;
pub mod file_position;
pub mod manual_wait;
pub mod pipe;
pub mod wait_no_child;
pub mod wait_pid;

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("cannot fork child process: {err}")]
    Fork { err: CpuApiError },
    #[error("cannot wait child process: {err}")]
    Wait { err: CpuApiError },
    #[error("cannot open '{}': {}", path.display(), err)]
    OpenFile { path: PathBuf, err: io::Error },
    #[error("cannot read '{}': {}", path.display(), err)]
    ReadFile { path: PathBuf, err: io::Error },
    #[error("cannot create pipe: {err}")]
    CreatePipe { err: CpuApiError },
    #[error("pipe transfer failed: {err}")]
    PipeIo { err: CpuApiError },
    #[error("cannot close standard output: {err}")]
    CloseStdout { err: CpuApiError },
}

impl ScenarioError {
    fn fork(err: CpuApiError) -> Self {
        Self::Fork { err }
    }

    fn wait(err: CpuApiError) -> Self {
        Self::Wait { err }
    }

    fn pipe_io(err: impl Into<CpuApiError>) -> Self {
        Self::PipeIo { err: err.into() }
    }
}

/// Forks the calling process.
fn fork() -> Result<JoinHandle, ScenarioError> {
    // The demonstrations run on the main thread of a process that never
    // spawns others.
    unsafe { process::fork() }.map_err(ScenarioError::fork)
}

/// Runs the scenario selected by `config`.
pub fn run(config: &Config) -> Result<(), ScenarioError> {
    match config.scenario {
        Scenario::FilePosition => file_position::run(&config.file_path, config.open_timing),
        Scenario::ManualWait => match config.wait_mode {
            ManualWaitMode::Naive => {
                manual_wait::run_naive(config.delay.unwrap_or(manual_wait::DEFAULT_DELAY))
            }
            ManualWaitMode::Synchronized => manual_wait::run_synchronized(),
        },
        Scenario::Exec => exec::run(&config.exec_path, &config.exec_argv),
        Scenario::WaitNoChild => wait_no_child::run(),
        Scenario::WaitPid => wait_pid::run(config.delay.unwrap_or(wait_pid::DEFAULT_DELAY)),
        Scenario::CloseStdout => close_stdout::run(),
        Scenario::Pipe => pipe::run(config.message.as_bytes()),
    }
}
