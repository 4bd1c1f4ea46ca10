//! Test runner for integration tests.
//!
//! This module provides the `Runner` struct, which prepares a per-test
//! working directory and runs the `cpu-api` binary inside it.

use std::{
    ffi::OsStr,
    fs,
    path::PathBuf,
    process::{self, ExitStatus},
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use anyhow::{Context as _, bail};
use tokio::{process::Command, time};

use crate::LoggedCommand;

/// A global atomic counter for assigning unique runner IDs.
static RUNNER_ID: AtomicUsize = AtomicUsize::new(0);

/// Represents a test runner for integration tests.
pub struct Runner {
    /// The unique ID of the runner.
    id: usize,
    /// The `cpu-api` binary under test.
    program: PathBuf,
    /// The working directory for the test.
    workspace_dir: PathBuf,
    /// How many times the binary has been run.
    run_count: usize,
}

/// Everything one run of the binary produced.
#[derive(Debug)]
pub struct Output {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl Output {
    /// Returns the stdout lines.
    #[must_use]
    pub fn lines(&self) -> Vec<&str> {
        self.stdout.lines().collect()
    }
}

impl Runner {
    /// Creates a new `Runner` instance.
    ///
    /// The working directory is
    /// `<target_tmpdir>/<module path components>/<fn_name>`, emptied first.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be created.
    pub fn new(
        program: &str,
        target_tmpdir: &str,
        module_path: &str,
        fn_name: &str,
    ) -> Result<Self, anyhow::Error> {
        let id = RUNNER_ID.fetch_add(1, Ordering::Relaxed);

        let mut workspace_dir = PathBuf::from(target_tmpdir);
        for component in module_path.split("::") {
            workspace_dir.push(component);
        }
        workspace_dir.push(fn_name);

        let _ = fs::remove_dir_all(&workspace_dir);
        fs::create_dir_all(&workspace_dir).context("create workspace failed")?;

        Ok(Self {
            id,
            program: PathBuf::from(program),
            workspace_dir,
            run_count: 0,
        })
    }

    /// Creates `name` in the working directory with the given contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_file(&self, name: &str, contents: &str) -> Result<PathBuf, anyhow::Error> {
        let path = self.workspace_dir.join(name);
        fs::write(&path, contents).with_context(|| format!("write {name} failed"))?;
        Ok(path)
    }

    /// Runs the binary with `args` in the working directory and waits until
    /// it and every process it forked have closed their output.
    ///
    /// # Errors
    ///
    /// Returns an error if the binary cannot be run or does not finish within
    /// `timeout`.
    pub async fn run<I, S>(&mut self, args: I, timeout: Duration) -> Result<Output, anyhow::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let run_id = self.run_count;
        self.run_count += 1;

        let log_path = self.workspace_dir.join(format!(
            "cpu-api.{}.{}.{}.out",
            process::id(),
            self.id,
            run_id
        ));

        let mut command = Command::new(&self.program);
        command.args(args).current_dir(&self.workspace_dir);

        let proc = LoggedCommand::new(command, &log_path)?;
        let Ok(res) = time::timeout(timeout, proc.wait_terminate()).await else {
            bail!("cpu-api did not finish within {timeout:?}");
        };
        let (status, stdout, stderr) = res?;

        let output = Output {
            status,
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        };
        print!("{}", output.stdout);
        eprint!("{}", output.stderr);
        Ok(output)
    }
}
