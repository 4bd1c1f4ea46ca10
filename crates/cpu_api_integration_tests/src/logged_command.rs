//! Utilities for managing and logging subprocess commands.
//!
//! This module provides the `LoggedCommand` struct, which wraps a subprocess,
//! collects its stdout and stderr, and mirrors both into a log file.

use std::{
    fs::File,
    io::Write as _,
    path::Path,
    process::{ExitStatus, Stdio},
    sync::{Arc, Mutex, PoisonError},
};

use anyhow::Context as _;
use tokio::{
    io::{AsyncRead, AsyncReadExt as _},
    process::{Child, Command},
    task::JoinHandle,
};

/// A struct for managing and logging subprocess commands.
pub struct LoggedCommand {
    /// The child process being managed.
    proc: Child,
    /// Handle for the task collecting stdout.
    stdout_handle: JoinHandle<Result<Vec<u8>, anyhow::Error>>,
    /// Handle for the task collecting stderr.
    stderr_handle: JoinHandle<Result<Vec<u8>, anyhow::Error>>,
}

impl LoggedCommand {
    /// Spawns `command` with piped stdout and stderr and starts collecting
    /// both.
    ///
    /// Everything the subprocess writes is also appended to `log_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the log file cannot be created or the subprocess
    /// cannot be spawned.
    pub fn new(mut command: Command, log_path: &Path) -> Result<Self, anyhow::Error> {
        let log = Arc::new(Mutex::new(
            File::create(log_path).context("open logfile failed")?,
        ));

        let mut proc = command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .context("spawn command failed")?;

        let stdout = proc.stdout.take().context("stdout is not piped")?;
        let stderr = proc.stderr.take().context("stderr is not piped")?;

        let stdout_handle = tokio::spawn(collect(Arc::clone(&log), stdout, "stdout"));
        let stderr_handle = tokio::spawn(collect(log, stderr, "stderr"));

        Ok(Self {
            proc,
            stdout_handle,
            stderr_handle,
        })
    }

    /// Waits for the subprocess to terminate and collects its output.
    ///
    /// Output is complete only once every process holding the subprocess's
    /// stdout and stderr has closed them, so this also waits for any
    /// children the subprocess left running.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the collecting tasks fail or if the process
    /// cannot be awaited.
    pub async fn wait_terminate(
        mut self,
    ) -> Result<(ExitStatus, Vec<u8>, Vec<u8>), anyhow::Error> {
        let status = self.proc.wait().await.context("wait command failed")?;
        let stdout = self
            .stdout_handle
            .await
            .context("stdout handle join failed")??;
        let stderr = self
            .stderr_handle
            .await
            .context("stderr handle join failed")??;
        Ok((status, stdout, stderr))
    }
}

async fn collect<R>(
    log: Arc<Mutex<File>>,
    mut stream: R,
    name: &'static str,
) -> Result<Vec<u8>, anyhow::Error>
where
    R: AsyncRead + Unpin,
{
    let mut output = vec![];
    let mut buf = vec![0; 4096];
    loop {
        let n = stream
            .read(&mut buf)
            .await
            .with_context(|| format!("read {name} failed"))?;
        if n == 0 {
            break;
        }

        let buf = &buf[..n];
        {
            let mut log = log.lock().unwrap_or_else(PoisonError::into_inner);
            log.write_all(buf).context("write logfile failed")?;
            log.flush().context("flush logfile failed")?;
        }
        output.extend_from_slice(buf);
    }
    Ok(output)
}
