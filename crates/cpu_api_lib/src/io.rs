use std::io::{self, Write as _};
use std::os::fd::{AsFd as _, RawFd};

use nix::unistd;

use crate::error::CpuApiError;

pub const STDOUT_FD: RawFd = 1;

/// Flushes the buffered standard output and standard error streams.
pub fn flush_std() -> Result<(), CpuApiError> {
    io::stdout().flush()?;
    io::stderr().flush()?;
    Ok(())
}

/// Writes `buf` to descriptor 1 with a single `write(2)`, bypassing the
/// buffered standard output handle.
pub fn write_stdout_raw(buf: &[u8]) -> Result<usize, CpuApiError> {
    let stdout = io::stdout();
    Ok(unistd::write(stdout.as_fd(), buf)?)
}

/// Closes descriptor 1 of the calling process.
///
/// Pending buffered output is flushed first. Only this process's descriptor
/// table entry is released; the open file it referred to stays open for
/// every other process holding a copy.
///
/// Later writes through [`std::io::stdout`] are silently discarded, since
/// the standard library treats `EBADF` on standard output as success.
pub fn close_stdout() -> Result<(), CpuApiError> {
    io::stdout().flush()?;
    unistd::close(STDOUT_FD)?;
    Ok(())
}
