use std::{
    convert::Infallible,
    ffi::{CString, OsStr},
    fmt,
    os::unix::ffi::OsStrExt as _,
    path::Path,
};

use nix::{
    sys::{
        signal::{self, SigHandler, Signal},
        wait::{self, WaitStatus},
    },
    unistd::{self, ForkResult, Pid},
};

use crate::{error::CpuApiError, io};

/// Identifier of a live or not yet reaped process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcId(Pid);

impl ProcId {
    #[must_use]
    pub fn from_raw(pid: i32) -> Self {
        Self(Pid::from_raw(pid))
    }

    #[must_use]
    pub fn get(self) -> i32 {
        self.0.as_raw()
    }
}

impl fmt::Display for ProcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Represents the exit status of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// The process called `exit` with the given code.
    Exited(i32),
    /// The process was terminated by a signal, possibly leaving a core dump.
    Signaled { signal: Signal, core_dumped: bool },
}

impl ExitStatus {
    fn from_wait_status(status: WaitStatus) -> Option<(ProcId, Self)> {
        match status {
            WaitStatus::Exited(pid, code) => Some((ProcId(pid), Self::Exited(code))),
            WaitStatus::Signaled(pid, signal, core_dumped) => Some((
                ProcId(pid),
                Self::Signaled {
                    signal,
                    core_dumped,
                },
            )),
            _ => None,
        }
    }

    /// Checks if the process exited successfully.
    #[must_use]
    pub fn success(&self) -> bool {
        matches!(self, Self::Exited(0))
    }

    /// Returns the exit code of the process, if it exited normally.
    #[must_use]
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Exited(code) => Some(*code),
            Self::Signaled { .. } => None,
        }
    }

    /// Returns the status word in the encoding `wait(2)` stores through its
    /// status pointer.
    #[must_use]
    pub fn raw(&self) -> i32 {
        match self {
            Self::Exited(code) => (code & 0xff) << 8,
            Self::Signaled {
                signal,
                core_dumped,
            } => (*signal as i32) | (i32::from(*core_dumped) << 7),
        }
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "exit status: {code}"),
            Self::Signaled {
                signal,
                core_dumped: false,
            } => write!(f, "signal: {signal}"),
            Self::Signaled {
                signal,
                core_dumped: true,
            } => write!(f, "signal: {signal} (core dumped)"),
        }
    }
}

/// Represents a child process.
#[derive(Debug)]
pub struct Child {
    pid: ProcId,
}

impl Child {
    /// Returns the process ID of the child process.
    #[must_use]
    pub fn id(&self) -> ProcId {
        self.pid
    }

    /// Waits for this specific child to exit and returns its exit status.
    pub fn wait(&mut self) -> Result<ExitStatus, CpuApiError> {
        wait_pid(self.pid)
    }
}

/// Represents a handle to a forked process, indicating whether it is the parent
/// or child process.
#[derive(Debug)]
pub enum JoinHandle {
    Parent { child: Child },
    Child,
}

impl JoinHandle {
    /// Converts the `JoinHandle` into an `Option<Child>`, returning
    /// `Some(child)` if it is the parent, or `None` if it is the child.
    #[must_use]
    pub fn into_parent(self) -> Option<Child> {
        match self {
            Self::Parent { child } => Some(child),
            Self::Child => None,
        }
    }

    /// Checks if the handle is for the child process.
    #[must_use]
    pub fn is_child(&self) -> bool {
        matches!(self, Self::Child)
    }
}

/// Forks the current process, creating a new child process.
///
/// Buffered standard output and standard error are flushed first, so that
/// pending bytes are not written twice (once by each process).
///
/// # Safety
///
/// The calling process must be single-threaded. In a multi-threaded process
/// the child may only call async-signal-safe functions until it execs or
/// exits, which the rest of this crate does not guarantee.
pub unsafe fn fork() -> Result<JoinHandle, CpuApiError> {
    io::flush_std()?;
    match unsafe { unistd::fork() }? {
        ForkResult::Parent { child } => Ok(JoinHandle::Parent {
            child: Child { pid: ProcId(child) },
        }),
        ForkResult::Child => Ok(JoinHandle::Child),
    }
}

/// Returns the process ID of the current process.
#[must_use]
pub fn id() -> ProcId {
    ProcId(unistd::getpid())
}

/// Replaces the current process image with the program at `path`.
///
/// `argv` is passed as is, so its first element becomes the new program's
/// `argv[0]`. `SIGPIPE`, which the Rust runtime ignores, is reset to its
/// default action first; an ignored disposition would survive `execv`.
/// Returns only on failure.
pub fn exec<P, A>(path: P, argv: &[A]) -> Result<Infallible, CpuApiError>
where
    P: AsRef<Path>,
    A: AsRef<OsStr>,
{
    let path = to_cstring(path.as_ref().as_os_str())?;
    let argv = argv
        .iter()
        .map(|arg| to_cstring(arg.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    // only `SIG_DFL` is installed, no handler runs in this process
    unsafe { signal::signal(Signal::SIGPIPE, SigHandler::SigDfl) }?;
    Ok(unistd::execv(&path, &argv)?)
}

fn to_cstring(s: &OsStr) -> Result<CString, CpuApiError> {
    CString::new(s.as_bytes()).map_err(|e| {
        CpuApiError::InvalidArgument(String::from_utf8_lossy(&e.into_vec()).into_owned())
    })
}

/// Exits the current process with the specified status code.
///
/// Buffered standard output is flushed before the process terminates.
pub fn exit(status: i32) -> ! {
    let _ = io::flush_std();
    std::process::exit(status)
}

/// Waits for any child process to exit and returns its process ID and exit
/// status.
///
/// Fails with [`CpuApiError::NoChildProcess`] if the caller has no children.
pub fn wait_any() -> Result<(ProcId, ExitStatus), CpuApiError> {
    loop {
        if let Some(res) = ExitStatus::from_wait_status(wait::wait()?) {
            return Ok(res);
        }
    }
}

/// Like [`wait_any`], but reports "no children" as `Ok(None)`.
///
/// This never blocks when the caller has no children.
pub fn try_wait_any() -> Result<Option<(ProcId, ExitStatus)>, CpuApiError> {
    match wait_any() {
        Ok(res) => Ok(Some(res)),
        Err(e) if e.is_no_child_process() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Waits for the specified child process to exit and returns its exit status.
///
/// # Panics
///
/// This function will panic if the waited process ID does not match the target
/// process ID.
pub fn wait_pid(pid: ProcId) -> Result<ExitStatus, CpuApiError> {
    loop {
        if let Some((wpid, status)) = ExitStatus::from_wait_status(wait::waitpid(pid.0, None)?) {
            assert_eq!(
                pid, wpid,
                "The waited process ID does not match the target process ID"
            );
            return Ok(status);
        }
    }
}
