use std::io;

use nix::errno::Errno;

#[derive(Debug, thiserror::Error)]
pub enum CpuApiError {
    // EPERM
    #[error("operation not permitted")]
    NotPermitted,
    // ENOENT
    #[error("no such file or directory")]
    FsEntryNotFound,
    // ESRCH
    #[error("no such process")]
    ProcessNotFound,
    #[error("interrupted system call")]
    Interrupted,
    #[error("input/output error")]
    InputOutput,
    #[error("argument list too long")]
    ArgumentListTooLong,
    #[error("exec format error")]
    ExecFormat,
    #[error("bad file descriptor")]
    BadFileDescriptor,
    #[error("no child process")]
    NoChildProcess,
    #[error("resource temporarily unavailable")]
    ResourceTemporarilyUnavailable,
    #[error("cannot allocate memory")]
    OutOfMemory,
    #[error("permission denied")]
    PermissionDenied,
    #[error("not a directory")]
    NotADirectory,
    #[error("is a directory")]
    IsADirectory,
    #[error("invalid argument")]
    InvalidInput,
    #[error("too many open files in system")]
    TooManyOpenFilesSystem,
    #[error("too many open files")]
    TooManyOpenFiles,
    #[error("text file busy")]
    ExecutableFileBusy,
    #[error("broken pipe")]
    BrokenPipe,
    #[error("file name too long")]
    InvalidFilename,

    #[error("argument contains an interior nul byte: {0:?}")]
    InvalidArgument(String),
    #[error("{0}")]
    Io(#[source] io::Error),
    #[error("unknown error: {0}")]
    Unknown(Errno),
}

impl CpuApiError {
    /// Returns `true` if the error is the "no children to wait for"
    /// indicator returned by `wait` in a childless process.
    #[must_use]
    pub fn is_no_child_process(&self) -> bool {
        matches!(self, Self::NoChildProcess)
    }
}

impl From<Errno> for CpuApiError {
    fn from(errno: Errno) -> Self {
        match errno {
            Errno::EPERM => Self::NotPermitted,
            Errno::ENOENT => Self::FsEntryNotFound,
            Errno::ESRCH => Self::ProcessNotFound,
            Errno::EINTR => Self::Interrupted,
            Errno::EIO => Self::InputOutput,
            Errno::E2BIG => Self::ArgumentListTooLong,
            Errno::ENOEXEC => Self::ExecFormat,
            Errno::EBADF => Self::BadFileDescriptor,
            Errno::ECHILD => Self::NoChildProcess,
            Errno::EAGAIN => Self::ResourceTemporarilyUnavailable,
            Errno::ENOMEM => Self::OutOfMemory,
            Errno::EACCES => Self::PermissionDenied,
            Errno::ENOTDIR => Self::NotADirectory,
            Errno::EISDIR => Self::IsADirectory,
            Errno::EINVAL => Self::InvalidInput,
            Errno::ENFILE => Self::TooManyOpenFilesSystem,
            Errno::EMFILE => Self::TooManyOpenFiles,
            Errno::ETXTBSY => Self::ExecutableFileBusy,
            Errno::EPIPE => Self::BrokenPipe,
            Errno::ENAMETOOLONG => Self::InvalidFilename,
            errno => Self::Unknown(errno),
        }
    }
}

impl From<io::Error> for CpuApiError {
    fn from(error: io::Error) -> Self {
        match error.raw_os_error() {
            Some(code) => Errno::from_raw(code).into(),
            None => Self::Io(error),
        }
    }
}
