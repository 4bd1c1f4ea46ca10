//! Thin, ownership-aware wrappers around the POSIX process-control
//! primitives: `fork`, `wait`, `waitpid`, `execv`, `pipe` and descriptor
//! closing.
//!
//! Everything here is a direct system call; nothing is emulated in user
//! space. The wrappers only add typed results and owned descriptors so that
//! closing a pipe end is dropping a value.

pub mod error;
pub mod io;
pub mod pipe;
pub mod process;
