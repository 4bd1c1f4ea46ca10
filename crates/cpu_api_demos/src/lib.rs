//! Demonstrations of POSIX process control, one scenario per module of
//! [`scenario`]. The `cpu-api` binary runs exactly one of them.

use std::{env, path::Path};

#[macro_use]
mod macros;

pub mod config;
pub mod scenario;

/// Returns the program name used to prefix diagnostics.
#[doc(hidden)]
#[must_use]
pub fn arg0() -> String {
    env::args_os()
        .next()
        .as_deref()
        .and_then(|arg0| Path::new(arg0).file_name())
        .map_or_else(
            || "cpu-api".to_owned(),
            |name| name.to_string_lossy().into_owned(),
        )
}
