//! Harness for running the `cpu-api` binary from integration tests.
//!
//! Tests create a [`Runner`] with the [`runner!`] macro, which gives every
//! test its own working directory, then run scenarios and inspect the
//! captured [`Output`].

pub use self::{
    logged_command::LoggedCommand,
    runner::{Output, Runner},
};

pub mod helper;
pub mod logged_command;
mod runner;

/// Creates a [`Runner`] for the calling integration test.
///
/// Must be expanded inside an integration test of the package that builds
/// the `cpu-api` binary, where cargo provides its path.
#[macro_export]
macro_rules! runner {
    ($name:expr) => {
        $crate::Runner::new(
            env!("CARGO_BIN_EXE_cpu-api"),
            env!("CARGO_TARGET_TMPDIR"),
            module_path!(),
            $name,
        )
    };
}
