//! `wait` in a process that has no children.
//!
//! The forked child has never forked, so `wait` fails with `ECHILD` at once
//! instead of blocking. The parent prints its own line without waiting, so
//! the two lines may appear in either order.

use cpu_api_lib::process::{self, JoinHandle};

use super::{ScenarioError, fork};

/// How many times the child calls `wait`.
pub const WAIT_ATTEMPTS: usize = 3;

/// Value `wait(2)` returns when there is no child to wait for.
pub const NO_CHILD_INDICATOR: i32 = -1;

pub fn run() -> Result<(), ScenarioError> {
    match fork()? {
        JoinHandle::Child => {
            for _ in 0..WAIT_ATTEMPTS {
                match process::try_wait_any().map_err(ScenarioError::wait)? {
                    None => println!("child: {NO_CHILD_INDICATOR}"),
                    Some((pid, _status)) => println!("child: {pid}"),
                }
            }
            process::exit(0);
        }
        JoinHandle::Parent { .. } => println!("parent"),
    }

    Ok(())
}
