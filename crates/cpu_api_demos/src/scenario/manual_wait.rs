//! Ordering parent output after child output without calling `wait`.
//!
//! [`run_naive`] keeps the classic mistake: a flag the child clears so the
//! parent knows it is done. `fork` gives the child a copy of the parent's
//! memory, so the child clears its own copy and the parent never sees it.
//! What actually orders the output is the parent's sleep, which is a race.
//!
//! [`run_synchronized`] sends the same flag through a pipe, so the parent
//! blocks until the child really has printed.

use std::{cell::Cell, thread, time::Duration};

use cpu_api_lib::{
    pipe,
    process::{self, JoinHandle},
};

use super::{ScenarioError, fork};

pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

pub fn run_naive(delay: Duration) -> Result<(), ScenarioError> {
    let waiting = Cell::new(true);

    match fork()? {
        JoinHandle::Child => {
            println!("hello!");
            waiting.set(false);
            process::exit(0);
        }
        JoinHandle::Parent { child } => {
            // Without the sleep this would spin forever: `waiting` is never
            // cleared in this address space.
            if waiting.get() {
                thread::sleep(delay);
            }
            if waiting.get() {
                message!(
                    "flag still set after {delay:?}; child {} cleared only its own copy",
                    child.id()
                );
            }
            println!("goodbye!");
        }
    }

    Ok(())
}

pub fn run_synchronized() -> Result<(), ScenarioError> {
    let (mut rx, tx) = pipe::pipe().map_err(|err| ScenarioError::CreatePipe { err })?;

    match fork()? {
        JoinHandle::Child => {
            rx.close().map_err(ScenarioError::pipe_io)?;
            println!("hello!");
            // closing the only write end is the "flag cleared" message
            tx.close().map_err(ScenarioError::pipe_io)?;
            process::exit(0);
        }
        JoinHandle::Parent { mut child } => {
            tx.close().map_err(ScenarioError::pipe_io)?;
            while rx.read_byte().map_err(ScenarioError::pipe_io)?.is_some() {}
            println!("goodbye!");
            child.wait().map_err(ScenarioError::wait)?;
        }
    }

    Ok(())
}
