//! Sibling-to-sibling message passing over one pipe.
//!
//! The pipe is created before either fork, so all three processes hold both
//! ends. Every process closes the ends it does not use; the reader only sees
//! end of stream after the writer *and* the parent have closed their write
//! ends.

use std::io::Write as _;

use cpu_api_lib::{
    io, pipe,
    process::{self, JoinHandle},
};

use super::{ScenarioError, fork};

pub fn run(message: &[u8]) -> Result<(), ScenarioError> {
    let (rx, tx) = pipe::pipe().map_err(|err| ScenarioError::CreatePipe { err })?;

    match fork()? {
        JoinHandle::Child => {
            println!("child #1 - gets the write end");
            rx.close().map_err(ScenarioError::pipe_io)?;

            let mut tx = tx;
            tx.write_all(message).map_err(ScenarioError::pipe_io)?;
            tx.close().map_err(ScenarioError::pipe_io)?;
            process::exit(0);
        }
        JoinHandle::Parent { .. } => {}
    }

    match fork()? {
        JoinHandle::Child => {
            println!("child #2 - gets the read end");
            tx.close().map_err(ScenarioError::pipe_io)?;

            let mut rx = rx;
            while let Some(b) = rx.read_byte().map_err(ScenarioError::pipe_io)? {
                io::write_stdout_raw(&[b]).map_err(ScenarioError::pipe_io)?;
            }
            rx.close().map_err(ScenarioError::pipe_io)?;
            process::exit(0);
        }
        JoinHandle::Parent { .. } => {}
    }

    println!("parent");
    rx.close().map_err(ScenarioError::pipe_io)?;
    tx.close().map_err(ScenarioError::pipe_io)?;

    while process::try_wait_any()
        .map_err(ScenarioError::wait)?
        .is_some()
    {}

    Ok(())
}
