//! Closing descriptor 1 in a child leaves the parent's descriptor 1 alone.

use cpu_api_lib::{
    io,
    process::{self, JoinHandle},
};

use super::{ScenarioError, fork};

pub fn run() -> Result<(), ScenarioError> {
    match fork()? {
        JoinHandle::Child => {
            println!("child");
            println!("closing stdout in child");
            io::close_stdout().map_err(|err| ScenarioError::CloseStdout { err })?;

            println!("we don't see this!");
            process::exit(0);
        }
        JoinHandle::Parent { mut child } => {
            println!("parent");
            child.wait().map_err(ScenarioError::wait)?;
            println!("we still see this in the parent!");
        }
    }

    Ok(())
}
