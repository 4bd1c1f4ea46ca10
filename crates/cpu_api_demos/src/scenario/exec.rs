//! Replacing a child's program image with `execv`.

use std::{ffi::OsString, path::Path};

use cpu_api_lib::process::{self, JoinHandle};

use super::{ScenarioError, fork};

/// Exit status of a child whose `execv` failed.
pub const EXEC_FAILURE_CODE: i32 = 127;

pub fn run(path: &Path, argv: &[OsString]) -> Result<(), ScenarioError> {
    match fork()? {
        JoinHandle::Child => {
            let Err(e) = process::exec(path, argv);

            // only reached when the image was not replaced
            let program = path.file_name().map_or(path, Path::new);
            println!("error executing {}", program.display());
            message_err!(e, "cannot exec '{}'", path.display());
            process::exit(EXEC_FAILURE_CODE);
        }
        JoinHandle::Parent { mut child } => {
            let status = child.wait().map_err(ScenarioError::wait)?;
            message!("child {} finished ({status})", child.id());
        }
    }

    Ok(())
}
