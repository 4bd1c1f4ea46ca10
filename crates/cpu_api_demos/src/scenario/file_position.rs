//! Shared vs. private file position under `fork`.
//!
//! A file opened before `fork` is one open file description referenced from
//! both descriptor tables, so a read in one process moves the offset the
//! other one reads from next. Opening the same path after `fork`, once in
//! each process, creates two descriptions with independent offsets.
//!
//! The parent waits for the child before reading, so with a shared file the
//! parent's prefix always starts where the child's ended.

use std::{
    fs::File,
    io::{self, Read as _},
    path::Path,
};

use cpu_api_lib::process::{self, JoinHandle};

use super::{ScenarioError, fork};
use crate::config::OpenTiming;

pub const INITIAL_COUNTER: usize = 10;
pub const CHILD_INCREMENT: usize = 1;
pub const PARENT_INCREMENT: usize = 2;
pub const PARENT_FINAL_INCREMENT: usize = 3;

/// Reads at most `len` bytes from the current position of `file`.
///
/// The read is unbuffered, so the file offset advances by exactly the length
/// of the returned prefix.
pub fn read_prefix(file: &mut File, len: usize) -> io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(len);
    file.by_ref().take(len as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

fn open(path: &Path) -> Result<File, ScenarioError> {
    File::open(path).map_err(|err| ScenarioError::OpenFile {
        path: path.to_owned(),
        err,
    })
}

fn read_and_show(
    who: &str,
    file: &mut File,
    path: &Path,
    counter: usize,
) -> Result<(), ScenarioError> {
    let prefix = read_prefix(file, counter).map_err(|err| ScenarioError::ReadFile {
        path: path.to_owned(),
        err,
    })?;
    println!(
        "{who} {{{}}}: {{{counter}}} {}",
        process::id(),
        String::from_utf8_lossy(&prefix)
    );
    Ok(())
}

pub fn run(path: &Path, timing: OpenTiming) -> Result<(), ScenarioError> {
    let mut counter = INITIAL_COUNTER;

    let mut shared = match timing {
        OpenTiming::BeforeFork => Some(open(path)?),
        OpenTiming::AfterFork => None,
    };

    println!("start {{{}}}: {{{counter}}}", process::id());

    match fork()? {
        JoinHandle::Child => {
            let mut file = match shared.take() {
                Some(file) => file,
                None => open(path)?,
            };
            counter += CHILD_INCREMENT;
            read_and_show("child", &mut file, path, counter)?;
        }
        JoinHandle::Parent { mut child } => {
            child.wait().map_err(ScenarioError::wait)?;

            let mut file = match shared.take() {
                Some(file) => file,
                None => open(path)?,
            };
            counter += PARENT_INCREMENT;
            read_and_show("parent", &mut file, path, counter)?;
            counter += PARENT_FINAL_INCREMENT;
        }
    }

    println!("end {{{}}}: {{{counter}}}", process::id());
    Ok(())
}
