//! Waiting for a specific child with `waitpid`, out of creation order.
//!
//! Child #1 exits right away, child #2 sleeps first. The parent still reaps
//! child #2 first, then collects child #1 with a plain `wait`.

use std::{thread, time::Duration};

use cpu_api_lib::process;

use super::{ScenarioError, fork};

pub const DEFAULT_DELAY: Duration = Duration::from_secs(3);

pub fn run(delay: Duration) -> Result<(), ScenarioError> {
    if fork()?.is_child() {
        println!("hello {}", process::id());
        process::exit(0);
    }

    let Some(mut second) = fork()?.into_parent() else {
        println!("hello {}", process::id());
        thread::sleep(delay);
        process::exit(0);
    };

    let status = second.wait().map_err(ScenarioError::wait)?;
    println!("goodbye child #2 {} {}", second.id(), status.raw());

    let (first, _status) = process::wait_any().map_err(ScenarioError::wait)?;
    println!("most final goodbye to child #1 {first}");

    Ok(())
}
