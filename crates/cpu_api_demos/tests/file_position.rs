#![cfg(test)]

use std::time::Duration;

use cpu_api_integration_tests::{Output, helper, runner};
use regex::Regex;

const TIMEOUT: Duration = Duration::from_secs(30);

struct Observed {
    start_pid: String,
    child_pid: String,
    child_prefix: String,
    parent_pid: String,
    parent_prefix: String,
}

fn observe(output: &Output) -> Observed {
    let lines = output.lines();
    assert_eq!(lines.len(), 5, "unexpected output: {lines:?}");

    let start = Regex::new(r"^start \{(\d+)\}: \{10\}$").unwrap();
    let child = Regex::new(r"^child \{(\d+)\}: \{11\} (.*)$").unwrap();
    let parent = Regex::new(r"^parent \{(\d+)\}: \{12\} (.*)$").unwrap();

    let start = start.captures(lines[0]).expect("start line");
    let child = child.captures(lines[1]).expect("child line");
    // the parent waits for the child before reading
    assert_eq!(lines[2], format!("end {{{}}}: {{11}}", &child[1]));
    let parent = parent.captures(lines[3]).expect("parent line");
    assert_eq!(lines[4], format!("end {{{}}}: {{15}}", &parent[1]));

    Observed {
        start_pid: start[1].to_owned(),
        child_pid: child[1].to_owned(),
        child_prefix: child[2].to_owned(),
        parent_pid: parent[1].to_owned(),
        parent_prefix: parent[2].to_owned(),
    }
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn open_after_fork_gives_private_positions() -> Result<(), anyhow::Error> {
    let mut r = runner!("open_after_fork_gives_private_positions")?;
    let contents = helper::random_str(64);
    r.write_file("test.txt", &contents)?;

    let output = r.run(["file-position"], TIMEOUT).await?;
    assert!(output.status.success());

    let observed = observe(&output);
    assert_eq!(observed.start_pid, observed.parent_pid);
    assert_ne!(observed.child_pid, observed.parent_pid);
    assert_eq!(observed.child_prefix, contents[..11]);
    assert_eq!(observed.parent_prefix, contents[..12]);
    Ok(())
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn open_before_fork_shares_position() -> Result<(), anyhow::Error> {
    let mut r = runner!("open_before_fork_shares_position")?;
    let contents = helper::random_str(64);
    r.write_file("test.txt", &contents)?;

    let output = r.run(["-b", "file-position"], TIMEOUT).await?;
    assert!(output.status.success());

    let observed = observe(&output);
    assert_eq!(observed.child_prefix, contents[..11]);
    assert_eq!(observed.parent_prefix, contents[11..23]);
    Ok(())
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn shared_position_stops_at_end_of_file() -> Result<(), anyhow::Error> {
    let mut r = runner!("shared_position_stops_at_end_of_file")?;
    let contents = helper::random_str(15);
    r.write_file("short.txt", &contents)?;

    let output = r
        .run(["file-position", "-b", "-f", "short.txt"], TIMEOUT)
        .await?;
    assert!(output.status.success());

    let observed = observe(&output);
    assert_eq!(observed.child_prefix, contents[..11]);
    assert_eq!(observed.parent_prefix, contents[11..]);
    Ok(())
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn missing_file_is_fatal() -> Result<(), anyhow::Error> {
    let mut r = runner!("missing_file_is_fatal")?;

    let output = r
        .run(["file-position", "-b", "-f", "missing.txt"], TIMEOUT)
        .await?;
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(
        output
            .stderr
            .starts_with("cpu-api: file-position: cannot open 'missing.txt': ")
    );

    let output = r
        .run(["file-position", "-f", "missing.txt"], TIMEOUT)
        .await?;
    assert!(!output.status.success());
    assert!(output.stdout.starts_with("start {"));
    assert!(!output.stdout.contains("parent {"));
    assert!(!output.stdout.contains("child {"));
    Ok(())
}
