#![cfg(test)]

use std::time::Duration;

use cpu_api_integration_tests::{helper, runner};

const TIMEOUT: Duration = Duration::from_secs(30);

const WRITER_LINE: &str = "child #1 - gets the write end\n";
const READER_LINE: &str = "child #2 - gets the read end\n";
const PARENT_LINE: &str = "parent\n";

/// Removes the three announcement lines, leaving what the reader echoed.
fn echoed(stdout: &str) -> String {
    let mut rest = stdout.to_owned();
    for line in [WRITER_LINE, READER_LINE, PARENT_LINE] {
        assert!(rest.contains(line), "missing {line:?} in {stdout:?}");
        rest = rest.replacen(line, "", 1);
    }
    rest
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn closing_stdout_in_child_keeps_parent_output() -> Result<(), anyhow::Error> {
    let mut r = runner!("closing_stdout_in_child_keeps_parent_output")?;

    let output = r.run(["close-stdout"], TIMEOUT).await?;
    assert!(output.status.success());

    let lines = output.lines();
    assert_eq!(lines.len(), 4, "unexpected output: {lines:?}");
    assert!(lines.contains(&"child"));
    assert!(lines.contains(&"closing stdout in child"));
    assert!(lines.contains(&"parent"));
    assert!(!output.stdout.contains("we don't see this!"));
    assert_eq!(lines[3], "we still see this in the parent!");
    Ok(())
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn pipe_default_message() -> Result<(), anyhow::Error> {
    let mut r = runner!("pipe_default_message")?;

    let output = r.run(Vec::<&str>::new(), TIMEOUT).await?;
    assert!(output.status.success());
    assert_eq!(echoed(&output.stdout), "child 2 should print this!\n");
    Ok(())
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn pipe_delivers_every_byte_in_order() -> Result<(), anyhow::Error> {
    let mut r = runner!("pipe_delivers_every_byte_in_order")?;

    for len in [1, 100, 4096, 20000] {
        let message = format!("{}\n", helper::random_str(len));
        let output = r.run(["pipe", "-m", message.as_str()], TIMEOUT).await?;
        assert!(output.status.success());
        assert_eq!(echoed(&output.stdout), message);
    }
    Ok(())
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn pipe_empty_message_reaches_end_of_stream() -> Result<(), anyhow::Error> {
    let mut r = runner!("pipe_empty_message_reaches_end_of_stream")?;

    let output = r.run(["pipe", "-m", ""], TIMEOUT).await?;
    assert!(output.status.success());
    assert_eq!(echoed(&output.stdout), "");
    Ok(())
}
