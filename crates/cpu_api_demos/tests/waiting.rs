#![cfg(test)]

use std::time::{Duration, Instant};

use cpu_api_integration_tests::runner;
use regex::Regex;

const TIMEOUT: Duration = Duration::from_secs(30);

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn naive_manual_wait_never_sees_the_child_flag() -> Result<(), anyhow::Error> {
    let mut r = runner!("naive_manual_wait_never_sees_the_child_flag")?;

    let output = r.run(["manual-wait", "-d", "0.5"], TIMEOUT).await?;
    assert!(output.status.success());

    let lines = output.lines();
    assert!(lines.contains(&"hello!"));
    assert!(lines.contains(&"goodbye!"));
    assert!(output.stderr.contains("flag still set"));
    Ok(())
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn synchronized_manual_wait_orders_output() -> Result<(), anyhow::Error> {
    let mut r = runner!("synchronized_manual_wait_orders_output")?;

    for _ in 0..5 {
        let output = r.run(["manual-wait", "-s"], TIMEOUT).await?;
        assert!(output.status.success());
        assert_eq!(output.lines(), ["hello!", "goodbye!"]);
        assert!(!output.stderr.contains("flag still set"));
    }
    Ok(())
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn wait_without_children_does_not_block() -> Result<(), anyhow::Error> {
    let mut r = runner!("wait_without_children_does_not_block")?;

    let output = r.run(["wait-no-child"], TIMEOUT).await?;
    assert!(output.status.success());

    let lines = output.lines();
    assert_eq!(lines.len(), 4, "unexpected output: {lines:?}");
    assert_eq!(lines.iter().filter(|l| **l == "parent").count(), 1);
    assert_eq!(lines.iter().filter(|l| **l == "child: -1").count(), 3);
    Ok(())
}

struct WaitPidOrder {
    hellos: Vec<String>,
    second: (usize, String),
    first: (usize, String),
}

fn find(lines: &[&str], re: &Regex) -> (usize, String) {
    let mut found = lines
        .iter()
        .enumerate()
        .filter_map(|(i, l)| re.captures(l).map(|c| (i, c[1].to_owned())));
    let res = found.next().expect("line not found");
    assert!(found.next().is_none(), "line printed twice: {lines:?}");
    res
}

fn wait_pid_order(stdout: &str) -> WaitPidOrder {
    let hello = Regex::new(r"^hello (\d+)$").unwrap();
    let second = Regex::new(r"^goodbye child #2 (\d+) 0$").unwrap();
    let first = Regex::new(r"^most final goodbye to child #1 (\d+)$").unwrap();

    let lines = stdout.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 4, "unexpected output: {lines:?}");

    let hellos = lines
        .iter()
        .filter_map(|l| hello.captures(l))
        .map(|c| c[1].to_owned())
        .collect();
    WaitPidOrder {
        hellos,
        second: find(&lines, &second),
        first: find(&lines, &first),
    }
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn waitpid_reaps_the_second_child_first() -> Result<(), anyhow::Error> {
    let mut r = runner!("waitpid_reaps_the_second_child_first")?;

    let start = Instant::now();
    let output = r.run(["wait-pid"], TIMEOUT).await?;
    let elapsed = start.elapsed();
    assert!(output.status.success());
    assert!(elapsed >= Duration::from_secs(3));

    let order = wait_pid_order(&output.stdout);
    assert_eq!(order.hellos.len(), 2);
    assert!(order.second.0 < order.first.0);
    assert_ne!(order.second.1, order.first.1);
    assert!(order.hellos.contains(&order.second.1));
    assert!(order.hellos.contains(&order.first.1));
    Ok(())
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn waitpid_order_holds_without_delay() -> Result<(), anyhow::Error> {
    let mut r = runner!("waitpid_order_holds_without_delay")?;

    for _ in 0..5 {
        let output = r.run(["wait-pid", "-d", "0"], TIMEOUT).await?;
        assert!(output.status.success());

        let order = wait_pid_order(&output.stdout);
        assert!(order.second.0 < order.first.0);
        assert_ne!(order.second.1, order.first.1);
        assert!(order.hellos.contains(&order.second.1));
        assert!(order.hellos.contains(&order.first.1));
    }
    Ok(())
}
