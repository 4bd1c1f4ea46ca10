//! Command-line configuration of the `cpu-api` binary.
//!
//! Every value the demonstrations used to hard-code has an option here, with
//! the hard-coded value as its default.

use std::{env, ffi::OsString, path::PathBuf, time::Duration};

use strum::VariantNames as _;

/// The demonstration to run.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Scenario {
    /// Shared vs. private file position under `fork`.
    FilePosition,
    /// Completion ordering without `wait`.
    ManualWait,
    /// Program replacement with `execv`.
    Exec,
    /// `wait` in a process without children.
    WaitNoChild,
    /// Waiting for a specific child out of creation order.
    WaitPid,
    /// Closing standard output in a child only.
    CloseStdout,
    /// Message passing between siblings over a pipe.
    Pipe,
}

/// When `file-position` opens its file relative to `fork`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenTiming {
    /// One open file description, shared by parent and child.
    BeforeFork,
    /// One open file description per process.
    #[default]
    AfterFork,
}

/// How `manual-wait` makes the parent wait for its child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManualWaitMode {
    /// A flag in copied memory plus a fixed sleep. The child's update never
    /// reaches the parent.
    #[default]
    Naive,
    /// The flag travels over a pipe; the parent blocks until it is cleared.
    Synchronized,
}

pub const DEFAULT_SCENARIO: Scenario = Scenario::Pipe;
pub const DEFAULT_FILE_PATH: &str = "test.txt";
pub const DEFAULT_EXEC_PATH: &str = "/bin/ls";
pub const DEFAULT_EXEC_ARGV: &[&str] = &["~"];
pub const DEFAULT_PIPE_MESSAGE: &str = "child 2 should print this!\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub scenario: Scenario,
    pub file_path: PathBuf,
    pub open_timing: OpenTiming,
    pub wait_mode: ManualWaitMode,
    /// Overrides the scenario's own delay, if any.
    pub delay: Option<Duration>,
    pub exec_path: PathBuf,
    pub exec_argv: Vec<OsString>,
    pub message: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scenario: DEFAULT_SCENARIO,
            file_path: PathBuf::from(DEFAULT_FILE_PATH),
            open_timing: OpenTiming::default(),
            wait_mode: ManualWaitMode::default(),
            delay: None,
            exec_path: PathBuf::from(DEFAULT_EXEC_PATH),
            exec_argv: DEFAULT_EXEC_ARGV.iter().map(OsString::from).collect(),
            message: DEFAULT_PIPE_MESSAGE.to_owned(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("help requested")]
    HelpRequested,
    #[error("missing argument for {0}")]
    MissingArgument(&'static str),
    #[error("unknown option '{0}'")]
    UnknownOption(String),
    #[error("unknown scenario '{0}'")]
    UnknownScenario(String),
    #[error("more than one scenario given: '{0}' and '{1}'")]
    DuplicateScenario(Scenario, String),
    #[error("invalid delay '{0}'")]
    InvalidDelay(String),
    #[error("argument is not valid UTF-8: {}", .0.display())]
    NonUtf8Argument(OsString),
}

pub const USAGE_ARGS: &str = "[-f file] [-b] [-s] [-d secs] [-e path] [-m message] [-h] \
                              [scenario] [-- exec-args...]";

impl Config {
    fn help_and_exit() -> ! {
        eprintln!("Usage: {} {USAGE_ARGS}", crate::arg0());
        eprintln!("    -f file     File read by file-position (default: {DEFAULT_FILE_PATH})");
        eprintln!("    -b          file-position opens the file before forking");
        eprintln!("    -s          manual-wait synchronizes over a pipe");
        eprintln!("    -d secs     Delay used by manual-wait and wait-pid");
        eprintln!("    -e path     Program run by exec (default: {DEFAULT_EXEC_PATH})");
        eprintln!("    -m message  Message sent by pipe");
        eprintln!("    -h          Print this help message");
        eprintln!(
            "    scenario    One of {} (default: {DEFAULT_SCENARIO})",
            Scenario::VARIANTS.join(", ")
        );
        eprintln!("    -- args     Argument vector passed to the exec program");
        cpu_api_lib::process::exit(1);
    }

    /// Parses the process's command line, exiting with a usage message on
    /// error.
    #[must_use]
    pub fn parse() -> Self {
        match Self::parse_from(env::args_os().skip(1)) {
            Ok(config) => config,
            Err(ConfigError::HelpRequested) => Self::help_and_exit(),
            Err(e) => {
                message!("{e}");
                usage_and_exit!("{USAGE_ARGS}");
            }
        }
    }

    pub fn parse_from<I, S>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut args = args.into_iter().map(Into::into);
        let mut config = Self::default();
        let mut scenario: Option<Scenario> = None;

        while let Some(arg) = args.next() {
            if arg == "--" {
                config.exec_argv = args.by_ref().collect();
                break;
            }

            let arg = arg.into_string().map_err(ConfigError::NonUtf8Argument)?;
            match arg.as_str() {
                "-f" => config.file_path = next_value(&mut args, "-f")?.into(),
                "-b" => config.open_timing = OpenTiming::BeforeFork,
                "-s" => config.wait_mode = ManualWaitMode::Synchronized,
                "-d" => {
                    let secs = next_utf8_value(&mut args, "-d")?;
                    let delay = secs
                        .parse::<f64>()
                        .ok()
                        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
                        .ok_or(ConfigError::InvalidDelay(secs))?;
                    config.delay = Some(delay);
                }
                "-e" => config.exec_path = next_value(&mut args, "-e")?.into(),
                "-m" => config.message = next_utf8_value(&mut args, "-m")?,
                "-h" => return Err(ConfigError::HelpRequested),
                _ if !arg.starts_with('-') => {
                    if let Some(prev) = scenario {
                        return Err(ConfigError::DuplicateScenario(prev, arg));
                    }
                    let Ok(parsed) = arg.parse::<Scenario>() else {
                        return Err(ConfigError::UnknownScenario(arg));
                    };
                    scenario = Some(parsed);
                }
                _ => return Err(ConfigError::UnknownOption(arg)),
            }
        }

        if let Some(scenario) = scenario {
            config.scenario = scenario;
        }
        Ok(config)
    }
}

fn next_value<I>(args: &mut I, opt: &'static str) -> Result<OsString, ConfigError>
where
    I: Iterator<Item = OsString>,
{
    args.next().ok_or(ConfigError::MissingArgument(opt))
}

fn next_utf8_value<I>(args: &mut I, opt: &'static str) -> Result<String, ConfigError>
where
    I: Iterator<Item = OsString>,
{
    next_value(args, opt)?
        .into_string()
        .map_err(ConfigError::NonUtf8Argument)
}
