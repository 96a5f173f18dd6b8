//! Command-line interface for shell-term.
//!
//! Uses lexopt to keep the binary small.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use crate::session::SessionKey;

/// Default time to let output settle after the last command.
pub const DEFAULT_WAIT: Duration = Duration::from_millis(500);

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Terminal buffer rows (overrides config).
    pub rows: Option<usize>,
    /// Terminal buffer columns (overrides config).
    pub cols: Option<usize>,
    /// Shell to spawn instead of the platform default.
    pub shell: Option<String>,
    /// Pool key for the shell session.
    pub key: Option<SessionKey>,
    /// Command lines to submit, in order.
    pub exec: Vec<String>,
    /// Settle time in milliseconds before printing the screen.
    pub wait_ms: Option<u64>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

impl Args {
    /// Settle time after the last command.
    pub fn wait(&self) -> Duration {
        self.wait_ms.map(Duration::from_millis).unwrap_or(DEFAULT_WAIT)
    }
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Long("rows") => {
                result.rows = Some(parse_positive("rows", parser.value()?.parse()?)?);
            }
            Long("cols") => {
                result.cols = Some(parse_positive("cols", parser.value()?.parse()?)?);
            }
            Short('s') | Long("shell") => {
                result.shell = Some(parser.value()?.parse()?);
            }
            Short('k') | Long("key") => {
                let value: String = parser.value()?.parse()?;
                result.key = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("key", value))?,
                );
            }
            Short('e') | Long("exec") => {
                result.exec.push(parser.value()?.parse()?);
            }
            Short('w') | Long("wait") => {
                let value: String = parser.value()?.parse()?;
                result.wait_ms = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("wait", value))?,
                );
            }
            Value(val) => {
                return Err(ArgsError::UnexpectedArgument(val.to_string_lossy().into()));
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

fn parse_positive(name: &'static str, value: String) -> Result<usize, ArgsError> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ArgsError::InvalidValue(name, value)),
    }
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"shell-term {version}
Terminal engine over an interactive shell stream

USAGE:
    shell-term [OPTIONS]

OPTIONS:
    -c, --config <FILE>     Path to configuration file (JSON)
    -l, --log-level <LVL>   Log level (error, warn, info, debug, trace)
        --rows <N>          Terminal buffer rows [default: 500]
        --cols <N>          Terminal buffer columns [default: 80]
    -s, --shell <PATH>      Shell to spawn [default: $SHELL or /bin/sh]
    -k, --key <KEY>         Pool key, server:<name> or sess-<hex> [default: server:local]
    -e, --exec <CMD>        Command line to submit (repeatable)
    -w, --wait <MS>         Wait before printing the screen [default: 500]
    -h, --help              Print help
    -V, --version           Print version

ENVIRONMENT VARIABLES:
    SHELL_TERM_ROWS           Buffer rows (overrides config)
    SHELL_TERM_COLS           Buffer columns (overrides config)
    SHELL_TERM_MAX_IDLE_SECS  Session pool idle timeout (overrides config)
    SHELL_TERM_LOG_LEVEL      Log level (overrides config)
    RUST_LOG                  Alternative log level setting

EXAMPLES:
    # Run two commands in the default shell and print the screen
    shell-term -e 'cd /tmp' -e 'ls -la'

    # Use bash with a narrow buffer and a longer settle time
    shell-term -s /bin/bash --cols 40 -w 2000 -e 'uname -a'
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("shell-term {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for --{}: '{}'", name, value)
            }
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}
