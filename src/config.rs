//! Command-line configuration.
//!
//! ```text
//! ls8 <program.ls8> [--trace] [--no-timestamp]
//! ```

use crate::utils::log::{self, Level};
use ls8_derive::Error;
use std::path::PathBuf;
use std::sync::atomic::Ordering;

/// Errors in the command line itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("missing program path")]
    MissingProgram,
    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),
    #[error("unknown option: {0}")]
    UnknownOption(String),
}

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Load and run a program.
    Run(Config),
    /// Print usage and exit successfully.
    Help,
}

/// Settings for a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Path of the program source.
    pub program_path: PathBuf,
    /// Log the machine state before every instruction.
    pub trace: bool,
    /// Prefix log lines with the time of day.
    pub timestamps: bool,
}

impl Config {
    /// Parses the arguments that follow the executable name.
    ///
    /// Exactly one positional argument, the program path, is accepted.
    pub fn from_args<I>(args: I) -> Result<Command, UsageError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut program_path: Option<PathBuf> = None;
        let mut trace = false;
        let mut timestamps = true;

        for arg in args {
            match arg.as_str() {
                "-h" | "--help" => return Ok(Command::Help),
                "-t" | "--trace" => trace = true,
                "--no-timestamp" => timestamps = false,
                other if other.starts_with('-') && other.len() > 1 => {
                    return Err(UsageError::UnknownOption(other.to_string()));
                }
                _ if program_path.is_some() => return Err(UsageError::UnexpectedArgument(arg)),
                _ => program_path = Some(PathBuf::from(arg)),
            }
        }

        let program_path = program_path.ok_or(UsageError::MissingProgram)?;
        Ok(Command::Run(Config {
            program_path,
            trace,
            timestamps,
        }))
    }

    /// Applies the logging settings process-wide.
    pub fn apply_logging(&self) {
        log::SHOW_TIMESTAMP.store(self.timestamps, Ordering::Relaxed);
        log::set_min_level(if self.trace { Level::Trace } else { Level::Info });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, UsageError> {
        Config::from_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn single_program_path() {
        assert_eq!(
            parse(&["print8.ls8"]),
            Ok(Command::Run(Config {
                program_path: PathBuf::from("print8.ls8"),
                trace: false,
                timestamps: true,
            }))
        );
    }

    #[test]
    fn options_in_any_position() {
        let Ok(Command::Run(config)) = parse(&["--trace", "call.ls8", "--no-timestamp"]) else {
            panic!("expected run command");
        };
        assert_eq!(config.program_path, PathBuf::from("call.ls8"));
        assert!(config.trace);
        assert!(!config.timestamps);

        let Ok(Command::Run(config)) = parse(&["-t", "x.ls8"]) else {
            panic!("expected run command");
        };
        assert!(config.trace);
    }

    #[test]
    fn help() {
        assert_eq!(parse(&["-h"]), Ok(Command::Help));
        assert_eq!(parse(&["a.ls8", "--help"]), Ok(Command::Help));
    }

    #[test]
    fn wrong_arity() {
        assert_eq!(parse(&[]), Err(UsageError::MissingProgram));
        assert_eq!(parse(&["--trace"]), Err(UsageError::MissingProgram));
        assert_eq!(
            parse(&["a.ls8", "b.ls8"]),
            Err(UsageError::UnexpectedArgument("b.ls8".into()))
        );
    }

    #[test]
    fn unknown_option() {
        assert_eq!(
            parse(&["--fast", "a.ls8"]),
            Err(UsageError::UnknownOption("--fast".into()))
        );
    }

    #[test]
    fn lone_dash_is_a_path() {
        let Ok(Command::Run(config)) = parse(&["-"]) else {
            panic!("expected run command");
        };
        assert_eq!(config.program_path, PathBuf::from("-"));
    }

    #[test]
    fn usage_error_messages() {
        assert_eq!(UsageError::MissingProgram.to_string(), "missing program path");
        assert_eq!(
            UsageError::UnexpectedArgument("b".into()).to_string(),
            "unexpected argument: b"
        );
    }
}
