//! Command-line argument parsing for the docverify CLI.

use thiserror::Error;

/// Where `parse` reads its input from.
#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    Stdin,
    File(String),
}

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Run the ingestion pipeline over a saved agent body
    Parse {
        input: InputSource,
        sse: bool,
        request_id: Option<String>,
    },
    /// Call the agent
    Send {
        message: String,
        attachments: Vec<String>,
        stream: bool,
    },
}

/// A command plus the global flags.
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub command: CliCommand,
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArgsError {
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("{flag} expects a value")]
    MissingValue { flag: String },
    #[error("unknown option: {0}")]
    UnknownOption(String),
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("unexpected argument: {0}")]
    Unexpected(String),
}

pub const USAGE: &str = "\
Usage:
  docverify parse [--sse] [--request-id ID] <FILE|->
  docverify send <MESSAGE> [--attach ID]... [--stream]

Options:
  -v, --verbose   Debug logging (RUST_LOG overrides)
  -V, --version   Print version
  -h, --help      Print this help

Environment:
  DOCVERIFY_AGENT_URL, DOCVERIFY_API_KEY, DOCVERIFY_AGENT_ID, DOCVERIFY_TIMEOUT_SECS";

/// Parse command-line arguments (including the program name).
///
/// `--version` and `--help` win wherever they appear.
pub fn parse_args<I>(args: I) -> Result<CliArgs, ArgsError>
where
    I: Iterator<Item = String>,
{
    let mut verbose = false;
    let mut rest = Vec::new();

    // Skip the program name
    for arg in args.skip(1) {
        match arg.as_str() {
            "--version" | "-V" => {
                return Ok(CliArgs {
                    command: CliCommand::Version,
                    verbose,
                })
            }
            "--help" | "-h" => {
                return Ok(CliArgs {
                    command: CliCommand::Help,
                    verbose,
                })
            }
            "--verbose" | "-v" => verbose = true,
            _ => rest.push(arg),
        }
    }

    let mut rest = rest.into_iter();
    let command = match rest.next().as_deref() {
        None => CliCommand::Help,
        Some("parse") => parse_parse(rest)?,
        Some("send") => parse_send(rest)?,
        Some(other) => return Err(ArgsError::UnknownCommand(other.to_string())),
    };

    Ok(CliArgs { command, verbose })
}

fn take_value(flag: &str, args: &mut impl Iterator<Item = String>) -> Result<String, ArgsError> {
    args.next().ok_or_else(|| ArgsError::MissingValue {
        flag: flag.to_string(),
    })
}

fn parse_parse(mut args: impl Iterator<Item = String>) -> Result<CliCommand, ArgsError> {
    let mut sse = false;
    let mut request_id = None;
    let mut input = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--sse" => sse = true,
            "--request-id" => request_id = Some(take_value("--request-id", &mut args)?),
            "-" if input.is_none() => input = Some(InputSource::Stdin),
            flag if flag.starts_with("--") => return Err(ArgsError::UnknownOption(arg)),
            _ if input.is_none() => input = Some(InputSource::File(arg)),
            _ => return Err(ArgsError::Unexpected(arg)),
        }
    }

    Ok(CliCommand::Parse {
        input: input.ok_or(ArgsError::Missing("input file (use - for stdin)"))?,
        sse,
        request_id,
    })
}

fn parse_send(mut args: impl Iterator<Item = String>) -> Result<CliCommand, ArgsError> {
    let mut stream = false;
    let mut attachments = Vec::new();
    let mut message: Option<String> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--stream" => stream = true,
            "--attach" => attachments.push(take_value("--attach", &mut args)?),
            flag if flag.starts_with("--") => return Err(ArgsError::UnknownOption(arg)),
            _ if message.is_none() => message = Some(arg),
            _ => return Err(ArgsError::Unexpected(arg)),
        }
    }

    Ok(CliCommand::Send {
        message: message.ok_or(ArgsError::Missing("message"))?,
        attachments,
        stream,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliArgs, ArgsError> {
        let args: Vec<String> = std::iter::once("docverify")
            .chain(args.iter().copied())
            .map(String::from)
            .collect();
        parse_args(args.into_iter())
    }

    #[test]
    fn test_parse_version_flag() {
        assert_eq!(parse(&["--version"]).unwrap().command, CliCommand::Version);
        assert_eq!(parse(&["send", "-V"]).unwrap().command, CliCommand::Version);
    }

    #[test]
    fn test_parse_no_args_is_help() {
        assert_eq!(parse(&[]).unwrap().command, CliCommand::Help);
        assert_eq!(parse(&["-h"]).unwrap().command, CliCommand::Help);
    }

    #[test]
    fn test_parse_command() {
        let args = parse(&["-v", "parse", "--sse", "--request-id", "r1", "body.txt"]).unwrap();
        assert!(args.verbose);
        assert_eq!(
            args.command,
            CliCommand::Parse {
                input: InputSource::File("body.txt".to_string()),
                sse: true,
                request_id: Some("r1".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_stdin() {
        let args = parse(&["parse", "-"]).unwrap();
        assert!(matches!(
            args.command,
            CliCommand::Parse {
                input: InputSource::Stdin,
                sse: false,
                request_id: None
            }
        ));
    }

    #[test]
    fn test_send_command() {
        let args = parse(&["send", "Check this", "--attach", "doc-1", "--attach", "doc-2", "--stream"]).unwrap();
        assert_eq!(
            args.command,
            CliCommand::Send {
                message: "Check this".to_string(),
                attachments: vec!["doc-1".to_string(), "doc-2".to_string()],
                stream: true,
            }
        );
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse(&["parse"]), Err(ArgsError::Missing("input file (use - for stdin)")));
        assert_eq!(
            parse(&["send", "hi", "--attach"]),
            Err(ArgsError::MissingValue {
                flag: "--attach".to_string()
            })
        );
        assert_eq!(
            parse(&["parse", "--json", "x"]),
            Err(ArgsError::UnknownOption("--json".to_string()))
        );
        assert_eq!(parse(&["upload"]), Err(ArgsError::UnknownCommand("upload".to_string())));
        assert_eq!(parse(&["send", "a", "b"]), Err(ArgsError::Unexpected("b".to_string())));
    }
}
