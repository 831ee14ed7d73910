//! Interactive command parsing.

use std::path::PathBuf;
use std::str::FromStr;

use rss_codec::{ChannelType, ErrorType, Theme};
use thiserror::Error;

/// A control the user can adjust between operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Setting {
    /// Parity symbols.
    Ecc(u32),
    /// Error rate in [0, 1].
    Rate(f64),
    /// Noise model.
    ErrorType(ErrorType),
    /// Transmission medium.
    Channel(ChannelType),
}

/// Theme change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeChoice {
    /// Flip between light and dark.
    Toggle,
    /// Use a specific theme.
    Set(Theme),
}

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Encode the rest of the line.
    Encode(String),
    /// Simulate the current artifact with the current controls.
    Simulate,
    /// Decode the current artifact, optionally with erasure positions.
    Decode(Option<Vec<u64>>),
    /// Adjust a control.
    Set(Setting),
    /// Hex preview of the current payload.
    Hex,
    /// Export the current simulation, optionally to a specific directory.
    Export(Option<PathBuf>),
    /// Drop the current artifact and simulation.
    Clear,
    /// Change the theme.
    Theme(ThemeChoice),
    /// Probe the codec service.
    Health,
    /// Show controls and session state.
    Show,
    /// List commands.
    Help,
    /// Leave the session.
    Quit,
}

/// Input that could not be turned into a command.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0} (try `help`)")]
    Unknown(String),
    #[error("missing {0}")]
    MissingArgument(&'static str),
    #[error("invalid {name}: {value}")]
    InvalidArgument { name: &'static str, value: String },
}

fn invalid(name: &'static str, value: &str) -> CommandError {
    CommandError::InvalidArgument {
        name,
        value: value.to_string(),
    }
}

/// Parse a rate given as a fraction (`0.15`) or a percentage (`15%`).
pub fn parse_rate(value: &str) -> Result<f64, CommandError> {
    let trimmed = value.trim();
    let parsed = match trimmed.strip_suffix('%') {
        Some(percent) => percent.trim().parse::<f64>().map(|p| p / 100.0),
        None => trimmed.parse::<f64>(),
    };
    parsed.map_err(|_| invalid("rate", value))
}

fn parse_setting(rest: &str) -> Result<Setting, CommandError> {
    let mut parts = rest.split_whitespace();
    let name = parts.next().ok_or(CommandError::MissingArgument("setting name"))?;
    let value = parts.next().ok_or(CommandError::MissingArgument("setting value"))?;

    match name.to_ascii_lowercase().as_str() {
        "ecc" | "nsym" => value
            .parse()
            .map(Setting::Ecc)
            .map_err(|_| invalid("ecc", value)),
        "rate" => parse_rate(value).map(Setting::Rate),
        "error-type" | "error_type" | "type" => value
            .parse()
            .map(Setting::ErrorType)
            .map_err(|_| invalid("error type", value)),
        "channel" => value
            .parse()
            .map(Setting::Channel)
            .map_err(|_| invalid("channel", value)),
        _ => Err(invalid("setting", name)),
    }
}

fn parse_erasures(rest: &str) -> Result<Option<Vec<u64>>, CommandError> {
    let positions = rest
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u64>().map_err(|_| invalid("erasure position", s)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(positions).filter(|p| !p.is_empty()))
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb.to_ascii_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "encode" | "e" => {
                if rest.is_empty() {
                    Err(CommandError::MissingArgument("text to encode"))
                } else {
                    Ok(Command::Encode(rest.to_string()))
                }
            }
            "simulate" | "sim" | "s" => Ok(Command::Simulate),
            "decode" | "d" => parse_erasures(rest).map(Command::Decode),
            "set" => parse_setting(rest).map(Command::Set),
            "hex" => Ok(Command::Hex),
            "export" => Ok(Command::Export(
                Some(rest).filter(|r| !r.is_empty()).map(PathBuf::from),
            )),
            "clear" | "reset" => Ok(Command::Clear),
            "theme" => match rest {
                "" | "toggle" => Ok(Command::Theme(ThemeChoice::Toggle)),
                other => other
                    .parse()
                    .map(|t| Command::Theme(ThemeChoice::Set(t)))
                    .map_err(|_| invalid("theme", other)),
            },
            "health" => Ok(Command::Health),
            "show" | "status" => Ok(Command::Show),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}
