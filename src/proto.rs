//! Wire protocol: plain-text, newline-terminated lines.
//!
//! Request line grammar: `<command-token> ":" <argument-text>` where the
//! argument runs to end of line. Only the first `:` splits; further
//! delimiters belong to the argument. Command tokens are normalized by
//! replacing `-` with `_` before lookup, since the command namespace uses
//! the underscore form as its canonical key.

use crate::error::ParseError;

/// Maximum accepted line length in bytes. Longer lines surface as a read
/// error and terminate the offending connection only.
pub const MAX_LINE_LENGTH: usize = 1024;

/// One parsed request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// Empty or whitespace-only input: a no-op, acknowledged with an empty
    /// reply line and never dispatched.
    Empty,
    /// A command with its argument text.
    Command {
        /// Normalized command token (`-` replaced by `_`).
        name: String,
        /// Argument text with surrounding whitespace removed.
        argument: String,
    },
}

/// Parse one received line into a command and argument.
pub fn parse_line(line: &str) -> Result<ParsedLine, ParseError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(ParsedLine::Empty);
    }

    let (raw_command, raw_argument) = trimmed
        .split_once(':')
        .ok_or(ParseError::MalformedCommand)?;

    Ok(ParsedLine::Command {
        name: raw_command.trim().replace('-', "_"),
        argument: raw_argument.trim().to_string(),
    })
}
