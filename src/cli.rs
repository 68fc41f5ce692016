//! CLI utilities for flatdb.
//!
//! The utilities present in this module can be used to build an interactive
//! client for the database server.
use std::io::{BufRead, Write};

use thiserror::Error;

/// Possible inputs from a user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Exit command `.exit`; also produced on end of input.
    Exit,
    /// A raw statement line to send to the server.
    Statement(String),
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("unrecognized command '{0}'")]
    Unrecognized(String),

    #[error("cli io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Prompts the user for a statement or client command.
///
/// Lines starting with `.` are client commands; anything else is treated as
/// a statement and passed along verbatim.
pub fn prompt<R, W>(mut reader: R, mut writer: W) -> Result<Command, CliError>
where
    R: BufRead,
    W: Write,
{
    write!(&mut writer, "> ")?;
    writer.flush()?;

    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(Command::Exit);
    }

    match line.trim_end() {
        ".exit" => Ok(Command::Exit),
        s if !s.starts_with('.') => Ok(Command::Statement(s.to_string())),
        s => Err(CliError::Unrecognized(s.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_prints_correctly() {
        let input = b".exit\n";
        let mut output = Vec::new();

        prompt(&input[..], &mut output).unwrap();

        let output = String::from_utf8(output).expect("not valid UTF-8");
        assert_eq!("> ", output);
    }

    #[test]
    fn prompt_passes_statements_through() {
        let input = b"SELECT * FROM people\n";
        let mut output = Vec::new();

        let res = prompt(&input[..], &mut output).unwrap();
        assert_eq!(
            Command::Statement("SELECT * FROM people".to_string()),
            res
        );
    }

    #[test]
    fn prompt_exits_on_end_of_input() {
        let input = b"";
        let mut output = Vec::new();

        let res = prompt(&input[..], &mut output).unwrap();
        assert_eq!(Command::Exit, res);
    }

    #[test]
    fn prompt_unrecognized_command() {
        let input = b".something_wrong\n";
        let mut output = Vec::new();

        let res = prompt(&input[..], &mut output);
        assert!(matches!(res, Err(CliError::Unrecognized(_))));
    }
}
