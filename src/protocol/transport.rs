use std::io::{self, BufRead, BufReader, Read, Write};

use thiserror::Error;

use super::Reply;

/// End-of-transmission sentinel sent on its own line after every reply.
pub(crate) const EOT_LINE: &str = "\u{4}";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection closed")]
    Closed,

    #[error("transport io error: {0}")]
    Io(#[from] io::Error),
}

/// Line-oriented codec over a bidirectional stream.
///
/// A session alternates strictly: the client writes one newline-terminated
/// statement line, the server answers with the reply text followed by the
/// sentinel line. Both halves of the exchange live here so client and server
/// cannot drift apart on framing.
pub struct ProtocolTransport<T: Read + Write> {
    stream: BufReader<T>,
}

impl<T: Read + Write> ProtocolTransport<T> {
    pub fn new(stream: T) -> Self {
        Self {
            stream: BufReader::new(stream),
        }
    }

    /// Reads one statement line. `Closed` on end of stream.
    pub fn read_statement(&mut self) -> Result<String, TransportError> {
        Ok(self.read_line()?)
    }

    pub fn write_statement(&mut self, statement: &str) -> Result<(), TransportError> {
        let stream = self.stream.get_mut();
        writeln!(stream, "{statement}")?;
        stream.flush()?;
        Ok(())
    }

    /// Writes the rendered reply followed by the sentinel line.
    pub fn write_reply(&mut self, reply: &Reply) -> Result<(), TransportError> {
        let stream = self.stream.get_mut();
        write!(stream, "{reply}\n{EOT_LINE}\n")?;
        stream.flush()?;
        Ok(())
    }

    /// Reads reply lines up to the sentinel, returning them re-joined.
    pub fn read_reply(&mut self) -> Result<String, TransportError> {
        let mut lines = Vec::new();
        loop {
            let line = self.read_line()?;
            if line == EOT_LINE {
                break;
            }
            lines.push(line);
        }
        Ok(lines.join("\n"))
    }

    /// Consumes the transport, returning the underlying stream.
    pub fn into_inner(self) -> T {
        self.stream.into_inner()
    }

    fn read_line(&mut self) -> Result<String, TransportError> {
        let mut line = String::new();
        if self.stream.read_line(&mut line)? == 0 {
            return Err(TransportError::Closed);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}
