use std::{
    fs, io,
    net::{SocketAddr, TcpListener, TcpStream},
    path::PathBuf,
};

use log::{debug, info, warn};

use crate::{
    protocol::{ProtocolTransport, Reply, Request, transport::TransportError},
    storage::{Engine, Session},
};

/// Serves the line protocol over TCP, one session at a time.
///
/// The engine performs no locking, so sessions are deliberately handled to
/// completion before the next connection is accepted.
pub struct TableServer {
    address: SocketAddr,
    engine: Engine,
}

impl TableServer {
    pub fn new(address: SocketAddr, root: PathBuf) -> Result<Self, io::Error> {
        fs::create_dir_all(&root)?;
        Ok(Self {
            address,
            engine: Engine::new(root),
        })
    }

    pub fn listen(self) -> Result<(), TransportError> {
        info!("listening at {}", self.address);
        let listener = TcpListener::bind(self.address)?;

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Err(e) = self.handle_connection(stream) {
                        warn!("session ended abnormally: {e}");
                    }
                }
                Err(e) => warn!("broken connection: {e:?}"),
            }
        }
        Ok(())
    }

    fn handle_connection(&self, stream: TcpStream) -> Result<(), TransportError> {
        let peer = stream.peer_addr()?;
        info!("serving {peer}");
        let mut transport = ProtocolTransport::new(stream);
        let res = self.serve_session(&mut transport);
        info!("{peer} disconnected");
        res
    }

    /// Runs one session to completion: statement in, reply out, until the
    /// peer goes away. Parse and engine failures become error replies, never
    /// the end of the session.
    fn serve_session<T: io::Read + io::Write>(
        &self,
        transport: &mut ProtocolTransport<T>,
    ) -> Result<(), TransportError> {
        let mut session = Session::default();

        loop {
            let line = match transport.read_statement() {
                Ok(line) => line,
                Err(TransportError::Closed) => return Ok(()),
                Err(e) => return Err(e),
            };
            debug!("received statement: {line}");

            let reply = match Request::try_from(line.as_str()) {
                Ok(request) => match self.engine.execute(&mut session, request) {
                    Ok(output) => Reply::Output(output),
                    Err(e) => Reply::Error(e.to_string()),
                },
                Err(e) => Reply::Error(e.to_string()),
            };

            transport.write_reply(&reply)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read, Write};

    use tempdir::TempDir;

    use super::*;

    /// One-directional fake of a socket: statements are consumed from
    /// `input`, replies accumulate in `output`.
    struct Duplex {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
    }

    impl Duplex {
        fn new(statements: &str) -> Self {
            Self {
                input: Cursor::new(statements.as_bytes().to_vec()),
                output: Vec::new(),
            }
        }
    }

    impl Read for Duplex {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for Duplex {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.output.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            self.output.flush()
        }
    }

    fn serve(statements: &str) -> Vec<String> {
        let temp = TempDir::new("server").unwrap();
        let server = TableServer::new(
            "127.0.0.1:0".parse().unwrap(),
            temp.path().to_path_buf(),
        )
        .unwrap();

        let mut transport = ProtocolTransport::new(Duplex::new(statements));
        server.serve_session(&mut transport).unwrap();

        let output = String::from_utf8(transport.into_inner().output).unwrap();
        output
            .split("\n\u{4}\n")
            .filter(|chunk| !chunk.is_empty())
            .map(|chunk| chunk.to_string())
            .collect()
    }

    #[test]
    fn full_session_over_the_wire() {
        let replies = serve(
            "CREATE DATABASE school\n\
             USE school\n\
             CREATE TABLE people (name, age)\n\
             INSERT INTO people VALUES ('alice', '30')\n\
             SELECT * FROM people\n",
        );

        assert_eq!(
            replies,
            vec![
                "OK".to_string(),
                "OK".to_string(),
                "OK".to_string(),
                "OK".to_string(),
                "id\tname\tage\n0\talice\t30".to_string(),
            ]
        );
    }

    #[test]
    fn errors_do_not_end_the_session() {
        let replies = serve(
            "SELECT * FROM people\n\
             NONSENSE\n\
             CREATE DATABASE school\n",
        );

        assert_eq!(replies.len(), 3);
        assert_eq!(replies[0], "ERROR:no database selected");
        assert!(replies[1].starts_with("ERROR:"));
        assert_eq!(replies[2], "OK");
    }
}
