use std::{
    error::Error,
    io,
    net::{SocketAddr, TcpStream},
};

use clap::Parser;
use flatdb::{Command, prompt, protocol::ProtocolTransport};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Address of a running flatdb server
    address: SocketAddr,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let cli = Cli::parse();
    let stream = TcpStream::connect(cli.address)?;
    let mut transport = ProtocolTransport::new(stream);

    let stdin = io::stdin();
    let stdout = io::stdout();

    loop {
        let reader = stdin.lock();
        let writer = stdout.lock();

        let command = match prompt(reader, writer) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        match command {
            Command::Exit => break,
            Command::Statement(statement) => {
                transport.write_statement(&statement)?;
                println!("{}", transport.read_reply()?);
            }
        }
    }

    Ok(())
}
