use std::{error::Error, net::SocketAddr, path::PathBuf};

use clap::Parser;
use flatdb::protocol::TableServer;
use log::info;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory holding one subdirectory per database
    path: PathBuf,
    /// Listen for new connections at address
    address: SocketAddr,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let cli = Cli::parse();

    ctrlc::set_handler(|| {
        info!("shutting down");
        std::process::exit(0);
    })?;

    let server = TableServer::new(cli.address, cli.path)?;
    server.listen()?;
    Ok(())
}
