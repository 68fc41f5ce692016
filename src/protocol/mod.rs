//! Client-server communication protocol.
//!
//! This module defines how statements and results travel between a flatdb
//! client and server: the structured request type the engine consumes, the
//! reply type written back to clients, the line-oriented transport framing,
//! and the TCP server that ties them together.
//!
//! # Wire Format
//!
//! The protocol is plain text, newline delimited:
//!
//! - A client sends one statement per line.
//! - The server answers with the result text (one or more lines), then a
//!   sentinel line holding the single end-of-transmission byte (`0x04`).
//! - Failures arrive as a single `ERROR:<description>` line, framed the same
//!   way; they never terminate the session.
//!
//! # Key Components
//!
//! - [`Request`]: structured operation descriptor produced by the statement
//!   layer and executed by the engine.
//! - [`Reply`]: rendered outcome of one statement.
//! - [`ProtocolTransport`]: framing codec over any bidirectional stream.
//! - [`TableServer`]: accepts TCP connections and serves sessions one at a
//!   time, matching the engine's single-caller assumption.
pub mod request;
mod response;
mod server;
mod transport;

pub use request::{Alteration, Request};
pub use response::Reply;
pub use server::TableServer;
pub use transport::{ProtocolTransport, TransportError};
