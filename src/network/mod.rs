//! Network Module
//!
//! Streams, dialing and the framed connection.
//!
//! ## Architecture
//! - One stream, split into a read handle and a write handle
//! - Writes serialized by a lock, reads owned by the client's reader thread
//! - Optional tees mirror raw traffic for debugging

mod address;
mod connection;
mod dump;
mod transport;

pub use address::{dial, with_default_port, DEFAULT_PORT};
pub use connection::Connection;
pub use dump::{dump_sink, DumpSink, TeeReader, TeeWriter};
pub use transport::Transport;
