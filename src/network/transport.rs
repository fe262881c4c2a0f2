//! Transport abstraction
//!
//! A duplex byte stream that can be split into independent read and write
//! handles and shut down from any of them.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};

/// A stream the client can run over
pub trait Transport: Read + Write + Send + 'static {
    /// Another handle to the same underlying stream
    fn duplicate(&self) -> io::Result<Self>
    where
        Self: Sized;

    /// Shut the stream down in both directions, unblocking pending reads
    fn close(&self) -> io::Result<()>;

    /// Peer description for log messages
    fn peer_label(&self) -> String {
        "unknown".to_string()
    }
}

impl Transport for TcpStream {
    fn duplicate(&self) -> io::Result<Self> {
        self.try_clone()
    }

    fn close(&self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }

    fn peer_label(&self) -> String {
        self.peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string())
    }
}

#[cfg(unix)]
impl Transport for std::os::unix::net::UnixStream {
    fn duplicate(&self) -> io::Result<Self> {
        self.try_clone()
    }

    fn close(&self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }
}
