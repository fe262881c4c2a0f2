//! Connection
//!
//! Framed reads and writes over one stream, plus the auth handshake.

use std::io::{BufReader, BufWriter, Read, Write};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, RecvTimeoutError};
use parking_lot::Mutex;

use crate::error::{EslError, Result};
use crate::protocol::{content_type, read_response, write_command, Command, Response};

/// Reply text of a successful `auth`
const AUTH_ACCEPTED: &str = "+OK accepted";

/// A framed connection to the switch
///
/// Reads and writes go through separate locks so the background reader
/// never blocks a writer. The write lock keeps concurrent commands from
/// interleaving partial frames.
pub struct Connection {
    /// Read half (buffered for line accumulation)
    reader: Mutex<BufReader<Box<dyn Read + Send>>>,

    /// Write half (buffered, flushed once per command)
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a connection over separate read and write handles
    pub fn new(reader: Box<dyn Read + Send>, writer: Box<dyn Write + Send>) -> Self {
        Self {
            reader: Mutex::new(BufReader::new(reader)),
            writer: Mutex::new(BufWriter::new(writer)),
            peer_addr: "unknown".to_string(),
        }
    }

    /// Set the peer address used in log messages
    pub fn with_peer_addr(mut self, peer_addr: impl Into<String>) -> Self {
        self.peer_addr = peer_addr.into();
        self
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// Write one command and flush it
    pub fn write(&self, command: &Command) -> Result<()> {
        tracing::debug!("Sending {:?} to {}", command, self.peer_addr);

        let mut writer = self.writer.lock();
        write_command(&mut *writer, command)
    }

    /// Read the next frame (blocking)
    pub fn read(&self) -> Result<Response> {
        let mut reader = self.reader.lock();
        let response = read_response(&mut *reader)?;

        tracing::debug!(
            "Received {} from {} (job: {:?}, {} bytes)",
            response.content_type(),
            self.peer_addr,
            response.job_uuid(),
            response.content_length()
        );
        Ok(response)
    }

    /// Run the authentication handshake
    ///
    /// 1. Expect an `auth/request` frame
    /// 2. Answer with `auth <password>`
    /// 3. Expect a `command/reply` with `+OK accepted`
    pub fn auth(&self, password: &str) -> Result<()> {
        let request = match self.read() {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("No auth request from {}: {}", self.peer_addr, e);
                return Err(EslError::MissingAuthRequest);
            }
        };

        match request.content_type() {
            content_type::AUTH_REQUEST => {}
            content_type::RUDE_REJECTION => return Err(EslError::AccessDenied),
            content_type::DISCONNECT_NOTICE => return Err(EslError::Closed),
            other => return Err(EslError::UnexpectedContentType(other.to_string())),
        }

        self.write(&Command::new("auth").arg(password))?;

        let reply = self.read()?;
        if reply.content_type() != content_type::COMMAND_REPLY {
            return Err(EslError::UnexpectedContentType(reply.content_type().to_string()));
        }
        if reply.text() != AUTH_ACCEPTED {
            return Err(EslError::InvalidPassword);
        }

        tracing::info!("Authenticated with {}", self.peer_addr);
        Ok(())
    }

    /// Run [`auth`](Self::auth) on a helper thread, giving up after `timeout`
    ///
    /// On timeout the helper thread is left behind. Its result is
    /// discarded; closing the stream makes its pending read fail.
    pub fn auth_timeout(self: &Arc<Self>, password: &str, timeout: Duration) -> Result<()> {
        let (tx, rx) = channel::bounded(1);
        let conn = Arc::clone(self);
        let password = password.to_string();

        thread::Builder::new()
            .name("esl-auth".to_string())
            .spawn(move || {
                // the receiver is gone after a timeout
                let _ = tx.send(conn.auth(&password));
            })?;

        match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!("Auth with {} timed out after {:?}", self.peer_addr, timeout);
                Err(EslError::Timeout(timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(EslError::Protocol(
                "auth handshake ended without a result".to_string(),
            )),
        }
    }
}
