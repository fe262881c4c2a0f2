//! Client Module
//!
//! The authenticated connection and its reader thread.
//!
//! ## Responsibilities
//! - Dial, authenticate and start exactly one reader thread
//! - Route replies to the waiting request and events to the event sink
//! - Turn `-ERR` replies into errors
//! - Shut down cleanly on `exit`, disconnect notice or stream failure

use std::collections::HashMap;
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender};
use crossbeam::select;
use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{EslError, Result};
use crate::network::{dial, with_default_port, Connection, TeeReader, TeeWriter, Transport};
use crate::protocol::{build_event_names, content_type, Command, Event, Response, EVENT_ALL};

/// How long `close` waits for an in-flight request before sending `exit`
/// without waiting for its reply
const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Lifecycle of a client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ClientState {
    Connecting = 0,
    Authenticating = 1,
    Ready = 2,
    Closing = 3,
    Closed = 4,
}

impl ClientState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ClientState::Connecting,
            1 => ClientState::Authenticating,
            2 => ClientState::Ready,
            3 => ClientState::Closing,
            _ => ClientState::Closed,
        }
    }
}

/// Shared lifecycle flag
#[derive(Clone)]
struct StateCell(Arc<AtomicU8>);

impl StateCell {
    fn new(state: ClientState) -> Self {
        Self(Arc::new(AtomicU8::new(state as u8)))
    }

    fn get(&self) -> ClientState {
        ClientState::from_u8(self.0.load(Ordering::Acquire))
    }

    fn set(&self, state: ClientState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

/// An authenticated event-socket client
///
/// ## Concurrency Model
///
/// - One reader thread owns the read half and routes every frame
/// - Requests are serialized by `request_lock`: the switch answers
///   commands strictly in order, so only one may wait for a reply
/// - The reply channel is a rendezvous channel; a reply is handed directly
///   to the waiting request
/// - Event delivery blocks the reader until the sink accepts the event
pub struct Client {
    /// Framed connection (shared with the reader thread)
    conn: Arc<Connection>,

    /// Lifecycle state (shared with the reader thread)
    state: StateCell,

    /// Replies to commands, in server order
    replies: Receiver<Response>,

    /// The error that stopped the reader, delivered once
    errors: Receiver<EslError>,

    /// Serializes write-then-await-reply round trips
    request_lock: Mutex<()>,

    /// Handle used to shut the stream down
    transport: Mutex<Box<dyn Transport>>,

    /// Keeps the event channel open until the client is dropped when the
    /// reader does not own closing it
    _events_guard: Option<Sender<Event>>,
}

impl Client {
    /// Dial `addr` and authenticate with `password`
    ///
    /// [`DEFAULT_PORT`](crate::network::DEFAULT_PORT) is used when `addr`
    /// has no port.
    pub fn connect(addr: &str, password: &str, config: Config) -> Result<Self> {
        let addr = with_default_port(addr)?;
        tracing::info!("Connecting to {}", addr);

        let stream = dial(&addr, config.dial_timeout)?;
        Self::with_stream(stream, password, config)
    }

    /// Authenticate over an already open stream and start the reader
    ///
    /// The stream is shut down if authentication fails.
    pub fn with_stream<T: Transport>(stream: T, password: &str, config: Config) -> Result<Self> {
        let state = StateCell::new(ClientState::Connecting);
        let peer_addr = stream.peer_label();

        let read_half = stream.duplicate()?;
        let write_half = stream.duplicate()?;

        let reader: Box<dyn Read + Send> = match &config.dump_in {
            Some(sink) => Box::new(TeeReader::new(read_half, Arc::clone(sink))),
            None => Box::new(read_half),
        };
        let writer: Box<dyn Write + Send> = match &config.dump_out {
            Some(sink) => Box::new(TeeWriter::new(write_half, Arc::clone(sink))),
            None => Box::new(write_half),
        };

        let conn = Arc::new(Connection::new(reader, writer).with_peer_addr(peer_addr));

        state.set(ClientState::Authenticating);
        if let Err(e) = conn.auth_timeout(password, config.auth_timeout) {
            tracing::warn!("Auth with {} failed: {}", conn.peer_addr(), e);
            let _ = stream.close();
            return Err(e);
        }
        state.set(ClientState::Ready);

        let (reply_tx, replies) = channel::bounded(0);
        let (error_tx, errors) = channel::bounded(1);

        let events_guard = if config.auto_close_events {
            None
        } else {
            config.events.clone()
        };

        let reader = Reader {
            conn: Arc::clone(&conn),
            state: state.clone(),
            replies: reply_tx,
            errors: error_tx,
            events: config.events,
        };

        let spawned = thread::Builder::new()
            .name("esl-reader".to_string())
            .spawn(move || reader.run());
        if let Err(e) = spawned {
            let _ = stream.close();
            return Err(e.into());
        }

        Ok(Self {
            conn,
            state,
            replies,
            errors,
            request_lock: Mutex::new(()),
            transport: Mutex::new(Box::new(stream)),
            _events_guard: events_guard,
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> ClientState {
        self.state.get()
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        self.conn.peer_addr()
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// Run an API command and return its output
    ///
    /// The switch accepts no other command until this one finishes.
    pub fn api(&self, command: &str) -> Result<String> {
        let response = self.send_recv(Command::new("api").arg(command))?;
        Ok(response.body_str())
    }

    /// Run an API command in the background and return the job id
    ///
    /// Completion arrives as a `BACKGROUND_JOB` event with the same
    /// `Job-UUID`.
    pub fn job(&self, command: &str) -> Result<String> {
        let response = self.send_recv(Command::new("bgapi").arg(command))?;
        Ok(response.job_uuid().to_string())
    }

    /// Run an API command in the background under a caller-chosen job id
    pub fn job_with_id(&self, command: &str, id: &str) -> Result<()> {
        self.send_recv(Command::new("bgapi").arg(command).with_job_uuid(id))?;
        Ok(())
    }

    /// Subscribe to events by name
    ///
    /// Native names and custom subclasses may be mixed. No names, or `all`,
    /// subscribes to everything. Subscriptions accumulate.
    pub fn subscribe<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        let names = build_event_names(names);
        self.send_recv(Command::new("event").arg(names))?;
        Ok(())
    }

    /// Unsubscribe from events by name; no names suppresses all events
    pub fn unsubscribe<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        let names = build_event_names(names);
        let command = if names == EVENT_ALL {
            Command::new("noevents")
        } else {
            Command::new("nixevent").arg(names)
        };

        self.send_recv(command)?;
        Ok(())
    }

    /// Only receive events whose `header` equals `value`
    ///
    /// Filters are inclusive and accumulate.
    pub fn filter(&self, header: &str, value: &str) -> Result<()> {
        self.send_recv(Command::new("filter").arg(header).arg(value))?;
        Ok(())
    }

    /// Remove a filter added with [`filter`](Self::filter)
    pub fn filter_delete(&self, header: &str, value: &str) -> Result<()> {
        self.send_recv(Command::new("filter").args(["delete", header, value]))?;
        Ok(())
    }

    /// Lock the event stream onto a single channel uuid
    pub fn my_events(&self, uuid: &str) -> Result<()> {
        self.send_recv(Command::new("myevents").arg(uuid))?;
        Ok(())
    }

    /// Divert events meant for an embedded script's input callback to
    /// this socket
    pub fn divert_events(&self, on: bool) -> Result<()> {
        let value = if on { "on" } else { "off" };
        self.send_recv(Command::new("divert_events").arg(value))?;
        Ok(())
    }

    /// Inject an event into the switch
    pub fn send_event(&self, name: &str, headers: HashMap<String, String>, body: &str) -> Result<()> {
        self.send_recv(Command::new("sendevent").arg(name).with_message(headers, body))?;
        Ok(())
    }

    /// Inject a prebuilt event into the switch
    pub fn fire(&self, event: &Event) -> Result<()> {
        self.send_recv(Command::from_event(event))?;
        Ok(())
    }

    /// Send a message to a specific channel
    pub fn send_msg(&self, uuid: &str, headers: HashMap<String, String>, body: &str) -> Result<()> {
        self.send_recv(Command::new("sendmsg").arg(uuid).with_message(headers, body))?;
        Ok(())
    }

    /// Send `exit` and shut the stream down
    ///
    /// The `exit` reply is not required. Pending and later requests fail
    /// with [`EslError::Closed`].
    pub fn close(&self) -> Result<()> {
        if self.state() != ClientState::Closed {
            self.state.set(ClientState::Closing);
        }
        tracing::info!("Closing connection to {}", self.conn.peer_addr());

        let exit = Command::new("exit");
        match self.request_lock.try_lock_for(CLOSE_GRACE) {
            Some(_guard) => {
                let _ = self.round_trip(&exit);
            }
            None => {
                let _ = self.conn.write(&exit);
            }
        }

        let result = self.transport.lock().close();
        self.state.set(ClientState::Closed);

        match result {
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            other => other.map_err(EslError::from),
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// One request at a time: write, then wait for its reply
    fn send_recv(&self, command: Command) -> Result<Response> {
        let _guard = self.request_lock.lock();
        self.round_trip(&command)
    }

    fn round_trip(&self, command: &Command) -> Result<Response> {
        if self.state() == ClientState::Closed {
            return Err(self.errors.try_recv().unwrap_or(EslError::Closed));
        }

        self.conn.write(command)?;

        select! {
            recv(self.errors) -> err => Err(err.unwrap_or(EslError::Closed)),
            recv(self.replies) -> reply => match reply {
                Ok(response) => response.into_result(),
                Err(_) => Err(self.errors.try_recv().unwrap_or(EslError::Closed)),
            },
        }
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        // unblocks the reader thread
        let _ = self.transport.lock().close();
    }
}

// =============================================================================
// Reader thread
// =============================================================================

/// State owned by the reader thread
///
/// Dropping it closes the reply and error channels, and the event sink
/// when the reader holds its last sender.
struct Reader {
    conn: Arc<Connection>,
    state: StateCell,
    replies: Sender<Response>,
    errors: Sender<EslError>,
    events: Option<Sender<Event>>,
}

impl Reader {
    fn run(mut self) {
        tracing::info!("Reader started for {}", self.conn.peer_addr());

        match self.dispatch() {
            Ok(()) => tracing::info!("Connection to {} ended", self.conn.peer_addr()),
            Err(e) => {
                if e.is_closed() {
                    tracing::debug!("Stream from {} closed", self.conn.peer_addr());
                } else {
                    tracing::warn!("Read from {} failed: {}", self.conn.peer_addr(), e);
                }
                // capacity 1 and sent once, never blocks
                let _ = self.errors.send(e);
            }
        }

        self.state.set(ClientState::Closed);
        tracing::info!("Reader stopped for {}", self.conn.peer_addr());
    }

    /// Route frames until a disconnect notice or a read error
    fn dispatch(&mut self) -> Result<()> {
        loop {
            let response = self.conn.read()?;

            match response.content_type() {
                content_type::API_RESPONSE | content_type::COMMAND_REPLY => {
                    if self.replies.send(response).is_err() {
                        return Ok(()); // client dropped
                    }
                }
                content_type::EVENT_PLAIN => self.dispatch_event(&response),
                content_type::DISCONNECT_NOTICE => return Ok(()),
                other => {
                    tracing::warn!("Discarding frame with unexpected content type {:?}", other);
                }
            }
        }
    }

    fn dispatch_event(&mut self, response: &Response) {
        let event = match response.to_event() {
            Ok(event) => event,
            Err(e) => {
                tracing::error!("Dropping undecodable event: {}", e);
                return;
            }
        };

        tracing::debug!(
            "Event {} (seq: {}, job: {:?})",
            event.name(),
            event.sequence(),
            event.job_uuid()
        );

        if let Some(sink) = &self.events {
            if sink.send(event).is_err() {
                tracing::warn!("Event receiver dropped, discarding further events");
                self.events = None;
            }
        }
    }
}
