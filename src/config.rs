//! Configuration for eslink
//!
//! Client options with sensible defaults, plus `.env` file loading for the
//! binaries.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use crossbeam::channel::Sender;

use crate::error::{EslError, Result};
use crate::network::{dump_sink, DumpSink};
use crate::protocol::Event;

/// Client configuration
#[derive(Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Connection Configuration
    // -------------------------------------------------------------------------
    /// TCP connect timeout
    pub dial_timeout: Duration,

    /// Deadline for the whole auth handshake
    pub auth_timeout: Duration,

    // -------------------------------------------------------------------------
    // Event Configuration
    // -------------------------------------------------------------------------
    /// Where parsed events are delivered. Events are dropped when unset.
    pub events: Option<Sender<Event>>,

    /// Let the reader drop its end of the event channel when the connection
    /// ends, so receivers see a disconnect. Otherwise the client keeps a
    /// sender alive until it is dropped.
    pub auto_close_events: bool,

    // -------------------------------------------------------------------------
    // Debug Configuration
    // -------------------------------------------------------------------------
    /// Mirror of every byte read from the switch
    pub dump_in: Option<DumpSink>,

    /// Mirror of every byte written to the switch
    pub dump_out: Option<DumpSink>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dial_timeout: Duration::from_secs(5),
            auth_timeout: Duration::from_secs(2),
            events: None,
            auto_close_events: false,
            dump_in: None,
            dump_out: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("dial_timeout", &self.dial_timeout)
            .field("auth_timeout", &self.auth_timeout)
            .field("events", &self.events.is_some())
            .field("auto_close_events", &self.auto_close_events)
            .field("dump_in", &self.dump_in.is_some())
            .field("dump_out", &self.dump_out.is_some())
            .finish()
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the TCP connect timeout
    pub fn dial_timeout(mut self, timeout: Duration) -> Self {
        self.config.dial_timeout = timeout;
        self
    }

    /// Set the auth handshake timeout
    pub fn auth_timeout(mut self, timeout: Duration) -> Self {
        self.config.auth_timeout = timeout;
        self
    }

    /// Deliver events to `sender`
    ///
    /// With `auto_close`, the channel disconnects when the connection ends.
    pub fn events(mut self, sender: Sender<Event>, auto_close: bool) -> Self {
        self.config.events = Some(sender);
        self.config.auto_close_events = auto_close;
        self
    }

    /// Mirror incoming bytes to `writer`
    pub fn dump_in(mut self, writer: impl Write + Send + 'static) -> Self {
        self.config.dump_in = Some(dump_sink(writer));
        self
    }

    /// Mirror outgoing bytes to `writer`
    pub fn dump_out(mut self, writer: impl Write + Send + 'static) -> Self {
        self.config.dump_out = Some(dump_sink(writer));
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

// =============================================================================
// .env files
// =============================================================================

/// Parse `KEY=VALUE` lines
///
/// Lines without `=` are skipped, as are values starting with `#`.
/// Anything after a `#` in the value is a comment. Keys and values are
/// trimmed.
pub fn parse_env_file(path: impl AsRef<Path>) -> Result<Vec<(String, String)>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| EslError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let vars = content
        .lines()
        .filter_map(|line| line.split_once('='))
        .filter(|(_, value)| !value.starts_with('#'))
        .map(|(key, value)| {
            let value = value.split('#').next().unwrap_or("");
            (key.trim().to_string(), value.trim().to_string())
        })
        .collect();

    Ok(vars)
}

/// Export the variables of a `.env` file into the process environment
///
/// A missing file is not an error. Returns the number of variables set.
pub fn load_env_file(path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    match fs::metadata(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(EslError::Config(format!("failed to open {}: {}", path.display(), e))),
        Ok(_) => {}
    }

    let vars = parse_env_file(path)?;
    for (key, value) in &vars {
        if key.is_empty() || key.contains('\0') || value.contains('\0') {
            return Err(EslError::Config(format!("invalid variable {key:?} in {}", path.display())));
        }
        std::env::set_var(key, value);
    }

    tracing::debug!("Loaded {} variables from {}", vars.len(), path.display());
    Ok(vars.len())
}
