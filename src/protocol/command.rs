//! Command definitions
//!
//! Represents requests sent to the switch.

use std::collections::HashMap;
use std::fmt;

use super::codec::encode_command;
use super::event::Event;

/// An outgoing request
///
/// Built per call with the `with_*` methods, then handed to
/// [`write_command`](super::write_command) exactly once.
#[derive(Clone, PartialEq, Eq)]
pub struct Command {
    verb: String,
    params: String,
    job_uuid: String,
    headers: HashMap<String, String>,
    body: String,
}

impl Command {
    /// Create a command with the given verb and no parameters
    ///
    /// # Panics
    ///
    /// Panics if `verb` is empty.
    pub fn new(verb: impl Into<String>) -> Self {
        let verb = verb.into();
        assert!(!verb.is_empty(), "command verb cannot be empty");

        Self {
            verb,
            params: String::new(),
            job_uuid: String::new(),
            headers: HashMap::new(),
            body: String::new(),
        }
    }

    /// Append one space-separated parameter
    pub fn arg(mut self, param: impl AsRef<str>) -> Self {
        if !self.params.is_empty() {
            self.params.push(' ');
        }
        self.params.push_str(param.as_ref());
        self
    }

    /// Append several space-separated parameters
    pub fn args<I, S>(self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        params.into_iter().fold(self, |cmd, param| cmd.arg(param))
    }

    /// Attach a job id, used to correlate a background job with its
    /// completion event
    pub fn with_job_uuid(mut self, id: impl AsRef<str>) -> Self {
        self.job_uuid = id.as_ref().trim().to_string();
        self
    }

    /// Replace the header block and body
    pub fn with_message(mut self, headers: HashMap<String, String>, body: impl Into<String>) -> Self {
        self.headers = headers;
        self.body = body.into();
        self
    }

    /// Add a single header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Build a `sendevent` command carrying the given event
    ///
    /// Header values have embedded line breaks collapsed to spaces and
    /// any `Content-Length` header is dropped; the encoder computes its own.
    pub fn from_event(event: &Event) -> Self {
        let headers = event
            .headers()
            .iter()
            .filter(|(key, _)| !key.eq_ignore_ascii_case("Content-Length"))
            .map(|(key, value)| (key.clone(), collapse_line_breaks(value)))
            .collect();

        Command::new("sendevent")
            .arg(event.get("Event-Name"))
            .with_message(headers, String::from_utf8_lossy(event.body()))
    }

    pub fn verb(&self) -> &str {
        &self.verb
    }

    pub fn params(&self) -> &str {
        &self.params
    }

    pub fn job_uuid(&self) -> &str {
        &self.job_uuid
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Replace `\r\n` and `\n` with a single space
///
/// Header values cannot span lines on the wire.
pub(crate) fn collapse_line_breaks(value: &str) -> String {
    value.replace("\r\n", " ").replace('\n', " ")
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&encode_command(self)))
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Command");
        debug.field("verb", &self.verb);

        if !self.params.is_empty() {
            // never leak the password into logs
            let params = if self.verb == "auth" { "*****" } else { self.params.as_str() };
            debug.field("params", &params);
        }
        if !self.job_uuid.is_empty() {
            debug.field("job_uuid", &self.job_uuid);
        }
        if !self.headers.is_empty() {
            debug.field("headers", &self.headers.len());
        }
        if !self.body.is_empty() {
            debug.field("body_len", &self.body.len());
        }

        debug.finish()
    }
}
