//! Response definitions
//!
//! Represents frames received from the switch.

use std::fmt;

use bytes::Bytes;

use crate::error::{EslError, Result};
use super::codec::{decode_event, encode_response};
use super::event::Event;

/// Known `Content-Type` values
pub mod content_type {
    pub const AUTH_REQUEST: &str = "auth/request";
    pub const API_RESPONSE: &str = "api/response";
    pub const COMMAND_REPLY: &str = "command/reply";
    pub const EVENT_PLAIN: &str = "text/event-plain";
    pub const DISCONNECT_NOTICE: &str = "text/disconnect-notice";
    pub const RUDE_REJECTION: &str = "text/rude-rejection";
}

/// A frame received from the switch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// `Content-Type` header
    pub(crate) content_type: String,

    /// `Reply-Text` header
    pub(crate) text: String,

    /// `Job-UUID` header
    pub(crate) job_uuid: String,

    /// Body, present when `Content-Length` was positive
    pub(crate) body: Bytes,
}

impl Response {
    /// Create a response with the given content type
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_job_uuid(mut self, id: impl Into<String>) -> Self {
        self.job_uuid = id.into();
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn job_uuid(&self) -> &str {
        &self.job_uuid
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body as text, lossy for invalid UTF-8
    pub fn body_str(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body length in bytes
    pub fn content_length(&self) -> usize {
        self.body.len()
    }

    /// True until a `Content-Type` header has been seen
    pub fn is_empty(&self) -> bool {
        self.content_type.is_empty()
    }

    /// Classify the response as an error, if it is one
    ///
    /// - a disconnect notice is always [`EslError::Closed`]
    /// - a command reply whose text starts with `-ERR` fails with that text
    /// - an api response whose body starts with `-ERR` fails with that body
    pub fn as_error(&self) -> Option<EslError> {
        match self.content_type.as_str() {
            content_type::DISCONNECT_NOTICE => Some(EslError::Closed),
            content_type::COMMAND_REPLY if self.text.starts_with("-ERR") => {
                Some(EslError::CommandFailed(self.text.clone()))
            }
            content_type::API_RESPONSE if self.body.starts_with(b"-ERR") => {
                Some(EslError::CommandFailed(self.body_str()))
            }
            _ => None,
        }
    }

    /// Turn an error response into `Err`
    pub fn into_result(self) -> Result<Self> {
        match self.as_error() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }

    /// Parse the body of a `text/event-plain` frame
    pub fn to_event(&self) -> Result<Event> {
        if self.content_type != content_type::EVENT_PLAIN {
            return Err(EslError::Protocol(format!(
                "unsupported event content type: {}",
                self.content_type
            )));
        }

        decode_event(&self.body)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&encode_response(self)))
    }
}
