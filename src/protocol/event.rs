//! Event definitions
//!
//! Unsolicited notifications pushed by the switch.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use super::codec::encode_event;

/// JSON field holding the body
const BODY_FIELD: &str = "_body";

/// An event: a header map plus an optional body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Event {
    pub(crate) headers: HashMap<String, String>,
    pub(crate) body: Bytes,
}

impl Event {
    /// Create an outbound event
    ///
    /// A name of the form `CUSTOM <subclass>` sets `Event-Name: CUSTOM`
    /// and `Event-Subclass: <subclass>`.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty or is a bare `CUSTOM` with no subclass.
    pub fn new(name: &str) -> Self {
        let name = name.trim();
        assert!(!name.is_empty(), "event name cannot be empty");
        assert!(name != "CUSTOM", "custom event requires a subclass name");

        let mut headers = HashMap::new();
        match name.strip_prefix("CUSTOM ") {
            Some(subclass) => {
                headers.insert("Event-Name".to_string(), "CUSTOM".to_string());
                headers.insert("Event-Subclass".to_string(), subclass.trim().to_string());
            }
            None => {
                headers.insert("Event-Name".to_string(), name.to_string());
            }
        }

        Self {
            headers,
            body: Bytes::new(),
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Header value, or `""` when absent
    pub fn get(&self, key: &str) -> &str {
        self.headers.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// `Event-Subclass` if present, else `Event-Name`
    pub fn name(&self) -> &str {
        match self.get("Event-Subclass") {
            "" => self.get("Event-Name"),
            subclass => subclass,
        }
    }

    /// True for `CUSTOM` events, whose logical name lives in `Event-Subclass`
    pub fn is_custom(&self) -> bool {
        let declared = self.get("Event-Name");
        declared == "CUSTOM" || declared.starts_with("CUSTOM ")
    }

    pub fn content_type(&self) -> &str {
        self.get("Content-Type")
    }

    pub fn job_uuid(&self) -> &str {
        self.get("Job-UUID")
    }

    /// Body length in bytes
    pub fn content_length(&self) -> usize {
        self.body.len()
    }

    /// `Event-Sequence`, or 0 when missing or malformed
    pub fn sequence(&self) -> i64 {
        self.get("Event-Sequence").parse().unwrap_or(0)
    }

    /// `Event-Date-Timestamp` (microseconds since the epoch), or the epoch
    /// when missing or malformed
    pub fn timestamp(&self) -> SystemTime {
        let Ok(micros) = self.get("Event-Date-Timestamp").parse::<i64>() else {
            return UNIX_EPOCH;
        };

        let offset = Duration::from_micros(micros.unsigned_abs());
        let ts = if micros >= 0 {
            UNIX_EPOCH.checked_add(offset)
        } else {
            UNIX_EPOCH.checked_sub(offset)
        };
        ts.unwrap_or(UNIX_EPOCH)
    }

    /// Channel variable `variable_<name>`
    pub fn variable(&self, name: &str) -> &str {
        self.get(&format!("variable_{name}"))
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body as text, lossy for invalid UTF-8
    pub fn body_str(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&encode_event(self)))
    }
}

// =============================================================================
// JSON representation
// =============================================================================

impl Serialize for Event {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let with_body = !self.body.is_empty();
        let mut map = serializer.serialize_map(Some(self.headers.len() + usize::from(with_body)))?;

        for (key, value) in &self.headers {
            map.serialize_entry(key, value)?;
        }
        if with_body {
            map.serialize_entry(BODY_FIELD, &String::from_utf8_lossy(&self.body))?;
        }

        map.end()
    }
}

impl<'de> Deserialize<'de> for Event {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let mut headers = HashMap::<String, String>::deserialize(deserializer)?;
        let body = headers
            .remove(BODY_FIELD)
            .map(Bytes::from)
            .unwrap_or_default();

        Ok(Self { headers, body })
    }
}
