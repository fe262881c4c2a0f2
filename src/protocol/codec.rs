//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ```text
//! Content-Type: api/response\n      header lines, "Key: value"
//! Content-Length: 2\n
//! \n                                blank line ends the header block
//! OK                                exactly Content-Length bytes, if any
//! ```
//!
//! Leading blank lines before the first header are skipped. Commands use
//! the same layout with the verb line first and a lower-case
//! `content-length`; every command write ends with `\n\n`.

use std::collections::HashMap;
use std::io::{BufRead, ErrorKind, Read, Write};

use bytes::Bytes;
use percent_encoding::percent_decode_str;

use crate::error::{EslError, Result};
use super::command::collapse_line_breaks;
use super::{Command, Event, Response};

/// Terminator written after every command
pub const FRAME_TERMINATOR: &[u8] = b"\n\n";

/// Maximum accepted body size (64 MB)
pub const MAX_BODY_SIZE: usize = 64 * 1024 * 1024;

// =============================================================================
// Command Encoding
// =============================================================================

/// Encode a command to bytes, without the frame terminator
///
/// Format: `verb[ params]`, then `Job-UUID`, then headers in ascending key
/// order, then `content-length` and the body when the body is not empty.
pub fn encode_command(command: &Command) -> Vec<u8> {
    let mut buf = Vec::with_capacity(64 + command.body().len());

    buf.extend_from_slice(command.verb().as_bytes());
    if !command.params().is_empty() {
        buf.push(b' ');
        buf.extend_from_slice(command.params().as_bytes());
    }

    if !command.job_uuid().is_empty() {
        buf.extend_from_slice(b"\nJob-UUID: ");
        buf.extend_from_slice(command.job_uuid().as_bytes());
    }

    for (key, value) in sorted(command.headers()) {
        buf.push(b'\n');
        buf.extend_from_slice(key.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(value.as_bytes());
    }

    let body = command.body();
    if !body.is_empty() {
        buf.extend_from_slice(format!("\ncontent-length: {}\n\n", body.len()).as_bytes());
        buf.extend_from_slice(body.as_bytes());
    }

    buf
}

/// Write a command followed by the frame terminator, then flush
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    writer.write_all(&encode_command(command))?;
    writer.write_all(FRAME_TERMINATOR)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: `Content-Type`, then `Reply-Text`, `Job-UUID` and
/// `Content-Length` + body when present.
pub fn encode_response(response: &Response) -> Vec<u8> {
    let mut buf = Vec::with_capacity(64 + response.body.len());

    buf.extend_from_slice(b"Content-Type: ");
    buf.extend_from_slice(response.content_type.as_bytes());

    if !response.text.is_empty() {
        buf.extend_from_slice(b"\nReply-Text: ");
        buf.extend_from_slice(response.text.as_bytes());
    }

    if !response.job_uuid.is_empty() {
        buf.extend_from_slice(b"\nJob-UUID: ");
        buf.extend_from_slice(response.job_uuid.as_bytes());
    }

    if !response.body.is_empty() {
        buf.extend_from_slice(format!("\nContent-Length: {}\n\n", response.body.len()).as_bytes());
        buf.extend_from_slice(&response.body);
    }

    buf
}

/// Read one complete frame from a stream
///
/// Blocks until a frame is received or an error occurs. End of stream
/// before the first header line is [`EslError::Closed`].
pub fn read_response<R: BufRead>(reader: &mut R) -> Result<Response> {
    let mut response = Response::default();
    let mut content_length = 0usize;

    loop {
        let line = match read_line(reader)? {
            Some(line) => line,
            None if response.is_empty() => return Err(EslError::Closed),
            None => return Err(EslError::UnexpectedEof { expected: 1, actual: 0 }),
        };

        if line.is_empty() {
            if response.is_empty() {
                continue; // leading blank line
            }
            break; // end of header block
        }

        let (key, value) = split_header(&line)?;
        tracing::trace!("Header {}: {}", key, value);

        match key {
            "Content-Type" => response.content_type = value.to_string(),
            "Reply-Text" => response.text = value.to_string(),
            "Job-UUID" => response.job_uuid = value.to_string(),
            "Content-Length" => content_length = parse_content_length(value)?,
            _ => tracing::warn!("Ignoring unsupported response header {}: {}", key, value),
        }
    }

    if content_length > 0 {
        response.body = read_body(reader, content_length)?;
    }

    Ok(response)
}

/// Read exactly `len` body bytes
fn read_body<R: Read>(reader: &mut R, len: usize) -> Result<Bytes> {
    let mut body = Vec::with_capacity(len);
    let actual = reader.by_ref().take(len as u64).read_to_end(&mut body)?;
    if actual < len {
        return Err(EslError::UnexpectedEof { expected: len, actual });
    }
    Ok(Bytes::from(body))
}

/// Read one line, without its `\n` / `\r\n`
///
/// Lines longer than the reader's buffer are accumulated across refills.
/// Returns `None` at end of stream.
fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let mut line = Vec::new();
    let n = match reader.read_until(b'\n', &mut line) {
        Ok(n) => n,
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => 0,
        Err(e) => return Err(e.into()),
    };
    if n == 0 {
        return Ok(None);
    }

    if line.last() == Some(&b'\n') {
        line.pop();
    }
    if line.last() == Some(&b'\r') {
        line.pop();
    }

    String::from_utf8(line)
        .map(Some)
        .map_err(|e| EslError::MalformedHeader(String::from_utf8_lossy(e.as_bytes()).into_owned()))
}

// =============================================================================
// Event Encoding/Decoding
// =============================================================================

/// Encode an event to bytes
///
/// Headers in ascending key order, one per line, line breaks inside values
/// collapsed to spaces. `Content-Length` is always recomputed from the body.
pub fn encode_event(event: &Event) -> Vec<u8> {
    let mut buf = Vec::with_capacity(256 + event.body.len());

    for (key, value) in sorted(&event.headers) {
        if key.eq_ignore_ascii_case("Content-Length") {
            continue;
        }
        buf.extend_from_slice(key.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(collapse_line_breaks(value).as_bytes());
        buf.push(b'\n');
    }

    if !event.body.is_empty() {
        buf.extend_from_slice(format!("Content-Length: {}\n\n", event.body.len()).as_bytes());
        buf.extend_from_slice(&event.body);
    }

    buf
}

/// Decode an event from the body of a `text/event-plain` frame
///
/// Header values are percent-decoded when they decode cleanly and kept
/// verbatim otherwise.
pub fn decode_event(bytes: &[u8]) -> Result<Event> {
    let mut headers = HashMap::new();
    let mut rest = bytes;

    while !rest.is_empty() {
        let line = match rest.iter().position(|&b| b == b'\n') {
            Some(i) => {
                let line = &rest[..i];
                rest = &rest[i + 1..];
                line
            }
            None => std::mem::take(&mut rest),
        };
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.is_empty() {
            break; // end of headers
        }

        let line = std::str::from_utf8(line)
            .map_err(|_| EslError::MalformedHeader(String::from_utf8_lossy(line).into_owned()))?;
        let (key, value) = split_header(line)?;
        headers.insert(key.to_string(), percent_decode(value));
    }

    let length = headers
        .get("Content-Length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);

    let body = if length > 0 {
        if rest.len() < length {
            return Err(EslError::UnexpectedEof { expected: length, actual: rest.len() });
        }
        Bytes::copy_from_slice(&rest[..length])
    } else {
        Bytes::new()
    };

    Ok(Event { headers, body })
}

// =============================================================================
// Helpers
// =============================================================================

/// Split `Key: value` at the first colon, trimming spaces and tabs from
/// the front of the value
fn split_header(line: &str) -> Result<(&str, &str)> {
    match line.find(':') {
        Some(idx) if idx > 0 => Ok((&line[..idx], trim_left(&line[idx + 1..]))),
        _ => Err(EslError::MalformedHeader(line.to_string())),
    }
}

fn trim_left(value: &str) -> &str {
    value.trim_start_matches([' ', '\t'])
}

fn parse_content_length(value: &str) -> Result<usize> {
    let length = value
        .parse::<usize>()
        .map_err(|_| EslError::MalformedContentLength(value.to_string()))?;

    if length > MAX_BODY_SIZE {
        return Err(EslError::BodyTooLarge { size: length, max: MAX_BODY_SIZE });
    }
    Ok(length)
}

/// Percent-decode, falling back to the raw value on a bad escape or
/// invalid UTF-8
fn percent_decode(value: &str) -> String {
    if !value.contains('%') {
        return value.to_string();
    }
    if !has_valid_escapes(value) {
        return value.to_string();
    }

    match percent_decode_str(value).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => value.to_string(),
    }
}

/// Every `%` must be followed by two hex digits
fn has_valid_escapes(value: &str) -> bool {
    let bytes = value.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.get(i + 1..i + 3).is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}

/// Map entries in ascending key order
fn sorted(map: &HashMap<String, String>) -> Vec<(&String, &String)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
    entries
}
