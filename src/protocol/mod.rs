//! Protocol Module
//!
//! Defines the text wire protocol spoken with the switch.
//!
//! ## Frame Format
//! ```text
//! ┌──────────────────────────────┐
//! │ Key: value\n                 │  header lines
//! │ ...                          │
//! │ \n                           │  blank line
//! ├──────────────────────────────┤
//! │ body (Content-Length bytes)  │  optional
//! └──────────────────────────────┘
//! ```
//!
//! ### Content Types
//! - `auth/request`: sent once on connect, answered with `auth <password>`
//! - `command/reply`: reply to a command, outcome in `Reply-Text`
//! - `api/response`: reply to `api`, outcome in the body
//! - `text/event-plain`: an event, headers and body nested in the frame body
//! - `text/disconnect-notice`: the switch is hanging up
//! - `text/rude-rejection`: the peer refused the connection

mod command;
mod response;
mod event;
mod names;
mod codec;

pub use command::Command;
pub use response::{content_type, Response};
pub use event::Event;
pub use names::{build_event_names, is_native_event, EVENT_ALL, EVENT_CUSTOM, NATIVE_EVENT_NAMES};
pub use codec::{
    decode_event, encode_command, encode_event, encode_response, read_response, write_command,
    FRAME_TERMINATOR, MAX_BODY_SIZE,
};
