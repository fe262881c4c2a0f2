//! Response Tests
//!
//! Tests for response classification and event extraction.

use eslink::protocol::{content_type, Response};
use eslink::EslError;

// =============================================================================
// Error Classification
// =============================================================================

#[test]
fn test_ok_command_reply() {
    let resp = Response::new(content_type::COMMAND_REPLY).with_text("+OK event listener enabled plain");
    assert!(resp.as_error().is_none());
    assert!(resp.into_result().is_ok());
}

#[test]
fn test_err_command_reply() {
    let resp = Response::new(content_type::COMMAND_REPLY).with_text("-ERR invalid command");
    match resp.into_result() {
        Err(EslError::CommandFailed(text)) => assert_eq!(text, "-ERR invalid command"),
        other => panic!("expected CommandFailed, got {other:?}"),
    }
}

#[test]
fn test_err_api_body() {
    let resp = Response::new(content_type::API_RESPONSE).with_body("-ERR no such command\n");
    match resp.as_error() {
        Some(EslError::CommandFailed(text)) => assert_eq!(text, "-ERR no such command\n"),
        other => panic!("expected CommandFailed, got {other:?}"),
    }
}

#[test]
fn test_api_body_ok() {
    let resp = Response::new(content_type::API_RESPONSE).with_body("UP 0 years, 1 day\n");
    assert!(resp.as_error().is_none());
}

#[test]
fn test_err_text_on_api_response_is_not_an_error() {
    // api outcomes live in the body, not Reply-Text
    let resp = Response::new(content_type::API_RESPONSE).with_text("-ERR").with_body("+OK");
    assert!(resp.as_error().is_none());
}

#[test]
fn test_err_body_on_command_reply_is_not_an_error() {
    let resp = Response::new(content_type::COMMAND_REPLY).with_text("+OK").with_body("-ERR");
    assert!(resp.as_error().is_none());
}

#[test]
fn test_disconnect_notice_is_closed() {
    let resp = Response::new(content_type::DISCONNECT_NOTICE).with_body("Disconnected, goodbye.\n");
    assert!(matches!(resp.as_error(), Some(EslError::Closed)));
}

#[test]
fn test_command_failed_displays_text() {
    let err = Response::new(content_type::COMMAND_REPLY)
        .with_text("-ERR no reply")
        .into_result()
        .unwrap_err();
    assert_eq!(err.to_string(), "-ERR no reply");
}

// =============================================================================
// Event Extraction
// =============================================================================

#[test]
fn test_to_event() {
    let resp = Response::new(content_type::EVENT_PLAIN)
        .with_body("Event-Name: BACKGROUND_JOB\nJob-UUID: abc\nContent-Length: 3\n\n+OK");

    let event = resp.to_event().unwrap();
    assert_eq!(event.name(), "BACKGROUND_JOB");
    assert_eq!(event.job_uuid(), "abc");
    assert_eq!(event.body_str(), "+OK");
}

#[test]
fn test_to_event_rejects_other_content_types() {
    let resp = Response::new("text/event-json").with_body("{}");
    assert!(matches!(resp.to_event(), Err(EslError::Protocol(_))));

    let resp = Response::new(content_type::API_RESPONSE).with_body("+OK");
    assert!(matches!(resp.to_event(), Err(EslError::Protocol(_))));
}

// =============================================================================
// Accessors
// =============================================================================

#[test]
fn test_accessors() {
    let resp = Response::new(content_type::API_RESPONSE)
        .with_job_uuid("job-7")
        .with_body(vec![0xff, b'o', b'k']);

    assert_eq!(resp.content_type(), "api/response");
    assert_eq!(resp.job_uuid(), "job-7");
    assert_eq!(resp.content_length(), 3);
    assert_eq!(resp.body_str(), "\u{fffd}ok");
    assert!(!resp.is_empty());
    assert!(Response::default().is_empty());
}

#[test]
fn test_display() {
    let resp = Response::new(content_type::COMMAND_REPLY).with_text("+OK accepted");
    assert_eq!(resp.to_string(), "Content-Type: command/reply\nReply-Text: +OK accepted");
}
