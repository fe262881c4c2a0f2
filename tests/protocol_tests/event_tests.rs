//! Event Tests
//!
//! Tests for event parsing, accessors and the JSON form.

use std::time::{Duration, UNIX_EPOCH};

use eslink::protocol::{decode_event, encode_event, Event};
use eslink::EslError;

// =============================================================================
// Helper Functions
// =============================================================================

const HEARTBEAT: &str = "Event-Name: HEARTBEAT\n\
Core-UUID: 2130a7d1-c1f7-44cd-8fae-8ed5946f3cec\n\
Event-Date-Timestamp: 1700000000123456\n\
Event-Sequence: 5471\n\
Up-Time: 0%20years,%200%20days\n\
\n";

fn decode(data: &str) -> Event {
    decode_event(data.as_bytes()).unwrap()
}

// =============================================================================
// Decoding Tests
// =============================================================================

#[test]
fn test_decode_headers() {
    let event = decode(HEARTBEAT);

    assert_eq!(event.name(), "HEARTBEAT");
    assert_eq!(event.get("Core-UUID"), "2130a7d1-c1f7-44cd-8fae-8ed5946f3cec");
    assert_eq!(event.headers().len(), 5);
    assert!(event.body().is_empty());
}

#[test]
fn test_decode_percent_escapes() {
    let event = decode(HEARTBEAT);
    assert_eq!(event.get("Up-Time"), "0 years, 0 days");
}

#[test]
fn test_bad_escape_keeps_raw_value() {
    let event = decode("Event-Name: CUSTOM\nRatio: 100%\nTruncated: %4\nBad: %zz\n\n");

    assert_eq!(event.get("Ratio"), "100%");
    assert_eq!(event.get("Truncated"), "%4");
    assert_eq!(event.get("Bad"), "%zz");
}

#[test]
fn test_invalid_utf8_escape_keeps_raw_value() {
    let event = decode("Event-Name: CUSTOM\nBytes: %ff%fe\n\n");
    assert_eq!(event.get("Bytes"), "%ff%fe");
}

#[test]
fn test_decode_body() {
    let event = decode(
        "Event-Name: BACKGROUND_JOB\n\
         Job-UUID: 7f4db78a\n\
         Content-Length: 8\n\
         \n\
         +OK done",
    );

    assert_eq!(event.job_uuid(), "7f4db78a");
    assert_eq!(event.body_str(), "+OK done");
    assert_eq!(event.content_length(), 8);
}

#[test]
fn test_decode_body_ignores_trailing_bytes() {
    let event = decode("Event-Name: API\nContent-Length: 2\n\nOKextra");
    assert_eq!(event.body_str(), "OK");
}

#[test]
fn test_decode_short_body() {
    let result = decode_event(b"Event-Name: API\nContent-Length: 20\n\nshort");
    assert!(matches!(
        result,
        Err(EslError::UnexpectedEof { expected: 20, actual: 5 })
    ));
}

#[test]
fn test_decode_crlf_and_missing_final_newline() {
    let event = decode("Event-Name: API\r\nCore-UUID: abc");
    assert_eq!(event.name(), "API");
    assert_eq!(event.get("Core-UUID"), "abc");
}

#[test]
fn test_decode_malformed_line() {
    let result = decode_event(b"Event-Name: API\nnot a header\n\n");
    assert!(matches!(result, Err(EslError::MalformedHeader(_))));
}

// =============================================================================
// Accessor Tests
// =============================================================================

#[test]
fn test_custom_event_name() {
    let event = decode("Event-Name: CUSTOM\nEvent-Subclass: sofia::register\n\n");

    assert!(event.is_custom());
    assert_eq!(event.name(), "sofia::register");
}

#[test]
fn test_native_event_is_not_custom() {
    let event = decode("Event-Name: CHANNEL_CREATE\n\n");

    assert!(!event.is_custom());
    assert_eq!(event.name(), "CHANNEL_CREATE");
}

#[test]
fn test_missing_header_is_empty() {
    let event = decode(HEARTBEAT);
    assert_eq!(event.get("No-Such-Header"), "");
    assert_eq!(event.job_uuid(), "");
    assert_eq!(event.content_type(), "");
}

#[test]
fn test_sequence() {
    assert_eq!(decode(HEARTBEAT).sequence(), 5471);
    assert_eq!(decode("Event-Name: API\n\n").sequence(), 0);
    assert_eq!(decode("Event-Name: API\nEvent-Sequence: seven\n\n").sequence(), 0);
}

#[test]
fn test_timestamp() {
    let expected = UNIX_EPOCH + Duration::from_micros(1_700_000_000_123_456);
    assert_eq!(decode(HEARTBEAT).timestamp(), expected);

    assert_eq!(decode("Event-Name: API\n\n").timestamp(), UNIX_EPOCH);
    assert_eq!(
        decode("Event-Name: API\nEvent-Date-Timestamp: soon\n\n").timestamp(),
        UNIX_EPOCH
    );
}

#[test]
fn test_channel_variable() {
    let event = decode("Event-Name: CHANNEL_ANSWER\nvariable_sip_from_user: 1000\n\n");

    assert_eq!(event.variable("sip_from_user"), "1000");
    assert_eq!(event.variable("sip_to_user"), "");
}

// =============================================================================
// Construction Tests
// =============================================================================

#[test]
fn test_new_native_event() {
    let event = Event::new("  NOTIFY ");
    assert_eq!(event.get("Event-Name"), "NOTIFY");
    assert_eq!(event.get("Event-Subclass"), "");
    assert!(!event.is_custom());
}

#[test]
fn test_new_custom_event() {
    let event = Event::new("CUSTOM conference::maintenance");

    assert_eq!(event.get("Event-Name"), "CUSTOM");
    assert_eq!(event.get("Event-Subclass"), "conference::maintenance");
    assert_eq!(event.name(), "conference::maintenance");
    assert!(event.is_custom());
}

#[test]
#[should_panic(expected = "event name cannot be empty")]
fn test_new_empty_event_panics() {
    let _ = Event::new("   ");
}

#[test]
#[should_panic(expected = "custom event requires a subclass name")]
fn test_new_bare_custom_panics() {
    let _ = Event::new("CUSTOM");
}

// =============================================================================
// Encoding Tests
// =============================================================================

#[test]
fn test_encode_layout() {
    let event = Event::new("NOTIFY")
        .with_header("profile", "internal")
        .with_header("Content-Length", "999")
        .with_body("OK");

    assert_eq!(
        encode_event(&event),
        b"Event-Name: NOTIFY\nprofile: internal\nContent-Length: 2\n\nOK"
    );
    assert_eq!(event.to_string(), "Event-Name: NOTIFY\nprofile: internal\nContent-Length: 2\n\nOK");
}

#[test]
fn test_encode_collapses_line_breaks() {
    let event = Event::new("NOTIFY").with_header("event-string", "a\r\nb\nc");
    assert_eq!(encode_event(&event), b"Event-Name: NOTIFY\nevent-string: a b c\n");
}

#[test]
fn test_encode_then_decode() {
    let event = Event::new("CUSTOM sofia::register")
        .with_header("profile-name", "internal")
        .with_header("from-user", "1000")
        .with_body("line one\nline two");

    let decoded = decode_event(&encode_event(&event)).unwrap();

    // decoding recomputes the synthetic length header
    let mut headers = decoded.headers().clone();
    assert_eq!(headers.remove("Content-Length").as_deref(), Some("17"));
    assert_eq!(&headers, event.headers());
    assert_eq!(decoded.body(), event.body());
}

// =============================================================================
// JSON Tests
// =============================================================================

#[test]
fn test_json_includes_body_field() {
    let event = Event::new("BACKGROUND_JOB")
        .with_header("Job-UUID", "abc")
        .with_body("+OK");

    let value: serde_json::Value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["Event-Name"], "BACKGROUND_JOB");
    assert_eq!(value["Job-UUID"], "abc");
    assert_eq!(value["_body"], "+OK");
}

#[test]
fn test_json_omits_empty_body() {
    let value = serde_json::to_value(Event::new("HEARTBEAT")).unwrap();
    assert!(value.get("_body").is_none());
}

#[test]
fn test_json_round_trip() {
    let event = decode(HEARTBEAT).with_body("payload");

    let json = serde_json::to_string(&event).unwrap();
    let back: Event = serde_json::from_str(&json).unwrap();

    assert_eq!(back, event);
    assert!(back.get("_body").is_empty());
}
