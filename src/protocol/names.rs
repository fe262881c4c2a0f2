//! Event names
//!
//! The table of native event types and the builder for the name list sent
//! with `event` / `nixevent`.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Subscription token meaning "every event"
pub const EVENT_ALL: &str = "all";

/// Marker that introduces custom subclass names
pub const EVENT_CUSTOM: &str = "CUSTOM";

/// Native event type names known to the switch
pub static NATIVE_EVENT_NAMES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "CUSTOM",
        "CLONE",
        "CHANNEL_CREATE",
        "CHANNEL_DESTROY",
        "CHANNEL_STATE",
        "CHANNEL_CALLSTATE",
        "CHANNEL_ANSWER",
        "CHANNEL_HANGUP",
        "CHANNEL_HANGUP_COMPLETE",
        "CHANNEL_EXECUTE",
        "CHANNEL_EXECUTE_COMPLETE",
        "CHANNEL_HOLD",
        "CHANNEL_UNHOLD",
        "CHANNEL_BRIDGE",
        "CHANNEL_UNBRIDGE",
        "CHANNEL_PROGRESS",
        "CHANNEL_PROGRESS_MEDIA",
        "CHANNEL_OUTGOING",
        "CHANNEL_PARK",
        "CHANNEL_UNPARK",
        "CHANNEL_APPLICATION",
        "CHANNEL_ORIGINATE",
        "CHANNEL_UUID",
        "API",
        "LOG",
        "INBOUND_CHAN",
        "OUTBOUND_CHAN",
        "STARTUP",
        "SHUTDOWN",
        "PUBLISH",
        "UNPUBLISH",
        "TALK",
        "NOTALK",
        "SESSION_CRASH",
        "MODULE_LOAD",
        "MODULE_UNLOAD",
        "DTMF",
        "MESSAGE",
        "PRESENCE_IN",
        "NOTIFY_IN",
        "PRESENCE_OUT",
        "PRESENCE_PROBE",
        "MESSAGE_WAITING",
        "MESSAGE_QUERY",
        "ROSTER",
        "CODEC",
        "BACKGROUND_JOB",
        "DETECTED_SPEECH",
        "DETECTED_TONE",
        "PRIVATE_COMMAND",
        "HEARTBEAT",
        "TRAP",
        "ADD_SCHEDULE",
        "DEL_SCHEDULE",
        "EXE_SCHEDULE",
        "RE_SCHEDULE",
        "RELOADXML",
        "NOTIFY",
        "PHONE_FEATURE",
        "PHONE_FEATURE_SUBSCRIBE",
        "SEND_MESSAGE",
        "RECV_MESSAGE",
        "REQUEST_PARAMS",
        "CHANNEL_DATA",
        "GENERAL",
        "COMMAND",
        "SESSION_HEARTBEAT",
        "CLIENT_DISCONNECTED",
        "SERVER_DISCONNECTED",
        "SEND_INFO",
        "RECV_INFO",
        "RECV_RTCP_MESSAGE",
        "SEND_RTCP_MESSAGE",
        "CALL_SECURE",
        "NAT",
        "RECORD_START",
        "RECORD_STOP",
        "PLAYBACK_START",
        "PLAYBACK_STOP",
        "CALL_UPDATE",
        "FAILURE",
        "SOCKET_DATA",
        "MEDIA_BUG_START",
        "MEDIA_BUG_STOP",
        "CONFERENCE_DATA_QUERY",
        "CONFERENCE_DATA",
        "CALL_SETUP_REQ",
        "CALL_SETUP_RESULT",
        "CALL_DETAIL",
        "DEVICE_STATE",
        "TEXT",
        "SHUTDOWN_REQUESTED",
    ]
    .into_iter()
    .collect()
});

/// True if `name` is a native event type (case-sensitive)
pub fn is_native_event(name: &str) -> bool {
    NATIVE_EVENT_NAMES.contains(name)
}

/// Build the space-separated name list for `event` / `nixevent`
///
/// Native names keep their input order. Anything not in the native table
/// is a custom subclass and is gathered after a single `CUSTOM` token.
/// Returns [`EVENT_ALL`] when nothing was asked for or `all` was.
pub fn build_event_names<S: AsRef<str>>(names: &[S]) -> String {
    let first = names.first().map(AsRef::as_ref).unwrap_or("");
    if first.is_empty() || first.eq_ignore_ascii_case(EVENT_ALL) {
        return EVENT_ALL.to_string();
    }

    let mut native: Vec<&str> = Vec::new();
    let mut custom: Vec<&str> = Vec::new();
    let mut has_custom = false;

    for name in names.iter().map(AsRef::as_ref) {
        if name.is_empty() {
            continue;
        }
        if name.eq_ignore_ascii_case(EVENT_ALL) {
            return EVENT_ALL.to_string();
        }
        if name.eq_ignore_ascii_case(EVENT_CUSTOM) {
            has_custom = true;
        } else if is_native_event(name) {
            native.push(name);
        } else {
            custom.push(name.strip_prefix("CUSTOM ").unwrap_or(name));
        }
    }

    if has_custom || !custom.is_empty() {
        native.push(EVENT_CUSTOM);
        native.extend(custom);
    }

    if native.is_empty() {
        return EVENT_ALL.to_string();
    }

    native.join(" ")
}
