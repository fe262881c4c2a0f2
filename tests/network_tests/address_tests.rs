//! Address Tests
//!
//! Tests for default-port handling and dialing.

use std::net::TcpListener;
use std::time::Duration;

use eslink::network::{dial, with_default_port, DEFAULT_PORT};
use eslink::EslError;

// =============================================================================
// Default Port
// =============================================================================

#[test]
fn test_default_port_value() {
    assert_eq!(DEFAULT_PORT, 8021);
}

#[test]
fn test_host_without_port() {
    assert_eq!(with_default_port("fs.local").unwrap(), "fs.local:8021");
    assert_eq!(with_default_port("10.0.0.1").unwrap(), "10.0.0.1:8021");
    assert_eq!(with_default_port("  localhost ").unwrap(), "localhost:8021");
}

#[test]
fn test_host_with_port_is_unchanged() {
    assert_eq!(with_default_port("fs.local:8022").unwrap(), "fs.local:8022");
    assert_eq!(with_default_port("10.0.0.1:9000").unwrap(), "10.0.0.1:9000");
    assert_eq!(with_default_port("[::1]:8022").unwrap(), "[::1]:8022");
}

#[test]
fn test_empty_address_is_localhost() {
    assert_eq!(with_default_port("").unwrap(), "localhost:8021");
    assert_eq!(with_default_port(":9000").unwrap(), "localhost:9000");
}

#[test]
fn test_ipv6_without_port() {
    assert_eq!(with_default_port("::1").unwrap(), "[::1]:8021");
    assert_eq!(with_default_port("[::1]").unwrap(), "[::1]:8021");
    assert_eq!(with_default_port("fe80::1").unwrap(), "[fe80::1]:8021");
}

#[test]
fn test_invalid_port() {
    match with_default_port("fs.local:http") {
        Err(EslError::BadAddress { addr, reason }) => {
            assert_eq!(addr, "fs.local:http");
            assert_eq!(reason, "invalid port");
        }
        other => panic!("expected BadAddress, got {other:?}"),
    }
    assert!(with_default_port("fs.local:70000").is_err());
}

#[test]
fn test_too_many_colons() {
    assert!(matches!(
        with_default_port("a:b:c"),
        Err(EslError::BadAddress { reason, .. }) if reason == "too many colons"
    ));
}

#[test]
fn test_malformed_brackets() {
    assert!(matches!(with_default_port("[::1"), Err(EslError::BadAddress { .. })));
    assert!(matches!(with_default_port("[fs.local]"), Err(EslError::BadAddress { .. })));
}

// =============================================================================
// Dialing
// =============================================================================

#[test]
fn test_dial_local_listener() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let stream = dial(&addr, Duration::from_secs(1)).unwrap();
    assert!(stream.nodelay().unwrap());

    let (_accepted, peer) = listener.accept().unwrap();
    assert_eq!(peer, stream.local_addr().unwrap());
}

#[test]
fn test_dial_refused() {
    // bind then drop to get a port with no listener
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().to_string()
    };

    assert!(matches!(dial(&addr, Duration::from_secs(1)), Err(EslError::Io(_))));
}
