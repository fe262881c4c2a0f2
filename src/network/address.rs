//! Switch addresses
//!
//! Default-port handling and dialing.

use std::net::{Ipv6Addr, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::{EslError, Result};

/// Event socket port used when the address has none
pub const DEFAULT_PORT: u16 = 8021;

fn bad_address(addr: &str, reason: &str) -> EslError {
    EslError::BadAddress {
        addr: addr.to_string(),
        reason: reason.to_string(),
    }
}

/// Append [`DEFAULT_PORT`] to `addr` when it carries no port
///
/// An empty host means `localhost`. Bare IPv6 literals are bracketed.
pub fn with_default_port(addr: &str) -> Result<String> {
    let addr = addr.trim();
    if addr.is_empty() {
        return Ok(format!("localhost:{DEFAULT_PORT}"));
    }
    if addr.parse::<SocketAddr>().is_ok() {
        return Ok(addr.to_string());
    }
    if let Ok(ip) = addr.parse::<Ipv6Addr>() {
        return Ok(format!("[{ip}]:{DEFAULT_PORT}"));
    }

    if let Some(inner) = addr.strip_prefix('[') {
        return match inner.strip_suffix(']') {
            Some(host) if host.parse::<Ipv6Addr>().is_ok() => Ok(format!("{addr}:{DEFAULT_PORT}")),
            _ => Err(bad_address(addr, "malformed bracketed host")),
        };
    }

    match addr.rsplit_once(':') {
        None => Ok(format!("{addr}:{DEFAULT_PORT}")),
        Some((host, _)) if host.contains(':') => Err(bad_address(addr, "too many colons")),
        Some((host, port)) => {
            port.parse::<u16>()
                .map_err(|_| bad_address(addr, "invalid port"))?;
            let host = if host.is_empty() { "localhost" } else { host };
            Ok(format!("{host}:{port}"))
        }
    }
}

/// Open a TCP connection, trying every resolved address in turn
pub fn dial(addr: &str, timeout: Duration) -> Result<TcpStream> {
    let mut last_err = None;

    for sock_addr in addr.to_socket_addrs()? {
        match TcpStream::connect_timeout(&sock_addr, timeout) {
            Ok(stream) => {
                // Disable Nagle's algorithm for low latency
                stream.set_nodelay(true)?;
                return Ok(stream);
            }
            Err(e) => {
                tracing::debug!("Dial {} failed: {}", sock_addr, e);
                last_err = Some(e);
            }
        }
    }

    Err(last_err
        .map(EslError::Io)
        .unwrap_or_else(|| bad_address(addr, "no addresses resolved")))
}
