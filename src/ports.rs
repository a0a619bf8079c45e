// ABOUTME: TCP port availability probing and conflict resolution.
// ABOUTME: Bind-probe first, connect-probe fallback, linear scan for free ports.

use std::io::ErrorKind;
use std::net::{TcpListener, TcpStream, ToSocketAddrs};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

const CONNECT_PROBE_TIMEOUT: Duration = Duration::from_millis(200);

#[derive(Debug, Error)]
pub enum PortError {
    #[error("no available port in range {base}..={max} (step {increment})")]
    Exhausted { base: u16, max: u16, increment: u16 },

    #[error("port {port} is already in use")]
    InUse { port: u16, holder: Option<String> },
}

/// Check whether a TCP port can be bound on `host`.
///
/// Binding a listener is the authoritative probe. When binding fails for a
/// reason other than `AddrInUse` (restricted port, odd host), fall back to
/// a bounded connect: a successful connection means something is listening.
pub fn is_port_available(port: u16, host: &str) -> bool {
    match TcpListener::bind((host, port)) {
        Ok(_) => true,
        Err(e) if e.kind() == ErrorKind::AddrInUse => false,
        Err(e) => {
            debug!("bind probe on {}:{} failed ({}), trying connect probe", host, port, e);
            connect_probe(port, host)
        }
    }
}

fn connect_probe(port: u16, host: &str) -> bool {
    let addr = match (host, port).to_socket_addrs() {
        Ok(mut addrs) => match addrs.next() {
            Some(addr) => addr,
            None => return true,
        },
        Err(_) => return true,
    };
    TcpStream::connect_timeout(&addr, CONNECT_PROBE_TIMEOUT).is_err()
}

/// Scan `base, base+increment, ...` up to `max` and return the first
/// available port.
pub fn find_available_port(
    base: u16,
    max: u16,
    increment: u16,
    host: &str,
) -> Result<u16, PortError> {
    let increment = increment.max(1);
    let mut candidate = u32::from(base);
    while candidate <= u32::from(max) {
        let port = candidate as u16;
        if is_port_available(port, host) {
            return Ok(port);
        }
        candidate += u32::from(increment);
    }
    Err(PortError::Exhausted {
        base,
        max,
        increment,
    })
}

/// Return `port` if it is free; otherwise either find a replacement
/// (`auto_assign`) or fail with the occupying process named best-effort.
pub fn resolve_port_conflict(port: u16, auto_assign: bool, host: &str) -> Result<u16, PortError> {
    if is_port_available(port, host) {
        return Ok(port);
    }

    if auto_assign {
        let replacement = find_available_port(port, u16::MAX, 1, host)?;
        warn!("port {} is in use, using {} instead", port, replacement);
        return Ok(replacement);
    }

    let holder = port_holder(port);
    match &holder {
        Some(holder) => warn!("port {} is held by {}", port, holder),
        None => warn!("port {} is in use (holder unknown)", port),
    }
    Err(PortError::InUse { port, holder })
}

/// Best-effort identification of the process listening on `port`.
///
/// Walks `/proc/net/tcp{,6}` for a listening socket on the port, then
/// scans process fd tables for the socket inode. Any failure along the
/// way yields `None`; this is diagnostic output only.
fn port_holder(port: u16) -> Option<String> {
    let inode = listening_socket_inode(port)?;
    let target = format!("socket:[{}]", inode);

    let proc_dir = std::fs::read_dir("/proc").ok()?;
    for entry in proc_dir.flatten() {
        let name = entry.file_name();
        let Some(pid) = name.to_str().filter(|n| n.bytes().all(|b| b.is_ascii_digit()))
        else {
            continue;
        };
        let fd_dir = match std::fs::read_dir(entry.path().join("fd")) {
            Ok(d) => d,
            Err(_) => continue,
        };
        for fd in fd_dir.flatten() {
            if let Ok(link) = std::fs::read_link(fd.path())
                && link.to_string_lossy() == target
            {
                let comm = std::fs::read_to_string(entry.path().join("comm"))
                    .map(|s| s.trim().to_string())
                    .unwrap_or_else(|_| "?".to_string());
                return Some(format!("{} (pid {})", comm, pid));
            }
        }
    }
    None
}

fn listening_socket_inode(port: u16) -> Option<u64> {
    for table in ["/proc/net/tcp", "/proc/net/tcp6"] {
        let Ok(content) = std::fs::read_to_string(table) else {
            continue;
        };
        for line in content.lines().skip(1) {
            let fields: Vec<&str> = line.split_whitespace().collect();
            // local_address is field 1 ("ADDR:PORT" in hex), state field 3,
            // inode field 9; 0A is TCP_LISTEN
            if fields.len() < 10 || fields[3] != "0A" {
                continue;
            }
            let Some((_, port_hex)) = fields[1].rsplit_once(':') else {
                continue;
            };
            if u16::from_str_radix(port_hex, 16) == Ok(port) {
                return fields[9].parse().ok();
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bound_port_is_unavailable() {
        let listener = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let port = listener.local_addr().unwrap().port();
        assert!(!is_port_available(port, "127.0.0.1"));
    }

    #[test]
    fn find_skips_bound_port() {
        let listener = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let port = listener.local_addr().unwrap().port();
        let found = find_available_port(port, u16::MAX, 1, "127.0.0.1").unwrap();
        assert_ne!(found, port);
        assert!(found > port);
    }

    #[test]
    fn exhausted_range_fails() {
        let listener = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let port = listener.local_addr().unwrap().port();
        let err = find_available_port(port, port, 1, "127.0.0.1").unwrap_err();
        assert!(matches!(err, PortError::Exhausted { .. }));
    }
}
