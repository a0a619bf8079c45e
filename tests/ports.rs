// ABOUTME: Integration tests for port availability probing and resolution.
// ABOUTME: Binds real listeners on loopback to create occupied ports.

use stakkr::ports::{PortError, find_available_port, is_port_available, resolve_port_conflict};
use std::net::TcpListener;

const HOST: &str = "127.0.0.1";

fn occupied_port() -> (TcpListener, u16) {
    let listener = TcpListener::bind((HOST, 0)).unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

mod availability {
    use super::*;

    #[test]
    fn bound_port_is_not_available() {
        let (_listener, port) = occupied_port();
        assert!(!is_port_available(port, HOST));
    }

    #[test]
    fn released_port_becomes_available() {
        let (listener, port) = occupied_port();
        drop(listener);
        assert!(is_port_available(port, HOST));
    }
}

mod scanning {
    use super::*;

    #[test]
    fn returns_base_when_free() {
        let (listener, port) = occupied_port();
        drop(listener);
        assert_eq!(find_available_port(port, u16::MAX, 1, HOST).unwrap(), port);
    }

    #[test]
    fn skips_occupied_base() {
        let (_listener, port) = occupied_port();
        let found = find_available_port(port, u16::MAX, 1, HOST).unwrap();
        assert!(found > port);
    }

    #[test]
    fn respects_increment() {
        let (_listener, port) = occupied_port();
        let found = find_available_port(port, u16::MAX, 5, HOST).unwrap();
        assert_eq!((found - port) % 5, 0);
    }

    #[test]
    fn fails_when_range_exhausted() {
        let (_listener, port) = occupied_port();
        let err = find_available_port(port, port, 1, HOST).unwrap_err();
        assert!(matches!(
            err,
            PortError::Exhausted {
                base,
                max,
                increment: 1,
            } if base == port && max == port
        ));
    }
}

mod conflict_resolution {
    use super::*;

    #[test]
    fn free_port_is_returned_unchanged() {
        let (listener, port) = occupied_port();
        drop(listener);
        assert_eq!(resolve_port_conflict(port, true, HOST).unwrap(), port);
        assert_eq!(resolve_port_conflict(port, false, HOST).unwrap(), port);
    }

    #[test]
    fn auto_assign_finds_replacement() {
        let (_listener, port) = occupied_port();
        let assigned = resolve_port_conflict(port, true, HOST).unwrap();
        assert_ne!(assigned, port);
        assert!(is_port_available(assigned, HOST));
    }

    #[test]
    fn without_auto_assign_fails_and_keeps_requested_port() {
        let (_listener, port) = occupied_port();
        let err = resolve_port_conflict(port, false, HOST).unwrap_err();
        assert!(matches!(err, PortError::InUse { port: p, .. } if p == port));
    }
}
