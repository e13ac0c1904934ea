//! Tests for DSN parsing

use std::path::PathBuf;

use melian::network::Dsn;
use melian::MelianError;

#[test]
fn test_parse_unix() {
    assert_eq!(
        Dsn::parse("unix:///tmp/melian.sock").unwrap(),
        Dsn::Unix(PathBuf::from("/tmp/melian.sock"))
    );
}

#[test]
fn test_parse_tcp() {
    assert_eq!(
        Dsn::parse("tcp://127.0.0.1:8765").unwrap(),
        Dsn::Tcp {
            host: "127.0.0.1".to_string(),
            port: 8765
        }
    );
}

#[test]
fn test_parse_tcp_ipv6() {
    let dsn: Dsn = "tcp://[::1]:9000".parse().unwrap();
    assert_eq!(
        dsn,
        Dsn::Tcp {
            host: "::1".to_string(),
            port: 9000
        }
    );
    assert_eq!(dsn.to_string(), "tcp://[::1]:9000");
}

#[test]
fn test_display_round_trip() {
    for text in ["unix:///var/run/melian.sock", "tcp://cache.local:7000"] {
        assert_eq!(Dsn::parse(text).unwrap().to_string(), text);
    }
}

#[test]
fn test_malformed_dsns() {
    let bad = [
        "unix://",
        "tcp://localhost",
        "tcp://:8000",
        "tcp://localhost:",
        "tcp://localhost:http",
        "tcp://localhost:70000",
        "http://localhost:80",
        "/tmp/melian.sock",
        "",
    ];

    for text in bad {
        match Dsn::parse(text) {
            Err(MelianError::Connection { dsn, .. }) => assert_eq!(dsn, text),
            other => panic!("expected Connection error for {:?}, got {:?}", text, other),
        }
    }
}
