//! Tests for Session
//!
//! These tests verify:
//! - Round trips over an in-memory stream
//! - Close semantics (idempotent, ClosedSession afterwards)
//! - Self-closing after transport and framing failures
//! - Real Unix socket connections

use std::io::ErrorKind;

use melian::network::Session;
use melian::protocol::{
    decode_response, encode_describe, encode_fetch, encode_response, Action, Key, Response,
};
use melian::{ClientConfig, MelianError};
use serde_json::json;

use crate::common::{row_json, MockStream};

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_round_trip_returns_one_frame() {
    let first = Response::row(0, 0, row_json(json!({"id": 1})));
    let second = Response::not_found(0, 0);
    let (stream, written) = MockStream::with_responses(&[first.clone(), second.clone()]);
    let mut session = Session::new(stream);

    let request = encode_fetch(0, 0, &Key::Int(1)).unwrap();
    assert_eq!(session.round_trip(&request).unwrap(), encode_response(&first));
    assert_eq!(*written.lock(), request);

    assert_eq!(session.round_trip(&request).unwrap(), encode_response(&second));
    assert_eq!(written.lock().len(), request.len() * 2);
    assert_eq!(session.round_trips(), 2);
}

#[test]
fn test_eof_before_full_frame() {
    let frame = encode_response(&Response::row(0, 0, row_json(json!({"id": 1}))));
    let (stream, _) = MockStream::new(frame[..frame.len() - 1].to_vec());
    let mut session = Session::new(stream);

    match session.round_trip(&encode_describe()) {
        Err(MelianError::Io(e)) => assert_eq!(e.kind(), ErrorKind::UnexpectedEof),
        other => panic!("expected Io error, got {:?}", other),
    }

    // A half-read stream is never reused
    assert!(!session.is_open());
    assert!(matches!(
        session.round_trip(&encode_describe()),
        Err(MelianError::ClosedSession)
    ));
}

#[test]
fn test_bad_frame_closes_session() {
    let (stream, _) = MockStream::new(vec![0xFF; 16]);
    let mut session = Session::new(stream);

    assert!(matches!(
        session.round_trip(&encode_describe()),
        Err(MelianError::Frame(_))
    ));
    assert!(!session.is_open());
}

#[test]
fn test_undecodable_reply_closes_session() {
    let (stream, _) = MockStream::with_responses(&[
        Response::error(Action::Fetch, 17, "index not loaded"),
        Response::row(0, 0, b"[1,2]".to_vec()),
    ]);
    let mut session = Session::new(stream);
    let request = encode_fetch(0, 0, &Key::Int(1)).unwrap();

    assert!(matches!(
        session.request(&request, decode_response),
        Err(MelianError::Protocol { code: 17, .. })
    ));
    assert!(session.is_open());

    assert!(matches!(
        session.request(&request, decode_response),
        Err(MelianError::Frame(_))
    ));
    assert!(!session.is_open());
}

// =============================================================================
// Close Tests
// =============================================================================

#[test]
fn test_close_is_idempotent() {
    let (stream, written) = MockStream::silent();
    let mut session = Session::new(stream);

    assert!(session.is_open());
    session.close();
    session.close();
    assert!(!session.is_open());

    assert!(matches!(
        session.round_trip(&encode_describe()),
        Err(MelianError::ClosedSession)
    ));
    assert!(written.lock().is_empty());
}

// =============================================================================
// Socket Tests
// =============================================================================

#[test]
fn test_open_malformed_dsn() {
    let result = Session::open("pipe://nowhere", &ClientConfig::default());
    assert!(matches!(result, Err(MelianError::Connection { .. })));
}

#[cfg(unix)]
#[test]
fn test_open_missing_socket() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let dsn = format!("unix://{}", temp_dir.path().join("absent.sock").display());

    match Session::open(&dsn, &ClientConfig::default()) {
        Err(MelianError::Connection { dsn: reported, .. }) => assert_eq!(reported, dsn),
        other => panic!("expected Connection error, got {:?}", other.map(|_| ())),
    }
}

#[cfg(unix)]
#[test]
fn test_round_trip_over_unix_socket() {
    use crate::common::{describe_json, server};
    use melian::protocol::{decode_describe_response, Request};

    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("melian.sock");
    let handle = server::spawn(&path, |request| match request {
        Request::Describe => Response::describe(describe_json()),
        Request::Fetch { table_id, index_id, .. } => Response::not_found(table_id, index_id),
    });

    let dsn = format!("unix://{}", path.display());
    let mut session = Session::open(&dsn, &ClientConfig::default()).unwrap();

    let response = session.round_trip(&encode_describe()).unwrap();
    let schema = decode_describe_response(&response).unwrap();
    assert_eq!(schema.len(), 2);

    session.close();
    assert_eq!(handle.join().unwrap(), 1);
}
