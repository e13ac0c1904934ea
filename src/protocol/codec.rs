//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────┬──────────┬─────────────┐
//! │ Ver (1)  │  Act (1) │ Table(1) │ Index(1) │ Len (4)  │   Payload   │
//! └──────────┴──────────┴──────────┴──────────┴──────────┴─────────────┘
//! ```
//!
//! ### Payload by Action
//! - DESCRIBE: empty
//! - FETCH:    key_tag (1) + key (int: 4 bytes LE, string: raw bytes)
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────┬──────────┬──────────┬──────────┐
//! │ Ver (1)  │  Act (1) │Status(1) │ Table(1) │ Index(1) │ Len (4)  │   Body   │
//! └──────────┴──────────┴──────────┴──────────┴──────────┴──────────┴──────────┘
//! ```
//!
//! Lengths are big-endian. Decoding is all-or-nothing: a frame that is short,
//! long, or malformed anywhere yields `MelianError::Frame`.

use std::io::{Read, Write};

use bytes::{Buf, BufMut, BytesMut};
use serde_json::Value;

use crate::error::{MelianError, Result};
use crate::schema::{KeyType, Schema, SchemaDocument};
use super::{Action, Key, Request, Response, Row, Status};

/// Protocol version byte leading every frame
pub const PROTOCOL_VERSION: u8 = 0x11;

/// Request header size: version + action + table + index + length (4)
pub const REQUEST_HEADER_SIZE: usize = 8;

/// Response header size: version + action + status + table + index + length (4)
pub const RESPONSE_HEADER_SIZE: usize = 9;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

/// Table and index ids travel as single bytes
const MAX_WIRE_ID: u32 = u8::MAX as u32;

// =============================================================================
// Request Encoding/Decoding
// =============================================================================

/// Encode a DESCRIBE request
pub fn encode_describe() -> Vec<u8> {
    encode_request(Action::Describe, 0, 0, &[])
}

/// Encode a FETCH request
///
/// Fails with `Frame` if an id does not fit in one byte or an integer key
/// does not fit in four.
pub fn encode_fetch(table_id: u32, index_id: u32, key: &Key) -> Result<Vec<u8>> {
    let table = wire_id(table_id, "table")?;
    let index = wire_id(index_id, "index")?;

    let mut payload = BytesMut::with_capacity(5);
    payload.put_u8(key.key_type() as u8);
    match key {
        Key::Int(value) => {
            let value = u32::try_from(*value).map_err(|_| {
                MelianError::Frame(format!(
                    "integer key {} does not fit in 4 unsigned bytes",
                    value
                ))
            })?;
            payload.put_u32_le(value);
        }
        Key::Bytes(bytes) => payload.put_slice(bytes),
    }

    if payload.len() > MAX_PAYLOAD_SIZE as usize {
        return Err(MelianError::Frame(format!(
            "Payload too large: {} bytes (max {})",
            payload.len(),
            MAX_PAYLOAD_SIZE
        )));
    }

    Ok(encode_request(Action::Fetch, table, index, &payload))
}

/// Encode a request header followed by its payload
fn encode_request(action: Action, table: u8, index: u8, payload: &[u8]) -> Vec<u8> {
    let mut message = BytesMut::with_capacity(REQUEST_HEADER_SIZE + payload.len());
    message.put_u8(PROTOCOL_VERSION);
    message.put_u8(action as u8);
    message.put_u8(table);
    message.put_u8(index);
    message.put_u32(payload.len() as u32);
    message.put_slice(payload);
    message.to_vec()
}

fn wire_id(id: u32, what: &str) -> Result<u8> {
    if id > MAX_WIRE_ID {
        return Err(MelianError::Frame(format!(
            "{} id {} exceeds wire maximum {}",
            what, id, MAX_WIRE_ID
        )));
    }
    Ok(id as u8)
}

/// Decode a request frame
///
/// The server side of the codec; used by test servers and tooling.
pub fn decode_request(bytes: &[u8]) -> Result<Request> {
    if bytes.len() < REQUEST_HEADER_SIZE {
        return Err(MelianError::Frame(format!(
            "Incomplete header: expected {} bytes, got {}",
            REQUEST_HEADER_SIZE,
            bytes.len()
        )));
    }

    let mut header = &bytes[..REQUEST_HEADER_SIZE];
    check_version(header.get_u8())?;
    let action_byte = header.get_u8();
    let table_id = header.get_u8();
    let index_id = header.get_u8();
    let payload = frame_body(bytes, REQUEST_HEADER_SIZE, header.get_u32())?;

    let action = Action::try_from(action_byte).map_err(|b| {
        MelianError::Frame(format!("Unknown action: 0x{:02x}", b))
    })?;

    match action {
        Action::Describe => {
            if !payload.is_empty() {
                return Err(MelianError::Frame(format!(
                    "DESCRIBE: unexpected payload of {} bytes",
                    payload.len()
                )));
            }
            Ok(Request::Describe)
        }
        Action::Fetch => {
            let (&tag, key_bytes) = payload.split_first().ok_or_else(|| {
                MelianError::Frame("FETCH: missing key type tag".to_string())
            })?;
            let key = match tag {
                t if t == KeyType::Int as u8 => {
                    let raw: [u8; 4] = key_bytes.try_into().map_err(|_| {
                        MelianError::Frame(format!(
                            "FETCH: integer key must be 4 bytes, got {}",
                            key_bytes.len()
                        ))
                    })?;
                    Key::Int(i64::from(u32::from_le_bytes(raw)))
                }
                t if t == KeyType::String as u8 => Key::Bytes(key_bytes.to_vec()),
                other => {
                    return Err(MelianError::Frame(format!(
                        "FETCH: unknown key type tag 0x{:02x}",
                        other
                    )))
                }
            };
            Ok(Request::Fetch {
                table_id,
                index_id,
                key,
            })
        }
    }
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response frame
pub fn encode_response(response: &Response) -> Vec<u8> {
    let mut message = BytesMut::with_capacity(RESPONSE_HEADER_SIZE + response.body.len());
    message.put_u8(PROTOCOL_VERSION);
    message.put_u8(response.action as u8);
    message.put_u8(response.status as u8);
    message.put_u8(response.table_id);
    message.put_u8(response.index_id);
    message.put_u32(response.body.len() as u32);
    message.put_slice(&response.body);
    message.to_vec()
}

/// Parse one complete response frame
///
/// Checks version, action, status and that the byte count matches the
/// declared body length exactly.
pub fn parse_response(bytes: &[u8]) -> Result<Response> {
    if bytes.len() < RESPONSE_HEADER_SIZE {
        return Err(MelianError::Frame(format!(
            "Incomplete response header: expected {} bytes, got {}",
            RESPONSE_HEADER_SIZE,
            bytes.len()
        )));
    }

    let mut header = &bytes[..RESPONSE_HEADER_SIZE];
    check_version(header.get_u8())?;
    let action = Action::try_from(header.get_u8()).map_err(|b| {
        MelianError::Frame(format!("Unknown response action: 0x{:02x}", b))
    })?;
    let status = Status::try_from(header.get_u8()).map_err(|b| {
        MelianError::Frame(format!("Unknown response status: 0x{:02x}", b))
    })?;
    let table_id = header.get_u8();
    let index_id = header.get_u8();
    let body = frame_body(bytes, RESPONSE_HEADER_SIZE, header.get_u32())?;

    Ok(Response {
        action,
        status,
        table_id,
        index_id,
        body: body.to_vec(),
    })
}

/// Decode a FETCH response
///
/// Returns `None` when the server has no row for the key and
/// `MelianError::Protocol` when it reports an error.
pub fn decode_response(bytes: &[u8]) -> Result<Option<Row>> {
    let response = parse_response(bytes)?;
    expect_action(&response, Action::Fetch)?;
    fetch_result(response)
}

/// Decode the response to a FETCH for `table_id`/`index_id`
///
/// Same as [`decode_response`], but an OK or NOT_FOUND frame must also echo
/// the requested table and index. ERROR frames are not tied to an index and
/// skip the echo check.
pub fn decode_fetch_response(bytes: &[u8], table_id: u32, index_id: u32) -> Result<Option<Row>> {
    let response = parse_response(bytes)?;
    expect_action(&response, Action::Fetch)?;

    let echoed = (u32::from(response.table_id), u32::from(response.index_id));
    if response.status != Status::Error && echoed != (table_id, index_id) {
        return Err(MelianError::Frame(format!(
            "response echoes table {} index {}, requested table {} index {}",
            echoed.0, echoed.1, table_id, index_id
        )));
    }

    fetch_result(response)
}

fn fetch_result(response: Response) -> Result<Option<Row>> {
    match response.status {
        Status::Ok if response.body.is_empty() => Ok(None),
        Status::Ok => {
            let fields = match serde_json::from_slice::<Value>(&response.body) {
                Ok(Value::Object(fields)) => fields,
                Ok(other) => {
                    return Err(MelianError::Frame(format!(
                        "row payload must be a JSON object, got {}",
                        json_kind(&other)
                    )))
                }
                Err(e) => {
                    return Err(MelianError::Frame(format!("row payload is not JSON: {}", e)))
                }
            };
            Ok(Some(Row::new(
                u32::from(response.table_id),
                u32::from(response.index_id),
                fields,
            )))
        }
        Status::NotFound => {
            if !response.body.is_empty() {
                return Err(MelianError::Frame(format!(
                    "NOT_FOUND response carries {} unexpected bytes",
                    response.body.len()
                )));
            }
            Ok(None)
        }
        Status::Error => Err(decode_error_body(&response.body)),
    }
}

/// Decode a DESCRIBE response into a validated schema
pub fn decode_describe_response(bytes: &[u8]) -> Result<Schema> {
    let response = parse_response(bytes)?;
    expect_action(&response, Action::Describe)?;

    match response.status {
        Status::Ok => {
            if response.body.is_empty() {
                return Err(MelianError::Frame(
                    "server returned an empty schema description".to_string(),
                ));
            }
            let document: SchemaDocument = serde_json::from_slice(&response.body)
                .map_err(|e| MelianError::Frame(format!("malformed schema description: {}", e)))?;
            Schema::try_from(document)
        }
        Status::NotFound => Err(MelianError::Frame(
            "NOT_FOUND is not a valid DESCRIBE status".to_string(),
        )),
        Status::Error => Err(decode_error_body(&response.body)),
    }
}

/// Turn an ERROR body into `Protocol`, or `Frame` if the body is malformed
fn decode_error_body(body: &[u8]) -> MelianError {
    if body.len() < 2 {
        return MelianError::Frame(format!(
            "ERROR body must hold a 2-byte code, got {} bytes",
            body.len()
        ));
    }

    let mut cursor = body;
    let code = cursor.get_u16();
    match std::str::from_utf8(cursor) {
        Ok(message) => MelianError::Protocol {
            code,
            message: message.to_string(),
        },
        Err(e) => MelianError::Frame(format!("ERROR message is not UTF-8: {}", e)),
    }
}

fn expect_action(response: &Response, expected: Action) -> Result<()> {
    if response.action != expected {
        return Err(MelianError::Frame(format!(
            "response echoes {:?}, expected {:?}",
            response.action, expected
        )));
    }
    Ok(())
}

fn check_version(version: u8) -> Result<()> {
    if version != PROTOCOL_VERSION {
        return Err(MelianError::Frame(format!(
            "Unknown protocol version: 0x{:02x} (expected 0x{:02x})",
            version, PROTOCOL_VERSION
        )));
    }
    Ok(())
}

/// Slice the body out of a frame, requiring the exact declared length
fn frame_body(bytes: &[u8], header_size: usize, declared: u32) -> Result<&[u8]> {
    if declared > MAX_PAYLOAD_SIZE {
        return Err(MelianError::Frame(format!(
            "Payload too large: {} bytes (max {})",
            declared, MAX_PAYLOAD_SIZE
        )));
    }

    let total_len = header_size + declared as usize;
    if bytes.len() < total_len {
        return Err(MelianError::Frame(format!(
            "Incomplete payload: expected {} bytes, got {}",
            total_len,
            bytes.len()
        )));
    }
    if bytes.len() > total_len {
        return Err(MelianError::Frame(format!(
            "Trailing data: expected {} bytes, got {}",
            total_len,
            bytes.len()
        )));
    }

    Ok(&bytes[header_size..])
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one complete response frame from a stream
///
/// Blocks until the header and the declared body have arrived. Returns the
/// raw frame bytes for [`decode_response`] or [`decode_describe_response`].
pub fn read_response_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    // Read header first
    let mut header = [0u8; RESPONSE_HEADER_SIZE];
    reader.read_exact(&mut header)?;

    check_version(header[0])?;

    let payload_len = u32::from_be_bytes([header[5], header[6], header[7], header[8]]);
    if payload_len > MAX_PAYLOAD_SIZE {
        return Err(MelianError::Frame(format!(
            "Response payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    let mut frame = Vec::with_capacity(RESPONSE_HEADER_SIZE + payload_len as usize);
    frame.extend_from_slice(&header);
    frame.resize(RESPONSE_HEADER_SIZE + payload_len as usize, 0);
    if payload_len > 0 {
        reader.read_exact(&mut frame[RESPONSE_HEADER_SIZE..])?;
    }

    Ok(frame)
}

/// Read one complete request frame from a stream
pub fn read_request<R: Read>(reader: &mut R) -> Result<Request> {
    let mut header = [0u8; REQUEST_HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let payload_len = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);
    if payload_len > MAX_PAYLOAD_SIZE {
        return Err(MelianError::Frame(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    let mut frame = vec![0u8; REQUEST_HEADER_SIZE + payload_len as usize];
    frame[..REQUEST_HEADER_SIZE].copy_from_slice(&header);
    if payload_len > 0 {
        reader.read_exact(&mut frame[REQUEST_HEADER_SIZE..])?;
    }

    decode_request(&frame)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
