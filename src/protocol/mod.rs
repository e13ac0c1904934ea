//! Protocol Module
//!
//! Defines the Melian wire protocol.
//!
//! ## Protocol Format
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────┬──────────┬─────────────┐
//! │ Ver (1)  │  Act (1) │ Table(1) │ Index(1) │ Len (4)  │   Payload   │
//! └──────────┴──────────┴──────────┴──────────┴──────────┴─────────────┘
//! ```
//!
//! ### Actions
//! - 0x44 'D': DESCRIBE - Payload: empty
//! - 0x46 'F': FETCH    - Payload: key_tag (1) + key
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────┬──────────┬──────────┬──────────┐
//! │ Ver (1)  │  Act (1) │Status(1) │ Table(1) │ Index(1) │ Len (4)  │   Body   │
//! └──────────┴──────────┴──────────┴──────────┴──────────┴──────────┴──────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK        (body: JSON row or schema document)
//! - 0x01: NOT_FOUND (body: empty)
//! - 0x02: ERROR     (body: code (2) + UTF-8 message)

mod request;
mod response;
mod codec;

pub use request::{Action, Key, Request};
pub use response::{Response, Row, Status};
pub use codec::{
    decode_describe_response, decode_fetch_response, decode_request, decode_response,
    encode_describe, encode_fetch, encode_response, parse_response, read_request,
    read_response_frame, write_response,
    MAX_PAYLOAD_SIZE, PROTOCOL_VERSION, REQUEST_HEADER_SIZE, RESPONSE_HEADER_SIZE,
};
