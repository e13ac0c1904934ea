//! Response definitions
//!
//! Represents response frames from the server and the rows they carry.

use serde_json::{Map, Value};

use crate::error::MelianError;
use super::Action;

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    NotFound = 0x01,
    Error = 0x02,
}

impl TryFrom<u8> for Status {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, u8> {
        match byte {
            0x00 => Ok(Status::Ok),
            0x01 => Ok(Status::NotFound),
            0x02 => Ok(Status::Error),
            other => Err(other),
        }
    }
}

/// A response frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Echo of the request action
    pub action: Action,

    /// Status code
    pub status: Status,

    /// Echo of the request table id
    pub table_id: u8,

    /// Echo of the request index id
    pub index_id: u8,

    /// JSON for OK, empty for NOT_FOUND, code + message for ERROR
    pub body: Vec<u8>,
}

impl Response {
    /// Create an OK fetch response carrying a JSON row
    pub fn row(table_id: u8, index_id: u8, body: Vec<u8>) -> Self {
        Self {
            action: Action::Fetch,
            status: Status::Ok,
            table_id,
            index_id,
            body,
        }
    }

    /// Create a NOT_FOUND fetch response
    pub fn not_found(table_id: u8, index_id: u8) -> Self {
        Self {
            action: Action::Fetch,
            status: Status::NotFound,
            table_id,
            index_id,
            body: Vec::new(),
        }
    }

    /// Create an OK describe response carrying a JSON schema document
    pub fn describe(body: Vec<u8>) -> Self {
        Self {
            action: Action::Describe,
            status: Status::Ok,
            table_id: 0,
            index_id: 0,
            body,
        }
    }

    /// Create an ERROR response
    pub fn error(action: Action, code: u16, message: &str) -> Self {
        let mut body = Vec::with_capacity(2 + message.len());
        body.extend_from_slice(&code.to_be_bytes());
        body.extend_from_slice(message.as_bytes());
        Self {
            action,
            status: Status::Error,
            table_id: 0,
            index_id: 0,
            body,
        }
    }
}

/// One decoded row
///
/// Fields keep the order the server sent them in.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    table_id: u32,
    index_id: u32,
    fields: Map<String, Value>,
}

impl Row {
    pub fn new(table_id: u32, index_id: u32, fields: Map<String, Value>) -> Self {
        Self {
            table_id,
            index_id,
            fields,
        }
    }

    /// Table the row came from
    pub fn table_id(&self) -> u32 {
        self.table_id
    }

    /// Index the row was looked up through
    pub fn index_id(&self) -> u32 {
        self.index_id
    }

    /// Get a field by name
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Iterate fields in wire order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Render the fields as pretty-printed JSON, in wire order
    pub fn to_json_pretty(&self) -> crate::Result<String> {
        serde_json::to_string_pretty(&self.fields).map_err(|e| MelianError::Io(e.into()))
    }
}
