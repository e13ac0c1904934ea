//! Request definitions
//!
//! Represents requests sent to the server.

use crate::schema::KeyType;

/// Wire actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Action {
    /// `'D'`: describe the schema
    Describe = 0x44,

    /// `'F'`: fetch one row by index key
    Fetch = 0x46,
}

impl TryFrom<u8> for Action {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0x44 => Ok(Action::Describe),
            0x46 => Ok(Action::Fetch),
            other => Err(other),
        }
    }
}

/// A lookup key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// Integer key, sent as 4 little-endian bytes
    Int(i64),

    /// Byte-string key, sent raw
    Bytes(Vec<u8>),
}

impl Key {
    /// The index key type this key satisfies
    pub fn key_type(&self) -> KeyType {
        match self {
            Key::Int(_) => KeyType::Int,
            Key::Bytes(_) => KeyType::String,
        }
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Bytes(value.as_bytes().to_vec())
    }
}

impl From<&[u8]> for Key {
    fn from(value: &[u8]) -> Self {
        Key::Bytes(value.to_vec())
    }
}

impl From<Vec<u8>> for Key {
    fn from(value: Vec<u8>) -> Self {
        Key::Bytes(value)
    }
}

/// A decoded request frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Ask for the schema description
    Describe,

    /// Fetch a row
    Fetch {
        table_id: u8,
        index_id: u8,
        key: Key,
    },
}

impl Request {
    pub fn action(&self) -> Action {
        match self {
            Request::Describe => Action::Describe,
            Request::Fetch { .. } => Action::Fetch,
        }
    }
}
