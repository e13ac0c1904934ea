//! Error types for the Melian client
//!
//! Provides a unified error type for all operations. Variants are grouped by
//! where the failure originates: schema acquisition, transport, wire format,
//! or local usage.

use thiserror::Error;

use crate::schema::KeyType;

/// Result type alias using MelianError
pub type Result<T> = std::result::Result<T, MelianError>;

/// Unified error type for Melian client operations
#[derive(Debug, Error)]
pub enum MelianError {
    // -------------------------------------------------------------------------
    // Schema Errors
    // -------------------------------------------------------------------------
    #[error("Schema spec error in clause '{clause}': {reason}")]
    SchemaParse { clause: String, reason: String },

    #[error("Invalid schema: {0}")]
    SchemaValidation(String),

    #[error("Schema load failed: {reason}")]
    SchemaLoad {
        reason: String,
        #[source]
        source: Option<Box<MelianError>>,
    },

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("Connection to '{dsn}' failed: {reason}")]
    Connection { dsn: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session is closed")]
    ClosedSession,

    // -------------------------------------------------------------------------
    // Wire Errors
    // -------------------------------------------------------------------------
    #[error("Malformed frame: {0}")]
    Frame(String),

    #[error("Server error {code}: {message}")]
    Protocol { code: u16, message: String },

    // -------------------------------------------------------------------------
    // Usage Errors
    // -------------------------------------------------------------------------
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Unknown index '{index}' on table '{table}'")]
    UnknownIndex { table: String, index: String },

    #[error("Index '{index}' on table '{table}' takes {expected} keys, got {actual} key")]
    KeyTypeMismatch {
        table: String,
        index: String,
        expected: KeyType,
        actual: KeyType,
    },
}

impl MelianError {
    pub(crate) fn parse(clause: &str, reason: impl Into<String>) -> Self {
        MelianError::SchemaParse {
            clause: clause.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn load(reason: impl Into<String>, source: MelianError) -> Self {
        MelianError::SchemaLoad {
            reason: reason.into(),
            source: Some(Box::new(source)),
        }
    }

    /// True for errors the caller caused and that were caught before any I/O
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            MelianError::UnknownTable(_)
                | MelianError::UnknownIndex { .. }
                | MelianError::KeyTypeMismatch { .. }
        )
    }

    /// True for failures of the underlying byte stream
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            MelianError::Connection { .. } | MelianError::Io(_) | MelianError::ClosedSession
        )
    }
}
