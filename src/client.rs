//! Client Module
//!
//! The public face of the crate: loads the schema, resolves names, and runs
//! fetches over a session.
//!
//! ## Responsibilities
//! - Acquire the schema from one of four sources during construction
//! - Resolve table/index names to wire ids
//! - Check key types before anything is written to the socket
//! - Release the connection on every failure path

use std::io::{Read, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::{ClientConfig, SchemaSource};
use crate::error::{MelianError, Result};
use crate::network::{Connection, Session};
use crate::protocol::{
    decode_describe_response, decode_fetch_response, encode_describe, encode_fetch, Key, Row,
};
use crate::schema::{load_schema_file, parse_schema_spec, Index, Schema, Table};

/// A table or index, named or addressed by wire id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ident<'a> {
    Id(u32),
    Name(&'a str),
}

impl From<u32> for Ident<'_> {
    fn from(id: u32) -> Self {
        Ident::Id(id)
    }
}

impl<'a> From<&'a str> for Ident<'a> {
    fn from(name: &'a str) -> Self {
        Ident::Name(name)
    }
}

impl<'a> From<&'a String> for Ident<'a> {
    fn from(name: &'a String) -> Self {
        Ident::Name(name.as_str())
    }
}

/// Melian client
///
/// ## Lifecycle
/// `connect` opens the session and loads the schema; if loading fails the
/// session is closed before the error is returned. The schema never changes
/// afterwards. `close` (or drop) releases the connection.
///
/// A client runs one request at a time. Share it across threads through
/// [`SharedClient`] or give each thread its own client.
pub struct Client<S: Read + Write = Connection> {
    schema: Arc<Schema>,
    session: Session<S>,
}

impl Client<Connection> {
    /// Connect to `config.dsn` and load the schema
    pub fn connect(config: ClientConfig) -> Result<Self> {
        let session = Session::open(&config.dsn, &config)?;
        Self::bootstrap(session, config.schema_source())
    }
}

impl<S: Read + Write> Client<S> {
    /// Build a client over an already connected stream
    pub fn with_stream(stream: S, source: SchemaSource) -> Result<Self> {
        Self::bootstrap(Session::new(stream), source)
    }

    /// Build a client over a stream with a schema already in hand
    pub fn with_schema(stream: S, schema: Arc<Schema>) -> Self {
        Self {
            schema,
            session: Session::new(stream),
        }
    }

    fn bootstrap(mut session: Session<S>, source: SchemaSource) -> Result<Self> {
        let kind = source.kind();
        match load_schema(&mut session, source) {
            Ok(schema) => {
                tracing::info!("Loaded schema from {}: {} tables", kind, schema.len());
                Ok(Self {
                    schema: Arc::new(schema),
                    session,
                })
            }
            Err(e) => {
                tracing::warn!("Schema load from {} failed: {}", kind, e);
                session.close();
                Err(e)
            }
        }
    }

    /// The schema loaded at construction
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Shared handle to the schema, usable from other threads
    pub fn shared_schema(&self) -> Arc<Schema> {
        Arc::clone(&self.schema)
    }

    /// Ask the server for its current schema
    ///
    /// Does not replace the schema this client was built with.
    pub fn describe_schema(&mut self) -> Result<Schema> {
        describe(&mut self.session)
    }

    /// Map a table name and index name to their wire ids
    pub fn resolve_index(&self, table: &str, index: &str) -> Result<(u32, u32)> {
        let (table, index) = self.schema.resolve(table, index)?;
        Ok((table.id(), index.id()))
    }

    /// Fetch a row by key
    ///
    /// `table` and `index` are ids or names. Unknown identifiers and keys of
    /// the wrong type fail before any byte reaches the socket. Returns `None`
    /// when the server has no row for the key.
    pub fn fetch<'a>(
        &mut self,
        table: impl Into<Ident<'a>>,
        index: impl Into<Ident<'a>>,
        key: Key,
    ) -> Result<Option<Row>> {
        let (table, index) = lookup(&self.schema, table.into(), index.into())?;

        if index.key_type() != key.key_type() {
            return Err(MelianError::KeyTypeMismatch {
                table: table.name().to_string(),
                index: index.name().to_string(),
                expected: index.key_type(),
                actual: key.key_type(),
            });
        }

        let (table_id, index_id) = (table.id(), index.id());
        let request = encode_fetch(table_id, index_id, &key)?;

        tracing::debug!(
            "FETCH {}.{} (table={}, index={})",
            table.name(),
            index.name(),
            table_id,
            index_id
        );

        self.session.request(&request, |response| {
            decode_fetch_response(response, table_id, index_id)
        })
    }

    /// Fetch a row from a string-keyed index
    pub fn fetch_by_string<'a>(
        &mut self,
        table: impl Into<Ident<'a>>,
        index: impl Into<Ident<'a>>,
        key: impl AsRef<[u8]>,
    ) -> Result<Option<Row>> {
        self.fetch(table, index, Key::Bytes(key.as_ref().to_vec()))
    }

    /// Fetch a row from an int-keyed index
    pub fn fetch_by_int<'a>(
        &mut self,
        table: impl Into<Ident<'a>>,
        index: impl Into<Ident<'a>>,
        key: i64,
    ) -> Result<Option<Row>> {
        self.fetch(table, index, Key::Int(key))
    }

    /// Close the session; later fetches fail with `ClosedSession`
    pub fn close(&mut self) {
        self.session.close();
    }

    pub fn is_open(&self) -> bool {
        self.session.is_open()
    }
}

/// Client guarded by a mutex for use from several threads
///
/// Requests are serialized on the lock; name resolution reads the shared
/// schema without taking it.
pub struct SharedClient<S: Read + Write = Connection> {
    schema: Arc<Schema>,
    client: Mutex<Client<S>>,
}

impl<S: Read + Write> SharedClient<S> {
    pub fn new(client: Client<S>) -> Self {
        Self {
            schema: client.shared_schema(),
            client: Mutex::new(client),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn resolve_index(&self, table: &str, index: &str) -> Result<(u32, u32)> {
        let (table, index) = self.schema.resolve(table, index)?;
        Ok((table.id(), index.id()))
    }

    pub fn fetch<'a>(
        &self,
        table: impl Into<Ident<'a>>,
        index: impl Into<Ident<'a>>,
        key: Key,
    ) -> Result<Option<Row>> {
        self.client.lock().fetch(table, index, key)
    }

    pub fn fetch_by_string<'a>(
        &self,
        table: impl Into<Ident<'a>>,
        index: impl Into<Ident<'a>>,
        key: impl AsRef<[u8]>,
    ) -> Result<Option<Row>> {
        self.client.lock().fetch_by_string(table, index, key)
    }

    pub fn fetch_by_int<'a>(
        &self,
        table: impl Into<Ident<'a>>,
        index: impl Into<Ident<'a>>,
        key: i64,
    ) -> Result<Option<Row>> {
        self.client.lock().fetch_by_int(table, index, key)
    }

    pub fn close(&self) {
        self.client.lock().close();
    }

    /// Take the client back out of the lock
    pub fn into_inner(self) -> Client<S> {
        self.client.into_inner()
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn load_schema<S: Read + Write>(session: &mut Session<S>, source: SchemaSource) -> Result<Schema> {
    match source {
        SchemaSource::Document(document) => Schema::try_from(document),
        SchemaSource::Spec(spec) => parse_schema_spec(&spec),
        SchemaSource::File(path) => load_schema_file(path),
        SchemaSource::Describe => describe(session)
            .map_err(|e| MelianError::load("schema discovery via DESCRIBE failed", e)),
    }
}

fn describe<S: Read + Write>(session: &mut Session<S>) -> Result<Schema> {
    tracing::debug!("DESCRIBE");
    session.request(&encode_describe(), decode_describe_response)
}

/// Find a table and one of its indexes by id or name
fn lookup<'s>(schema: &'s Schema, table: Ident<'_>, index: Ident<'_>) -> Result<(&'s Table, &'s Index)> {
    let table = match table {
        Ident::Name(name) => schema.table(name),
        Ident::Id(id) => schema.table_by_id(id),
    }
    .ok_or_else(|| MelianError::UnknownTable(describe_ident(table)))?;

    let found = match index {
        Ident::Name(name) => table.index(name),
        Ident::Id(id) => table.index_by_id(id),
    };
    let index = found.ok_or_else(|| MelianError::UnknownIndex {
        table: table.name().to_string(),
        index: describe_ident(index),
    })?;

    Ok((table, index))
}

fn describe_ident(ident: Ident<'_>) -> String {
    match ident {
        Ident::Name(name) => name.to_string(),
        Ident::Id(id) => format!("#{}", id),
    }
}
