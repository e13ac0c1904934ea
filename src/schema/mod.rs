//! Schema Module
//!
//! The tables and indexes a client needs to address the server.
//!
//! ## Responsibilities
//! - Immutable, validated model built once per client
//! - Name and id lookups for tables and their indexes
//! - Loading from a compact spec, a JSON document, or a DESCRIBE reply
//!
//! ## Compact Spec Format
//! ```text
//! table1#0|60|id#0:int;table2#1|60|id#0:int,hostname#1:string
//! └─┬──┘ │ └┬┘ └──┬───┘
//!  name  id │  index clauses (name#id:type, comma separated)
//!        row width
//! ```
//! Table clauses are separated by `;` or newlines.

mod table;
mod parser;
mod document;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{MelianError, Result};

pub use table::{Index, Table};
pub use parser::parse_schema_spec;
pub use document::{load_schema_file, IndexDocument, SchemaDocument, TableDocument};

/// Type of key an index accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum KeyType {
    Int = 0x01,
    String = 0x02,
}

impl KeyType {
    /// Canonical lowercase name, as used in specs and documents
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Int => "int",
            KeyType::String => "string",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "int" => Ok(KeyType::Int),
            "string" => Ok(KeyType::String),
            other => Err(format!("unrecognized key type '{}'", other)),
        }
    }
}

/// Validated set of tables
///
/// Tables keep their declaration order. Lookups by name and id go through
/// maps built at construction; the schema is never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    tables: Vec<Table>,
    by_name: HashMap<String, usize>,
    by_id: HashMap<u32, usize>,
}

impl Schema {
    /// Build a schema, checking every invariant
    ///
    /// Fails with `SchemaValidation` on an empty table list, empty names,
    /// duplicate table names or ids, tables without indexes, duplicate index
    /// names or ids within a table, or an index owned by another table id.
    pub fn new(tables: Vec<Table>) -> Result<Self> {
        if tables.is_empty() {
            return Err(MelianError::SchemaValidation(
                "schema defines no tables".to_string(),
            ));
        }

        let mut by_name = HashMap::with_capacity(tables.len());
        let mut by_id = HashMap::with_capacity(tables.len());

        for (pos, table) in tables.iter().enumerate() {
            table.validate()?;

            if by_name.insert(table.name().to_string(), pos).is_some() {
                return Err(MelianError::SchemaValidation(format!(
                    "duplicate table name '{}'",
                    table.name()
                )));
            }
            if by_id.insert(table.id(), pos).is_some() {
                return Err(MelianError::SchemaValidation(format!(
                    "duplicate table id {} (table '{}')",
                    table.id(),
                    table.name()
                )));
            }
        }

        Ok(Self {
            tables,
            by_name,
            by_id,
        })
    }

    /// All tables in declaration order
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Look up a table by name
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.by_name.get(name).map(|&pos| &self.tables[pos])
    }

    /// Look up a table by wire id
    pub fn table_by_id(&self, id: u32) -> Option<&Table> {
        self.by_id.get(&id).map(|&pos| &self.tables[pos])
    }

    /// Resolve a table name and index name to the table and index
    pub fn resolve(&self, table_name: &str, index_name: &str) -> Result<(&Table, &Index)> {
        let table = self
            .table(table_name)
            .ok_or_else(|| MelianError::UnknownTable(table_name.to_string()))?;
        let index = table.index(index_name).ok_or_else(|| MelianError::UnknownIndex {
            table: table_name.to_string(),
            index: index_name.to_string(),
        })?;
        Ok((table, index))
    }

    /// Number of tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl FromStr for Schema {
    type Err = MelianError;

    fn from_str(spec: &str) -> Result<Self> {
        parse_schema_spec(spec)
    }
}

/// Canonical compact spec: table clauses joined by `;`
impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (pos, table) in self.tables.iter().enumerate() {
            if pos > 0 {
                f.write_str(";")?;
            }
            write!(f, "{}", table)?;
        }
        Ok(())
    }
}
