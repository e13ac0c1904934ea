//! Table and index definitions

use std::fmt;

use crate::error::{MelianError, Result};
use super::KeyType;

/// A lookup path into a table, scoped to its owning table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    name: String,
    id: u32,
    key_type: KeyType,
    table_id: u32,
}

impl Index {
    /// Column name the index is keyed on
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wire id, unique within the owning table
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// Id of the owning table
    pub fn table_id(&self) -> u32 {
        self.table_id
    }
}

/// A cached table and its indexes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
    id: u32,
    row_width: u32,
    indexes: Vec<Index>,
}

impl Table {
    /// Create a table with no indexes yet
    pub fn new(name: impl Into<String>, id: u32, row_width: u32) -> Self {
        Self {
            name: name.into(),
            id,
            row_width,
            indexes: Vec::new(),
        }
    }

    /// Add an index owned by this table
    pub fn with_index(mut self, name: impl Into<String>, id: u32, key_type: KeyType) -> Self {
        self.push_index(name, id, key_type);
        self
    }

    pub(crate) fn push_index(&mut self, name: impl Into<String>, id: u32, key_type: KeyType) {
        self.indexes.push(Index {
            name: name.into(),
            id,
            key_type,
            table_id: self.id,
        });
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wire id of the table
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Width field from the schema (`period` in server documents)
    pub fn row_width(&self) -> u32 {
        self.row_width
    }

    /// Indexes in declaration order
    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    /// Look up an index by column name
    pub fn index(&self, name: &str) -> Option<&Index> {
        self.indexes.iter().find(|idx| idx.name == name)
    }

    /// Look up an index by wire id
    pub fn index_by_id(&self, id: u32) -> Option<&Index> {
        self.indexes.iter().find(|idx| idx.id == id)
    }

    pub(crate) fn has_index_name(&self, name: &str) -> bool {
        self.index(name).is_some()
    }

    pub(crate) fn has_index_id(&self, id: u32) -> bool {
        self.index_by_id(id).is_some()
    }

    /// Check the per-table invariants
    pub(crate) fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(MelianError::SchemaValidation(format!(
                "table id {} has an empty name",
                self.id
            )));
        }
        if self.indexes.is_empty() {
            return Err(MelianError::SchemaValidation(format!(
                "table '{}' defines no indexes",
                self.name
            )));
        }

        for (pos, index) in self.indexes.iter().enumerate() {
            if index.name.trim().is_empty() {
                return Err(MelianError::SchemaValidation(format!(
                    "table '{}' has an index with an empty name",
                    self.name
                )));
            }
            if index.table_id != self.id {
                return Err(MelianError::SchemaValidation(format!(
                    "index '{}' belongs to table id {}, not {}",
                    index.name, index.table_id, self.id
                )));
            }

            let earlier = &self.indexes[..pos];
            if earlier.iter().any(|other| other.name == index.name) {
                return Err(MelianError::SchemaValidation(format!(
                    "duplicate index name '{}' in table '{}'",
                    index.name, self.name
                )));
            }
            if earlier.iter().any(|other| other.id == index.id) {
                return Err(MelianError::SchemaValidation(format!(
                    "duplicate index id {} in table '{}'",
                    index.id, self.name
                )));
            }
        }

        Ok(())
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}|{}|", self.name, self.id, self.row_width)?;
        for (pos, index) in self.indexes.iter().enumerate() {
            if pos > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}#{}:{}", index.name, index.id, index.key_type)?;
        }
        Ok(())
    }
}
