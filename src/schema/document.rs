//! Serialized schema documents
//!
//! The JSON shape used by schema files and by the server's DESCRIBE reply:
//!
//! ```json
//! {"tables": [{"name": "table1", "id": 0, "period": 60,
//!              "indexes": [{"column": "id", "id": 0, "type": "int"}]}]}
//! ```
//!
//! Every field shown is required. Unknown keys are ignored.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MelianError, Result};
use super::{KeyType, Schema, Table};

/// Top-level schema document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub tables: Vec<TableDocument>,
}

/// One table entry of a schema document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDocument {
    pub name: String,
    pub id: u32,
    #[serde(rename = "period", alias = "row_width")]
    pub row_width: u32,
    pub indexes: Vec<IndexDocument>,
}

/// One index entry of a table document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDocument {
    #[serde(rename = "column", alias = "name")]
    pub name: String,
    pub id: u32,
    #[serde(rename = "type")]
    pub key_type: String,
}

impl SchemaDocument {
    /// Deserialize a document from JSON bytes
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| MelianError::SchemaValidation(format!("malformed schema document: {}", e)))
    }

    /// Serialize the document as pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| MelianError::SchemaValidation(format!("cannot serialize schema: {}", e)))
    }
}

impl TryFrom<SchemaDocument> for Schema {
    type Error = MelianError;

    fn try_from(document: SchemaDocument) -> Result<Self> {
        let mut tables = Vec::with_capacity(document.tables.len());

        for table_doc in document.tables {
            let mut table = Table::new(table_doc.name, table_doc.id, table_doc.row_width);
            for index_doc in table_doc.indexes {
                let key_type = index_doc.key_type.parse::<KeyType>().map_err(|reason| {
                    MelianError::SchemaValidation(format!(
                        "index '{}' of table '{}': {}",
                        index_doc.name,
                        table.name(),
                        reason
                    ))
                })?;
                table.push_index(index_doc.name, index_doc.id, key_type);
            }
            tables.push(table);
        }

        Schema::new(tables)
    }
}

impl From<&Schema> for SchemaDocument {
    fn from(schema: &Schema) -> Self {
        let tables = schema
            .tables()
            .iter()
            .map(|table| TableDocument {
                name: table.name().to_string(),
                id: table.id(),
                row_width: table.row_width(),
                indexes: table
                    .indexes()
                    .iter()
                    .map(|index| IndexDocument {
                        name: index.name().to_string(),
                        id: index.id(),
                        key_type: index.key_type().to_string(),
                    })
                    .collect(),
            })
            .collect();

        Self { tables }
    }
}

/// Load and validate a JSON schema document from disk
///
/// Every failure (missing or unreadable file, malformed JSON, invalid
/// contents) is reported as `SchemaLoad` wrapping the cause.
pub fn load_schema_file(path: impl AsRef<Path>) -> Result<Schema> {
    let path = path.as_ref();

    let contents = fs::read(path).map_err(|e| {
        MelianError::load(format!("cannot read schema file {}", path.display()), e.into())
    })?;

    let document = SchemaDocument::from_json(&contents).map_err(|e| {
        MelianError::load(format!("cannot parse schema file {}", path.display()), e)
    })?;

    Schema::try_from(document).map_err(|e| {
        MelianError::load(format!("invalid schema file {}", path.display()), e)
    })
}
