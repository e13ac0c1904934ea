//! Compact schema spec parser
//!
//! Turns `name#id|width|idx#id:type,...` clauses into a [`Schema`].

use crate::error::{MelianError, Result};
use super::{KeyType, Schema, Table};

/// Parse a compact schema spec
///
/// Table clauses are separated by `;` or newlines, index clauses by `,`.
/// A missing `:type` on an index defaults to `int`.
pub fn parse_schema_spec(spec: &str) -> Result<Schema> {
    let spec = spec.trim();
    if spec.is_empty() {
        return Err(MelianError::parse(spec, "schema spec is empty"));
    }

    let mut tables: Vec<Table> = Vec::new();

    for clause in spec.split(|c: char| c == ';' || c == '\n') {
        let clause = clause.trim();
        if clause.is_empty() {
            continue;
        }

        let table = parse_table_clause(clause)?;

        if tables.iter().any(|t| t.name() == table.name()) {
            return Err(MelianError::parse(
                clause,
                format!("duplicate table name '{}'", table.name()),
            ));
        }
        if tables.iter().any(|t| t.id() == table.id()) {
            return Err(MelianError::parse(
                clause,
                format!("duplicate table id {}", table.id()),
            ));
        }

        tables.push(table);
    }

    if tables.is_empty() {
        return Err(MelianError::parse(spec, "schema spec defines no tables"));
    }

    // Every invariant was checked per clause above
    Schema::new(tables).map_err(|e| MelianError::parse(spec, e.to_string()))
}

/// Parse one `name#id|width|indexes` clause
fn parse_table_clause(clause: &str) -> Result<Table> {
    let parts: Vec<&str> = clause.split('|').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(MelianError::parse(
            clause,
            format!("expected 'name#id|width|indexes', found {} fields", parts.len()),
        ));
    }

    let (name, id) = split_with_hash(clause, parts[0], "table")?;
    let row_width = parse_number(clause, parts[1], "row width")?;

    let mut table = Table::new(name, id, row_width);

    for index_clause in parts[2].split(',') {
        let index_clause = index_clause.trim();
        if index_clause.is_empty() {
            continue;
        }

        let (head, key_type) = match index_clause.split_once(':') {
            Some((head, ty)) => {
                let key_type = ty
                    .parse::<KeyType>()
                    .map_err(|reason| MelianError::parse(clause, reason))?;
                (head, key_type)
            }
            None => (index_clause, KeyType::Int),
        };

        let (index_name, index_id) = split_with_hash(clause, head, "index")?;

        if table.has_index_name(index_name) {
            return Err(MelianError::parse(
                clause,
                format!("duplicate index name '{}'", index_name),
            ));
        }
        if table.has_index_id(index_id) {
            return Err(MelianError::parse(
                clause,
                format!("duplicate index id {}", index_id),
            ));
        }

        table.push_index(index_name, index_id, key_type);
    }

    if table.indexes().is_empty() {
        return Err(MelianError::parse(
            clause,
            format!("table '{}' must define at least one index", table.name()),
        ));
    }

    Ok(table)
}

/// Split `name#id`, trimming both halves
fn split_with_hash<'a>(clause: &str, value: &'a str, label: &str) -> Result<(&'a str, u32)> {
    let (name, id) = value.split_once('#').ok_or_else(|| {
        MelianError::parse(
            clause,
            format!("missing '#' in {} '{}'", label, value),
        )
    })?;

    let name = name.trim();
    if name.is_empty() {
        return Err(MelianError::parse(
            clause,
            format!("empty {} name in '{}'", label, value),
        ));
    }

    let id = parse_number(clause, id, &format!("{} id", label))?;
    Ok((name, id))
}

fn parse_number(clause: &str, value: &str, what: &str) -> Result<u32> {
    let value = value.trim();
    value.parse::<u32>().map_err(|_| {
        MelianError::parse(
            clause,
            format!("{} '{}' is not a non-negative integer", what, value),
        )
    })
}
