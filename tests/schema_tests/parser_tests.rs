//! Tests for the compact schema spec parser
//!
//! These tests verify:
//! - Parsing single and multi-table specs
//! - Key type handling (case, default)
//! - Canonical form and round trips
//! - Rejection of malformed specs

use melian::schema::parse_schema_spec;
use melian::{KeyType, MelianError, Schema};

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_err(spec: &str) -> (String, String) {
    match parse_schema_spec(spec) {
        Err(MelianError::SchemaParse { clause, reason }) => (clause, reason),
        Err(other) => panic!("expected SchemaParse for {:?}, got {:?}", spec, other),
        Ok(schema) => panic!("expected SchemaParse for {:?}, parsed {:?}", spec, schema),
    }
}

// =============================================================================
// Parsing Tests
// =============================================================================

#[test]
fn test_parse_single_table() {
    let schema = parse_schema_spec("table1#0|60|id#0:int,hostname#1:string").unwrap();

    assert_eq!(schema.len(), 1);
    let table = schema.table("table1").unwrap();
    assert_eq!(table.id(), 0);
    assert_eq!(table.row_width(), 60);
    assert_eq!(table.indexes().len(), 2);

    let id = table.index("id").unwrap();
    assert_eq!(id.id(), 0);
    assert_eq!(id.key_type(), KeyType::Int);
    assert_eq!(id.table_id(), 0);

    let hostname = table.index("hostname").unwrap();
    assert_eq!(hostname.id(), 1);
    assert_eq!(hostname.key_type(), KeyType::String);
}

#[test]
fn test_parse_multiple_tables_semicolon() {
    let schema =
        parse_schema_spec("table1#0|60|id#0:int;table2#1|30|id#0:int,hostname#1:string").unwrap();

    assert_eq!(schema.len(), 2);
    let names: Vec<&str> = schema.tables().iter().map(|t| t.name()).collect();
    assert_eq!(names, vec!["table1", "table2"]);

    let table2 = schema.table_by_id(1).unwrap();
    assert_eq!(table2.name(), "table2");
    assert_eq!(table2.row_width(), 30);
    assert_eq!(table2.index_by_id(1).unwrap().name(), "hostname");
}

#[test]
fn test_parse_multiple_tables_newline_and_whitespace() {
    let spec = "
        table1 # 0 | 60 | id # 0 : int

        table2#1|60| id#0:int , hostname#1:string
    ";
    let schema = parse_schema_spec(spec).unwrap();

    assert_eq!(schema.len(), 2);
    assert_eq!(schema.table("table1").unwrap().index("id").unwrap().id(), 0);
    assert_eq!(
        schema.table("table2").unwrap().index("hostname").unwrap().key_type(),
        KeyType::String
    );
}

#[test]
fn test_key_type_case_insensitive() {
    let schema = parse_schema_spec("t#3|0|a#0:INT,b#1:String").unwrap();
    let table = schema.table("t").unwrap();

    assert_eq!(table.index("a").unwrap().key_type(), KeyType::Int);
    assert_eq!(table.index("b").unwrap().key_type(), KeyType::String);
    assert_eq!(schema.to_string(), "t#3|0|a#0:int,b#1:string");
}

#[test]
fn test_missing_key_type_defaults_to_int() {
    let schema = parse_schema_spec("t#0|0|id#0").unwrap();
    assert_eq!(
        schema.table("t").unwrap().index("id").unwrap().key_type(),
        KeyType::Int
    );
}

#[test]
fn test_index_ids_scoped_to_table() {
    // Both tables use index id 0, which is legal
    let schema = parse_schema_spec("a#0|0|id#0:int;b#1|0|id#0:string").unwrap();
    assert_eq!(schema.table("a").unwrap().index_by_id(0).unwrap().key_type(), KeyType::Int);
    assert_eq!(schema.table("b").unwrap().index_by_id(0).unwrap().key_type(), KeyType::String);
}

#[test]
fn test_from_str() {
    let schema: Schema = "table1#0|60|id#0:int".parse().unwrap();
    assert!(schema.table("table1").is_some());
}

// =============================================================================
// Canonical Form Tests
// =============================================================================

#[test]
fn test_display_canonical_form() {
    let schema =
        parse_schema_spec(" table1#0|60|id#0:INT \n table2#1|60|id#0,hostname#1:string ").unwrap();
    assert_eq!(
        schema.to_string(),
        "table1#0|60|id#0:int;table2#1|60|id#0:int,hostname#1:string"
    );
}

#[test]
fn test_canonical_round_trip() {
    let specs = [
        "table1#0|60|id#0:int,hostname#1:string",
        "table1#0|60|id#0:int;table2#1|60|id#0:int,hostname#1:string",
        "x#255|4096|k#7:string\ny#9|0|k#0:Int,j#1",
    ];

    for spec in specs {
        let parsed = parse_schema_spec(spec).unwrap();
        let reparsed = parse_schema_spec(&parsed.to_string()).unwrap();
        assert_eq!(parsed, reparsed, "round trip changed {:?}", spec);
    }
}

// =============================================================================
// Error Handling Tests
// =============================================================================

#[test]
fn test_empty_spec() {
    parse_err("");
    parse_err("   \n ; ");
}

#[test]
fn test_wrong_field_count() {
    let (clause, reason) = parse_err("table1#0|60");
    assert_eq!(clause, "table1#0|60");
    assert!(reason.contains("found 2 fields"));

    parse_err("table1#0|60|id#0:int|extra");
}

#[test]
fn test_missing_hash() {
    let (_, reason) = parse_err("table1|60|id#0:int");
    assert!(reason.contains("missing '#'"));

    parse_err("table1#0|60|id:int");
}

#[test]
fn test_empty_names() {
    parse_err("#0|60|id#0:int");
    parse_err("t#0|60|#0:int");
}

#[test]
fn test_non_numeric_fields() {
    let (_, reason) = parse_err("table1#x|60|id#0:int");
    assert!(reason.contains("table id"));

    let (_, reason) = parse_err("table1#0|wide|id#0:int");
    assert!(reason.contains("row width"));

    let (_, reason) = parse_err("table1#0|60|id#-1:int");
    assert!(reason.contains("index id"));

    parse_err("table1#|60|id#0:int");
}

#[test]
fn test_unknown_key_type() {
    let (clause, reason) = parse_err("table1#0|60|id#0:float");
    assert_eq!(clause, "table1#0|60|id#0:float");
    assert!(reason.contains("float"));
}

#[test]
fn test_table_without_indexes() {
    let (_, reason) = parse_err("table1#0|60|");
    assert!(reason.contains("at least one index"));
}

#[test]
fn test_duplicate_table_name() {
    let (clause, reason) = parse_err("t#0|60|id#0:int;t#1|60|id#0:int");
    assert_eq!(clause, "t#1|60|id#0:int");
    assert!(reason.contains("duplicate table name"));
}

#[test]
fn test_duplicate_table_id() {
    let (_, reason) = parse_err("a#0|60|id#0:int;b#0|60|id#0:int");
    assert!(reason.contains("duplicate table id"));
}

#[test]
fn test_duplicate_index_id() {
    let (_, reason) = parse_err("t#0|60|id#0:int,hostname#0:string");
    assert!(reason.contains("duplicate index id"));
}

#[test]
fn test_duplicate_index_name() {
    let (_, reason) = parse_err("t#0|60|id#0:int,id#1:string");
    assert!(reason.contains("duplicate index name"));
}
