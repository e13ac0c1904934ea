//! # Melian
//!
//! Client for the Melian row cache server:
//! - Schema model loaded from a compact spec, a JSON file, or the server
//! - Binary wire codec for DESCRIBE and FETCH
//! - Synchronous sessions over Unix domain sockets or TCP
//! - Name-based and id-based lookups by int or string key
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Client                               │
//! │           (resolve names, check key types)                  │
//! └───────┬──────────────────────┬──────────────────────┬───────┘
//!         │                      │                      │
//!         ▼                      ▼                      ▼
//!  ┌─────────────┐        ┌─────────────┐        ┌─────────────┐
//!  │   Schema    │        │  Protocol   │        │   Session   │
//!  │ (immutable) │        │   (codec)   │        │  (socket)   │
//!  └─────────────┘        └─────────────┘        └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use melian::{Client, ClientConfig};
//!
//! let config = ClientConfig::builder()
//!     .dsn("unix:///tmp/melian.sock")
//!     .schema_spec("table1#0|60|id#0:int,hostname#1:string")
//!     .build();
//! let mut client = Client::connect(config)?;
//! if let Some(row) = client.fetch_by_int("table1", "id", 5)? {
//!     println!("{:?}", row.get("name"));
//! }
//! client.close();
//! # Ok::<(), melian::MelianError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod schema;
pub mod protocol;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{MelianError, Result};
pub use config::{ClientConfig, SchemaSource};
pub use client::{Client, Ident, SharedClient};
pub use protocol::{Key, Row};
pub use schema::{Index, KeyType, Schema, SchemaDocument, Table};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of the client
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
