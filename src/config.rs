//! Configuration for the Melian client
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::schema::SchemaDocument;

/// Environment variable that overrides the DSN
pub const DSN_ENV_VAR: &str = "MELIAN_DSN";

/// DSN used when nothing else is configured
pub const DEFAULT_DSN: &str = "unix:///tmp/melian.sock";

/// Main configuration for a Melian client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Endpoint, either `unix:///path/to/socket` or `tcp://host:port`
    pub dsn: String,

    /// Connect timeout for TCP endpoints (milliseconds, 0 = OS default)
    pub connect_timeout_ms: u64,

    /// Socket read timeout (milliseconds, 0 = block forever)
    pub read_timeout_ms: u64,

    /// Socket write timeout (milliseconds, 0 = block forever)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Schema Configuration
    // -------------------------------------------------------------------------
    /// Pre-parsed schema document
    pub schema: Option<SchemaDocument>,

    /// Compact schema spec, e.g. `table1#0|60|id#0:int,hostname#1:string`
    pub schema_spec: Option<String>,

    /// Path to a JSON schema document
    pub schema_file: Option<PathBuf>,
}

/// Where the client gets its schema from
#[derive(Debug, Clone)]
pub enum SchemaSource {
    /// Validate and use a pre-parsed document
    Document(SchemaDocument),

    /// Parse a compact spec string
    Spec(String),

    /// Load a JSON document from disk
    File(PathBuf),

    /// Ask the server with DESCRIBE
    Describe,
}

impl SchemaSource {
    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            SchemaSource::Document(_) => "document",
            SchemaSource::Spec(_) => "spec",
            SchemaSource::File(_) => "file",
            SchemaSource::Describe => "describe",
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            dsn: DEFAULT_DSN.to_string(),
            connect_timeout_ms: 1000,
            read_timeout_ms: 1000,
            write_timeout_ms: 1000,
            schema: None,
            schema_spec: None,
            schema_file: None,
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Create a builder seeded from the environment
    pub fn builder_from_env() -> ClientConfigBuilder {
        ClientConfigBuilder::from_env()
    }

    /// Default config with the DSN taken from `MELIAN_DSN` when set
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(dsn) = std::env::var(DSN_ENV_VAR) {
            if !dsn.trim().is_empty() {
                config.dsn = dsn.trim().to_string();
            }
        }
        config
    }

    /// Pick the schema source.
    ///
    /// Precedence: document > spec > file > server DESCRIBE.
    pub fn schema_source(&self) -> SchemaSource {
        let supplied = [
            self.schema.is_some(),
            self.schema_spec.is_some(),
            self.schema_file.is_some(),
        ]
        .iter()
        .filter(|s| **s)
        .count();

        let source = if let Some(document) = &self.schema {
            SchemaSource::Document(document.clone())
        } else if let Some(spec) = &self.schema_spec {
            SchemaSource::Spec(spec.clone())
        } else if let Some(path) = &self.schema_file {
            SchemaSource::File(path.clone())
        } else {
            SchemaSource::Describe
        };

        if supplied > 1 {
            tracing::warn!(
                "{} schema sources configured, using {}",
                supplied,
                source.kind()
            );
        }

        source
    }
}

/// Builder for ClientConfig
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Start from the environment instead of the plain defaults
    pub fn from_env() -> Self {
        Self {
            config: ClientConfig::from_env(),
        }
    }

    /// Set the endpoint DSN
    pub fn dsn(mut self, dsn: impl Into<String>) -> Self {
        self.config.dsn = dsn.into();
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Use a pre-parsed schema document
    pub fn schema(mut self, document: SchemaDocument) -> Self {
        self.config.schema = Some(document);
        self
    }

    /// Use a compact schema spec
    pub fn schema_spec(mut self, spec: impl Into<String>) -> Self {
        self.config.schema_spec = Some(spec.into());
        self
    }

    /// Load the schema from a JSON file
    pub fn schema_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.schema_file = Some(path.into());
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}
