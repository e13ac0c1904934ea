//! DSN parsing
//!
//! Endpoints are written `unix:///path/to/socket` or `tcp://host:port`.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{MelianError, Result};

/// A parsed endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dsn {
    /// Local domain socket
    Unix(PathBuf),

    /// TCP endpoint
    Tcp { host: String, port: u16 },
}

impl Dsn {
    /// Parse a DSN string, failing with `Connection` if it is malformed
    pub fn parse(dsn: &str) -> Result<Self> {
        let malformed = |reason: &str| MelianError::Connection {
            dsn: dsn.to_string(),
            reason: reason.to_string(),
        };

        let dsn = dsn.trim();
        if let Some(path) = dsn.strip_prefix("unix://") {
            if path.is_empty() {
                return Err(malformed("unix DSN must include a socket path"));
            }
            return Ok(Dsn::Unix(PathBuf::from(path)));
        }

        if let Some(host_port) = dsn.strip_prefix("tcp://") {
            let (host, port) = host_port
                .rsplit_once(':')
                .ok_or_else(|| malformed("tcp DSN must include host:port"))?;
            let host = host.trim_start_matches('[').trim_end_matches(']');
            if host.is_empty() || port.is_empty() {
                return Err(malformed("tcp DSN must include host:port"));
            }
            let port = port
                .parse::<u16>()
                .map_err(|_| malformed("tcp DSN port must be a number between 0 and 65535"))?;
            return Ok(Dsn::Tcp {
                host: host.to_string(),
                port,
            });
        }

        Err(malformed("unsupported DSN scheme, expected unix:// or tcp://"))
    }
}

impl FromStr for Dsn {
    type Err = MelianError;

    fn from_str(s: &str) -> Result<Self> {
        Dsn::parse(s)
    }
}

impl fmt::Display for Dsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dsn::Unix(path) => write!(f, "unix://{}", path.display()),
            Dsn::Tcp { host, port } if host.contains(':') => write!(f, "tcp://[{}]:{}", host, port),
            Dsn::Tcp { host, port } => write!(f, "tcp://{}:{}", host, port),
        }
    }
}
