//! Socket connection
//!
//! One blocking byte stream to the server, over a Unix socket or TCP.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
#[cfg(unix)]
use std::os::unix::net::UnixStream;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::{MelianError, Result};
use super::Dsn;

/// An open stream to the server
#[derive(Debug)]
pub enum Connection {
    #[cfg(unix)]
    Unix(UnixStream),
    Tcp(TcpStream),
}

impl Connection {
    /// Connect to the endpoint and apply the configured timeouts
    pub fn open(dsn: &Dsn, config: &ClientConfig) -> Result<Self> {
        let failed = |e: io::Error| MelianError::Connection {
            dsn: dsn.to_string(),
            reason: e.to_string(),
        };

        let connection = match dsn {
            #[cfg(unix)]
            Dsn::Unix(path) => Connection::Unix(UnixStream::connect(path).map_err(failed)?),
            #[cfg(not(unix))]
            Dsn::Unix(_) => {
                return Err(MelianError::Connection {
                    dsn: dsn.to_string(),
                    reason: "unix sockets are not supported on this platform".to_string(),
                })
            }
            Dsn::Tcp { host, port } => {
                let stream = connect_tcp(host, *port, config.connect_timeout_ms).map_err(failed)?;
                // Disable Nagle's algorithm for low latency
                stream.set_nodelay(true).map_err(failed)?;
                Connection::Tcp(stream)
            }
        };

        connection
            .set_timeouts(config.read_timeout_ms, config.write_timeout_ms)
            .map_err(failed)?;

        tracing::info!("Connected to {}", dsn);
        Ok(connection)
    }

    /// Configure socket timeouts (0 leaves the call blocking)
    pub fn set_timeouts(&self, read_ms: u64, write_ms: u64) -> io::Result<()> {
        let read = (read_ms > 0).then(|| Duration::from_millis(read_ms));
        let write = (write_ms > 0).then(|| Duration::from_millis(write_ms));

        match self {
            #[cfg(unix)]
            Connection::Unix(stream) => {
                stream.set_read_timeout(read)?;
                stream.set_write_timeout(write)
            }
            Connection::Tcp(stream) => {
                stream.set_read_timeout(read)?;
                stream.set_write_timeout(write)
            }
        }
    }
}

fn connect_tcp(host: &str, port: u16, timeout_ms: u64) -> io::Result<TcpStream> {
    if timeout_ms == 0 {
        return TcpStream::connect((host, port));
    }

    let timeout = Duration::from_millis(timeout_ms);
    let mut last_err = None;
    for addr in (host, port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }

    Err(last_err.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, format!("{} resolved to no addresses", host))
    }))
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            #[cfg(unix)]
            Connection::Unix(stream) => stream.read(buf),
            Connection::Tcp(stream) => stream.read(buf),
        }
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            #[cfg(unix)]
            Connection::Unix(stream) => stream.write(buf),
            Connection::Tcp(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            #[cfg(unix)]
            Connection::Unix(stream) => stream.flush(),
            Connection::Tcp(stream) => stream.flush(),
        }
    }
}
