//! Transport session
//!
//! Owns one byte stream and runs one request/response exchange at a time.

use std::io::{Read, Write};

use crate::config::ClientConfig;
use crate::error::{MelianError, Result};
use crate::protocol::read_response_frame;
use super::{Connection, Dsn};

/// One open stream with strictly sequential round trips
///
/// Responses carry no correlation id, so a reply always belongs to the
/// request written just before it. After an I/O or framing failure the
/// stream position is unknown and the session closes itself.
pub struct Session<S: Read + Write = Connection> {
    stream: Option<S>,
    round_trips: u64,
}

impl Session<Connection> {
    /// Parse the DSN and connect
    pub fn open(dsn: &str, config: &ClientConfig) -> Result<Self> {
        let dsn = Dsn::parse(dsn)?;
        let connection = Connection::open(&dsn, config)?;
        Ok(Self::new(connection))
    }
}

impl<S: Read + Write> Session<S> {
    /// Wrap an already connected stream
    pub fn new(stream: S) -> Self {
        Self {
            stream: Some(stream),
            round_trips: 0,
        }
    }

    /// Write one request frame and read back one complete response frame
    pub fn round_trip(&mut self, request: &[u8]) -> Result<Vec<u8>> {
        let stream = self.stream.as_mut().ok_or(MelianError::ClosedSession)?;

        let result = exchange(stream, request);
        match &result {
            Ok(response) => {
                self.round_trips += 1;
                tracing::trace!(
                    "Round trip {}: sent {} bytes, received {} bytes",
                    self.round_trips,
                    request.len(),
                    response.len()
                );
            }
            Err(e) => {
                tracing::warn!("Round trip failed, closing session: {}", e);
                self.close();
            }
        }
        result
    }

    /// Run one round trip and decode the reply with `decode`
    ///
    /// A reply that fails to decode as a frame means the stream can no
    /// longer be trusted, so the session closes just as it does for I/O
    /// failures. Server-reported errors leave it open.
    pub fn request<T, F>(&mut self, request: &[u8], decode: F) -> Result<T>
    where
        F: FnOnce(&[u8]) -> Result<T>,
    {
        let response = self.round_trip(request)?;
        let result = decode(&response);
        if let Err(e @ MelianError::Frame(_)) = &result {
            tracing::warn!("Undecodable response, closing session: {}", e);
            self.close();
        }
        result
    }

    /// Release the stream; safe to call more than once
    pub fn close(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!("Session closed after {} round trips", self.round_trips);
        }
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Completed round trips
    pub fn round_trips(&self) -> u64 {
        self.round_trips
    }
}

fn exchange<S: Read + Write>(stream: &mut S, request: &[u8]) -> Result<Vec<u8>> {
    stream.write_all(request)?;
    stream.flush()?;
    read_response_frame(stream)
}
